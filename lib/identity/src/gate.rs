//! Route gating.
//!
//! Decides per request, before any page logic, whether a path may be served
//! with the session at hand.

use chrono::{DateTime, Utc};

use crate::session::SessionToken;

/// Outcome of gating a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    Allow,
    /// Redirect to the sign-in entry point.
    RedirectToLogin(String),
}

/// Gates one protected path prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteGate {
    prefix: String,
    login_path: String,
    exempt: Vec<String>,
}

impl RouteGate {
    /// Creates a gate for `prefix`, redirecting to `login_path`.
    ///
    /// The prefix is normalized to start with `/` and to carry no trailing
    /// slash. `/` gates every path except the login path and any paths
    /// added with [`RouteGate::with_exempt_paths`].
    #[must_use]
    pub fn new(prefix: impl Into<String>, login_path: impl Into<String>) -> Self {
        Self {
            prefix: normalize(&prefix.into()),
            login_path: login_path.into(),
            exempt: Vec::new(),
        }
    }

    /// Never gates the given exact paths, whatever the prefix.
    ///
    /// The sign-in flow's own endpoints belong here: gating them would send
    /// an anonymous user back to the login page before sign-in can start.
    #[must_use]
    pub fn with_exempt_paths<I, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<String>,
    {
        self.exempt.extend(paths.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    #[must_use]
    pub fn login_path(&self) -> &str {
        &self.login_path
    }

    /// Returns true if `path` sits under the protected prefix.
    ///
    /// Matching is by whole segments: with prefix `/me`, `/me` and
    /// `/me/profile` are protected but `/members` is not.
    #[must_use]
    pub fn is_protected(&self, path: &str) -> bool {
        if path == self.login_path || self.exempt.iter().any(|exempt| exempt == path) {
            return false;
        }
        if self.prefix.is_empty() {
            return true;
        }
        path.strip_prefix(self.prefix.as_str())
            .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
    }

    /// Decides whether `path` may be served.
    ///
    /// `token` is whatever the cookie layer verified and decoded; a cookie
    /// that failed verification arrives as `None`.
    #[must_use]
    pub fn decide(
        &self,
        path: &str,
        token: Option<&SessionToken>,
        now: DateTime<Utc>,
    ) -> GateDecision {
        if !self.is_protected(path) {
            return GateDecision::Allow;
        }
        match token {
            Some(token) if token.is_valid_at(now) => GateDecision::Allow,
            _ => GateDecision::RedirectToLogin(self.login_path.clone()),
        }
    }
}

fn normalize(prefix: &str) -> String {
    let trimmed = prefix.trim().trim_end_matches('/');
    if trimmed.is_empty() || trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    }
}
