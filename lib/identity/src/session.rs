//! Session enrichment.
//!
//! A session is either anonymous or carries a token naming an internal user.
//! Tokens are immutable: every transition produces a new [`SessionState`].

use chrono::{DateTime, Duration, SubsecRound, Utc};
use gatehouse_core::{InternalUserId, ParseIdError};
use serde::{Deserialize, Serialize};

use crate::callback::VerifiedSignIn;
use crate::user::InternalUser;

/// Claims of an enriched session.
///
/// Holds only backend-derived data. Provider account ids, provider tokens and
/// the raw external identity never end up here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionToken {
    /// Internal user id, stringified.
    sub: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    email: String,
    #[serde(with = "chrono::serde::ts_seconds")]
    iat: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_seconds")]
    exp: DateTime<Utc>,
}

impl SessionToken {
    pub(crate) fn issue(user: &InternalUser, issued_at: DateTime<Utc>, ttl: Duration) -> Self {
        let iat = issued_at.trunc_subsecs(0);
        Self {
            sub: user.id().to_string(),
            name: user.name().map(ToString::to_string),
            email: user.email().to_string(),
            iat,
            exp: iat.checked_add_signed(ttl).unwrap_or(DateTime::<Utc>::MAX_UTC),
        }
    }

    /// Returns the internal user id as carried in the token.
    #[must_use]
    pub fn internal_user_id(&self) -> &str {
        &self.sub
    }

    /// Parses the carried id.
    ///
    /// # Errors
    ///
    /// Returns an error if the token holds something other than a numeric id,
    /// which only happens for tokens not issued by this crate.
    pub fn user_id(&self) -> Result<InternalUserId, ParseIdError> {
        self.sub.parse()
    }

    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    #[must_use]
    pub fn issued_at(&self) -> DateTime<Utc> {
        self.iat
    }

    #[must_use]
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.exp
    }

    /// Returns true once `now` has reached the expiry.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.exp
    }

    /// Returns true if the token is usable at `now`.
    #[must_use]
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        !self.is_expired_at(now) && self.user_id().is_ok()
    }

    /// Client-facing projection.
    #[must_use]
    pub fn session(&self) -> Session {
        Session {
            user: SessionUser {
                id: self.sub.clone(),
                name: self.name.clone(),
                email: self.email.clone(),
            },
        }
    }
}

/// Read-only view of a session handed to pages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    pub user: SessionUser,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionUser {
    pub id: String,
    pub name: Option<String>,
    pub email: String,
}

/// Lifecycle of a session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SessionState {
    #[default]
    Anonymous,
    Enriched(SessionToken),
}

impl SessionState {
    /// Wraps whatever the cookie layer decoded.
    #[must_use]
    pub fn from_token(token: Option<SessionToken>) -> Self {
        token.map_or(Self::Anonymous, Self::Enriched)
    }

    /// Attaches the internal user from a completed sign-in.
    ///
    /// Re-enriching a still-valid session with the same id returns it
    /// unchanged. A different id or an expired token is replaced outright.
    #[must_use]
    pub fn enrich(self, sign_in: &VerifiedSignIn, issued_at: DateTime<Utc>, ttl: Duration) -> Self {
        let user = sign_in.user();
        match self {
            Self::Enriched(token)
                if token.user_id().is_ok_and(|id| id == user.id())
                    && !token.is_expired_at(issued_at) =>
            {
                Self::Enriched(token)
            }
            _ => Self::Enriched(SessionToken::issue(user, issued_at, ttl)),
        }
    }

    /// Ends the session.
    #[must_use]
    pub fn sign_out(self) -> Self {
        Self::Anonymous
    }

    /// Returns the token, if enriched.
    #[must_use]
    pub fn token(&self) -> Option<&SessionToken> {
        match self {
            Self::Anonymous => None,
            Self::Enriched(token) => Some(token),
        }
    }
}
