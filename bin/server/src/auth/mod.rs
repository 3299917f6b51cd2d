//! Authentication for the gatehouse server.
//!
//! This module provides:
//! - GitHub OAuth sign-in (`/auth/login`, `/auth/callback`, `/auth/logout`)
//! - The signed session cookie codec
//! - The route gate middleware and session extractors
//!
//! # Session Model
//!
//! Sessions are stateless: the signed `session` cookie carries the token
//! issued at the end of a successful callback, and nothing is stored
//! server-side. Signing out removes the cookie. The token names the internal
//! user id handed out by the backend identity service; provider tokens are
//! discarded once the callback finishes.

pub mod cookie;
pub mod github;
pub mod middleware;
pub mod routes;

use std::sync::Arc;

use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;
use gatehouse_identity::{CallbackOrchestrator, RouteGate, UserDirectory};

use crate::config::{GateConfig, SessionConfig};
use crate::pages::PageRenderer;

pub use github::{GithubOAuthClient, OAuthProvider};
pub use middleware::{AuthRejection, OptionalSession, RequireSession, route_gate};
pub use routes::{callback, login, logout};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// OAuth provider for sign-in.
    pub provider: Arc<dyn OAuthProvider>,
    /// Runs provider callbacks against the backend.
    pub orchestrator: Arc<CallbackOrchestrator>,
    /// Profile lookups.
    pub directory: Arc<dyn UserDirectory>,
    /// Protected path classification.
    pub gate: Arc<RouteGate>,
    /// Session configuration.
    pub session_config: Arc<SessionConfig>,
    /// Cookie signing key.
    pub cookie_key: Key,
    /// Server-side page templates.
    pub pages: Arc<PageRenderer>,
}

/// Builds the route gate for `config`, leaving the sign-in routes ungated.
#[must_use]
pub fn build_gate(config: &GateConfig) -> RouteGate {
    RouteGate::new(config.protected_prefix.as_str(), config.login_path.as_str())
        .with_exempt_paths(routes::PATHS)
}

impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.cookie_key.clone()
    }
}
