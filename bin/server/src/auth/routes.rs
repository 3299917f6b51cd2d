//! Authentication routes for login, callback, and logout.

use axum::{
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::SignedCookieJar;
use chrono::Utc;
use gatehouse_identity::SessionState;
use serde::Deserialize;
use tracing::{error, info, warn};

use super::{AppState, cookie};
use crate::error::CallbackError;

/// Error code put on the sign-in page after a failed callback.
pub const SIGNIN_FAILED: &str = "signin_failed";

pub const LOGIN_PATH: &str = "/auth/login";
pub const CALLBACK_PATH: &str = "/auth/callback";
pub const LOGOUT_PATH: &str = "/auth/logout";

/// Paths of the sign-in flow. These stay reachable without a session.
pub const PATHS: [&str; 3] = [LOGIN_PATH, CALLBACK_PATH, LOGOUT_PATH];

/// Query parameters for the OAuth callback.
#[derive(Debug, Default, Deserialize)]
pub struct CallbackQuery {
    code: Option<String>,
    state: Option<String>,
    error: Option<String>,
}

/// Initiates the OAuth login flow by redirecting to the provider.
pub async fn login(State(state): State<AppState>, jar: SignedCookieJar) -> Response {
    let (auth_url, auth_state) = state.provider.authorization_url();

    match cookie::write_auth_state(jar.clone(), &auth_state, &state.session_config) {
        Ok(jar) => (jar, Redirect::to(&auth_url)).into_response(),
        Err(report) => {
            error!(error = ?report, "failed to store auth state");
            (jar, sign_in_failed(&state)).into_response()
        }
    }
}

/// Handles the OAuth callback after the user authenticates with the provider.
///
/// On success the session cookie carries the backend's user id and the
/// browser goes home. On any failure both cookies are removed and the
/// browser goes back to the sign-in page.
pub async fn callback(
    State(state): State<AppState>,
    Query(query): Query<CallbackQuery>,
    jar: SignedCookieJar,
) -> Response {
    let outcome = complete_sign_in(&state, query, &jar)
        .await
        .and_then(|session| {
            let jar = cookie::clear_auth_state(jar.clone());
            cookie::store_session(jar, &session, &state.session_config).map_err(|report| {
                error!(error = ?report, "failed to write session cookie");
                CallbackError::Cookie
            })
        });

    match outcome {
        Ok(jar) => (jar, Redirect::to("/")).into_response(),
        Err(err) => {
            warn!(error = %err, "sign-in failed");
            let jar = cookie::clear_session(cookie::clear_auth_state(jar));
            (jar, sign_in_failed(&state)).into_response()
        }
    }
}

async fn complete_sign_in(
    state: &AppState,
    query: CallbackQuery,
    jar: &SignedCookieJar,
) -> Result<SessionState, CallbackError> {
    if let Some(error) = query.error {
        return Err(CallbackError::ProviderDenied { error });
    }

    let auth_state = cookie::read_auth_state(jar).ok_or(CallbackError::MissingAuthState)?;

    if query.state.as_deref() != Some(auth_state.csrf_token.as_str()) {
        return Err(CallbackError::CsrfMismatch);
    }

    let code = query.code.ok_or(CallbackError::MissingCode)?;

    let provider_result = state
        .provider
        .exchange_code(&code, &auth_state.pkce_verifier)
        .await
        .map_err(|report| {
            warn!(error = ?report, "provider exchange failed");
            CallbackError::Provider
        })?;

    let signed_in = state
        .orchestrator
        .complete(provider_result)
        .await
        .map_err(CallbackError::SignIn)?;

    let session = SessionState::from_token(cookie::read_session(jar)).enrich(
        &signed_in,
        Utc::now(),
        state.session_config.duration(),
    );

    Ok(session)
}

/// Logs out the user by removing the session cookie.
pub async fn logout(State(state): State<AppState>, jar: SignedCookieJar) -> Response {
    let current = SessionState::from_token(cookie::read_session(&jar));
    if let Some(token) = current.token() {
        info!(user_id = token.internal_user_id(), "signed out");
    }

    let jar = match cookie::store_session(jar.clone(), &current.sign_out(), &state.session_config) {
        Ok(jar) => jar,
        Err(report) => {
            error!(error = ?report, "failed to clear session cookie");
            cookie::clear_session(jar)
        }
    };

    (jar, Redirect::to("/")).into_response()
}

fn sign_in_failed(state: &AppState) -> Redirect {
    Redirect::to(&format!("{}?error={}", state.gate.login_path(), SIGNIN_FAILED))
}
