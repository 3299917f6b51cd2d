//! Route gate middleware and session extractors for Axum.

use axum::{
    extract::{FromRef, FromRequestParts, Request, State},
    http::{StatusCode, request::Parts},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::{SignedCookieJar, cookie::Key};
use chrono::Utc;
use gatehouse_identity::{GateDecision, SessionToken};
use tracing::debug;

use super::{AppState, cookie};

/// Gates every request before it reaches a handler.
///
/// Unprotected paths pass through untouched. Protected paths need a session
/// cookie that verifies, decodes and has not expired; anything else is sent
/// to the sign-in entry point.
pub async fn route_gate(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    request: Request,
    next: Next,
) -> Response {
    let token = cookie::read_session(&jar);
    let path = request.uri().path().to_owned();

    match state.gate.decide(&path, token.as_ref(), Utc::now()) {
        GateDecision::Allow => next.run(request).await,
        GateDecision::RedirectToLogin(login_path) => {
            debug!(%path, has_cookie = token.is_some(), "redirecting to sign-in");
            Redirect::to(&login_path).into_response()
        }
    }
}

/// Extractor for requiring a valid session.
///
/// If there is none, the user is redirected to the sign-in entry point.
pub struct RequireSession(pub SessionToken);

impl<S> FromRequestParts<S> for RequireSession
where
    AppState: FromRef<S>,
    Key: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let login_path = AppState::from_ref(state).gate.login_path().to_string();
        let jar = SignedCookieJar::<Key>::from_request_parts(parts, state)
            .await
            .map_err(|_| AuthRejection::InternalError)?;

        let token = cookie::read_session(&jar).ok_or_else(|| AuthRejection::NotAuthenticated {
            login_path: login_path.clone(),
        })?;

        if !token.is_valid_at(Utc::now()) {
            return Err(AuthRejection::SessionExpired { login_path });
        }

        Ok(RequireSession(token))
    }
}

/// Extractor for optionally getting the session.
///
/// Returns None if there is no valid session.
pub struct OptionalSession(pub Option<SessionToken>);

impl<S> FromRequestParts<S> for OptionalSession
where
    AppState: FromRef<S>,
    Key: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match RequireSession::from_request_parts(parts, state).await {
            Ok(RequireSession(token)) => Ok(OptionalSession(Some(token))),
            Err(_) => Ok(OptionalSession(None)),
        }
    }
}

/// Rejection type for session extractors.
#[derive(Debug)]
pub enum AuthRejection {
    NotAuthenticated { login_path: String },
    SessionExpired { login_path: String },
    InternalError,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::NotAuthenticated { login_path } | Self::SessionExpired { login_path } => {
                Redirect::to(&login_path).into_response()
            }
            Self::InternalError => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
            }
        }
    }
}
