//! JSON endpoints for the browser.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use gatehouse_identity::{ProfileLookup, lookup_profile};
use serde_json::json;

use crate::auth::{AppState, OptionalSession};

/// `GET /api/bff/me`: the signed-in user's backend record.
///
/// - `401` without a valid session
/// - `404` when the backend has no such user
/// - `502` when the backend could not be asked
///
/// Backend failures of any kind, whether an error status or a transport
/// fault, collapse into the one `502`. The backend's own status is not
/// forwarded.
pub async fn me(
    State(state): State<AppState>,
    OptionalSession(token): OptionalSession,
) -> Response {
    let Some(token) = token else {
        return error(StatusCode::UNAUTHORIZED, "Unauthorized");
    };

    match lookup_profile(state.directory.as_ref(), &token).await {
        ProfileLookup::Found(user) => Json(user).into_response(),
        ProfileLookup::Missing => error(StatusCode::NOT_FOUND, "User not found"),
        ProfileLookup::Failed => error(StatusCode::BAD_GATEWAY, "Failed to fetch user"),
    }
}

fn error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}
