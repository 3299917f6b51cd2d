//! Router assembly.

use axum::{Router, middleware, routing::get};
use tower_http::trace::TraceLayer;

use crate::auth::{self, AppState, routes};
use crate::{api, pages};

/// Builds the application router.
///
/// The route gate wraps every route and the fallback, so protected paths
/// without a handler of their own are still gated.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(pages::home))
        .route("/login", get(pages::login))
        .route("/me", get(pages::me))
        .route("/api/bff/me", get(api::me))
        .route(routes::LOGIN_PATH, get(auth::login))
        .route(routes::CALLBACK_PATH, get(auth::callback))
        .route(routes::LOGOUT_PATH, get(auth::logout).post(auth::logout))
        .fallback(pages::not_found)
        .layer(middleware::from_fn_with_state(state.clone(), auth::route_gate))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
