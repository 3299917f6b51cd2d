//! Server-rendered pages.
//!
//! Templates are embedded at compile time and rendered with handlebars,
//! which HTML-escapes every interpolated value.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use gatehouse_identity::{ProfileLookup, lookup_profile};
use handlebars::Handlebars;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::error;

use crate::auth::{AppState, OptionalSession, RequireSession};
use crate::error::StartupError;

const TEMPLATES: &[(&str, &str)] = &[
    ("layout", include_str!("../templates/layout.hbs")),
    ("home", include_str!("../templates/home.hbs")),
    ("login", include_str!("../templates/login.hbs")),
    ("me", include_str!("../templates/me.hbs")),
    ("not_found", include_str!("../templates/not_found.hbs")),
];

/// Registry of the page templates.
pub struct PageRenderer {
    registry: Handlebars<'static>,
}

impl PageRenderer {
    /// Registers all page templates.
    ///
    /// # Errors
    ///
    /// Returns an error if a template does not parse.
    pub fn new() -> gatehouse_core::Result<Self, StartupError> {
        let mut registry = Handlebars::new();
        for (name, source) in TEMPLATES {
            registry
                .register_template_string(name, source)
                .map_err(|e| StartupError::Templates {
                    details: format!("{name}: {e}"),
                })?;
        }
        Ok(Self { registry })
    }

    /// Renders `name` to an HTML response.
    pub fn render<T: Serialize>(&self, name: &str, data: &T) -> Response {
        match self.registry.render(name, data) {
            Ok(html) => Html(html).into_response(),
            Err(e) => {
                error!(template = name, error = %e, "failed to render page");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
            }
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct LoginQuery {
    error: Option<String>,
}

pub async fn home(
    State(state): State<AppState>,
    OptionalSession(token): OptionalSession,
) -> Response {
    let session = token.map(|t| t.session());
    let profile_path = match state.gate.prefix() {
        "" => "/",
        prefix => prefix,
    };
    state.pages.render(
        "home",
        &json!({
            "session": session,
            "login_path": state.gate.login_path(),
            "profile_path": profile_path,
        }),
    )
}

/// The sign-in entry point.
pub async fn login(State(state): State<AppState>, Query(query): Query<LoginQuery>) -> Response {
    state
        .pages
        .render("login", &json!({ "failed": query.error.is_some() }))
}

/// The protected profile page.
///
/// A profile that cannot be resolved is shown as a message, never as an
/// error status.
pub async fn me(
    State(state): State<AppState>,
    RequireSession(token): RequireSession,
) -> Response {
    let profile = match lookup_profile(state.directory.as_ref(), &token).await {
        ProfileLookup::Found(user) => Some(user),
        ProfileLookup::Missing | ProfileLookup::Failed => None,
    };

    state.pages.render(
        "me",
        &json!({ "profile": profile, "session": token.session() }),
    )
}

pub async fn not_found(State(state): State<AppState>) -> Response {
    (StatusCode::NOT_FOUND, state.pages.render("not_found", &json!({}))).into_response()
}
