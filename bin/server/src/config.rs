//! Centralized server configuration.
//!
//! Strongly-typed configuration loaded via the `config` crate from
//! environment variables. Nested keys use `__` as separator, so
//! `SESSION__SECRET` populates [`SessionConfig::secret`].

use axum_extra::extract::cookie::Key;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Deserialize;

use crate::error::StartupError;

/// Longest accepted session lifetime: one year.
const MAX_SESSION_DURATION_MINUTES: i64 = 366 * 24 * 60;

/// Server configuration.
#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    /// Address to listen on.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Backend identity service.
    pub backend: BackendConfig,

    /// Session cookie configuration.
    pub session: SessionConfig,

    /// GitHub OAuth application.
    pub github: GithubOAuthConfig,

    /// Route gating.
    #[serde(default)]
    pub gate: GateConfig,
}

/// Backend identity service configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct BackendConfig {
    /// Base URL, e.g. `http://localhost:8080`.
    pub base_url: String,

    /// Timeout applied to every backend request, in seconds.
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    /// How profiles are resolved from the backend.
    #[serde(default)]
    pub profile_lookup: ProfileLookupMode,
}

/// Strategy for resolving a user id to a profile.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileLookupMode {
    /// Fetch `GET /users` and filter by id.
    #[default]
    List,
    /// Fetch `GET /users/{id}` directly.
    ById,
}

/// Session-related configuration.
#[derive(Clone, Deserialize)]
pub struct SessionConfig {
    /// Base64-encoded cookie signing secret, at least 64 bytes once decoded.
    pub secret: String,

    /// Session duration in minutes.
    #[serde(default = "default_session_duration_minutes")]
    pub duration_minutes: i64,

    /// Whether to set the Secure flag on cookies (requires HTTPS).
    /// Defaults to true; set to false for local HTTP development.
    #[serde(default = "default_secure_cookies")]
    pub secure_cookies: bool,
}

impl std::fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionConfig")
            .field("secret", &"<redacted>")
            .field("duration_minutes", &self.duration_minutes)
            .field("secure_cookies", &self.secure_cookies)
            .finish()
    }
}

impl SessionConfig {
    /// Creates a session config with an explicit secret and default settings.
    #[must_use]
    pub fn with_secret(secret: String) -> Self {
        Self {
            secret,
            duration_minutes: default_session_duration_minutes(),
            secure_cookies: default_secure_cookies(),
        }
    }

    /// Checks that the session lifetime is positive and at most a year.
    ///
    /// # Errors
    ///
    /// Returns [`StartupError::Config`] for any other `duration_minutes`.
    pub fn validate(&self) -> gatehouse_core::Result<(), StartupError> {
        let in_range = (1..=MAX_SESSION_DURATION_MINUTES).contains(&self.duration_minutes);
        if !in_range || chrono::TimeDelta::try_minutes(self.duration_minutes).is_none() {
            return Err(StartupError::Config {
                details: format!(
                    "session.duration_minutes must be between 1 and {MAX_SESSION_DURATION_MINUTES}, got {}",
                    self.duration_minutes
                ),
            }
            .into());
        }
        Ok(())
    }

    /// Session lifetime.
    ///
    /// Clamped to the range [`SessionConfig::validate`] accepts.
    #[must_use]
    pub fn duration(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.bounded_minutes())
    }

    /// Session cookie `Max-Age`, matching [`SessionConfig::duration`].
    #[must_use]
    pub fn cookie_max_age(&self) -> time::Duration {
        time::Duration::minutes(self.bounded_minutes())
    }

    fn bounded_minutes(&self) -> i64 {
        self.duration_minutes.clamp(1, MAX_SESSION_DURATION_MINUTES)
    }

    /// Derives the cookie signing key from the configured secret.
    ///
    /// # Errors
    ///
    /// Returns an error if the secret is not valid base64 or decodes to
    /// fewer than 64 bytes.
    pub fn signing_key(&self) -> gatehouse_core::Result<Key, StartupError> {
        let bytes = STANDARD
            .decode(self.secret.trim())
            .map_err(|e| StartupError::InvalidSecret {
                details: e.to_string(),
            })?;

        Ok(Key::try_from(bytes.as_slice()).map_err(|e| StartupError::InvalidSecret {
            details: e.to_string(),
        })?)
    }
}

/// GitHub OAuth application configuration.
#[derive(Clone, Deserialize)]
pub struct GithubOAuthConfig {
    pub client_id: String,
    pub client_secret: String,
    /// Callback URL registered with GitHub, ending in `/auth/callback`.
    pub redirect_url: String,
    #[serde(default = "default_github_auth_url")]
    pub auth_url: String,
    #[serde(default = "default_github_token_url")]
    pub token_url: String,
    #[serde(default = "default_github_api_base_url")]
    pub api_base_url: String,
}

impl std::fmt::Debug for GithubOAuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GithubOAuthConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("redirect_url", &self.redirect_url)
            .field("auth_url", &self.auth_url)
            .field("token_url", &self.token_url)
            .field("api_base_url", &self.api_base_url)
            .finish()
    }
}

/// Route gate configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct GateConfig {
    /// Path prefix that requires a session.
    #[serde(default = "default_protected_prefix")]
    pub protected_prefix: String,

    /// Sign-in entry point unauthenticated requests are sent to.
    #[serde(default = "default_login_path")]
    pub login_path: String,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            protected_prefix: default_protected_prefix(),
            login_path: default_login_path(),
        }
    }
}

fn default_bind_addr() -> String {
    "127.0.0.1:3000".to_string()
}

fn default_timeout_seconds() -> u64 {
    10
}

fn default_session_duration_minutes() -> i64 {
    // 30 days
    43_200
}

fn default_secure_cookies() -> bool {
    true
}

fn default_github_auth_url() -> String {
    "https://github.com/login/oauth/authorize".to_string()
}

fn default_github_token_url() -> String {
    "https://github.com/login/oauth/access_token".to_string()
}

fn default_github_api_base_url() -> String {
    "https://api.github.com".to_string()
}

fn default_protected_prefix() -> String {
    "/me".to_string()
}

fn default_login_path() -> String {
    "/login".to_string()
}

impl ServerConfig {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if required configuration is missing or invalid.
    pub fn from_env() -> Result<Self, config::ConfigError> {
        Self::from_environment(config::Environment::default())
    }

    fn from_environment(environment: config::Environment) -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(environment.separator("__").try_parsing(true))
            .build()?
            .try_deserialize()
    }
}
