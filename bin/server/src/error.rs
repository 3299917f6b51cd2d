//! Domain error types for server operations.
//!
//! Internals return `Report<E>` with one of these contexts. Nothing here is
//! rendered verbatim to a browser: handlers log the report and answer with a
//! generic message or a redirect.

use std::fmt;

use gatehouse_identity::SignInError;

/// Errors that prevent the server from starting.
#[derive(Debug)]
pub enum StartupError {
    /// Configuration could not be loaded.
    Config { details: String },
    /// The session secret is unusable as a signing key.
    InvalidSecret { details: String },
    /// A configured URL does not parse.
    InvalidUrl { field: &'static str, details: String },
    /// An HTTP client could not be built.
    HttpClient { details: String },
    /// Page templates failed to register.
    Templates { details: String },
    /// The listener could not be bound or the server stopped with an error.
    Serve { details: String },
}

impl fmt::Display for StartupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config { details } => write!(f, "configuration error: {}", details),
            Self::InvalidSecret { details } => {
                write!(f, "invalid session secret: {}", details)
            }
            Self::InvalidUrl { field, details } => {
                write!(f, "invalid URL for '{}': {}", field, details)
            }
            Self::HttpClient { details } => {
                write!(f, "failed to build HTTP client: {}", details)
            }
            Self::Templates { details } => {
                write!(f, "failed to register page templates: {}", details)
            }
            Self::Serve { details } => write!(f, "server error: {}", details),
        }
    }
}

impl std::error::Error for StartupError {}

/// Failures of the backend identity sync call.
///
/// Logged inside the sync client; callers only ever see
/// [`SyncFailed`](gatehouse_identity::SyncFailed).
#[derive(Debug)]
pub enum IdentitySyncError {
    /// Transport error, including timeouts.
    Network { details: String },
    /// The backend answered with a non-success status.
    Status { status: u16, body: String },
    /// The response body did not have the expected shape.
    MalformedPayload { details: String },
}

impl fmt::Display for IdentitySyncError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Network { details } => write!(f, "sync request failed: {}", details),
            Self::Status { status, body } => {
                write!(f, "backend answered sync with status {}: {}", status, body)
            }
            Self::MalformedPayload { details } => {
                write!(f, "malformed sync response: {}", details)
            }
        }
    }
}

impl std::error::Error for IdentitySyncError {}

/// OAuth provider errors.
#[derive(Debug)]
pub enum ProviderError {
    /// Token exchange with the provider failed.
    TokenExchange { details: String },
    /// The provider's user API could not be read.
    Profile { details: String },
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TokenExchange { details } => {
                write!(f, "token exchange failed: {}", details)
            }
            Self::Profile { details } => {
                write!(f, "failed to fetch provider profile: {}", details)
            }
        }
    }
}

impl std::error::Error for ProviderError {}

/// Errors encoding cookies.
#[derive(Debug)]
pub enum CookieError {
    Encode { details: String },
}

impl fmt::Display for CookieError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Encode { details } => write!(f, "failed to encode cookie: {}", details),
        }
    }
}

impl std::error::Error for CookieError {}

/// Reasons an OAuth callback request did not yield a session.
#[derive(Debug)]
pub enum CallbackError {
    /// The provider redirected back with an error, e.g. consent denied.
    ProviderDenied { error: String },
    /// No auth state cookie, or it failed verification.
    MissingAuthState,
    /// The returned state does not match the stored one.
    CsrfMismatch,
    /// The callback carried no authorization code.
    MissingCode,
    /// Code exchange or profile fetch failed.
    Provider,
    /// The orchestrator rejected the sign-in.
    SignIn(SignInError),
    /// The session cookie could not be written.
    Cookie,
}

impl fmt::Display for CallbackError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ProviderDenied { error } => write!(f, "provider returned error '{}'", error),
            Self::MissingAuthState => write!(f, "missing or invalid auth state"),
            Self::CsrfMismatch => write!(f, "CSRF token mismatch"),
            Self::MissingCode => write!(f, "missing authorization code"),
            Self::Provider => write!(f, "provider exchange failed"),
            Self::SignIn(err) => write!(f, "{}", err),
            Self::Cookie => write!(f, "failed to write session cookie"),
        }
    }
}

impl std::error::Error for CallbackError {}
