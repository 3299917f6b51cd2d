//! Error types for the identity crate.
//!
//! - `SignInError`: why a provider callback did not produce a session
//! - `SyncFailed`: the opaque failure signal of the backend sync
//! - `DirectoryError`: failures resolving a user profile from the backend
//!
//! An unauthenticated request is not an error. It is a routing decision made
//! by [`RouteGate`](crate::gate::RouteGate).

use std::fmt;

/// Reasons a sign-in attempt is rejected.
///
/// Both variants are terminal for the current callback. The user is left
/// unauthenticated and has to start the sign-in again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignInError {
    /// The provider result lacks an account link or an email.
    ProviderCallbackInvalid { reason: String },
    /// The backend could not map the identity to an internal user.
    IdentitySyncFailure,
}

impl fmt::Display for SignInError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ProviderCallbackInvalid { reason } => {
                write!(f, "provider callback rejected: {reason}")
            }
            Self::IdentitySyncFailure => {
                write!(f, "identity sync with the backend failed")
            }
        }
    }
}

impl std::error::Error for SignInError {}

/// Generic failure returned by an [`IdentitySync`](crate::sync::IdentitySync)
/// implementation.
///
/// Carries no detail. Implementations log the cause themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncFailed;

impl fmt::Display for SyncFailed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "identity sync failed")
    }
}

impl std::error::Error for SyncFailed {}

/// Errors from profile lookups against the backend user directory.
///
/// A user that does not exist is not an error; directories return `Ok(None)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectoryError {
    /// The backend could not be reached or answered with a failure status.
    Unavailable { details: String },
    /// The backend answered but the payload did not have the expected shape.
    MalformedPayload { details: String },
}

impl fmt::Display for DirectoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unavailable { details } => {
                write!(f, "user directory unavailable: {details}")
            }
            Self::MalformedPayload { details } => {
                write!(f, "malformed user directory payload: {details}")
            }
        }
    }
}

impl std::error::Error for DirectoryError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_callback_invalid_display() {
        let err = SignInError::ProviderCallbackInvalid {
            reason: "missing email".to_string(),
        };
        assert!(err.to_string().contains("rejected"));
        assert!(err.to_string().contains("missing email"));
    }

    #[test]
    fn sync_failure_display_is_generic() {
        assert_eq!(
            SignInError::IdentitySyncFailure.to_string(),
            "identity sync with the backend failed"
        );
        assert_eq!(SyncFailed.to_string(), "identity sync failed");
    }

    #[test]
    fn directory_error_display() {
        let err = DirectoryError::Unavailable {
            details: "status 503".to_string(),
        };
        assert!(err.to_string().contains("unavailable"));
        assert!(err.to_string().contains("503"));
    }
}
