//! HTTP clients for the backend identity service.

pub mod sync;
pub mod users;

pub use sync::HttpIdentitySync;
pub use users::HttpUserDirectory;

use std::time::Duration;

use crate::error::StartupError;

/// Builds the shared backend HTTP client.
///
/// Every request made through it is bounded by `timeout`. A timeout surfaces
/// as an ordinary transport error.
///
/// # Errors
///
/// Returns an error if the TLS backend cannot be initialized.
pub fn http_client(
    timeout: Duration,
) -> gatehouse_core::Result<reqwest::Client, StartupError> {
    Ok(reqwest::Client::builder()
        .timeout(timeout)
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .map_err(|e| StartupError::HttpClient {
            details: e.to_string(),
        })?)
}

fn endpoint(base_url: &str, path: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_joins_without_double_slash() {
        assert_eq!(
            endpoint("http://backend:8080/", "/users"),
            "http://backend:8080/users"
        );
        assert_eq!(
            endpoint("http://backend:8080", "/auth/oauth/callback"),
            "http://backend:8080/auth/oauth/callback"
        );
    }
}
