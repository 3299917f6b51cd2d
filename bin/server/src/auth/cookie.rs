//! Signed cookie codec for the session and the OAuth auth state.
//!
//! Both cookies go through [`SignedCookieJar`], so a value that fails HMAC
//! verification is invisible to the rest of the server. Values are
//! base64url-encoded JSON.

use axum_extra::extract::cookie::{Cookie, SameSite, SignedCookieJar};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use gatehouse_identity::{SessionState, SessionToken};
use rootcause::prelude::Report;
use time::Duration as TimeDuration;

use super::github::AuthState;
use crate::config::SessionConfig;
use crate::error::CookieError;

/// Session cookie name.
pub const SESSION_COOKIE: &str = "session";

/// Auth state cookie name (CSRF and PKCE data during the OAuth flow).
pub const AUTH_STATE_COOKIE: &str = "auth_state";

/// Lifetime of the auth state cookie.
const AUTH_STATE_MAX_AGE_MINUTES: i64 = 10;

/// Reads the session token.
///
/// Returns `None` when the cookie is absent, fails verification or does not
/// decode. Expiry is not checked here.
#[must_use]
pub fn read_session(jar: &SignedCookieJar) -> Option<SessionToken> {
    let cookie = jar.get(SESSION_COOKIE)?;
    let bytes = URL_SAFE_NO_PAD.decode(cookie.value()).ok()?;
    serde_json::from_slice(&bytes).ok()
}

/// Writes the session token.
///
/// # Errors
///
/// Returns an error if the token cannot be serialized.
pub fn write_session(
    jar: SignedCookieJar,
    token: &SessionToken,
    config: &SessionConfig,
) -> Result<SignedCookieJar, Report<CookieError>> {
    let json = serde_json::to_vec(token).map_err(|e| CookieError::Encode {
        details: e.to_string(),
    })?;

    let cookie = Cookie::build((SESSION_COOKIE, URL_SAFE_NO_PAD.encode(json)))
        .path("/")
        .http_only(true)
        .secure(config.secure_cookies)
        .same_site(SameSite::Lax)
        .max_age(config.cookie_max_age());

    Ok(jar.add(cookie))
}

#[must_use]
pub fn clear_session(jar: SignedCookieJar) -> SignedCookieJar {
    jar.remove(Cookie::build(SESSION_COOKIE).path("/"))
}

/// Makes the session cookie match `session`: written when enriched,
/// removed when anonymous.
///
/// # Errors
///
/// Returns an error if the token cannot be serialized.
pub fn store_session(
    jar: SignedCookieJar,
    session: &SessionState,
    config: &SessionConfig,
) -> Result<SignedCookieJar, Report<CookieError>> {
    match session.token() {
        Some(token) => write_session(jar, token, config),
        None => Ok(clear_session(jar)),
    }
}

/// Reads the auth state stored by the login route.
#[must_use]
pub fn read_auth_state(jar: &SignedCookieJar) -> Option<AuthState> {
    let cookie = jar.get(AUTH_STATE_COOKIE)?;
    let bytes = URL_SAFE_NO_PAD.decode(cookie.value()).ok()?;
    serde_json::from_slice(&bytes).ok()
}

/// Stores the auth state for the callback.
///
/// # Errors
///
/// Returns an error if the state cannot be serialized.
pub fn write_auth_state(
    jar: SignedCookieJar,
    state: &AuthState,
    config: &SessionConfig,
) -> Result<SignedCookieJar, Report<CookieError>> {
    let json = serde_json::to_vec(state).map_err(|e| CookieError::Encode {
        details: e.to_string(),
    })?;

    let cookie = Cookie::build((AUTH_STATE_COOKIE, URL_SAFE_NO_PAD.encode(json)))
        .path("/")
        .http_only(true)
        .secure(config.secure_cookies)
        .same_site(SameSite::Lax)
        .max_age(TimeDuration::minutes(AUTH_STATE_MAX_AGE_MINUTES));

    Ok(jar.add(cookie))
}

#[must_use]
pub fn clear_auth_state(jar: SignedCookieJar) -> SignedCookieJar {
    jar.remove(Cookie::build(AUTH_STATE_COOKIE).path("/"))
}

/// Turns the `Set-Cookie` headers of a response into a request `Cookie`
/// header, dropping removals.
#[cfg(test)]
pub(crate) fn replay_set_cookies(
    headers: &axum::http::HeaderMap,
) -> Option<axum::http::HeaderValue> {
    let pairs: Vec<&str> = headers
        .get_all(axum::http::header::SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .filter_map(|value| value.split(';').next())
        .filter(|pair| pair.split_once('=').is_some_and(|(_, v)| !v.is_empty()))
        .collect();
    if pairs.is_empty() {
        return None;
    }
    axum::http::HeaderValue::from_str(&pairs.join("; ")).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderMap, HeaderValue, header};
    use axum::response::IntoResponse;
    use axum_extra::extract::cookie::Key;
    use chrono::{Duration, Utc};
    use gatehouse_core::InternalUserId;
    use gatehouse_identity::{
        AccountLink, CallbackOrchestrator, IdentitySync, InternalUser, ProviderCallback,
        SessionState, SyncFailed, SyncRequest,
    };
    use std::sync::Arc;

    struct Fixed;

    #[async_trait::async_trait]
    impl IdentitySync for Fixed {
        async fn sync(&self, _: &SyncRequest) -> Result<InternalUser, SyncFailed> {
            Ok(InternalUser::with_all_fields(
                InternalUserId::new(42),
                "alice@example.com".to_string(),
                Some("Alice".to_string()),
                Utc::now(),
            ))
        }
    }

    async fn token() -> SessionToken {
        let signed_in = CallbackOrchestrator::new(Arc::new(Fixed))
            .complete(
                ProviderCallback::new(AccountLink::new("github", "1"))
                    .with_email(Some("alice@example.com".to_string())),
            )
            .await
            .expect("sign-in");
        SessionState::Anonymous
            .enrich(&signed_in, Utc::now(), Duration::hours(1))
            .token()
            .cloned()
            .expect("enriched")
    }

    fn config() -> SessionConfig {
        SessionConfig::with_secret(String::new())
    }

    /// Sends the jar's cookies back as the next request would.
    fn replay(jar: SignedCookieJar, key: &Key) -> SignedCookieJar {
        let response = jar.into_response();
        let mut headers = HeaderMap::new();
        if let Some(cookie) = replay_set_cookies(response.headers()) {
            headers.insert(header::COOKIE, cookie);
        }
        SignedCookieJar::from_headers(&headers, key.clone())
    }

    #[tokio::test]
    async fn session_survives_a_round_trip() {
        let key = Key::generate();
        let token = token().await;

        let jar = write_session(SignedCookieJar::new(key.clone()), &token, &config()).expect("write");
        let jar = replay(jar, &key);

        assert_eq!(read_session(&jar), Some(token));
    }

    #[tokio::test]
    async fn cookie_signed_with_another_key_is_ignored() {
        let token = token().await;
        let jar = write_session(SignedCookieJar::new(Key::generate()), &token, &config()).expect("write");

        let jar = replay(jar, &Key::generate());

        assert!(read_session(&jar).is_none());
    }

    #[tokio::test]
    async fn anonymous_state_removes_cookie() {
        let key = Key::generate();
        let jar = write_session(SignedCookieJar::new(key.clone()), &token().await, &config())
            .expect("write");
        let jar = replay(jar, &key);

        let jar = store_session(jar, &SessionState::Anonymous, &config()).expect("store");

        assert!(read_session(&jar).is_none());
        let response = jar.into_response();
        let set_cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .expect("removal cookie");
        assert!(set_cookie.starts_with("session=;"));
        assert!(set_cookie.contains("Max-Age=0"));
    }

    #[test]
    fn garbage_session_value_is_ignored() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("session=not-signed"));
        let jar = SignedCookieJar::from_headers(&headers, Key::generate());

        assert!(read_session(&jar).is_none());
    }

    #[test]
    fn auth_state_round_trip() {
        let key = Key::generate();
        let state = AuthState {
            csrf_token: "csrf".to_string(),
            pkce_verifier: "verifier".to_string(),
        };

        let jar = write_auth_state(SignedCookieJar::new(key.clone()), &state, &config()).expect("write");
        let jar = replay(jar, &key);

        assert_eq!(read_auth_state(&jar), Some(state));
        assert!(read_auth_state(&clear_auth_state(jar)).is_none());
    }
}
