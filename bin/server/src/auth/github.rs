//! GitHub OAuth client using the oauth2 crate.
//!
//! Runs the authorization-code flow with PKCE and reads the signed-in
//! account from the GitHub REST API:
//! - `GET /user` for the account id, login and name
//! - `GET /user/emails` when the profile email is private

use async_trait::async_trait;
use gatehouse_identity::{AccountLink, ProviderCallback};
use oauth2::{
    AuthUrl, AuthorizationCode, ClientId, ClientSecret, CsrfToken, PkceCodeChallenge,
    PkceCodeVerifier, RedirectUrl, Scope, TokenResponse, TokenUrl, basic::BasicClient,
};
use rootcause::prelude::Report;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, instrument, warn};

use crate::config::GithubOAuthConfig;
use crate::error::{ProviderError, StartupError};

/// Provider name recorded on the account link.
pub const PROVIDER: &str = "github";

/// Scopes needed to read the profile and email addresses.
const SCOPES: &[&str] = &["read:user", "user:email"];

/// Data needed to complete the callback, kept in the auth state cookie.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct AuthState {
    pub csrf_token: String,
    pub pkce_verifier: String,
}

/// An OAuth provider that can start and finish a sign-in.
#[async_trait]
pub trait OAuthProvider: Send + Sync {
    /// Returns the URL to send the browser to, plus the state to keep.
    fn authorization_url(&self) -> (String, AuthState);

    /// Exchanges an authorization code and reads the account behind it.
    async fn exchange_code(
        &self,
        code: &str,
        pkce_verifier: &str,
    ) -> Result<ProviderCallback, Report<ProviderError>>;
}

/// GitHub OAuth App client.
#[derive(Clone)]
pub struct GithubOAuthClient {
    client_id: ClientId,
    client_secret: ClientSecret,
    auth_url: AuthUrl,
    token_url: TokenUrl,
    redirect_url: RedirectUrl,
    api_base_url: String,
    http_client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct GithubUser {
    id: u64,
    login: String,
    name: Option<String>,
    email: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GithubEmail {
    email: String,
    primary: bool,
    verified: bool,
}

impl GithubOAuthClient {
    /// Creates a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if a configured URL is invalid or the HTTP client
    /// cannot be built.
    pub fn new(
        config: &GithubOAuthConfig,
        timeout: Duration,
    ) -> gatehouse_core::Result<Self, StartupError> {
        let auth_url = AuthUrl::new(config.auth_url.clone())
            .map_err(|e| invalid_url("github.auth_url", &e))?;
        let token_url = TokenUrl::new(config.token_url.clone())
            .map_err(|e| invalid_url("github.token_url", &e))?;
        let redirect_url = RedirectUrl::new(config.redirect_url.clone())
            .map_err(|e| invalid_url("github.redirect_url", &e))?;

        let http_client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .user_agent(concat!("gatehouse/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| StartupError::HttpClient {
                details: e.to_string(),
            })?;

        Ok(Self {
            client_id: ClientId::new(config.client_id.clone()),
            client_secret: ClientSecret::new(config.client_secret.clone()),
            auth_url,
            token_url,
            redirect_url,
            api_base_url: config.api_base_url.trim_end_matches('/').to_string(),
            http_client,
        })
    }

    async fn fetch_user(&self, access_token: &str) -> Result<GithubUser, Report<ProviderError>> {
        self.get_json("/user", access_token).await
    }

    /// Picks the primary verified address.
    async fn fetch_primary_email(
        &self,
        access_token: &str,
    ) -> Result<Option<String>, Report<ProviderError>> {
        let emails: Vec<GithubEmail> = self.get_json("/user/emails", access_token).await?;
        Ok(emails
            .into_iter()
            .find(|e| e.primary && e.verified)
            .map(|e| e.email))
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        access_token: &str,
    ) -> Result<T, Report<ProviderError>> {
        let response = self
            .http_client
            .get(format!("{}{}", self.api_base_url, path))
            .bearer_auth(access_token)
            .header(reqwest::header::ACCEPT, "application/vnd.github+json")
            .send()
            .await
            .map_err(|e| ProviderError::Profile {
                details: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Profile {
                details: format!("GET {} returned status {}", path, status.as_u16()),
            }
            .into());
        }

        Ok(response.json().await.map_err(|e| ProviderError::Profile {
            details: e.to_string(),
        })?)
    }
}

fn invalid_url(field: &'static str, err: &oauth2::url::ParseError) -> StartupError {
    StartupError::InvalidUrl {
        field,
        details: err.to_string(),
    }
}

#[async_trait]
impl OAuthProvider for GithubOAuthClient {
    fn authorization_url(&self) -> (String, AuthState) {
        let client = BasicClient::new(self.client_id.clone())
            .set_client_secret(self.client_secret.clone())
            .set_auth_uri(self.auth_url.clone())
            .set_redirect_uri(self.redirect_url.clone());

        let (pkce_challenge, pkce_verifier) = PkceCodeChallenge::new_random_sha256();

        let mut auth_request = client
            .authorize_url(CsrfToken::new_random)
            .set_pkce_challenge(pkce_challenge);

        for scope in SCOPES {
            auth_request = auth_request.add_scope(Scope::new((*scope).to_string()));
        }

        let (auth_url, csrf_token) = auth_request.url();

        let state = AuthState {
            csrf_token: csrf_token.secret().clone(),
            pkce_verifier: pkce_verifier.secret().clone(),
        };

        (auth_url.to_string(), state)
    }

    #[instrument(skip_all)]
    async fn exchange_code(
        &self,
        code: &str,
        pkce_verifier: &str,
    ) -> Result<ProviderCallback, Report<ProviderError>> {
        let client = BasicClient::new(self.client_id.clone())
            .set_client_secret(self.client_secret.clone())
            .set_token_uri(self.token_url.clone())
            .set_redirect_uri(self.redirect_url.clone());

        let token = client
            .exchange_code(AuthorizationCode::new(code.to_string()))
            .set_pkce_verifier(PkceCodeVerifier::new(pkce_verifier.to_string()))
            .request_async(&self.http_client)
            .await
            .map_err(|e| ProviderError::TokenExchange {
                details: e.to_string(),
            })?;

        let access_token = token.access_token().secret();
        let user = self.fetch_user(access_token).await?;

        let email = match user.email.filter(|e| !e.is_empty()) {
            Some(email) => Some(email),
            None => match self.fetch_primary_email(access_token).await {
                Ok(email) => email,
                Err(report) => {
                    warn!(error = ?report, "could not read GitHub email addresses");
                    None
                }
            },
        };

        debug!(github_id = user.id, has_email = email.is_some(), "read GitHub profile");

        Ok(ProviderCallback::new(AccountLink::new(PROVIDER, user.id.to_string()))
            .with_email(email)
            .with_display_name(user.name.filter(|n| !n.is_empty()).or(Some(user.login))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config(server: &MockServer) -> GithubOAuthConfig {
        GithubOAuthConfig {
            client_id: "Iv1.client".to_string(),
            client_secret: "shh".to_string(),
            redirect_url: "http://localhost:3000/auth/callback".to_string(),
            auth_url: format!("{}/login/oauth/authorize", server.uri()),
            token_url: format!("{}/login/oauth/access_token", server.uri()),
            api_base_url: server.uri(),
        }
    }

    async fn mount_token(server: &MockServer) {
        Mock::given(method("POST"))
            .and(path("/login/oauth/access_token"))
            .and(body_string_contains("code=the-code"))
            .and(body_string_contains("code_verifier=the-verifier"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "gho_token",
                "token_type": "bearer",
                "scope": "read:user,user:email"
            })))
            .expect(1)
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn authorization_url_carries_pkce_and_scopes() {
        let server = MockServer::start().await;
        let client = GithubOAuthClient::new(&config(&server), Duration::from_secs(5)).expect("client");

        let (url, state) = client.authorization_url();

        assert!(url.starts_with(&format!("{}/login/oauth/authorize?", server.uri())));
        assert!(url.contains("code_challenge_method=S256"));
        assert!(url.contains("scope=read%3Auser+user%3Aemail"));
        assert!(url.contains(&format!("state={}", state.csrf_token)));
        assert!(!state.pkce_verifier.is_empty());
    }

    #[tokio::test]
    async fn exchange_reads_public_profile() {
        let server = MockServer::start().await;
        mount_token(&server).await;
        Mock::given(method("GET"))
            .and(path("/user"))
            .and(header("authorization", "Bearer gho_token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": 583231,
                "login": "octocat",
                "name": "The Octocat",
                "email": "octocat@github.com"
            })))
            .mount(&server)
            .await;

        let client = GithubOAuthClient::new(&config(&server), Duration::from_secs(5)).expect("client");
        let callback = client
            .exchange_code("the-code", "the-verifier")
            .await
            .expect("exchange");

        assert_eq!(callback.account, Some(AccountLink::new("github", "583231")));
        assert_eq!(callback.email.as_deref(), Some("octocat@github.com"));
        assert_eq!(callback.display_name.as_deref(), Some("The Octocat"));
    }

    #[tokio::test]
    async fn private_email_falls_back_to_primary_verified() {
        let server = MockServer::start().await;
        mount_token(&server).await;
        Mock::given(method("GET"))
            .and(path("/user"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": 1,
                "login": "hubot",
                "name": null,
                "email": null
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/user/emails"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "email": "old@example.com", "primary": false, "verified": true },
                { "email": "hubot@example.com", "primary": true, "verified": true }
            ])))
            .mount(&server)
            .await;

        let client = GithubOAuthClient::new(&config(&server), Duration::from_secs(5)).expect("client");
        let callback = client
            .exchange_code("the-code", "the-verifier")
            .await
            .expect("exchange");

        assert_eq!(callback.email.as_deref(), Some("hubot@example.com"));
        assert_eq!(callback.display_name.as_deref(), Some("hubot"));
    }

    #[tokio::test]
    async fn no_usable_email_yields_none() {
        let server = MockServer::start().await;
        mount_token(&server).await;
        Mock::given(method("GET"))
            .and(path("/user"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": 1,
                "login": "hubot",
                "email": null
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/user/emails"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "email": "hubot@example.com", "primary": true, "verified": false }
            ])))
            .mount(&server)
            .await;

        let client = GithubOAuthClient::new(&config(&server), Duration::from_secs(5)).expect("client");
        let callback = client
            .exchange_code("the-code", "the-verifier")
            .await
            .expect("exchange");

        assert!(callback.email.is_none());
    }

    #[tokio::test]
    async fn token_error_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/login/oauth/access_token"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": "bad_verification_code"
            })))
            .mount(&server)
            .await;

        let client = GithubOAuthClient::new(&config(&server), Duration::from_secs(5)).expect("client");

        assert!(client.exchange_code("stale", "verifier").await.is_err());
    }

    #[test]
    fn invalid_redirect_url_is_rejected() {
        let config = GithubOAuthConfig {
            client_id: "id".to_string(),
            client_secret: "secret".to_string(),
            redirect_url: "not a url".to_string(),
            auth_url: "https://github.com/login/oauth/authorize".to_string(),
            token_url: "https://github.com/login/oauth/access_token".to_string(),
            api_base_url: "https://api.github.com".to_string(),
        };

        assert!(GithubOAuthClient::new(&config, Duration::from_secs(5)).is_err());
    }
}
