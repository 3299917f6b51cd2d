//! User directory over HTTP.

use async_trait::async_trait;
use gatehouse_core::InternalUserId;
use gatehouse_identity::{DirectoryError, InternalUser, UserDirectory};
use reqwest::StatusCode;
use rootcause::prelude::Report;
use tracing::instrument;

use super::endpoint;
use crate::config::ProfileLookupMode;

/// Resolves users against the backend's `/users` endpoints.
///
/// In [`ProfileLookupMode::List`] it fetches the full listing and filters it
/// locally. In [`ProfileLookupMode::ById`] it asks for the single record and
/// treats `404` as not found.
#[derive(Clone)]
pub struct HttpUserDirectory {
    client: reqwest::Client,
    base_url: String,
    mode: ProfileLookupMode,
}

impl HttpUserDirectory {
    #[must_use]
    pub fn new(client: reqwest::Client, base_url: &str, mode: ProfileLookupMode) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            mode,
        }
    }

    async fn find_in_listing(
        &self,
        id: InternalUserId,
    ) -> Result<Option<InternalUser>, Report<DirectoryError>> {
        let response = self.send(&endpoint(&self.base_url, "/users")).await?;
        let users: Vec<InternalUser> = decode(response).await?;
        Ok(users.into_iter().find(|user| user.id() == id))
    }

    async fn by_id(
        &self,
        id: InternalUserId,
    ) -> Result<Option<InternalUser>, Report<DirectoryError>> {
        let url = endpoint(&self.base_url, &format!("/users/{id}"));
        let response = self.send(&url).await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        Ok(Some(decode(response).await?))
    }

    async fn send(&self, url: &str) -> Result<reqwest::Response, Report<DirectoryError>> {
        Ok(self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| DirectoryError::Unavailable {
                details: e.to_string(),
            })?)
    }
}

async fn decode<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, Report<DirectoryError>> {
    let status = response.status();
    if !status.is_success() {
        return Err(DirectoryError::Unavailable {
            details: format!("{} returned status {}", response.url().path(), status.as_u16()),
        }
        .into());
    }

    let body = response
        .bytes()
        .await
        .map_err(|e| DirectoryError::Unavailable {
            details: e.to_string(),
        })?;

    Ok(
        serde_json::from_slice(&body).map_err(|e| DirectoryError::MalformedPayload {
            details: e.to_string(),
        })?,
    )
}

#[async_trait]
impl UserDirectory for HttpUserDirectory {
    #[instrument(skip(self), fields(mode = ?self.mode))]
    async fn find_user(
        &self,
        id: InternalUserId,
    ) -> Result<Option<InternalUser>, Report<DirectoryError>> {
        match self.mode {
            ProfileLookupMode::List => self.find_in_listing(id).await,
            ProfileLookupMode::ById => self.by_id(id).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::http_client;
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn user_json(id: i64, email: &str) -> serde_json::Value {
        json!({ "id": id, "email": email, "created_at": "2025-01-15T09:30:00Z" })
    }

    fn directory(server: &MockServer, mode: ProfileLookupMode) -> HttpUserDirectory {
        let client = http_client(Duration::from_secs(5)).expect("client");
        HttpUserDirectory::new(client, &server.uri(), mode)
    }

    #[tokio::test]
    async fn listing_is_filtered_by_id() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                user_json(1, "a@example.com"),
                user_json(42, "alice@example.com"),
            ])))
            .mount(&server)
            .await;

        let directory = directory(&server, ProfileLookupMode::List);

        let found = directory
            .find_user(InternalUserId::new(42))
            .await
            .expect("lookup")
            .expect("present");
        assert_eq!(found.email(), "alice@example.com");

        let missing = directory.find_user(InternalUserId::new(99)).await.expect("lookup");
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn listing_failure_is_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let err = directory(&server, ProfileLookupMode::List)
            .find_user(InternalUserId::new(1))
            .await
            .unwrap_err();

        assert!(err.to_string().contains("user directory unavailable"));
    }

    #[tokio::test]
    async fn malformed_listing_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "users": [] })))
            .mount(&server)
            .await;

        let err = directory(&server, ProfileLookupMode::List)
            .find_user(InternalUserId::new(1))
            .await
            .unwrap_err();

        assert!(err.to_string().contains("malformed user directory payload"));
    }

    #[tokio::test]
    async fn by_id_fetches_single_record() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users/42"))
            .respond_with(ResponseTemplate::new(200).set_body_json(user_json(42, "alice@example.com")))
            .expect(1)
            .mount(&server)
            .await;

        let found = directory(&server, ProfileLookupMode::ById)
            .find_user(InternalUserId::new(42))
            .await
            .expect("lookup");

        assert_eq!(found.map(|u| u.id()), Some(InternalUserId::new(42)));
    }

    #[tokio::test]
    async fn by_id_404_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users/7"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let found = directory(&server, ProfileLookupMode::ById)
            .find_user(InternalUserId::new(7))
            .await
            .expect("lookup");

        assert!(found.is_none());
    }
}
