//! Identity sync over HTTP.

use async_trait::async_trait;
use gatehouse_identity::{IdentitySync, InternalUser, SyncFailed, SyncRequest};
use rootcause::prelude::Report;
use serde::Deserialize;
use tracing::{debug, error, instrument};

use super::endpoint;
use crate::error::IdentitySyncError;

/// Success body of `POST /auth/oauth/callback`.
#[derive(Debug, Deserialize)]
struct SyncResponse {
    user: InternalUser,
    #[serde(default)]
    is_new_user: bool,
}

/// Calls `POST {backend}/auth/oauth/callback`.
///
/// Single attempt per call. Any 2xx status with a well-formed body is a
/// success; everything else is logged and reported as [`SyncFailed`].
#[derive(Clone)]
pub struct HttpIdentitySync {
    client: reqwest::Client,
    url: String,
}

impl HttpIdentitySync {
    /// Creates a sync client for the backend at `base_url`.
    #[must_use]
    pub fn new(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            url: endpoint(base_url, "/auth/oauth/callback"),
        }
    }

    async fn post(&self, request: &SyncRequest) -> Result<SyncResponse, Report<IdentitySyncError>> {
        let response = self
            .client
            .post(&self.url)
            .json(request)
            .send()
            .await
            .map_err(|e| IdentitySyncError::Network {
                details: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(IdentitySyncError::Status {
                status: status.as_u16(),
                body,
            }
            .into());
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| IdentitySyncError::Network {
                details: e.to_string(),
            })?;

        Ok(
            serde_json::from_slice(&body).map_err(|e| IdentitySyncError::MalformedPayload {
                details: e.to_string(),
            })?,
        )
    }
}

#[async_trait]
impl IdentitySync for HttpIdentitySync {
    #[instrument(skip(self, request), fields(provider = %request.provider))]
    async fn sync(&self, request: &SyncRequest) -> Result<InternalUser, SyncFailed> {
        match self.post(request).await {
            Ok(response) => {
                debug!(
                    user_id = %response.user.id(),
                    is_new_user = response.is_new_user,
                    "identity synced"
                );
                Ok(response.user)
            }
            Err(report) => {
                error!(error = ?report, "identity sync failed");
                Err(SyncFailed)
            }
        }
    }
}
