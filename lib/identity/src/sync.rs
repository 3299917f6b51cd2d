//! Contract for exchanging an external identity for an internal user.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::SyncFailed;
use crate::identity::ExternalIdentity;
use crate::user::InternalUser;

/// Body of a backend sync call.
///
/// Serializes to `{"provider", "provider_account_id", "email", "name"}`.
/// A missing display name is sent as an empty string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncRequest {
    pub provider: String,
    pub provider_account_id: String,
    pub email: String,
    pub name: String,
}

impl SyncRequest {
    /// Builds the sync body for a validated identity.
    #[must_use]
    pub fn from_identity(identity: &ExternalIdentity) -> Self {
        Self {
            provider: identity.provider().to_string(),
            provider_account_id: identity.provider_account_id().to_string(),
            email: identity.email().to_string(),
            name: identity.display_name().unwrap_or_default().to_string(),
        }
    }
}

/// Exchanges a verified external identity for the backend's user record.
///
/// The backend creates the record on first sign-in and returns the existing
/// one afterwards; repeated calls for the same provider account yield the
/// same id. Implementations make a single attempt, log failure detail
/// themselves and return only [`SyncFailed`].
#[async_trait]
pub trait IdentitySync: Send + Sync {
    /// Creates or retrieves the internal user for `request`.
    async fn sync(&self, request: &SyncRequest) -> Result<InternalUser, SyncFailed>;
}
