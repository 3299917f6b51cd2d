//! Profile lookup against the backend user directory.

use async_trait::async_trait;
use gatehouse_core::InternalUserId;
use rootcause::prelude::Report;
use tracing::{debug, warn};

use crate::error::DirectoryError;
use crate::session::SessionToken;
use crate::user::InternalUser;

/// Read access to the backend's user records.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Finds a user by id. A user that does not exist is `Ok(None)`.
    async fn find_user(&self, id: InternalUserId)
    -> Result<Option<InternalUser>, Report<DirectoryError>>;
}

/// Result of resolving the profile behind a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileLookup {
    Found(InternalUser),
    /// The session's id has no backend record.
    Missing,
    /// The backend could not answer.
    Failed,
}

/// Resolves the profile for an enriched session.
///
/// Never fails: errors are logged here and reported as [`ProfileLookup::Failed`].
pub async fn lookup_profile(directory: &dyn UserDirectory, token: &SessionToken) -> ProfileLookup {
    let Ok(id) = token.user_id() else {
        warn!(sub = token.internal_user_id(), "session carries a non-numeric user id");
        return ProfileLookup::Missing;
    };

    match directory.find_user(id).await {
        Ok(Some(user)) => ProfileLookup::Found(user),
        Ok(None) => {
            debug!(user_id = %id, "profile not found in user directory");
            ProfileLookup::Missing
        }
        Err(report) => {
            warn!(user_id = %id, error = ?report, "profile lookup failed");
            ProfileLookup::Failed
        }
    }
}
