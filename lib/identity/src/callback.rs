//! Callback orchestration.
//!
//! Runs once per successful provider round-trip: validate what the provider
//! returned, sync it with the backend, and hand the backend's user to
//! session enrichment.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::error::SignInError;
use crate::identity::{ExternalIdentity, ProviderCallback};
use crate::sync::{IdentitySync, SyncRequest};
use crate::user::InternalUser;

/// Proof that a callback completed against the backend.
///
/// Only [`CallbackOrchestrator::complete`] constructs this, which is what
/// keeps [`SessionState::enrich`](crate::session::SessionState::enrich)
/// unreachable without a successful sync.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedSignIn {
    user: InternalUser,
}

impl VerifiedSignIn {
    pub(crate) fn new(user: InternalUser) -> Self {
        Self { user }
    }

    /// Returns the backend's user record.
    #[must_use]
    pub fn user(&self) -> &InternalUser {
        &self.user
    }
}

/// Coordinates a sign-in after the provider callback.
#[derive(Clone)]
pub struct CallbackOrchestrator {
    sync: Arc<dyn IdentitySync>,
}

impl CallbackOrchestrator {
    /// Creates an orchestrator backed by `sync`.
    #[must_use]
    pub fn new(sync: Arc<dyn IdentitySync>) -> Self {
        Self { sync }
    }

    /// Completes a sign-in for a provider result.
    ///
    /// # Errors
    ///
    /// - [`SignInError::ProviderCallbackInvalid`] if the account link or the
    ///   email is missing; the backend is not called.
    /// - [`SignInError::IdentitySyncFailure`] if the backend sync failed for
    ///   any reason.
    pub async fn complete(
        &self,
        callback: ProviderCallback,
    ) -> Result<VerifiedSignIn, SignInError> {
        let identity = validate(callback)?;

        debug!(
            provider = identity.provider(),
            "syncing external identity with backend"
        );

        let request = SyncRequest::from_identity(&identity);
        let user = self.sync.sync(&request).await.map_err(|_| {
            warn!(provider = identity.provider(), "sign-in aborted: identity sync failed");
            SignInError::IdentitySyncFailure
        })?;

        info!(
            provider = identity.provider(),
            user_id = %user.id(),
            "sign-in completed"
        );

        Ok(VerifiedSignIn::new(user))
    }
}

fn validate(callback: ProviderCallback) -> Result<ExternalIdentity, SignInError> {
    let account = callback
        .account
        .filter(|a| !a.provider.trim().is_empty() && !a.provider_account_id.trim().is_empty())
        .ok_or_else(|| reject("missing provider account link"))?;

    let email = callback
        .email
        .map(|e| e.trim().to_string())
        .filter(|e| !e.is_empty())
        .ok_or_else(|| reject("identity has no email"))?;

    let display_name = callback
        .display_name
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty());

    Ok(ExternalIdentity::new(account, email, display_name))
}

fn reject(reason: &str) -> SignInError {
    warn!(reason, "provider callback rejected");
    SignInError::ProviderCallbackInvalid {
        reason: reason.to_string(),
    }
}
