//! The backend's user record.
//!
//! `InternalUser` is owned by the backend identity service. The front end
//! reads it from sync and lookup responses and never mutates it.

use chrono::{DateTime, Utc};
use gatehouse_core::InternalUserId;
use serde::{Deserialize, Serialize};

/// A user record as returned by the backend identity service.
///
/// Wire format: `{"id": 42, "email": "...", "name": "..." | null, "created_at": "<RFC 3339>"}`.
/// `name` may also be absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InternalUser {
    /// Backend-assigned id.
    id: InternalUserId,
    /// Email address on record.
    email: String,
    /// Name on record, if the user has one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    /// When the backend created the record.
    created_at: DateTime<Utc>,
}

impl InternalUser {
    /// Creates a user record with all fields specified.
    ///
    /// Use this for stubs and tests; real records come from the backend.
    #[must_use]
    pub fn with_all_fields(
        id: InternalUserId,
        email: String,
        name: Option<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            email,
            name,
            created_at,
        }
    }

    /// Returns the backend id.
    #[must_use]
    pub fn id(&self) -> InternalUserId {
        self.id
    }

    /// Returns the email address.
    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    /// Returns the name, if set.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Returns when the record was created.
    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
