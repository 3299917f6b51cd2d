//! Identity synchronization and session gating for gatehouse.
//!
//! This crate provides:
//! - Provider-side identity types (`ProviderCallback`, `ExternalIdentity`)
//! - The backend's user record (`InternalUser`)
//! - The backend sync contract (`IdentitySync`) and profile lookup contract
//!   (`UserDirectory`)
//! - Callback orchestration (`CallbackOrchestrator`)
//! - Session enrichment (`SessionState`, `SessionToken`)
//! - Route gating (`RouteGate`)
//!
//! # Session Model
//!
//! Sessions move between two states:
//! - `Anonymous`: no session, or one that is expired or failed verification
//! - `Enriched`: a token carrying the internal user id from the backend
//!
//! The only way into `Enriched` is `SessionState::enrich`, which takes a
//! `VerifiedSignIn`. Only `CallbackOrchestrator::complete` produces one, and
//! only after the backend sync succeeded.
//!
//! # Example
//!
//! ```
//! use chrono::Utc;
//! use gatehouse_identity::{GateDecision, RouteGate};
//!
//! let gate = RouteGate::new("/me", "/login");
//! let now = Utc::now();
//!
//! assert_eq!(gate.decide("/", None, now), GateDecision::Allow);
//! assert_eq!(
//!     gate.decide("/me/profile", None, now),
//!     GateDecision::RedirectToLogin("/login".to_string()),
//! );
//! ```

pub mod callback;
pub mod directory;
pub mod error;
pub mod gate;
pub mod identity;
pub mod session;
pub mod sync;
pub mod user;

// Re-export main types at crate root
pub use callback::{CallbackOrchestrator, VerifiedSignIn};
pub use directory::{ProfileLookup, UserDirectory, lookup_profile};
pub use error::{DirectoryError, SignInError, SyncFailed};
pub use gate::{GateDecision, RouteGate};
pub use identity::{AccountLink, ExternalIdentity, ProviderCallback};
pub use session::{Session, SessionState, SessionToken, SessionUser};
pub use sync::{IdentitySync, SyncRequest};
pub use user::InternalUser;
