//! Core types and utilities shared by the gatehouse crates.
//!
//! This crate provides the identifier types and the error-handling foundation
//! used by the identity domain crate and the web server.

pub mod error;
pub mod id;

pub use error::Result;
pub use id::{InternalUserId, ParseIdError};
