//! gatehouse web server.
//!
//! Signs users in with GitHub, exchanges the GitHub identity for the
//! backend's internal user, keeps the result in a signed session cookie and
//! gates the members area on it.

pub mod api;
pub mod app;
pub mod auth;
pub mod backend;
pub mod config;
pub mod error;
pub mod pages;
