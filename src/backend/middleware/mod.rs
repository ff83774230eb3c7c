//! Middleware Module
//!
//! Request processing shared by every handler. Identity is pulled from the
//! `Authorization` header by the `AuthenticatedUser` extractor.

pub mod auth;

pub use auth::AuthenticatedUser;
