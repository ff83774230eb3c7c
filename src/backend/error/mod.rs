//! Backend Error Module
//!
//! This module defines error types specific to the conversation store.
//! These errors are used in HTTP handlers and are converted to HTTP responses.
//!
//! # Module Structure
//!
//! ```text
//! error/
//! ├── mod.rs        - Module exports and documentation
//! ├── types.rs      - Error type definitions
//! └── conversion.rs - Error conversion implementations
//! ```
//!
//! # Error Types
//!
//! - `HandlerError` - Request-level failures (auth, access, bad input)
//! - `StoreError` - Storage failures (missing rows, database errors)
//! - `SharedError` - Errors from the shared module
//!
//! # HTTP Response Conversion
//!
//! All backend errors implement `IntoResponse` from Axum, allowing them to be
//! returned directly from handlers as `{ "error": ..., "status": ... }`.

/// Error type definitions
pub mod types;

/// Error conversion implementations
pub mod conversion;

// Re-export commonly used types
pub use types::BackendError;
