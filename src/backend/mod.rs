//! Backend Module
//!
//! This module contains the conversation store service: an Axum HTTP server
//! that persists conversations and messages and serves the REST endpoints the
//! polling client reads from and writes to.
//!
//! # Architecture
//!
//! - **`server`** - Server initialization, application state, configuration
//! - **`routes`** - HTTP route configuration and router assembly
//! - **`messaging`** - Conversation/message handlers and storage
//! - **`auth`** - JWT claims and token verification
//! - **`middleware`** - Caller identity extraction
//! - **`error`** - Backend-specific error types
//!
//! # Module Structure
//!
//! ```text
//! backend/
//! ├── mod.rs          - Module exports and documentation
//! ├── server/         - Server initialization and state
//! ├── routes/         - Route configuration
//! ├── messaging/      - Handlers, store, PostgreSQL queries
//! ├── auth/           - JWT sessions
//! ├── middleware/     - Authenticated caller extractor
//! └── error/          - Error types
//! ```
//!
//! # Storage
//!
//! The store is in-memory unless `DATABASE_URL` is set, in which case it is
//! backed by PostgreSQL. Both backends give the same ordering and counter
//! semantics: messages ascend by `created_at` (ties by insertion order),
//! conversations descend by `last_message_at`, and each write bumps the
//! receiving role's unread counter.
//!
//! # Thread Safety
//!
//! - `Arc<RwLock<>>` for the in-memory store
//! - `PgPool` for the database store
//! - Axum handlers are `Send + Sync`

/// Server setup and configuration
pub mod server;

/// Route configuration
pub mod routes;

/// Backend error types
pub mod error;

/// JWT sessions
pub mod auth;

/// Request identity extraction
pub mod middleware;

/// Conversations and messages
pub mod messaging;

/// Re-export commonly used types
pub use server::{create_app, AppState};
pub use error::BackendError;
pub use messaging::store::ConversationStore;
