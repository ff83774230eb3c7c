//! Messaging Module
//!
//! The conversation store and the HTTP handlers in front of it.
//!
//! - **`store`** - `ConversationStore` handle and `StoreError`
//! - **`memory`** - in-memory backend (default)
//! - **`db`** - PostgreSQL backend
//! - **`handlers`** - conversation and message endpoints

pub mod db;
pub mod handlers;
pub mod memory;
pub mod store;

pub use store::{ConversationStore, StoreError};
