//! Realty Chat - Main Library
//!
//! Realty Chat is the client <-> agent messaging core of a real-estate client
//! portal. A client talks to the brokerage's admin pool either in a single
//! direct conversation or in conversations scoped to a property listing.
//!
//! There is no persistent connection: the client keeps its view fresh by
//! polling the conversation store over plain HTTP, tightening the poll
//! interval while a conversation is active and relaxing it while idle.
//!
//! # Module Structure
//!
//! - **`shared`** - Types shared between client and server
//!   - Conversation and message records, request/response bodies
//!   - Configuration builder
//!   - Error types
//!
//! - **`backend`** - The conversation store service (only compiled with `ssr`)
//!   - Axum HTTP server
//!   - In-memory and PostgreSQL storage
//!   - JWT identity extraction
//!
//! - **`client`** - The polling client
//!   - Poller, Composer and the adaptive schedule
//!   - Scoped chat session owning every timer
//!   - HTTP service client
//!
//! # Feature Flags
//!
//! - **`ssr`** - Server-side code (enabled by default)
//!
//! # Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use realty_chat::client::{ChatSession, Config, HttpConversationService};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::load()?;
//! let service = Arc::new(HttpConversationService::new(config.clone()));
//! let mut session = ChatSession::new(service, &config);
//! let conversation_id = session.open_direct().await?;
//! session.composer().send_message(conversation_id, "Is the house still available?").await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Thread Safety
//!
//! - **Server**: store state lives behind `Arc<RwLock<>>` or a `PgPool`
//! - **Client**: the view lives behind a tokio `RwLock`; every timer is a
//!   tokio task owned by the session that spawned it

/// Shared types and data structures
pub mod shared;

/// Conversation store service
#[cfg(feature = "ssr")]
pub mod backend;

/// Polling chat client
pub mod client;
