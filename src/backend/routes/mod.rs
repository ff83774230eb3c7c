//! Route Configuration Module
//!
//! This module configures all HTTP routes for the backend server.
//!
//! # Module Structure
//!
//! ```text
//! routes/
//! ├── mod.rs          - Module exports and documentation
//! ├── router.rs       - Main router creation
//! └── api_routes.rs   - Conversation and message endpoints
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use realty_chat::backend::routes::create_router;
//! use realty_chat::backend::server::state::AppState;
//!
//! let router = create_router(AppState::in_memory("dev-secret"));
//! ```

/// Main router creation
pub mod router;

/// API endpoint handlers
pub mod api_routes;

// Re-export commonly used functions
pub use router::create_router;
