//! Shared Module
//!
//! This module contains types and data structures that are shared between
//! the polling client and the conversation store service. These types are
//! the JSON bodies exchanged over the REST endpoints.
//!
//! # Overview
//!
//! The shared module provides platform-agnostic types that can be used
//! in both server and client code. All types are designed for serialization
//! and transmission over HTTP.

/// Shared error types
pub mod error;

/// Application configuration
pub mod config;

/// Conversation and message types
pub mod messaging;

/// Re-export commonly used types for convenience
pub use error::SharedError;
pub use config::{AppConfig, AppConfigBuilder, ConfigError, ScheduleSettings};
pub use messaging::{ChatMessage, Conversation, Role};
