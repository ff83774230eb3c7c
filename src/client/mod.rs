//! Polling Chat Client
//!
//! Keeps a chat view in sync with the conversation store over plain
//! request/response HTTP.
//!
//! # Architecture
//!
//! - **`api`** - `ConversationService` trait and its HTTP implementation
//! - **`poller`** - Message and conversation list polling
//! - **`composer`** - Sending and deleting messages
//! - **`schedule`** - Adaptive message poll interval
//! - **`diff`** - Replace-or-keep list comparison
//! - **`view`** - View state and change events
//! - **`session`** - Scoped session owning every timer
//! - **`config`** - Client configuration loading
//! - **`error`** - Client error types

pub mod api;
pub mod composer;
pub mod config;
pub mod diff;
pub mod error;
pub mod poller;
pub mod schedule;
pub mod session;
pub mod view;

pub use api::{ConversationService, HttpConversationService};
pub use composer::Composer;
pub use config::Config;
pub use error::{ClientError, ComposeError};
pub use poller::{Polled, Poller};
pub use schedule::AdaptiveSchedule;
pub use session::{ChatSession, TimerGuard, TimerRegistry};
pub use view::{ChatView, MountToken, Notice, NoticeLevel, ViewEvent, ViewEvents, ViewHandle};
