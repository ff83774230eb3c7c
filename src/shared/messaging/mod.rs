//! Messaging Module
//!
//! This module contains all the data structures for client <-> admin chat:
//!
//! - `Role` - Which side of a conversation a user is on
//! - `Conversation` - A thread between one client and the admin pool
//! - `ChatMessage` - A message in a conversation
//!
//! # Usage
//!
//! ```rust
//! use realty_chat::shared::messaging::{ChatMessage, Conversation, Role};
//! ```

pub mod conversation;
pub mod message;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::shared::error::SharedError;

// Re-export all types
pub use conversation::{
    ClientSummary, Conversation, ConversationStatus, CreateConversationRequest,
    CreateConversationResponse, ListConversationsResponse, ListingSummary,
    UpdateStatusRequest,
};
pub use message::{
    ChatMessage, ClearMessagesResponse, DeleteMessageResponse, ListMessagesResponse,
    SendMessageRequest, SendMessageResponse, SenderSnapshot,
};

/// Side of a conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// A portal client; owns their conversations
    Client,
    /// Any member of the admin pool
    Admin,
}

impl Role {
    /// The role that receives what this role sends
    pub fn other(self) -> Role {
        match self {
            Role::Client => Role::Admin,
            Role::Admin => Role::Client,
        }
    }

    /// Storage form
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Client => "client",
            Role::Admin => "admin",
        }
    }

    pub fn is_admin(self) -> bool {
        self == Role::Admin
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = SharedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "client" => Ok(Role::Client),
            "admin" => Ok(Role::Admin),
            other => Err(SharedError::validation("role", format!("unknown role '{}'", other))),
        }
    }
}
