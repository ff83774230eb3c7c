//! Chat Message Data Structure
//!
//! Represents a message in a conversation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Role;
use crate::shared::error::SharedError;

/// Who sent a message, captured when the message is written
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SenderSnapshot {
    pub id: Uuid,
    pub name: String,
    pub role: Role,
}

/// Represents a chat message
///
/// Equality is field-wise; two fetched lists are "the same" exactly when
/// every record compares equal in order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatMessage {
    /// Unique message ID
    pub id: Uuid,
    /// Conversation this message belongs to
    pub conversation_id: Uuid,
    /// Sender identity and role
    pub sender: SenderSnapshot,
    /// Plain text content, never empty
    pub content: String,
    /// Whether the receiving role has read it
    pub is_read: bool,
    /// When the receiving role read it
    #[serde(default)]
    pub read_at: Option<DateTime<Utc>>,
    /// Server-assigned creation time
    pub created_at: DateTime<Utc>,
}

impl ChatMessage {
    /// Create a new unread text message
    pub fn new_text(conversation_id: Uuid, sender: SenderSnapshot, content: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            conversation_id,
            sender,
            content,
            is_read: false,
            read_at: None,
            created_at: Utc::now(),
        }
    }
}

/// Request to send a message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendMessageRequest {
    pub content: String,
}

impl SendMessageRequest {
    pub fn new(content: impl Into<String>) -> Self {
        Self { content: content.into() }
    }

    /// Trimmed content, or a validation error when nothing is left
    pub fn validated_content(&self) -> Result<String, SharedError> {
        let trimmed = self.content.trim();
        if trimmed.is_empty() {
            return Err(SharedError::validation("content", "Message content is required"));
        }
        Ok(trimmed.to_string())
    }
}

/// Response after sending a message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendMessageResponse {
    pub message: ChatMessage,
}

/// Response for listing messages
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListMessagesResponse {
    pub messages: Vec<ChatMessage>,
}

/// Response after deleting a single message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteMessageResponse {
    pub success: bool,
}

/// Response after clearing a conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClearMessagesResponse {
    pub success: bool,
    pub deleted_count: u64,
}
