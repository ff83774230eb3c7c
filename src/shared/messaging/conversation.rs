//! Conversation Data Structure
//!
//! Represents a conversation between one client and the admin pool,
//! optionally scoped to a property listing.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Role;
use crate::shared::error::SharedError;

/// The client side of a conversation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClientSummary {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

/// The listing a conversation is about
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ListingSummary {
    pub id: Uuid,
    pub title: String,
    pub address: String,
}

/// Conversation visibility
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ConversationStatus {
    #[default]
    Active,
    Archived,
}

impl ConversationStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ConversationStatus::Active => "active",
            ConversationStatus::Archived => "archived",
        }
    }

}

impl FromStr for ConversationStatus {
    type Err = SharedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(ConversationStatus::Active),
            "archived" => Ok(ConversationStatus::Archived),
            other => Err(SharedError::validation("status", format!("unknown status '{}'", other))),
        }
    }
}

/// Represents a conversation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Conversation {
    /// Unique conversation ID
    pub id: Uuid,
    /// The client participant
    pub client: ClientSummary,
    /// Listing scope; `None` for the direct conversation
    #[serde(default)]
    pub listing: Option<ListingSummary>,
    /// Timestamp of the newest message, used for list ordering
    pub last_message_at: DateTime<Utc>,
    /// Messages the client has not read yet
    pub client_unread_count: u32,
    /// Messages the admin pool has not read yet
    pub admin_unread_count: u32,
    #[serde(default)]
    pub status: ConversationStatus,
    pub created_at: DateTime<Utc>,
}

impl Conversation {
    /// Create a new empty conversation for a client
    pub fn new(client: ClientSummary, listing: Option<ListingSummary>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            client,
            listing,
            last_message_at: now,
            client_unread_count: 0,
            admin_unread_count: 0,
            status: ConversationStatus::Active,
            created_at: now,
        }
    }

    /// Unread counter belonging to `role`
    pub fn unread_for(&self, role: Role) -> u32 {
        match role {
            Role::Client => self.client_unread_count,
            Role::Admin => self.admin_unread_count,
        }
    }

    pub fn unread_for_mut(&mut self, role: Role) -> &mut u32 {
        match role {
            Role::Client => &mut self.client_unread_count,
            Role::Admin => &mut self.admin_unread_count,
        }
    }

    /// Whether `user_id` acting as `role` may read and write this conversation
    pub fn is_accessible_by(&self, user_id: Uuid, role: Role) -> bool {
        role.is_admin() || self.client.id == user_id
    }
}

/// Response for listing conversations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListConversationsResponse {
    pub conversations: Vec<Conversation>,
}

/// Request to open (create or fetch) a conversation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateConversationRequest {
    #[serde(default)]
    pub listing_id: Option<Uuid>,
}

/// Response after opening a conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateConversationResponse {
    pub conversation: Conversation,
    /// `true` when the conversation already existed
    pub existing: bool,
}

/// Request to archive or reactivate a conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: ConversationStatus,
}
