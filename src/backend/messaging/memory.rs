//! In-memory conversation store
//!
//! Messages live in a single vector in insertion order, so filtering by
//! conversation already yields the required ordering. `created_at` is kept
//! monotonic per conversation to make the timestamp order agree with it.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::store::{recount_unread, StoreError, StoreResult};
use crate::shared::messaging::{
    ChatMessage, ClientSummary, Conversation, ConversationStatus, ListingSummary, Role,
    SenderSnapshot,
};

#[derive(Debug, Default)]
struct StoreInner {
    conversations: HashMap<Uuid, Conversation>,
    messages: Vec<ChatMessage>,
    listings: HashMap<Uuid, ListingSummary>,
}

impl StoreInner {
    fn conversation_mut(&mut self, conversation_id: Uuid) -> StoreResult<&mut Conversation> {
        self.conversations
            .get_mut(&conversation_id)
            .ok_or(StoreError::NotFound("conversation"))
    }

    fn messages_of(&self, conversation_id: Uuid) -> impl Iterator<Item = &ChatMessage> {
        self.messages
            .iter()
            .filter(move |m| m.conversation_id == conversation_id)
    }
}

#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<StoreInner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn register_listing(&self, listing: ListingSummary) {
        let mut inner = self.inner.write().await;
        inner.listings.insert(listing.id, listing);
    }

    pub async fn list_conversations(&self, user_id: Uuid, role: Role) -> Vec<Conversation> {
        let inner = self.inner.read().await;
        let mut conversations: Vec<Conversation> = inner
            .conversations
            .values()
            .filter(|c| c.status == ConversationStatus::Active)
            .filter(|c| c.is_accessible_by(user_id, role))
            .cloned()
            .collect();
        conversations.sort_by(|a, b| {
            b.last_message_at
                .cmp(&a.last_message_at)
                .then_with(|| b.created_at.cmp(&a.created_at))
        });
        conversations
    }

    pub async fn find_conversation(&self, conversation_id: Uuid) -> StoreResult<Conversation> {
        let inner = self.inner.read().await;
        inner
            .conversations
            .get(&conversation_id)
            .cloned()
            .ok_or(StoreError::NotFound("conversation"))
    }

    pub async fn open_conversation(
        &self,
        client: ClientSummary,
        listing_id: Option<Uuid>,
    ) -> StoreResult<(Conversation, bool)> {
        let mut inner = self.inner.write().await;

        let listing = match listing_id {
            Some(id) => Some(
                inner
                    .listings
                    .get(&id)
                    .cloned()
                    .ok_or(StoreError::NotFound("listing"))?,
            ),
            None => None,
        };

        let existing = inner.conversations.values().find(|c| {
            c.client.id == client.id && c.listing.as_ref().map(|l| l.id) == listing_id
        });
        if let Some(conversation) = existing {
            return Ok((conversation.clone(), true));
        }

        let conversation = Conversation::new(client, listing);
        inner.conversations.insert(conversation.id, conversation.clone());
        Ok((conversation, false))
    }

    pub async fn list_messages(&self, conversation_id: Uuid) -> StoreResult<Vec<ChatMessage>> {
        let inner = self.inner.read().await;
        if !inner.conversations.contains_key(&conversation_id) {
            return Err(StoreError::NotFound("conversation"));
        }
        Ok(inner.messages_of(conversation_id).cloned().collect())
    }

    /// Snapshot the messages and mark the other role's unread ones in the
    /// snapshot as read, all under one write lock
    pub async fn read_messages(&self, conversation_id: Uuid, reader: Role) -> StoreResult<Vec<ChatMessage>> {
        let mut inner = self.inner.write().await;
        inner.conversation_mut(conversation_id)?;
        let snapshot: Vec<ChatMessage> = inner.messages_of(conversation_id).cloned().collect();

        let now = Utc::now();
        let sender_role = reader.other();
        let seen: Vec<Uuid> = snapshot
            .iter()
            .filter(|m| m.sender.role == sender_role && !m.is_read)
            .map(|m| m.id)
            .collect();
        for message in inner.messages.iter_mut().filter(|m| seen.contains(&m.id)) {
            message.is_read = true;
            message.read_at = Some(now);
        }

        let (client_unread, admin_unread) = recount_unread(inner.messages_of(conversation_id));
        let conversation = inner.conversation_mut(conversation_id)?;
        *conversation.unread_for_mut(reader) = match reader {
            Role::Client => client_unread,
            Role::Admin => admin_unread,
        };

        Ok(snapshot)
    }

    pub async fn mark_read(&self, conversation_id: Uuid, reader: Role) -> StoreResult<()> {
        let mut inner = self.inner.write().await;
        *inner.conversation_mut(conversation_id)?.unread_for_mut(reader) = 0;

        let now = Utc::now();
        let sender_role = reader.other();
        for message in inner
            .messages
            .iter_mut()
            .filter(|m| m.conversation_id == conversation_id && m.sender.role == sender_role && !m.is_read)
        {
            message.is_read = true;
            message.read_at = Some(now);
        }
        Ok(())
    }

    pub async fn append_message(
        &self,
        conversation_id: Uuid,
        sender: SenderSnapshot,
        content: String,
    ) -> StoreResult<ChatMessage> {
        let mut inner = self.inner.write().await;
        let newest = inner.messages_of(conversation_id).map(|m| m.created_at).max();

        let receiver = sender.role.other();
        let mut message = ChatMessage::new_text(conversation_id, sender, content);
        if let Some(newest) = newest {
            message.created_at = message.created_at.max(newest);
        }

        let conversation = inner.conversation_mut(conversation_id)?;
        conversation.last_message_at = message.created_at;
        *conversation.unread_for_mut(receiver) += 1;

        inner.messages.push(message.clone());
        Ok(message)
    }

    pub async fn delete_message(&self, message_id: Uuid) -> StoreResult<ChatMessage> {
        let mut inner = self.inner.write().await;
        let index = inner
            .messages
            .iter()
            .position(|m| m.id == message_id)
            .ok_or(StoreError::NotFound("message"))?;
        let removed = inner.messages.remove(index);

        let conversation_id = removed.conversation_id;
        let (client_unread, admin_unread) = recount_unread(inner.messages_of(conversation_id));
        let newest = inner.messages_of(conversation_id).map(|m| m.created_at).max();

        let conversation = inner.conversation_mut(conversation_id)?;
        conversation.client_unread_count = client_unread;
        conversation.admin_unread_count = admin_unread;
        if let Some(newest) = newest {
            conversation.last_message_at = newest;
        }

        Ok(removed)
    }

    pub async fn clear_messages(&self, conversation_id: Uuid) -> StoreResult<u64> {
        let mut inner = self.inner.write().await;
        let conversation = inner.conversation_mut(conversation_id)?;
        conversation.client_unread_count = 0;
        conversation.admin_unread_count = 0;
        conversation.last_message_at = conversation.created_at;

        let before = inner.messages.len();
        inner.messages.retain(|m| m.conversation_id != conversation_id);
        Ok((before - inner.messages.len()) as u64)
    }

    pub async fn set_status(&self, conversation_id: Uuid, status: ConversationStatus) -> StoreResult<Conversation> {
        let mut inner = self.inner.write().await;
        let conversation = inner.conversation_mut(conversation_id)?;
        conversation.status = status;
        Ok(conversation.clone())
    }
}
