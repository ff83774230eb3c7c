//! Conversation store
//!
//! One handle over the two storage backends. The in-memory backend is the
//! default and backs the test suites; the Postgres backend is selected at
//! startup when `DATABASE_URL` points at a reachable database.

use thiserror::Error;
use uuid::Uuid;

use super::db::PgStore;
use super::memory::MemoryStore;
use crate::shared::messaging::{
    ChatMessage, ClientSummary, Conversation, ConversationStatus, ListingSummary, Role,
    SenderSnapshot,
};

/// Storage-layer errors
#[derive(Debug, Error)]
pub enum StoreError {
    /// The named record does not exist
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A stored row could not be mapped back onto the wire model
    #[error("Corrupt record: {0}")]
    Corrupt(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Handle to the conversation store; cheap to clone
#[derive(Clone)]
pub enum ConversationStore {
    Memory(MemoryStore),
    Postgres(PgStore),
}

impl std::fmt::Debug for ConversationStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.backend_name())
    }
}

impl ConversationStore {
    pub fn in_memory() -> Self {
        Self::Memory(MemoryStore::new())
    }

    pub fn postgres(pool: sqlx::PgPool) -> Self {
        Self::Postgres(PgStore::new(pool))
    }

    pub fn backend_name(&self) -> &'static str {
        match self {
            Self::Memory(_) => "memory",
            Self::Postgres(_) => "postgres",
        }
    }

    /// Active conversations visible to the caller, newest activity first
    pub async fn list_conversations(&self, user_id: Uuid, role: Role) -> StoreResult<Vec<Conversation>> {
        match self {
            Self::Memory(store) => Ok(store.list_conversations(user_id, role).await),
            Self::Postgres(store) => store.list_conversations(user_id, role).await,
        }
    }

    pub async fn find_conversation(&self, conversation_id: Uuid) -> StoreResult<Conversation> {
        match self {
            Self::Memory(store) => store.find_conversation(conversation_id).await,
            Self::Postgres(store) => store.find_conversation(conversation_id).await,
        }
    }

    /// Create-or-get. Returns the conversation and whether it already existed.
    ///
    /// Without a listing this is the client's single direct conversation;
    /// with one it is the (client, listing) conversation.
    pub async fn open_conversation(
        &self,
        client: ClientSummary,
        listing_id: Option<Uuid>,
    ) -> StoreResult<(Conversation, bool)> {
        match self {
            Self::Memory(store) => store.open_conversation(client, listing_id).await,
            Self::Postgres(store) => store.open_conversation(client, listing_id).await,
        }
    }

    /// Messages of a conversation, oldest first, ties in insertion order
    pub async fn list_messages(&self, conversation_id: Uuid) -> StoreResult<Vec<ChatMessage>> {
        match self {
            Self::Memory(store) => store.list_messages(conversation_id).await,
            Self::Postgres(store) => store.list_messages(conversation_id).await,
        }
    }

    /// Messages of a conversation as seen by `reader`, who has now read them.
    ///
    /// Only the other role's messages in the returned list are marked read,
    /// and the reader's counter is recomputed from what is still unread, so a
    /// message appended while the read is in progress stays unread.
    pub async fn read_messages(&self, conversation_id: Uuid, reader: Role) -> StoreResult<Vec<ChatMessage>> {
        match self {
            Self::Memory(store) => store.read_messages(conversation_id, reader).await,
            Self::Postgres(store) => store.read_messages(conversation_id, reader).await,
        }
    }

    /// Mark every message sent by the other role as read and zero the
    /// reader's unread counter
    pub async fn mark_read(&self, conversation_id: Uuid, reader: Role) -> StoreResult<()> {
        match self {
            Self::Memory(store) => store.mark_read(conversation_id, reader).await,
            Self::Postgres(store) => store.mark_read(conversation_id, reader).await,
        }
    }

    pub async fn append_message(
        &self,
        conversation_id: Uuid,
        sender: SenderSnapshot,
        content: String,
    ) -> StoreResult<ChatMessage> {
        match self {
            Self::Memory(store) => store.append_message(conversation_id, sender, content).await,
            Self::Postgres(store) => store.append_message(conversation_id, sender, content).await,
        }
    }

    /// Hard delete. Counters and `last_message_at` are recomputed from the
    /// remaining messages.
    pub async fn delete_message(&self, message_id: Uuid) -> StoreResult<ChatMessage> {
        match self {
            Self::Memory(store) => store.delete_message(message_id).await,
            Self::Postgres(store) => store.delete_message(message_id).await,
        }
    }

    /// Delete every message of a conversation, returning how many were removed
    pub async fn clear_messages(&self, conversation_id: Uuid) -> StoreResult<u64> {
        match self {
            Self::Memory(store) => store.clear_messages(conversation_id).await,
            Self::Postgres(store) => store.clear_messages(conversation_id).await,
        }
    }

    pub async fn set_status(&self, conversation_id: Uuid, status: ConversationStatus) -> StoreResult<Conversation> {
        match self {
            Self::Memory(store) => store.set_status(conversation_id, status).await,
            Self::Postgres(store) => store.set_status(conversation_id, status).await,
        }
    }

    /// Make a listing available for scoped conversations
    pub async fn register_listing(&self, listing: ListingSummary) -> StoreResult<()> {
        match self {
            Self::Memory(store) => {
                store.register_listing(listing).await;
                Ok(())
            }
            Self::Postgres(store) => store.register_listing(listing).await,
        }
    }
}

/// Unread counters derived from a conversation's remaining messages:
/// `(client_unread, admin_unread)`. A message is unread by the role that
/// did not send it.
pub(crate) fn recount_unread<'a>(messages: impl IntoIterator<Item = &'a ChatMessage>) -> (u32, u32) {
    messages
        .into_iter()
        .filter(|m| !m.is_read)
        .fold((0, 0), |(client, admin), m| match m.sender.role.other() {
            Role::Client => (client + 1, admin),
            Role::Admin => (client, admin + 1),
        })
}
