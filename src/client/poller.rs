//! # Poller
//!
//! Keeps the view's message and conversation lists in line with the store
//! without a persistent connection. Each poll fetches the whole list and
//! replaces the local one only when it differs.
//!
//! Poll failures never reach the caller as errors: they are logged and
//! reported as [`Polled::Unconfirmed`], and the next tick retries.

use std::sync::Arc;

use uuid::Uuid;

use super::api::ConversationService;
use super::view::{MountToken, ViewHandle};
use crate::shared::messaging::{ChatMessage, Conversation};

/// Outcome of one poll
#[derive(Debug, Clone, PartialEq)]
pub enum Polled<T> {
    /// The fetch succeeded. `replaced` is `true` when the view changed.
    Fresh { items: Vec<T>, replaced: bool },
    /// The fetch failed or was skipped; nothing new is known
    Unconfirmed,
}

impl<T> Polled<T> {
    /// Number of fetched records, `None` for an unconfirmed poll
    pub fn len(&self) -> Option<usize> {
        match self {
            Polled::Fresh { items, .. } => Some(items.len()),
            Polled::Unconfirmed => None,
        }
    }

    pub fn is_fresh(&self) -> bool {
        matches!(self, Polled::Fresh { .. })
    }

    pub fn replaced(&self) -> bool {
        matches!(self, Polled::Fresh { replaced: true, .. })
    }
}

pub struct Poller<S> {
    service: Arc<S>,
    view: ViewHandle,
}

impl<S> Clone for Poller<S> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
            view: self.view.clone(),
        }
    }
}

impl<S: ConversationService> Poller<S> {
    pub fn new(service: Arc<S>, view: ViewHandle) -> Self {
        Self { service, view }
    }

    /// Fetch a conversation's messages and update the view if it is the
    /// mounted conversation.
    ///
    /// The mount is captured before the fetch; if the view is unmounted or
    /// remounted while the request is in flight the result is not written.
    pub async fn poll_messages(&self, conversation_id: Uuid) -> Polled<ChatMessage> {
        let token = self
            .view
            .token()
            .await
            .filter(|t| t.conversation_id == conversation_id);
        self.fetch_messages(conversation_id, token).await
    }

    /// Poll for a specific mount
    pub(crate) async fn poll_mounted(&self, token: MountToken) -> Polled<ChatMessage> {
        self.fetch_messages(token.conversation_id, Some(token)).await
    }

    async fn fetch_messages(&self, conversation_id: Uuid, token: Option<MountToken>) -> Polled<ChatMessage> {
        if !self.view.is_online().await {
            tracing::debug!("Offline, skipping message poll for {}", conversation_id);
            return Polled::Unconfirmed;
        }

        match self.service.list_messages(conversation_id).await {
            Ok(messages) => {
                let replaced = match token {
                    Some(token) => self.view.replace_messages(token, messages.clone()).await,
                    None => false,
                };
                tracing::debug!(
                    "Polled {} messages for {} (replaced: {})",
                    messages.len(),
                    conversation_id,
                    replaced
                );
                Polled::Fresh { items: messages, replaced }
            }
            Err(e) => {
                tracing::warn!("Message poll for {} failed: {}", conversation_id, e);
                Polled::Unconfirmed
            }
        }
    }

    /// Refresh the conversation list (unread badges and ordering)
    pub async fn poll_conversations(&self) -> Polled<Conversation> {
        if !self.view.is_online().await {
            tracing::debug!("Offline, skipping conversation list poll");
            return Polled::Unconfirmed;
        }

        match self.service.list_conversations().await {
            Ok(conversations) => {
                let replaced = self.view.replace_conversations(conversations.clone()).await;
                tracing::debug!(
                    "Polled {} conversations (replaced: {})",
                    conversations.len(),
                    replaced
                );
                Polled::Fresh { items: conversations, replaced }
            }
            Err(e) => {
                tracing::warn!("Conversation list poll failed: {}", e);
                Polled::Unconfirmed
            }
        }
    }
}
