//! # Composer
//!
//! Sends and deletes messages, keeping the view's optimistic state honest:
//!
//! - Submitting the draft clears it as soon as the send starts and puts the
//!   cleared text back if the send fails. Every failed send raises a notice
//!   and is never retried automatically.
//! - A confirmed send appends the stored message, then triggers one
//!   out-of-band message poll so counters and read flags catch up without
//!   waiting for the next tick.
//! - A delete removes the message locally only after the store confirmed
//!   it, then refreshes the conversation list.
//! - Only one send is in flight at a time; the flag is released on every
//!   exit path by [`SendingGuard`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use uuid::Uuid;

use super::api::ConversationService;
use super::error::ComposeError;
use super::poller::Poller;
use super::view::{Notice, ViewHandle};
use crate::shared::messaging::{ChatMessage, Role, SendMessageRequest};

/// Holds the `sending` flag; releases it on drop
struct SendingGuard {
    flag: Arc<AtomicBool>,
}

impl SendingGuard {
    fn acquire(flag: &Arc<AtomicBool>) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag: Arc::clone(flag) })
    }
}

impl Drop for SendingGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

pub struct Composer<S> {
    service: Arc<S>,
    view: ViewHandle,
    poller: Poller<S>,
    role: Role,
    sending: Arc<AtomicBool>,
}

impl<S> Clone for Composer<S> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
            view: self.view.clone(),
            poller: self.poller.clone(),
            role: self.role,
            sending: Arc::clone(&self.sending),
        }
    }
}

impl<S: ConversationService> Composer<S> {
    pub fn new(service: Arc<S>, view: ViewHandle, poller: Poller<S>, role: Role) -> Self {
        Self {
            service,
            view,
            poller,
            role,
            sending: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Whether a send is in flight
    pub fn is_sending(&self) -> bool {
        self.sending.load(Ordering::Acquire)
    }

    /// Send the current draft.
    ///
    /// The draft is cleared once the send starts and put back if the store
    /// does not accept it. A blank draft is rejected and left as it is.
    pub async fn submit_draft(&self, conversation_id: Uuid) -> Result<ChatMessage, ComposeError> {
        let draft = self.view.draft().await;
        let text = SendMessageRequest::new(draft.as_str()).validated_content()?;
        let guard = self.acquire()?;

        let cleared = self.view.take_draft().await;
        let result = self.deliver(guard, conversation_id, &text).await;
        if result.is_err() {
            self.view.set_draft(cleared).await;
        }
        result
    }

    /// Send `content` to a conversation without touching the draft.
    ///
    /// Empty or whitespace-only content is rejected without a request.
    pub async fn send_message(
        &self,
        conversation_id: Uuid,
        content: impl Into<String>,
    ) -> Result<ChatMessage, ComposeError> {
        let content = content.into();
        let text = SendMessageRequest::new(content.as_str()).validated_content()?;
        let guard = self.acquire()?;
        self.deliver(guard, conversation_id, &text).await
    }

    fn acquire(&self) -> Result<SendingGuard, ComposeError> {
        SendingGuard::acquire(&self.sending).ok_or_else(|| {
            tracing::debug!("Send ignored, another send is in flight");
            ComposeError::InFlight
        })
    }

    async fn deliver(
        &self,
        guard: SendingGuard,
        conversation_id: Uuid,
        text: &str,
    ) -> Result<ChatMessage, ComposeError> {
        let sent = self.service.send_message(conversation_id, text).await;
        drop(guard);

        let message = match sent {
            Ok(message) => message,
            Err(e) => {
                tracing::error!("Failed to send message to {}: {}", conversation_id, e);
                self.view
                    .push_notice(Notice::error(format!("Message not sent: {}", e)))
                    .await;
                return Err(e.into());
            }
        };

        self.view.append_own_message(message.clone()).await;
        self.poller.poll_messages(conversation_id).await;

        Ok(message)
    }

    /// Delete a message (admin only). Local state changes only after the
    /// store confirmed the delete.
    pub async fn delete_message(&self, message_id: Uuid) -> Result<(), ComposeError> {
        if !self.role.is_admin() {
            return Err(ComposeError::NotPermitted);
        }

        if let Err(e) = self.service.delete_message(message_id).await {
            tracing::error!("Failed to delete message {}: {}", message_id, e);
            self.view
                .push_notice(Notice::error(format!("Message not deleted: {}", e)))
                .await;
            return Err(e.into());
        }

        self.view.remove_message(message_id).await;
        self.poller.poll_conversations().await;
        Ok(())
    }
}
