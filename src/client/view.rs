//! # Chat View State
//!
//! The locally held state a renderer draws from, plus a broadcast channel of
//! [`ViewEvent`]s announcing every change.
//!
//! Each mount of a conversation gets a [`MountToken`]. Writes that belong to
//! a conversation carry the token they were started under and are dropped
//! when the view has since been unmounted or remounted, so a response that
//! arrives late can never overwrite a newer view.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::{broadcast, RwLock};
use uuid::Uuid;

use super::diff::replace_if_changed;
use crate::shared::messaging::{ChatMessage, Conversation};

/// Notices older than this many entries are dropped
const MAX_NOTICES: usize = 20;

const EVENT_CAPACITY: usize = 256;

/// Identifies one mount of one conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MountToken {
    pub conversation_id: Uuid,
    pub generation: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

/// Non-blocking user notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
    pub at: DateTime<Utc>,
}

impl Notice {
    pub fn info(text: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Info, text: text.into(), at: Utc::now() }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Error, text: text.into(), at: Utc::now() }
    }
}

/// Change announcements for renderers
#[derive(Debug, Clone, PartialEq)]
pub enum ViewEvent {
    /// The message list was replaced by a fetched one
    MessagesReplaced { conversation_id: Uuid, count: usize },
    /// The caller's own message was confirmed and appended
    MessageAppended(ChatMessage),
    MessageRemoved { message_id: Uuid },
    ConversationsReplaced { count: usize },
    Notice(Notice),
    TypingChanged(bool),
    ConnectivityChanged(bool),
}

/// Snapshot of the view
#[derive(Debug, Clone, PartialEq)]
pub struct ChatView {
    pub conversation_id: Option<Uuid>,
    pub generation: u64,
    pub messages: Vec<ChatMessage>,
    pub conversations: Vec<Conversation>,
    /// Message count the poll schedule compares against
    pub last_message_count: usize,
    pub draft: String,
    pub notices: Vec<Notice>,
    pub is_typing: bool,
    pub is_online: bool,
    pub last_synced_at: Option<DateTime<Utc>>,
}

impl Default for ChatView {
    fn default() -> Self {
        Self {
            conversation_id: None,
            generation: 0,
            messages: Vec::new(),
            conversations: Vec::new(),
            last_message_count: 0,
            draft: String::new(),
            notices: Vec::new(),
            is_typing: false,
            is_online: true,
            last_synced_at: None,
        }
    }
}

impl ChatView {
    fn is_current(&self, token: MountToken) -> bool {
        self.conversation_id == Some(token.conversation_id) && self.generation == token.generation
    }

    fn token(&self) -> Option<MountToken> {
        self.conversation_id.map(|conversation_id| MountToken {
            conversation_id,
            generation: self.generation,
        })
    }
}

/// Receiver that skips over events it was too slow to see
///
/// A slow consumer loses the overwritten events but keeps receiving; the
/// stream only ends once every [`ViewHandle`] is gone.
pub struct ViewEvents {
    receiver: broadcast::Receiver<ViewEvent>,
}

impl ViewEvents {
    pub async fn next(&mut self) -> Option<ViewEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!("View consumer fell behind, skipped {} events", skipped);
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

/// Shared handle to the view
#[derive(Debug, Clone)]
pub struct ViewHandle {
    state: Arc<RwLock<ChatView>>,
    events: broadcast::Sender<ViewEvent>,
}

impl Default for ViewHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewHandle {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            state: Arc::new(RwLock::new(ChatView::default())),
            events,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ViewEvent> {
        self.events.subscribe()
    }

    /// Event stream for a renderer that may fall behind
    pub fn events(&self) -> ViewEvents {
        ViewEvents { receiver: self.events.subscribe() }
    }

    fn emit(&self, event: ViewEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }

    pub async fn snapshot(&self) -> ChatView {
        self.state.read().await.clone()
    }

    pub async fn messages(&self) -> Vec<ChatMessage> {
        self.state.read().await.messages.clone()
    }

    pub async fn conversations(&self) -> Vec<Conversation> {
        self.state.read().await.conversations.clone()
    }

    pub async fn draft(&self) -> String {
        self.state.read().await.draft.clone()
    }

    pub async fn notices(&self) -> Vec<Notice> {
        self.state.read().await.notices.clone()
    }

    pub async fn is_online(&self) -> bool {
        self.state.read().await.is_online
    }

    pub async fn last_message_count(&self) -> usize {
        self.state.read().await.last_message_count
    }

    /// Token of the current mount, if any
    pub async fn token(&self) -> Option<MountToken> {
        self.state.read().await.token()
    }

    pub async fn mounted_conversation(&self) -> Option<Uuid> {
        self.state.read().await.conversation_id
    }

    /// Start a new mount. Any token handed out earlier stops being current.
    pub async fn mount(&self, conversation_id: Uuid) -> MountToken {
        let mut view = self.state.write().await;
        view.generation += 1;
        view.conversation_id = Some(conversation_id);
        view.messages.clear();
        view.last_message_count = 0;
        view.last_synced_at = None;
        MountToken {
            conversation_id,
            generation: view.generation,
        }
    }

    pub async fn unmount(&self) {
        let typing_was_on = {
            let mut view = self.state.write().await;
            view.generation += 1;
            view.conversation_id = None;
            view.messages.clear();
            view.last_message_count = 0;
            std::mem::replace(&mut view.is_typing, false)
        };
        if typing_was_on {
            self.emit(ViewEvent::TypingChanged(false));
        }
    }

    /// Replace the message list if the fetched one differs.
    ///
    /// Returns `false` for an unchanged list and for a stale token.
    pub async fn replace_messages(&self, token: MountToken, fetched: Vec<ChatMessage>) -> bool {
        let count = fetched.len();
        let replaced = {
            let mut view = self.state.write().await;
            if !view.is_current(token) {
                tracing::debug!(
                    "Discarding stale message list for conversation {} (generation {})",
                    token.conversation_id,
                    token.generation
                );
                return false;
            }
            view.last_synced_at = Some(Utc::now());
            replace_if_changed(&mut view.messages, fetched)
        };

        if replaced {
            self.emit(ViewEvent::MessagesReplaced {
                conversation_id: token.conversation_id,
                count,
            });
        }
        replaced
    }

    /// Append the caller's own confirmed message and record the new list
    /// length as the schedule's baseline, so it is not mistaken for remote
    /// activity.
    pub async fn append_own_message(&self, message: ChatMessage) -> bool {
        {
            let mut view = self.state.write().await;
            if view.conversation_id != Some(message.conversation_id) {
                return false;
            }
            if !view.messages.iter().any(|m| m.id == message.id) {
                view.messages.push(message.clone());
            }
            view.last_message_count = view.messages.len();
        }
        self.emit(ViewEvent::MessageAppended(message));
        true
    }

    pub async fn remove_message(&self, message_id: Uuid) -> bool {
        let removed = {
            let mut view = self.state.write().await;
            let before = view.messages.len();
            view.messages.retain(|m| m.id != message_id);
            view.messages.len() != before
        };
        if removed {
            self.emit(ViewEvent::MessageRemoved { message_id });
        }
        removed
    }

    pub async fn replace_conversations(&self, fetched: Vec<Conversation>) -> bool {
        let count = fetched.len();
        let replaced = {
            let mut view = self.state.write().await;
            replace_if_changed(&mut view.conversations, fetched)
        };
        if replaced {
            self.emit(ViewEvent::ConversationsReplaced { count });
        }
        replaced
    }

    /// Run `f` on the recorded message count if `token` is still current
    pub async fn update_count<R>(&self, token: MountToken, f: impl FnOnce(&mut usize) -> R) -> Option<R> {
        let mut view = self.state.write().await;
        if !view.is_current(token) {
            return None;
        }
        Some(f(&mut view.last_message_count))
    }

    pub async fn set_draft(&self, text: impl Into<String>) {
        self.state.write().await.draft = text.into();
    }

    /// Clear the draft and return what it held
    pub async fn take_draft(&self) -> String {
        std::mem::take(&mut self.state.write().await.draft)
    }

    pub async fn push_notice(&self, notice: Notice) {
        {
            let mut view = self.state.write().await;
            view.notices.push(notice.clone());
            if view.notices.len() > MAX_NOTICES {
                let excess = view.notices.len() - MAX_NOTICES;
                view.notices.drain(..excess);
            }
        }
        self.emit(ViewEvent::Notice(notice));
    }

    pub async fn set_typing(&self, typing: bool) {
        let changed = {
            let mut view = self.state.write().await;
            std::mem::replace(&mut view.is_typing, typing) != typing
        };
        if changed {
            self.emit(ViewEvent::TypingChanged(typing));
        }
    }

    /// Returns `true` if connectivity changed
    pub async fn set_online(&self, online: bool) -> bool {
        let changed = {
            let mut view = self.state.write().await;
            std::mem::replace(&mut view.is_online, online) != online
        };
        if changed {
            self.emit(ViewEvent::ConnectivityChanged(online));
        }
        changed
    }
}
