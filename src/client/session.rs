//! # Chat Session
//!
//! The scoped owner of everything a mounted chat view runs in the
//! background. Every timer is a tokio task wrapped in a [`TimerGuard`];
//! dropping the guard aborts the task, so unmounting, remounting or
//! dropping the session cannot leave a timer armed.
//!
//! While a conversation is mounted the session runs:
//!
//! - one self-rescheduling message poll timer, driven by
//!   [`AdaptiveSchedule`], for both roles
//! - for admins, one fixed-interval conversation list timer
//! - while the user is typing, one typing reset timer

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use uuid::Uuid;

use super::api::ConversationService;
use super::composer::Composer;
use super::config::Config;
use super::error::ClientError;
use super::poller::Poller;
use super::schedule::AdaptiveSchedule;
use super::view::{MountToken, ViewHandle};
use crate::shared::config::ScheduleSettings;
use crate::shared::messaging::Role;

/// Counts timers owned by live guards
#[derive(Debug, Clone, Default)]
pub struct TimerRegistry {
    live: Arc<AtomicUsize>,
}

impl TimerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn live(&self) -> usize {
        self.live.load(Ordering::Acquire)
    }

    /// Spawn `task` and return the guard that owns it
    pub fn spawn<F>(&self, name: &'static str, task: F) -> TimerGuard
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.live.fetch_add(1, Ordering::AcqRel);
        tracing::debug!("Timer {} armed", name);
        TimerGuard {
            name,
            handle: tokio::spawn(task),
            live: Arc::clone(&self.live),
        }
    }
}

/// Owns one spawned timer task; aborts it on drop
#[derive(Debug)]
pub struct TimerGuard {
    name: &'static str,
    handle: JoinHandle<()>,
    live: Arc<AtomicUsize>,
}

impl TimerGuard {
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl Drop for TimerGuard {
    fn drop(&mut self) {
        self.handle.abort();
        self.live.fetch_sub(1, Ordering::AcqRel);
        tracing::debug!("Timer {} cleared", self.name);
    }
}

/// Timers belonging to the current mount
#[derive(Debug, Default)]
struct MountTimers {
    messages: Option<TimerGuard>,
    conversations: Option<TimerGuard>,
    typing: Option<TimerGuard>,
}

pub struct ChatSession<S: ConversationService> {
    service: Arc<S>,
    view: ViewHandle,
    poller: Poller<S>,
    composer: Composer<S>,
    role: Role,
    settings: ScheduleSettings,
    timers: TimerRegistry,
    mounted: MountTimers,
}

impl<S: ConversationService> ChatSession<S> {
    pub fn new(service: Arc<S>, config: &Config) -> Self {
        let view = ViewHandle::new();
        let poller = Poller::new(Arc::clone(&service), view.clone());
        let composer = Composer::new(Arc::clone(&service), view.clone(), poller.clone(), config.role());

        Self {
            service,
            view,
            poller,
            composer,
            role: config.role(),
            settings: *config.schedule(),
            timers: TimerRegistry::new(),
            mounted: MountTimers::default(),
        }
    }

    pub fn view(&self) -> &ViewHandle {
        &self.view
    }

    pub fn poller(&self) -> &Poller<S> {
        &self.poller
    }

    pub fn composer(&self) -> &Composer<S> {
        &self.composer
    }

    pub fn timers(&self) -> &TimerRegistry {
        &self.timers
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub async fn mounted_conversation(&self) -> Option<Uuid> {
        self.view.mounted_conversation().await
    }

    /// Open the caller's direct conversation and mount it
    pub async fn open_direct(&mut self) -> Result<Uuid, ClientError> {
        self.open(None).await
    }

    /// Open the caller's conversation about a listing and mount it
    pub async fn open_listing(&mut self, listing_id: Uuid) -> Result<Uuid, ClientError> {
        self.open(Some(listing_id)).await
    }

    async fn open(&mut self, listing_id: Option<Uuid>) -> Result<Uuid, ClientError> {
        let conversation = self.service.open_conversation(listing_id).await?;
        self.mount(conversation.id).await;
        Ok(conversation.id)
    }

    /// Mount a conversation, replacing any current mount
    pub async fn mount(&mut self, conversation_id: Uuid) {
        self.clear_timers();
        let token = self.view.mount(conversation_id).await;

        self.mounted.messages = Some(self.timers.spawn(
            "message-poll",
            message_loop(self.poller.clone(), self.view.clone(), token, self.settings),
        ));

        if self.role.is_admin() {
            let period = Duration::from_millis(self.settings.conversation_list_ms);
            self.mounted.conversations = Some(self.timers.spawn(
                "conversation-list",
                conversation_loop(self.poller.clone(), period),
            ));
        }

        tracing::info!("Mounted conversation {} as {}", conversation_id, self.role);
    }

    /// Unmount the current conversation and clear every timer
    pub async fn unmount(&mut self) {
        self.clear_timers();
        if let Some(conversation_id) = self.view.mounted_conversation().await {
            tracing::info!("Unmounted conversation {}", conversation_id);
        }
        self.view.unmount().await;
    }

    fn clear_timers(&mut self) {
        self.mounted = MountTimers::default();
    }

    /// Flag the user as typing and (re)arm the reset timer
    pub async fn note_typing(&mut self) {
        self.view.set_typing(true).await;

        let view = self.view.clone();
        let reset = Duration::from_millis(self.settings.typing_reset_ms);
        // Replacing the guard aborts the previous reset timer
        self.mounted.typing = Some(self.timers.spawn("typing-reset", async move {
            tokio::time::sleep(reset).await;
            view.set_typing(false).await;
        }));
    }

    /// Record a connectivity change. Coming back online polls the mounted
    /// conversation right away.
    pub async fn set_online(&self, online: bool) {
        if !self.view.set_online(online).await {
            return;
        }

        if online {
            tracing::info!("Back online");
            if let Some(conversation_id) = self.view.mounted_conversation().await {
                self.poller.poll_messages(conversation_id).await;
            }
        } else {
            tracing::info!("Connection lost, polls are paused");
        }
    }
}

/// Self-rescheduling message poll: each tick computes the next delay from
/// its own outcome before sleeping again.
async fn message_loop<S: ConversationService>(
    poller: Poller<S>,
    view: ViewHandle,
    token: MountToken,
    settings: ScheduleSettings,
) {
    let mut schedule = AdaptiveSchedule::new(settings);

    let initial = poller.poll_mounted(token).await;
    if view
        .update_count(token, |count| schedule.seed(initial.len(), count))
        .await
        .is_none()
    {
        return;
    }

    loop {
        tokio::time::sleep(schedule.current()).await;

        let polled = poller.poll_mounted(token).await;
        match view
            .update_count(token, |count| schedule.observe(polled.len(), count))
            .await
        {
            Some(next) => tracing::debug!(
                "Next message poll for {} in {}ms",
                token.conversation_id,
                next.as_millis()
            ),
            None => break,
        }
    }
}

/// Fixed-interval conversation list refresh
async fn conversation_loop<S: ConversationService>(poller: Poller<S>, period: Duration) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    loop {
        interval.tick().await;
        poller.poll_conversations().await;
    }
}
