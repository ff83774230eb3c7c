//! # Adaptive Poll Schedule
//!
//! Computes the delay before the next message poll from the outcome of the
//! current one. The message timer is self-rescheduling: a tick arms the next
//! one only after its fetch has settled, so a slow network never stacks
//! requests from the same timer.
//!
//! - A tick that fetched more messages than recorded tightens to `min_ms`
//!   and records the new count.
//! - Any other tick relaxes by `step_ms`, capped at `max_ms`.
//! - A failed tick relaxes like an idle one and leaves the recorded count
//!   alone, so the next successful tick compares against the pre-failure
//!   count.
//! - A fetched count below the recorded one (after a deletion) is recorded
//!   without tightening.

use std::time::Duration;

use crate::shared::config::ScheduleSettings;

/// Adaptive message poll schedule
#[derive(Debug, Clone)]
pub struct AdaptiveSchedule {
    settings: ScheduleSettings,
    current_ms: u64,
}

impl AdaptiveSchedule {
    pub fn new(settings: ScheduleSettings) -> Self {
        let current_ms = settings.initial_ms.clamp(settings.min_ms, settings.max_ms);
        Self {
            settings,
            current_ms,
        }
    }

    /// Delay before the next tick
    pub fn current(&self) -> Duration {
        Duration::from_millis(self.current_ms)
    }

    /// Record the count from the initial load of a freshly mounted view.
    ///
    /// The initial load only establishes the baseline; the delay stays at
    /// its initial value.
    pub fn seed(&mut self, fetched: Option<usize>, last_count: &mut usize) -> Duration {
        if let Some(count) = fetched {
            *last_count = count;
        }
        self.current()
    }

    /// Fold one tick's outcome into the schedule and return the next delay.
    ///
    /// `fetched` is `None` when the tick failed.
    pub fn observe(&mut self, fetched: Option<usize>, last_count: &mut usize) -> Duration {
        match fetched {
            Some(count) if count > *last_count => {
                *last_count = count;
                self.current_ms = self.settings.min_ms;
            }
            Some(count) => {
                *last_count = count;
                self.relax();
            }
            None => self.relax(),
        }
        self.current()
    }

    fn relax(&mut self) {
        self.current_ms = self
            .current_ms
            .saturating_add(self.settings.step_ms)
            .min(self.settings.max_ms);
    }
}

impl Default for AdaptiveSchedule {
    fn default() -> Self {
        Self::new(ScheduleSettings::default())
    }
}
