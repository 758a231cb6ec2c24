//! Countdown timer gating a button
//!
//! Typical use is the "resend code" button of a login form: after the code is
//! sent the button is disabled and shows the seconds left, then re-enables
//! itself with its original label.

use std::{
    sync::{Arc, Mutex, Weak},
    time::Duration,
};
use tokio::sync::watch;
use tracing::{debug, info};

use crate::{
    config::CountdownSettings,
    scheduler::{RepeatingTask, Scheduler, TimerHandle},
    state::ButtonState,
    utils::sync::lock,
};

/// Countdown length used when `start` is given zero seconds
pub const DEFAULT_TOTAL_SECONDS: u32 = 60;

/// Timing and labels of a countdown
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountdownOptions {
    pub default_total_seconds: u32,
    pub tick: Duration,
    /// Label shown while the button is enabled
    pub idle_label: String,
    /// Appended to the zero-padded seconds while locked
    pub suffix: String,
}

impl Default for CountdownOptions {
    fn default() -> Self {
        Self::from(&CountdownSettings::default())
    }
}

impl From<&CountdownSettings> for CountdownOptions {
    fn from(settings: &CountdownSettings) -> Self {
        Self {
            default_total_seconds: settings.total_seconds,
            tick: Duration::from_millis(settings.tick_ms),
            idle_label: settings.idle_label.clone(),
            suffix: settings.suffix.clone(),
        }
    }
}

#[derive(Debug)]
struct CountdownState {
    remaining: u32,
    total: u32,
    timer: Option<TimerHandle>,
    /// Bumped on every start and stop; stale ticks compare unequal
    generation: u64,
    view: ButtonState,
}

struct Shared {
    state: Mutex<CountdownState>,
    scheduler: Arc<dyn Scheduler>,
    options: CountdownOptions,
    updates: watch::Sender<ButtonState>,
}

impl Shared {
    fn ticker(self: &Arc<Self>, generation: u64) -> RepeatingTask {
        let weak: Weak<Self> = Arc::downgrade(self);
        Box::new(move || {
            if let Some(shared) = weak.upgrade() {
                shared.tick(generation);
            }
        })
    }

    fn tick(&self, generation: u64) {
        let mut state = lock(&self.state);
        if state.generation != generation || state.timer.is_none() {
            return;
        }

        if state.remaining <= 1 {
            if let Some(timer) = state.timer.take() {
                self.scheduler.cancel(timer);
            }
            state.remaining = state.total;
            state.view = ButtonState::idle(self.options.idle_label.as_str(), state.total);
            info!("Countdown finished, button re-enabled");
        } else {
            state.remaining -= 1;
            state.view = ButtonState::locked(state.remaining, &self.options.suffix);
            debug!("Countdown tick: {}s remaining", state.remaining);
        }

        self.updates.send_replace(state.view.clone());
    }
}

impl Drop for Shared {
    fn drop(&mut self) {
        let state = self
            .state
            .get_mut()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        if let Some(timer) = state.timer.take() {
            self.scheduler.cancel(timer);
        }
    }
}

/// Countdown that locks a button for a number of seconds.
///
/// Clones share one countdown. Each state change is published to
/// [`Countdown::subscribe`] receivers.
#[derive(Clone)]
pub struct Countdown {
    shared: Arc<Shared>,
}

impl Countdown {
    pub fn new(scheduler: Arc<dyn Scheduler>, options: CountdownOptions) -> Self {
        let total = options.default_total_seconds.max(1);
        let view = ButtonState::idle(options.idle_label.as_str(), total);
        let (updates, _) = watch::channel(view.clone());

        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(CountdownState {
                    remaining: total,
                    total,
                    timer: None,
                    generation: 0,
                    view,
                }),
                scheduler,
                options,
                updates,
            }),
        }
    }

    /// Lock the button for `total_seconds`, replacing any running countdown.
    ///
    /// Zero falls back to the configured default length.
    pub fn start(&self, total_seconds: u32) {
        let shared = &self.shared;
        let total = match total_seconds {
            0 => shared.options.default_total_seconds.max(1),
            n => n,
        };

        let mut state = lock(&shared.state);
        if let Some(previous) = state.timer.take() {
            shared.scheduler.cancel(previous);
            debug!("Replacing running countdown");
        }

        state.generation += 1;
        state.total = total;
        state.remaining = total;
        state.view = ButtonState::locked(total, &shared.options.suffix);
        let timer = shared
            .scheduler
            .schedule_repeating(shared.options.tick, shared.ticker(state.generation));
        state.timer = Some(timer);

        info!("Countdown started for {}s", total);
        shared.updates.send_replace(state.view.clone());
    }

    /// Start with the configured default length
    pub fn start_default(&self) {
        self.start(self.shared.options.default_total_seconds);
    }

    /// End the countdown early and re-enable the button.
    ///
    /// Returns whether a countdown was running. Stopping an idle countdown
    /// changes nothing.
    pub fn stop(&self) -> bool {
        let shared = &self.shared;
        let mut state = lock(&shared.state);
        let Some(timer) = state.timer.take() else {
            return false;
        };

        shared.scheduler.cancel(timer);
        state.generation += 1;
        state.remaining = state.total;
        state.view = ButtonState::idle(shared.options.idle_label.as_str(), state.total);

        info!("Countdown stopped early");
        shared.updates.send_replace(state.view.clone());
        true
    }

    /// Current button fields
    pub fn state(&self) -> ButtonState {
        lock(&self.shared.state).view.clone()
    }

    pub fn is_locked(&self) -> bool {
        lock(&self.shared.state).view.disabled
    }

    pub fn label(&self) -> String {
        lock(&self.shared.state).view.label.clone()
    }

    pub fn remaining(&self) -> u32 {
        lock(&self.shared.state).remaining
    }

    /// Whether a repeating tick is armed
    pub fn is_active(&self) -> bool {
        lock(&self.shared.state).timer.is_some()
    }

    /// Receive every button state change, starting from the current one
    pub fn subscribe(&self) -> watch::Receiver<ButtonState> {
        self.shared.updates.subscribe()
    }
}
