//! Debounced action wrapper
//!
//! A [`Debounced`] turns a high-frequency stream of trigger calls into at
//! most one action invocation per burst. In leading mode the action runs
//! synchronously on the first trigger and later triggers are swallowed until
//! the quiet period closes the burst. In trailing mode every trigger restarts
//! the quiet period and the action runs once it elapses, with the arguments
//! of the last trigger.

use std::{
    collections::VecDeque,
    mem,
    sync::{Arc, Mutex, Weak},
    time::Duration,
};
use tracing::{debug, error};

use crate::{
    config::DebounceSettings,
    scheduler::{OnceTask, Scheduler, TimerHandle},
    state::DebounceStats,
    utils::sync::lock,
};

/// Default quiet period between bursts
pub const DEFAULT_QUIET_PERIOD: Duration = Duration::from_millis(300);

/// Timing policy of a debounced action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DebounceOptions {
    pub quiet_period: Duration,
    /// Fire on the first trigger of a burst instead of after the last one
    pub leading: bool,
}

impl DebounceOptions {
    pub fn leading(quiet_period: Duration) -> Self {
        Self {
            quiet_period,
            leading: true,
        }
    }

    pub fn trailing(quiet_period: Duration) -> Self {
        Self {
            quiet_period,
            leading: false,
        }
    }
}

impl Default for DebounceOptions {
    fn default() -> Self {
        Self::leading(DEFAULT_QUIET_PERIOD)
    }
}

impl From<&DebounceSettings> for DebounceOptions {
    fn from(settings: &DebounceSettings) -> Self {
        Self {
            quiet_period: Duration::from_millis(settings.quiet_period_ms),
            leading: settings.leading,
        }
    }
}

/// What a single trigger call did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Leading edge: the action ran during this call
    Fired,
    /// Leading edge: a burst is live, the trigger was swallowed
    Suppressed,
    /// Trailing edge: a new quiet period was armed
    Scheduled,
    /// Trailing edge: the pending quiet period was restarted with new arguments
    Rescheduled,
}

type Action<A> = Box<dyn FnMut(A) -> anyhow::Result<()> + Send>;

enum Phase<A> {
    Idle,
    /// Leading edge already fired; the timer only closes the burst
    Suppressing { timer: TimerHandle },
    /// Trailing edge armed with the most recent arguments
    Armed { timer: TimerHandle, args: A },
}

impl<A> Phase<A> {
    fn into_timer(self) -> Option<TimerHandle> {
        match self {
            Phase::Idle => None,
            Phase::Suppressing { timer } | Phase::Armed { timer, .. } => Some(timer),
        }
    }
}

struct Session<A> {
    phase: Phase<A>,
    /// Bumped whenever a timer is armed or cancelled; stale expiries compare unequal
    generation: u64,
    stats: DebounceStats,
}

/// Holds the action while it is idle.
///
/// The action is moved out for the duration of a call, so a nested
/// invocation from inside the action queues its arguments in `deferred`
/// instead of locking the action a second time.
struct Runner<A> {
    action: Option<Action<A>>,
    deferred: VecDeque<A>,
}

/// Puts the action back into its slot if it panics
struct Restore<'a, A> {
    slot: &'a Mutex<Runner<A>>,
    action: Option<Action<A>>,
}

impl<A> Drop for Restore<'_, A> {
    fn drop(&mut self) {
        if let Some(action) = self.action.take() {
            lock(self.slot).action = Some(action);
        }
    }
}

struct Shared<A> {
    session: Mutex<Session<A>>,
    runner: Mutex<Runner<A>>,
    scheduler: Arc<dyn Scheduler>,
    options: DebounceOptions,
}

impl<A: Send + 'static> Shared<A> {
    fn expiry(self: &Arc<Self>, generation: u64) -> OnceTask {
        let weak: Weak<Self> = Arc::downgrade(self);
        Box::new(move || {
            if let Some(shared) = weak.upgrade() {
                shared.expire(generation);
            }
        })
    }

    fn expire(&self, generation: u64) {
        let mut session = lock(&self.session);
        if session.generation != generation {
            return;
        }

        match mem::replace(&mut session.phase, Phase::Idle) {
            Phase::Idle => {}
            Phase::Suppressing { .. } => debug!("Quiet period elapsed, burst closed"),
            Phase::Armed { args, .. } => {
                session.stats.record_fire();
                drop(session);

                debug!("Quiet period elapsed, firing trailing action");
                if let Err(e) = self.invoke(args) {
                    error!("Debounced action failed: {:#}", e);
                }
            }
        }
    }

    /// Run the action, then any invocations queued by the action itself.
    ///
    /// Errors from queued invocations are logged; the first invocation's
    /// result is returned.
    fn invoke(&self, args: A) -> anyhow::Result<()> {
        let action = {
            let mut runner = lock(&self.runner);
            match runner.action.take() {
                Some(action) => action,
                None => {
                    debug!("Action already running, deferring nested invocation");
                    runner.deferred.push_back(args);
                    return Ok(());
                }
            }
        };

        let mut guard = Restore {
            slot: &self.runner,
            action: Some(action),
        };
        let result = guard.run(args);

        loop {
            let next = {
                let mut runner = lock(&self.runner);
                match runner.deferred.pop_front() {
                    Some(next) => next,
                    None => {
                        runner.action = guard.action.take();
                        break;
                    }
                }
            };
            if let Err(e) = guard.run(next) {
                error!("Deferred debounced action failed: {:#}", e);
            }
        }

        result
    }
}

impl<A> Restore<'_, A> {
    fn run(&mut self, args: A) -> anyhow::Result<()> {
        match self.action.as_mut() {
            Some(action) => action(args),
            None => Ok(()),
        }
    }
}

impl<A> Drop for Shared<A> {
    fn drop(&mut self) {
        let session = self
            .session
            .get_mut()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        if let Some(timer) = mem::replace(&mut session.phase, Phase::Idle).into_timer() {
            self.scheduler.cancel(timer);
        }
    }
}

/// An action wrapped with debounce semantics.
///
/// Clones share one session: a trigger through any clone belongs to the same
/// burst. Independent debouncers never share timer state. Dropping the last
/// clone cancels the pending timer, discarding any unfired trailing call.
pub struct Debounced<A> {
    shared: Arc<Shared<A>>,
}

impl<A> Clone for Debounced<A> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<A: Send + 'static> Debounced<A> {
    /// Wrap `action` so that triggers are debounced on `scheduler`
    pub fn new<F>(scheduler: Arc<dyn Scheduler>, options: DebounceOptions, action: F) -> Self
    where
        F: FnMut(A) -> anyhow::Result<()> + Send + 'static,
    {
        Self {
            shared: Arc::new(Shared {
                session: Mutex::new(Session {
                    phase: Phase::Idle,
                    generation: 0,
                    stats: DebounceStats::default(),
                }),
                runner: Mutex::new(Runner {
                    action: Some(Box::new(action)),
                    deferred: VecDeque::new(),
                }),
                scheduler,
                options,
            }),
        }
    }

    /// Wrap `action` and hand it `context` as its receiver on every invocation
    pub fn with_context<C, F>(
        scheduler: Arc<dyn Scheduler>,
        options: DebounceOptions,
        mut context: C,
        mut action: F,
    ) -> Self
    where
        C: Send + 'static,
        F: FnMut(&mut C, A) -> anyhow::Result<()> + Send + 'static,
    {
        Self::new(scheduler, options, move |args| action(&mut context, args))
    }

    /// Deliver one trigger event.
    ///
    /// In leading mode an action error is returned from the call that ran it.
    /// Trailing invocations happen on the scheduler and their errors are
    /// logged.
    pub fn call(&self, args: A) -> anyhow::Result<Outcome> {
        if self.shared.options.leading {
            self.call_leading(args)
        } else {
            Ok(self.call_trailing(args))
        }
    }

    fn call_leading(&self, args: A) -> anyhow::Result<Outcome> {
        let shared = &self.shared;
        let mut session = lock(&shared.session);
        session.stats.record_trigger();

        if !matches!(session.phase, Phase::Idle) {
            session.stats.record_suppressed();
            debug!("Trigger suppressed inside live burst");
            return Ok(Outcome::Suppressed);
        }

        session.generation += 1;
        let timer = shared
            .scheduler
            .schedule_once(shared.options.quiet_period, shared.expiry(session.generation));
        session.phase = Phase::Suppressing { timer };
        session.stats.record_fire();
        drop(session);

        debug!("Burst started, firing leading action");
        shared.invoke(args)?;
        Ok(Outcome::Fired)
    }

    fn call_trailing(&self, args: A) -> Outcome {
        let shared = &self.shared;
        let mut session = lock(&shared.session);
        session.stats.record_trigger();

        let outcome = match mem::replace(&mut session.phase, Phase::Idle).into_timer() {
            Some(previous) => {
                shared.scheduler.cancel(previous);
                Outcome::Rescheduled
            }
            None => Outcome::Scheduled,
        };

        session.generation += 1;
        let timer = shared
            .scheduler
            .schedule_once(shared.options.quiet_period, shared.expiry(session.generation));
        session.phase = Phase::Armed { timer, args };

        debug!("Trailing action armed ({:?})", outcome);
        outcome
    }

    /// Drop the pending timer without running the action.
    ///
    /// Returns whether anything was pending. Calling it again is a no-op.
    pub fn cancel(&self) -> bool {
        let mut session = lock(&self.shared.session);
        match mem::replace(&mut session.phase, Phase::Idle).into_timer() {
            Some(timer) => {
                session.generation += 1;
                self.shared.scheduler.cancel(timer);
                debug!("Debounce cancelled");
                true
            }
            None => false,
        }
    }

    /// Whether a burst is live (leading) or an invocation is armed (trailing)
    pub fn is_pending(&self) -> bool {
        !matches!(lock(&self.shared.session).phase, Phase::Idle)
    }

    pub fn options(&self) -> DebounceOptions {
        self.shared.options
    }

    pub fn stats(&self) -> DebounceStats {
        lock(&self.shared.session).stats.clone()
    }
}
