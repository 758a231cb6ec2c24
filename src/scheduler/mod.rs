//! Timer scheduling module
//!
//! The controls never talk to a clock directly. They arm and cancel timers
//! through the [`Scheduler`] trait, which has two implementations:
//! [`TokioScheduler`] for async hosts and [`ManualScheduler`] for hosts that
//! drive time from their own dispatch cycle.

pub mod manual;
pub mod tokio_scheduler;
#[cfg(test)]
pub(crate) mod test_support;

use std::time::Duration;

// Re-export main types
pub use manual::ManualScheduler;
pub use tokio_scheduler::TokioScheduler;

/// Callback run once when a single-shot timer expires
pub type OnceTask = Box<dyn FnOnce() + Send + 'static>;

/// Callback run on every tick of a repeating timer
pub type RepeatingTask = Box<dyn FnMut() + Send + 'static>;

/// Opaque reference to a scheduled timer.
///
/// Handles are neither `Clone` nor `Copy`: exactly one owner holds a handle
/// and gives it up by passing it to [`Scheduler::cancel`].
#[derive(Debug, PartialEq, Eq, Hash)]
#[must_use = "dropping a TimerHandle leaves the timer running with no way to cancel it"]
pub struct TimerHandle(u64);

impl TimerHandle {
    pub(crate) fn new(id: u64) -> Self {
        Self(id)
    }

    pub(crate) fn id(&self) -> u64 {
        self.0
    }
}

/// Source of single-shot and repeating timers.
///
/// Implementations must not run a task synchronously from inside
/// `schedule_*` or `cancel`, and must not hold internal locks while a task
/// runs. The controls rely on both to call back into the scheduler from
/// within their own callbacks.
pub trait Scheduler: Send + Sync {
    /// Run `task` once, `delay` from now
    fn schedule_once(&self, delay: Duration, task: OnceTask) -> TimerHandle;

    /// Run `task` every `period`, first tick one `period` from now
    fn schedule_repeating(&self, period: Duration, task: RepeatingTask) -> TimerHandle;

    /// Cancel a timer. Cancelling a timer that already completed is a no-op.
    fn cancel(&self, handle: TimerHandle);
}
