//! Tokio-backed scheduler: one spawned task per timer

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};
use tokio::{
    runtime::Handle,
    task::AbortHandle,
    time::{interval_at, sleep, Instant, MissedTickBehavior},
};
use tracing::debug;

use super::{OnceTask, RepeatingTask, Scheduler, TimerHandle};
use crate::{error::TimingError, utils::sync::lock};

/// Shortest period a repeating timer may use; tokio rejects a zero interval
const MIN_PERIOD: Duration = Duration::from_millis(1);

/// Scheduler that spawns a tokio task per timer and aborts it on cancel
#[derive(Debug)]
pub struct TokioScheduler {
    runtime: Handle,
    next_id: AtomicU64,
    tasks: Arc<Mutex<HashMap<u64, AbortHandle>>>,
}

impl TokioScheduler {
    /// Create a scheduler bound to the runtime of the calling context
    pub fn current() -> Result<Self, TimingError> {
        Handle::try_current()
            .map(Self::with_handle)
            .map_err(|_| TimingError::NoRuntime)
    }

    /// Create a scheduler that spawns its timers on `runtime`
    pub fn with_handle(runtime: Handle) -> Self {
        Self {
            runtime,
            next_id: AtomicU64::new(1),
            tasks: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Number of timers that have been armed and have not finished
    pub fn active_timers(&self) -> usize {
        lock(&self.tasks).len()
    }

    fn next_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }
}

impl Scheduler for TokioScheduler {
    fn schedule_once(&self, delay: Duration, task: OnceTask) -> TimerHandle {
        let id = self.next_id();
        let tasks = Arc::clone(&self.tasks);

        // The registry lock is held across the spawn so the task cannot
        // deregister itself before it has been registered.
        let mut registry = lock(&self.tasks);
        let join = self.runtime.spawn(async move {
            sleep(delay).await;
            lock(&tasks).remove(&id);
            task();
        });
        registry.insert(id, join.abort_handle());

        debug!("Armed one-shot timer {} for {:?}", id, delay);
        TimerHandle::new(id)
    }

    fn schedule_repeating(&self, period: Duration, mut task: RepeatingTask) -> TimerHandle {
        let id = self.next_id();
        let period = period.max(MIN_PERIOD);
        let start = {
            let _runtime = self.runtime.enter();
            Instant::now() + period
        };

        let mut registry = lock(&self.tasks);
        let join = self.runtime.spawn(async move {
            let mut ticker = interval_at(start, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                task();
            }
        });
        registry.insert(id, join.abort_handle());

        debug!("Armed repeating timer {} every {:?}", id, period);
        TimerHandle::new(id)
    }

    fn cancel(&self, handle: TimerHandle) {
        if let Some(task) = lock(&self.tasks).remove(&handle.id()) {
            task.abort();
            debug!("Cancelled timer {}", handle.id());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn counter() -> (Arc<AtomicUsize>, Arc<AtomicUsize>) {
        let count = Arc::new(AtomicUsize::new(0));
        (Arc::clone(&count), count)
    }

    #[test]
    fn current_requires_a_runtime() {
        assert!(matches!(TokioScheduler::current(), Err(TimingError::NoRuntime)));
    }

    #[tokio::test(start_paused = true)]
    async fn once_fires_after_delay() {
        let scheduler = TokioScheduler::current().unwrap();
        let (hits, seen) = counter();

        let _handle = scheduler.schedule_once(
            Duration::from_millis(300),
            Box::new(move || {
                hits.fetch_add(1, Ordering::SeqCst);
            }),
        );

        sleep(Duration::from_millis(290)).await;
        assert_eq!(seen.load(Ordering::SeqCst), 0);

        sleep(Duration::from_millis(20)).await;
        assert_eq!(seen.load(Ordering::SeqCst), 1);
        assert_eq!(scheduler.active_timers(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_once_never_fires() {
        let scheduler = TokioScheduler::current().unwrap();
        let (hits, seen) = counter();

        let handle = scheduler.schedule_once(
            Duration::from_millis(100),
            Box::new(move || {
                hits.fetch_add(1, Ordering::SeqCst);
            }),
        );
        scheduler.cancel(handle);

        sleep(Duration::from_millis(500)).await;
        assert_eq!(seen.load(Ordering::SeqCst), 0);
        assert_eq!(scheduler.active_timers(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn repeating_ticks_until_cancelled() {
        let scheduler = TokioScheduler::current().unwrap();
        let (hits, seen) = counter();

        let handle = scheduler.schedule_repeating(
            Duration::from_secs(1),
            Box::new(move || {
                hits.fetch_add(1, Ordering::SeqCst);
            }),
        );

        sleep(Duration::from_millis(3_500)).await;
        assert_eq!(seen.load(Ordering::SeqCst), 3);

        scheduler.cancel(handle);
        sleep(Duration::from_secs(5)).await;
        assert_eq!(seen.load(Ordering::SeqCst), 3);
    }
}
