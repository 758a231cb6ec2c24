//! Virtual-clock scheduler driven by the host's dispatch cycle

use std::{
    collections::{BTreeMap, HashMap},
    sync::Mutex,
    time::Duration,
};

use super::{OnceTask, RepeatingTask, Scheduler, TimerHandle};
use crate::utils::sync::lock;

enum Task {
    Once(OnceTask),
    Repeating { period: Duration, task: RepeatingTask },
}

/// Queue position: deadline first, then arming order among equal deadlines
type Slot = (Duration, u64);

#[derive(Default)]
struct Queue {
    now: Duration,
    next_id: u64,
    next_seq: u64,
    due: BTreeMap<Slot, (u64, Task)>,
    slots: HashMap<u64, Slot>,
    /// Repeating timer currently executing, and whether it cancelled itself
    running: Option<(u64, bool)>,
}

impl Queue {
    fn push(&mut self, id: u64, at: Duration, task: Task) {
        let slot = (at, self.next_seq);
        self.next_seq += 1;
        self.due.insert(slot, (id, task));
        self.slots.insert(id, slot);
    }

    fn pop_due(&mut self, until: Duration) -> Option<(u64, Task)> {
        let (&slot, _) = self.due.first_key_value()?;
        if slot.0 > until {
            return None;
        }
        let (id, task) = self.due.remove(&slot)?;
        self.slots.remove(&id);
        self.now = slot.0;
        Some((id, task))
    }
}

/// Scheduler whose clock only moves when [`ManualScheduler::advance`] is
/// called.
///
/// Hosts with their own frame or event loop call `advance` once per frame
/// with the elapsed time. Due timers run in deadline order, ties in the
/// order they were armed, each observing [`ManualScheduler::now`] equal to
/// its own deadline.
#[derive(Default)]
pub struct ManualScheduler {
    queue: Mutex<Queue>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Virtual time elapsed since the scheduler was created
    pub fn now(&self) -> Duration {
        lock(&self.queue).now
    }

    /// Number of armed timers
    pub fn pending(&self) -> usize {
        let queue = lock(&self.queue);
        let running = matches!(queue.running, Some((_, false)));
        queue.due.len() + usize::from(running)
    }

    /// Move the clock forward by `by`, running every timer that falls due
    pub fn advance(&self, by: Duration) {
        let until = lock(&self.queue).now + by;

        loop {
            let Some((id, task)) = lock(&self.queue).pop_due(until) else {
                break;
            };

            match task {
                Task::Once(task) => task(),
                Task::Repeating { period, mut task } => {
                    lock(&self.queue).running = Some((id, false));
                    task();
                    let mut queue = lock(&self.queue);
                    let cancelled = matches!(queue.running.take(), Some((_, true)));
                    if !cancelled {
                        let next = queue.now + period;
                        queue.push(id, next, Task::Repeating { period, task });
                    }
                }
            }
        }

        lock(&self.queue).now = until;
    }

    /// Move the clock to an absolute virtual time; earlier times are ignored
    pub fn advance_to(&self, at: Duration) {
        let now = self.now();
        if at > now {
            self.advance(at - now);
        }
    }

    fn arm(&self, delay: Duration, task: Task) -> TimerHandle {
        let mut queue = lock(&self.queue);
        let id = queue.next_id;
        queue.next_id += 1;
        let at = queue.now + delay;
        queue.push(id, at, task);
        TimerHandle::new(id)
    }
}

impl Scheduler for ManualScheduler {
    fn schedule_once(&self, delay: Duration, task: OnceTask) -> TimerHandle {
        self.arm(delay, Task::Once(task))
    }

    fn schedule_repeating(&self, period: Duration, task: RepeatingTask) -> TimerHandle {
        let period = period.max(Duration::from_millis(1));
        self.arm(period, Task::Repeating { period, task })
    }

    fn cancel(&self, handle: TimerHandle) {
        let mut queue = lock(&self.queue);
        if let Some(slot) = queue.slots.remove(&handle.id()) {
            queue.due.remove(&slot);
        } else if let Some((id, cancelled)) = queue.running.as_mut() {
            if *id == handle.id() {
                *cancelled = true;
            }
        }
    }
}
