//! Scheduler double for tests that need stale callbacks to run

use std::{sync::Mutex, time::Duration};

use super::{OnceTask, RepeatingTask, Scheduler, TimerHandle};
use crate::utils::sync::lock;

enum Armed {
    Once(OnceTask),
    Repeating(RepeatingTask),
}

/// Scheduler that never honours `cancel`.
///
/// Models a runtime that already dequeued a callback when the owner cancelled
/// it: every armed task still runs on [`IgnoresCancel::run_all`].
#[derive(Default)]
pub(crate) struct IgnoresCancel {
    armed: Mutex<Vec<Armed>>,
    next_id: Mutex<u64>,
}

impl IgnoresCancel {
    /// Run every one-shot task once and every repeating task one tick, in
    /// the order they were armed
    pub(crate) fn run_all(&self) {
        let armed = std::mem::take(&mut *lock(&self.armed));
        let mut keep = Vec::new();
        for task in armed {
            match task {
                Armed::Once(task) => task(),
                Armed::Repeating(mut task) => {
                    task();
                    keep.push(Armed::Repeating(task));
                }
            }
        }
        lock(&self.armed).extend(keep);
    }

    fn arm(&self, task: Armed) -> TimerHandle {
        lock(&self.armed).push(task);
        let mut next_id = lock(&self.next_id);
        *next_id += 1;
        TimerHandle::new(*next_id)
    }
}

impl Scheduler for IgnoresCancel {
    fn schedule_once(&self, _delay: Duration, task: OnceTask) -> TimerHandle {
        self.arm(Armed::Once(task))
    }

    fn schedule_repeating(&self, _period: Duration, task: RepeatingTask) -> TimerHandle {
        self.arm(Armed::Repeating(task))
    }

    fn cancel(&self, _handle: TimerHandle) {}
}
