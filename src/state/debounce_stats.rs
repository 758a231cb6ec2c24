//! Counters describing how a debouncer coalesced its triggers

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Trigger bookkeeping for one debounced action
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebounceStats {
    /// Trigger calls received
    pub triggers: u64,
    /// Times the action was invoked
    pub fired: u64,
    /// Leading-edge triggers swallowed inside a live burst
    pub suppressed: u64,
    /// Wall-clock time of the most recent invocation
    pub last_fired_at: Option<DateTime<Utc>>,
}

impl DebounceStats {
    pub(crate) fn record_trigger(&mut self) {
        self.triggers += 1;
    }

    pub(crate) fn record_fire(&mut self) {
        self.fired += 1;
        self.last_fired_at = Some(Utc::now());
    }

    pub(crate) fn record_suppressed(&mut self) {
        self.suppressed += 1;
    }

    /// Triggers that were absorbed without their own invocation
    pub fn coalesced(&self) -> u64 {
        self.triggers.saturating_sub(self.fired)
    }
}
