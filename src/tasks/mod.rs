//! Background tasks module
//!
//! Async tasks the demo binary runs on top of the timing controls.

pub mod countdown_watcher;
pub mod scenario;

// Re-export main functions
pub use countdown_watcher::{countdown_watcher_task, wait_until_unlocked};
pub use scenario::run_scenario;
