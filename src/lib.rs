//! UI Timing - debounce, countdown and scroll-edge controls for UI components
//!
//! This library decides *when* and *how often* caller-supplied actions run
//! relative to a stream of UI events. It never renders anything: results are
//! exposed as callback invocations and as observable button state.

pub mod config;
pub mod controls;
pub mod error;
pub mod scheduler;
pub mod state;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use config::{Config, Settings};
pub use controls::{
    check_edge, Countdown, DebounceOptions, Debounced, Edge, EdgeDetector, Outcome,
};
pub use error::TimingError;
pub use scheduler::{ManualScheduler, Scheduler, TimerHandle, TokioScheduler};
pub use state::{ButtonState, DebounceStats};
pub use utils::signals::shutdown_signal;
