//! Observable state module
//!
//! Snapshots the controls expose to the surrounding UI layer.

pub mod button_state;
pub mod debounce_stats;

// Re-export main types
pub use button_state::ButtonState;
pub use debounce_stats::DebounceStats;
