//! Timing controls module
//!
//! The three behaviors UI components share: debounced actions, a
//! button-locking countdown and scroll edge detection.

pub mod countdown;
pub mod debounce;
pub mod scroll;

// Re-export main types
pub use countdown::{Countdown, CountdownOptions};
pub use debounce::{DebounceOptions, Debounced, Outcome};
pub use scroll::{
    check_edge, scroll_to_bottom, set_scroll_top, Edge, EdgeDetector, ScrollEvent,
    ScrollGeometry, ScrollSnapshot, ScrollTarget,
};
