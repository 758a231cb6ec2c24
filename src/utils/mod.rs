//! Utility functions module
//!
//! This module contains utility functions used throughout the application.

pub mod signals;
pub(crate) mod sync;

// Re-export main functions
pub use signals::shutdown_signal;
