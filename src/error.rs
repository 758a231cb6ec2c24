//! Error types for the timing controls

use thiserror::Error;

/// Errors raised while building schedulers or loading settings.
///
/// Timer operations themselves never fail: cancelling an absent handle or
/// stopping an idle countdown is a no-op.
#[derive(Debug, Error)]
pub enum TimingError {
    #[error("no tokio runtime is available to drive timers")]
    NoRuntime,

    #[error("invalid setting `{field}`: {reason}")]
    InvalidSetting { field: &'static str, reason: String },

    #[error("failed to parse settings: {0}")]
    Config(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl TimingError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidSetting {
            field,
            reason: reason.into(),
        }
    }
}
