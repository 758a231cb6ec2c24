//! Button state driven by the countdown timer

use serde::{Deserialize, Serialize};

/// UI-bound fields of a countdown-gated button
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ButtonState {
    /// Whether the button must be disabled
    pub disabled: bool,
    /// Text to render on the button
    pub label: String,
    /// Seconds left in the countdown; the full duration while idle
    pub remaining_seconds: u32,
}

impl ButtonState {
    /// Idle button showing its default label
    pub fn idle(label: impl Into<String>, remaining_seconds: u32) -> Self {
        Self {
            disabled: false,
            label: label.into(),
            remaining_seconds,
        }
    }

    /// Locked button showing the time left before it re-enables
    pub fn locked(remaining_seconds: u32, suffix: &str) -> Self {
        Self {
            disabled: true,
            label: format_remaining(remaining_seconds, suffix),
            remaining_seconds,
        }
    }

    pub fn is_locked(&self) -> bool {
        self.disabled
    }
}

/// Two-digit, zero-padded seconds followed by `suffix`, e.g. `07s until resend`
pub fn format_remaining(remaining_seconds: u32, suffix: &str) -> String {
    format!("{:02}{}", remaining_seconds, suffix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locked_label_is_zero_padded() {
        let state = ButtonState::locked(7, "s until resend");
        assert!(state.is_locked());
        assert_eq!(state.label, "07s until resend");
        assert_eq!(ButtonState::locked(42, "s").label, "42s");
    }

    #[test]
    fn wide_values_are_not_truncated() {
        assert_eq!(format_remaining(120, "s"), "120s");
    }

    #[test]
    fn idle_is_enabled() {
        let state = ButtonState::idle("Get verification code", 60);
        assert!(!state.is_locked());
        assert_eq!(state.remaining_seconds, 60);
    }
}
