//! Configuration: settings file layer and CLI argument handling

use std::{fs, path::{Path, PathBuf}};
use clap::Parser;
use serde::{Deserialize, Serialize};

use crate::{
    controls::{
        countdown::DEFAULT_TOTAL_SECONDS,
        debounce::DEFAULT_QUIET_PERIOD,
        scroll::{Edge, DEFAULT_TOLERANCE_PX},
    },
    error::TimingError,
};

/// Debounce timing defaults
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DebounceSettings {
    pub quiet_period_ms: u64,
    pub leading: bool,
}

impl Default for DebounceSettings {
    fn default() -> Self {
        Self {
            quiet_period_ms: DEFAULT_QUIET_PERIOD.as_millis() as u64,
            leading: true,
        }
    }
}

/// Countdown length, tick interval and button labels
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CountdownSettings {
    pub total_seconds: u32,
    pub tick_ms: u64,
    pub idle_label: String,
    pub suffix: String,
}

impl Default for CountdownSettings {
    fn default() -> Self {
        Self {
            total_seconds: DEFAULT_TOTAL_SECONDS,
            tick_ms: 1000,
            idle_label: "Get verification code".to_string(),
            suffix: "s until resend".to_string(),
        }
    }
}

/// Scroll edge detection defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrollSettings {
    pub edge: Edge,
    pub tolerance_px: f64,
}

impl Default for ScrollSettings {
    fn default() -> Self {
        Self {
            edge: Edge::Bottom,
            tolerance_px: DEFAULT_TOLERANCE_PX,
        }
    }
}

/// All tunables of the timing controls. Missing keys take their defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub debounce: DebounceSettings,
    pub countdown: CountdownSettings,
    pub scroll: ScrollSettings,
}

impl Settings {
    /// Parse and validate settings from a JSON document
    pub fn from_json(json: &str) -> Result<Self, TimingError> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Read settings from a JSON file
    pub fn load(path: &Path) -> Result<Self, TimingError> {
        Self::from_json(&fs::read_to_string(path)?)
    }

    pub fn validate(&self) -> Result<(), TimingError> {
        if self.countdown.total_seconds == 0 {
            return Err(TimingError::invalid("countdown.total_seconds", "must be positive"));
        }
        if self.countdown.tick_ms == 0 {
            return Err(TimingError::invalid("countdown.tick_ms", "must be positive"));
        }
        let tolerance = self.scroll.tolerance_px;
        if !tolerance.is_finite() || tolerance < 0.0 {
            return Err(TimingError::invalid(
                "scroll.tolerance_px",
                format!("must be a finite, non-negative number, got {}", tolerance),
            ));
        }
        Ok(())
    }
}

/// CLI argument parsing structure for the demo binary
#[derive(Parser)]
#[command(name = "ui-timing")]
#[command(about = "Run a scripted debounce, countdown and scroll scenario")]
#[command(version)]
pub struct Config {
    /// JSON settings file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Debounce quiet period in milliseconds
    #[arg(short, long)]
    pub quiet_period_ms: Option<u64>,

    /// Debounce on the trailing edge instead of the leading edge
    #[arg(long)]
    pub trailing: bool,

    /// Countdown length in seconds
    #[arg(long)]
    pub countdown: Option<u32>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Settings from the file (or defaults) with CLI overrides applied
    pub fn settings(&self) -> Result<Settings, TimingError> {
        let mut settings = match &self.config {
            Some(path) => Settings::load(path)?,
            None => Settings::default(),
        };

        if let Some(quiet_period_ms) = self.quiet_period_ms {
            settings.debounce.quiet_period_ms = quiet_period_ms;
        }
        if self.trailing {
            settings.debounce.leading = false;
        }
        if let Some(total_seconds) = self.countdown {
            settings.countdown.total_seconds = total_seconds;
        }

        settings.validate()?;
        Ok(settings)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }
}
