//! Scroll edge detection
//!
//! [`check_edge`] classifies a single scroll event and runs a callback when
//! the viewport sits at the requested edge. It keeps no memory between
//! events, so a callback that must run at most once per arrival (loading the
//! next page, say) should be wrapped in a [`Debounced`](super::Debounced).

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{config::ScrollSettings, error::TimingError};

/// Default distance from the bottom that still counts as "at the bottom"
pub const DEFAULT_TOLERANCE_PX: f64 = 100.0;

/// Viewport edge to watch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Edge {
    Top,
    #[default]
    Bottom,
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Edge::Top => f.write_str("TOP"),
            Edge::Bottom => f.write_str("BOTTOM"),
        }
    }
}

impl FromStr for Edge {
    type Err = TimingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "TOP" => Ok(Edge::Top),
            "BOTTOM" => Ok(Edge::Bottom),
            other => Err(TimingError::invalid(
                "edge",
                format!("expected TOP or BOTTOM, got `{}`", other),
            )),
        }
    }
}

/// Scrollable element geometry, in CSS pixels
pub trait ScrollTarget {
    /// Height of the full scrollable content
    fn scroll_height(&self) -> f64;
    /// Height of the visible viewport
    fn client_height(&self) -> f64;
    /// Distance scrolled from the top
    fn scroll_top(&self) -> f64;
    fn set_scroll_top(&mut self, value: f64);
}

/// A scroll event as delivered by the host UI
pub trait ScrollEvent {
    type Target: ScrollTarget;

    fn target(&self) -> &Self::Target;

    /// Suppress the host's default handling of this event
    fn prevent_default(&mut self);
}

/// Whether `target` sits at `edge`
pub fn at_edge<T: ScrollTarget + ?Sized>(target: &T, edge: Edge, tolerance_px: f64) -> bool {
    let offset = target.scroll_top();
    match edge {
        Edge::Top => offset == 0.0,
        Edge::Bottom => offset + target.client_height() + tolerance_px >= target.scroll_height(),
    }
}

/// Run `callback` if the event's target is at `edge`, then prevent the
/// event's default action whether or not the callback ran.
///
/// `tolerance_px` only applies to [`Edge::Bottom`]; the top edge requires an
/// offset of exactly zero. Returns whether the callback ran.
pub fn check_edge<E, F>(event: &mut E, callback: F, edge: Edge, tolerance_px: f64) -> bool
where
    E: ScrollEvent + ?Sized,
    F: FnOnce(),
{
    let reached = at_edge(event.target(), edge, tolerance_px);
    if reached {
        callback();
    }
    event.prevent_default();
    reached
}

pub fn set_scroll_top<T: ScrollTarget + ?Sized>(target: &mut T, value: f64) {
    target.set_scroll_top(value);
}

/// Scroll `target` all the way down
pub fn scroll_to_bottom<T: ScrollTarget + ?Sized>(target: &mut T) {
    let value = target.scroll_height();
    set_scroll_top(target, value);
}

/// Edge and tolerance bundled for repeated checks
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeDetector {
    pub edge: Edge,
    pub tolerance_px: f64,
}

impl EdgeDetector {
    pub fn new(edge: Edge, tolerance_px: f64) -> Self {
        Self { edge, tolerance_px }
    }

    pub fn top() -> Self {
        Self::new(Edge::Top, 0.0)
    }

    pub fn bottom(tolerance_px: f64) -> Self {
        Self::new(Edge::Bottom, tolerance_px)
    }

    pub fn check<E, F>(&self, event: &mut E, callback: F) -> bool
    where
        E: ScrollEvent + ?Sized,
        F: FnOnce(),
    {
        check_edge(event, callback, self.edge, self.tolerance_px)
    }
}

impl Default for EdgeDetector {
    fn default() -> Self {
        Self::bottom(DEFAULT_TOLERANCE_PX)
    }
}

impl From<&ScrollSettings> for EdgeDetector {
    fn from(settings: &ScrollSettings) -> Self {
        Self::new(settings.edge, settings.tolerance_px)
    }
}

/// Plain scroll geometry for hosts that hand over raw numbers
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScrollGeometry {
    pub scroll_height: f64,
    pub client_height: f64,
    pub scroll_top: f64,
}

impl ScrollGeometry {
    pub fn new(scroll_height: f64, client_height: f64, scroll_top: f64) -> Self {
        Self {
            scroll_height,
            client_height,
            scroll_top,
        }
    }
}

impl ScrollTarget for ScrollGeometry {
    fn scroll_height(&self) -> f64 {
        self.scroll_height
    }

    fn client_height(&self) -> f64 {
        self.client_height
    }

    fn scroll_top(&self) -> f64 {
        self.scroll_top
    }

    fn set_scroll_top(&mut self, value: f64) {
        self.scroll_top = value;
    }
}

/// A scroll event carrying a [`ScrollGeometry`] snapshot
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScrollSnapshot {
    pub target: ScrollGeometry,
    pub default_prevented: bool,
}

impl ScrollSnapshot {
    pub fn new(target: ScrollGeometry) -> Self {
        Self {
            target,
            default_prevented: false,
        }
    }
}

impl From<ScrollGeometry> for ScrollSnapshot {
    fn from(target: ScrollGeometry) -> Self {
        Self::new(target)
    }
}

impl ScrollEvent for ScrollSnapshot {
    type Target = ScrollGeometry;

    fn target(&self) -> &ScrollGeometry {
        &self.target
    }

    fn prevent_default(&mut self) {
        self.default_prevented = true;
    }
}
