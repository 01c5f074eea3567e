//! Scroll sampling
//!
//! Turns the host's raw scroll offset and page metrics into a `ScrollState`.
//! Sampling is read-only; the tracker only remembers the previous offset so
//! it can report the scroll direction.

use serde::{Deserialize, Serialize};

use crate::consts::RIBBON_REVEAL_PX;

/// Viewport and document metrics reported by the host
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Visible height (innerHeight)
    pub height: f64,
    /// Total scrollable content height (scrollHeight)
    pub scroll_height: f64,
}

impl Viewport {
    pub fn new(height: f64, scroll_height: f64) -> Self {
        Self {
            height,
            scroll_height,
        }
    }

    /// Largest reachable scroll offset (0 when content fits the viewport)
    #[inline]
    pub fn max_scroll(&self) -> f64 {
        (self.scroll_height - self.height).max(0.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ScrollDirection {
    Forward,
    Backward,
    #[default]
    None,
}

/// One scroll sample
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScrollState {
    pub offset_px: f64,
    /// Progress through the page, always within [0, 100]
    pub progress_pct: f64,
    pub direction: ScrollDirection,
}

impl ScrollState {
    /// Pure sample with no direction information
    pub fn sample(offset_px: f64, viewport: Viewport) -> Self {
        Self {
            offset_px,
            progress_pct: progress_pct(offset_px, viewport),
            direction: ScrollDirection::None,
        }
    }
}

/// Percentage of the scrollable range covered by `offset_px`
pub fn progress_pct(offset_px: f64, viewport: Viewport) -> f64 {
    let max = viewport.max_scroll();
    if max <= 0.0 || !offset_px.is_finite() {
        return 0.0;
    }
    (offset_px / max * 100.0).clamp(0.0, 100.0)
}

/// Samples scroll state and tracks direction between samples
#[derive(Debug, Clone)]
pub struct ScrollTracker {
    last_offset: Option<f64>,
    ribbon_reveal_px: f64,
}

impl Default for ScrollTracker {
    fn default() -> Self {
        Self::new(RIBBON_REVEAL_PX)
    }
}

impl ScrollTracker {
    pub fn new(ribbon_reveal_px: f64) -> Self {
        Self {
            last_offset: None,
            ribbon_reveal_px,
        }
    }

    /// Sample the current scroll position. Call on every scroll event and once at startup.
    pub fn sample(&mut self, offset_px: f64, viewport: Viewport) -> ScrollState {
        let mut state = ScrollState::sample(offset_px, viewport);
        state.direction = match self.last_offset {
            Some(prev) if offset_px > prev => ScrollDirection::Forward,
            Some(prev) if offset_px < prev => ScrollDirection::Backward,
            _ => ScrollDirection::None,
        };
        self.last_offset = Some(offset_px);
        state
    }

    /// Offset of the previous sample, if any
    pub fn last_offset(&self) -> Option<f64> {
        self.last_offset
    }

    /// Whether the KPI ribbon should be shown for this sample
    pub fn ribbon_visible(&self, state: &ScrollState) -> bool {
        state.offset_px > self.ribbon_reveal_px
    }
}
