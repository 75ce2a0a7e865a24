//! Positional mapping onto a chainage window
//!
//! Converts a unit's absolute chainage (km marker along the canal) into a
//! normalized 0-100 position inside a configured window, for timeline-style
//! rendering.

use serde::{Deserialize, Serialize};

/// A start/end chainage window in km
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChainageWindow {
    /// Window start (km)
    pub start: f64,
    /// Window end (km)
    pub end: f64,
}

impl ChainageWindow {
    /// Create a window from start/end km markers
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    /// Window span in km
    pub fn span(&self) -> f64 {
        self.end - self.start
    }

    /// Normalized position of a chainage within the window, in `[0, 100]`.
    ///
    /// Out-of-range chainages clamp to the window edges so markers stay on
    /// the rendered axis; a degenerate window (end == start) maps everything
    /// to the midpoint 50 rather than dividing by zero.
    pub fn position(&self, chainage: f64) -> f64 {
        let span = self.span();
        if span == 0.0 {
            return 50.0;
        }
        let position = (chainage - self.start) / span * 100.0;
        position.clamp(0.0, 100.0)
    }

    /// Whether the chainage lies inside the window
    pub fn contains(&self, chainage: f64) -> bool {
        let (lo, hi) = if self.start <= self.end {
            (self.start, self.end)
        } else {
            (self.end, self.start)
        };
        chainage >= lo && chainage <= hi
    }
}

// ============================================================================
// Tests
// ============================================================================
