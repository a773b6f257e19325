//! Resolved overlay parameters.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Width and height in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct FrameSize {
    pub width: u32,
    pub height: u32,
}

impl FrameSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Whether this size fits inside `bound` on both axes.
    pub fn fits_within(&self, bound: FrameSize) -> bool {
        self.width <= bound.width && self.height <= bound.height
    }
}

impl fmt::Display for FrameSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Top-left corner of the overlay in main-video pixel space.
///
/// Negative when a bottom or right anchor places an overlay larger than the
/// frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct PixelPosition {
    pub x: i64,
    pub y: i64,
}

impl PixelPosition {
    pub fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }
}

/// Overlay parameters derived from a request and the two probed inputs.
///
/// Recomputed on every invocation; carries no identity of its own.
/// `0 <= start < end <= main duration` holds for every value produced by
/// the resolver.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ResolvedOverlay {
    /// Render size of the overlay
    pub size: FrameSize,
    /// Top-left corner on the main frame
    pub position: PixelPosition,
    /// Time the overlay becomes visible (seconds)
    pub start: f64,
    /// Time the overlay disappears (seconds)
    pub end: f64,
    /// Additional repetitions of the overlay clip
    pub loop_count: u32,
}

impl ResolvedOverlay {
    /// Length of the active window in seconds.
    pub fn window(&self) -> f64 {
        self.end - self.start
    }
}
