//! Probed media information.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::resolved::FrameSize;

/// Dimensions and duration of the first video stream of a media file.
///
/// All three fields are required; a probe that cannot produce every one of
/// them yields no `MediaInfo` at all.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct MediaInfo {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Duration in seconds
    pub duration: f64,
}

impl MediaInfo {
    pub fn new(width: u32, height: u32, duration: f64) -> Self {
        Self {
            width,
            height,
            duration,
        }
    }

    /// Frame size of the video stream.
    pub fn frame_size(&self) -> FrameSize {
        FrameSize::new(self.width, self.height)
    }
}
