//! Overlay request models.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::ModelError;
use crate::position::OverlayPosition;

/// Audio routing for the composed output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum AudioOption {
    /// Keep the main track's audio, ignore the overlay's
    #[default]
    Main,
    /// Silence the main track during the overlay window, play the overlay's audio
    Overlay,
    /// Mix the overlay's audio over the main track
    Mix,
    /// No audio stream at all
    None,
}

impl AudioOption {
    pub const ALL: &'static [AudioOption] = &[
        AudioOption::Main,
        AudioOption::Overlay,
        AudioOption::Mix,
        AudioOption::None,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AudioOption::Main => "main",
            AudioOption::Overlay => "overlay",
            AudioOption::Mix => "mix",
            AudioOption::None => "none",
        }
    }

    /// Volume applied to the main track during the overlay window, for the
    /// options that build a separate audio mix.
    pub fn main_volume(&self) -> Option<u8> {
        match self {
            AudioOption::Overlay => Some(0),
            AudioOption::Mix => Some(1),
            AudioOption::Main | AudioOption::None => None,
        }
    }
}

impl fmt::Display for AudioOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AudioOption {
    type Err = ModelError;

    /// Exact, case-sensitive match against the host's choice list.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|option| option.as_str() == s)
            .ok_or_else(|| ModelError::UnsupportedAudioOption(s.to_string()))
    }
}

/// Requested overlay render size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum OverlaySize {
    /// Fit the overlay into the main frame, never upscaling
    #[default]
    Auto,
    /// Caller-supplied dimensions, interpreted per `SizeMode`
    Explicit { width: u32, height: u32 },
}

impl OverlaySize {
    /// Build from the host's two integer inputs.
    ///
    /// `(0, 0)` means auto; both positive is explicit; anything else is
    /// degenerate.
    pub fn from_dimensions(width: i64, height: i64) -> Result<Self, ModelError> {
        if width == 0 && height == 0 {
            return Ok(OverlaySize::Auto);
        }
        let invalid = || ModelError::InvalidSize { width, height };
        if width <= 0 || height <= 0 {
            return Err(invalid());
        }
        let w = u32::try_from(width).map_err(|_| invalid())?;
        let h = u32::try_from(height).map_err(|_| invalid())?;
        Ok(OverlaySize::Explicit { width: w, height: h })
    }
}

/// A picture-in-picture composition request.
///
/// Immutable once resolution begins. Times are in seconds; `end == 0`
/// means "unspecified".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct OverlayRequest {
    /// Primary media the overlay is drawn on
    pub main_media: PathBuf,
    /// Secondary media drawn on top
    pub overlay_media: PathBuf,
    /// Overlay placement
    #[serde(default)]
    #[schemars(with = "String")]
    pub position: OverlayPosition,
    /// Overlay render size
    #[serde(default)]
    pub size: OverlaySize,
    /// Overlay start time
    #[serde(default)]
    pub start: f64,
    /// Overlay end time (0 = derive)
    #[serde(default)]
    pub end: f64,
    /// Audio routing
    #[serde(default)]
    pub audio: AudioOption,
}

impl OverlayRequest {
    /// Create a request with host defaults (left-top, auto size, whole
    /// window, main audio).
    pub fn new(main_media: impl Into<PathBuf>, overlay_media: impl Into<PathBuf>) -> Self {
        Self {
            main_media: main_media.into(),
            overlay_media: overlay_media.into(),
            position: OverlayPosition::default(),
            size: OverlaySize::default(),
            start: 0.0,
            end: 0.0,
            audio: AudioOption::default(),
        }
    }

    pub fn with_position(mut self, position: OverlayPosition) -> Self {
        self.position = position;
        self
    }

    pub fn with_size(mut self, size: OverlaySize) -> Self {
        self.size = size;
        self
    }

    pub fn with_window(mut self, start: f64, end: f64) -> Self {
        self.start = start;
        self.end = end;
        self
    }

    pub fn with_audio(mut self, audio: AudioOption) -> Self {
        self.audio = audio;
        self
    }
}
