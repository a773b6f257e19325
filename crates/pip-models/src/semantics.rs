//! Resolution semantics.
//!
//! Size interpretation and end-time derivation each have two reasonable
//! readings. Both are selectable, neither is guessed.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ModelError;

/// How an explicit overlay size is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum SizeMode {
    /// Render at exactly the requested width and height
    #[default]
    Exact,
    /// Fit the overlay inside the requested box, preserving aspect ratio
    FitWithin,
}

impl SizeMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SizeMode::Exact => "exact",
            SizeMode::FitWithin => "fit_within",
        }
    }
}

impl fmt::Display for SizeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SizeMode {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "exact" => Ok(SizeMode::Exact),
            "fit_within" | "fit" => Ok(SizeMode::FitWithin),
            _ => Err(ModelError::UnknownSizeMode(s.to_string())),
        }
    }
}

/// How an unspecified end time (`end == 0`) is derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum EndTimeMode {
    /// `min(start + overlay duration, main duration)`
    #[default]
    OverlayDuration,
    /// The full main duration
    MainDuration,
}

impl EndTimeMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            EndTimeMode::OverlayDuration => "overlay_duration",
            EndTimeMode::MainDuration => "main_duration",
        }
    }
}

impl fmt::Display for EndTimeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EndTimeMode {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "overlay_duration" | "overlay" => Ok(EndTimeMode::OverlayDuration),
            "main_duration" | "main" => Ok(EndTimeMode::MainDuration),
            _ => Err(ModelError::UnknownEndTimeMode(s.to_string())),
        }
    }
}

/// The pair of semantic choices in force for a resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
pub struct ResolveSemantics {
    #[serde(default)]
    pub size_mode: SizeMode,
    #[serde(default)]
    pub end_time_mode: EndTimeMode,
}

impl ResolveSemantics {
    pub fn with_size_mode(mut self, size_mode: SizeMode) -> Self {
        self.size_mode = size_mode;
        self
    }

    pub fn with_end_time_mode(mut self, end_time_mode: EndTimeMode) -> Self {
        self.end_time_mode = end_time_mode;
        self
    }
}
