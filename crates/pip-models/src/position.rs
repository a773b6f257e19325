//! Overlay position tokens.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ModelError;

/// Named corner anchors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Anchor {
    LeftTop,
    LeftBottom,
    RightTop,
    RightBottom,
}

impl Anchor {
    pub const ALL: &'static [Anchor] = &[
        Anchor::LeftTop,
        Anchor::LeftBottom,
        Anchor::RightTop,
        Anchor::RightBottom,
    ];

    /// Token accepted from the host.
    pub fn as_str(&self) -> &'static str {
        match self {
            Anchor::LeftTop => "left-top",
            Anchor::LeftBottom => "left-bottom",
            Anchor::RightTop => "right-top",
            Anchor::RightBottom => "right-bottom",
        }
    }

    fn from_token(token: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|a| a.as_str() == token)
    }
}

/// Where the overlay's top-left corner goes.
///
/// Parsed from either a case-sensitive anchor token (`left-top`,
/// `left-bottom`, `right-top`, `right-bottom`) or an `"x,y"` literal.
/// Literal coordinates are kept signed here; range checks against the main
/// frame happen at resolution time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum OverlayPosition {
    Anchor(Anchor),
    Custom { x: i64, y: i64 },
}

impl Default for OverlayPosition {
    fn default() -> Self {
        OverlayPosition::Anchor(Anchor::LeftTop)
    }
}

impl fmt::Display for OverlayPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OverlayPosition::Anchor(anchor) => f.write_str(anchor.as_str()),
            OverlayPosition::Custom { x, y } => write!(f, "{},{}", x, y),
        }
    }
}

impl FromStr for OverlayPosition {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(anchor) = Anchor::from_token(s) {
            return Ok(OverlayPosition::Anchor(anchor));
        }

        // Anything that is not an anchor must be an "x,y" literal
        let invalid = || ModelError::InvalidPositionFormat(s.to_string());
        let (x, y) = s.split_once(',').ok_or_else(invalid)?;
        if y.contains(',') {
            return Err(invalid());
        }
        let x = x.trim().parse::<i64>().map_err(|_| invalid())?;
        let y = y.trim().parse::<i64>().map_err(|_| invalid())?;

        Ok(OverlayPosition::Custom { x, y })
    }
}

impl TryFrom<String> for OverlayPosition {
    type Error = ModelError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<OverlayPosition> for String {
    fn from(value: OverlayPosition) -> Self {
        value.to_string()
    }
}
