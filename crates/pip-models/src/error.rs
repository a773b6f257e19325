//! Parse and validation errors for model types.

use thiserror::Error;

/// Errors raised while building model values from host input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("Unsupported audio option: {0}")]
    UnsupportedAudioOption(String),

    #[error("Invalid position format '{0}'. Use a named anchor or 'x,y' for custom coordinates")]
    InvalidPositionFormat(String),

    #[error("Invalid overlay size {width}x{height}: both dimensions must be zero (auto) or positive")]
    InvalidSize { width: i64, height: i64 },

    #[error("Unknown size mode: {0}")]
    UnknownSizeMode(String),

    #[error("Unknown end time mode: {0}")]
    UnknownEndTimeMode(String),
}
