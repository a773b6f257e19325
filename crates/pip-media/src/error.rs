//! Error types for media operations.

use std::path::PathBuf;
use thiserror::Error;

use pip_models::ModelError;

/// Result type for media operations.
pub type MediaResult<T> = Result<T, MediaError>;

/// Errors that can occur while composing an overlay.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("FFmpeg not found in PATH")]
    FfmpegNotFound,

    #[error("FFprobe not found in PATH")]
    FfprobeNotFound,

    #[error("FFmpeg command failed: {message}")]
    FfmpegFailed {
        message: String,
        stderr: Option<String>,
        exit_code: Option<i32>,
    },

    #[error("Could not probe {path}: {message}")]
    ProbeFailed { path: PathBuf, message: String },

    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Invalid overlay size: {0}")]
    InvalidSize(String),

    #[error("Invalid time window: {0}")]
    InvalidTimeWindow(String),

    #[error("Invalid position: {0}")]
    InvalidPosition(String),

    #[error("Unsupported audio option: {0}")]
    UnsupportedAudioOption(String),

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Operation timed out after {0} seconds")]
    Timeout(u64),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl MediaError {
    /// Create an FFmpeg failure error.
    pub fn ffmpeg_failed(
        message: impl Into<String>,
        stderr: Option<String>,
        exit_code: Option<i32>,
    ) -> Self {
        Self::FfmpegFailed {
            message: message.into(),
            stderr,
            exit_code,
        }
    }

    /// Create a probe failure error.
    pub fn probe_failed(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::ProbeFailed {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn invalid_time_window(message: impl Into<String>) -> Self {
        Self::InvalidTimeWindow(message.into())
    }

    pub fn invalid_position(message: impl Into<String>) -> Self {
        Self::InvalidPosition(message.into())
    }

    pub fn invalid_size(message: impl Into<String>) -> Self {
        Self::InvalidSize(message.into())
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Short, stable label used for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::FfmpegNotFound | Self::FfprobeNotFound => "tool_missing",
            Self::FfmpegFailed { .. } => "engine_failed",
            Self::ProbeFailed { .. } => "probe_failed",
            Self::FileNotFound(_) => "file_not_found",
            Self::InvalidSize(_) => "invalid_size",
            Self::InvalidTimeWindow(_) => "invalid_time_window",
            Self::InvalidPosition(_) => "invalid_position",
            Self::UnsupportedAudioOption(_) => "unsupported_audio_option",
            Self::Cancelled => "cancelled",
            Self::Timeout(_) => "timeout",
            Self::Io(_) => "io",
            Self::JsonParse(_) => "json",
            Self::Internal(_) => "internal",
        }
    }
}

impl From<ModelError> for MediaError {
    fn from(err: ModelError) -> Self {
        match err {
            ModelError::UnsupportedAudioOption(option) => Self::UnsupportedAudioOption(option),
            ModelError::InvalidPositionFormat(_) => Self::InvalidPosition(err.to_string()),
            ModelError::InvalidSize { .. } => Self::InvalidSize(err.to_string()),
            ModelError::UnknownSizeMode(_) | ModelError::UnknownEndTimeMode(_) => {
                Self::Internal(err.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_error_mapping() {
        let err: MediaError = ModelError::UnsupportedAudioOption("surround".into()).into();
        assert!(matches!(err, MediaError::UnsupportedAudioOption(ref o) if o == "surround"));

        let err: MediaError = ModelError::InvalidPositionFormat("abc,60".into()).into();
        assert!(matches!(err, MediaError::InvalidPosition(_)));
        assert_eq!(err.kind(), "invalid_position");

        let err: MediaError = ModelError::InvalidSize { width: 0, height: 10 }.into();
        assert!(matches!(err, MediaError::InvalidSize(_)));
    }
}
