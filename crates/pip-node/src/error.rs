//! Node error types.

use std::path::PathBuf;
use thiserror::Error;

pub type NodeResult<T> = Result<T, NodeError>;

#[derive(Debug, Error)]
pub enum NodeError {
    #[error("Invalid media name: {0}")]
    InvalidMediaName(String),

    #[error("Media not found: {0}")]
    MediaNotFound(PathBuf),

    #[error("Invalid input: {0}")]
    InvalidInput(#[from] pip_models::ModelError),

    #[error("Media error: {0}")]
    Media(#[from] pip_media::MediaError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl NodeError {
    pub fn invalid_media_name(msg: impl Into<String>) -> Self {
        Self::InvalidMediaName(msg.into())
    }
}
