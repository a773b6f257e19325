//! The external media engine seam.
//!
//! The pipeline only talks to a [`MediaEngine`]; production uses
//! [`FfmpegEngine`], tests substitute their own.

use async_trait::async_trait;
use std::path::Path;
use tokio::sync::watch;
use tracing::debug;

use pip_models::MediaInfo;

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::MediaResult;
use crate::probe::probe_media_info;

/// Probe and execute operations of the external engine.
#[async_trait]
pub trait MediaEngine: Send + Sync {
    /// Inspect a media file.
    async fn probe(&self, path: &Path) -> MediaResult<MediaInfo>;

    /// Execute one command to completion. `expected_secs` is the length of
    /// the output, used for progress reporting only.
    async fn run(&self, command: &FfmpegCommand, expected_secs: f64) -> MediaResult<()>;
}

/// FFmpeg/FFprobe CLI engine.
#[derive(Debug, Clone, Default)]
pub struct FfmpegEngine {
    runner: FfmpegRunner,
}

impl FfmpegEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Kill any invocation running longer than `secs`.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.runner = self.runner.with_timeout(secs);
        self
    }

    /// Kill the running invocation once `cancel_rx` reads `true`.
    pub fn with_cancel(mut self, cancel_rx: watch::Receiver<bool>) -> Self {
        self.runner = self.runner.with_cancel(cancel_rx);
        self
    }
}

#[async_trait]
impl MediaEngine for FfmpegEngine {
    async fn probe(&self, path: &Path) -> MediaResult<MediaInfo> {
        probe_media_info(path).await
    }

    async fn run(&self, command: &FfmpegCommand, expected_secs: f64) -> MediaResult<()> {
        let output = command.output().display().to_string();
        self.runner
            .run_with_progress(command, move |progress| {
                debug!(
                    output = %output,
                    percent = progress.percentage(expected_secs),
                    speed = progress.speed,
                    frame = progress.frame,
                    "FFmpeg progress"
                );
            })
            .await
    }
}
