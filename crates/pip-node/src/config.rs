//! Node configuration.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use tracing::warn;

use pip_media::OverlayOptions;
use pip_models::{EncodingConfig, EndTimeMode, ResolveSemantics, SizeMode};

/// Node configuration.
#[derive(Debug, Clone)]
pub struct NodeConfig {
    /// Directory offered for uploads and bare `load` names
    pub input_dir: PathBuf,
    /// Directory receiving composed outputs
    pub output_dir: PathBuf,
    /// Parent of per-run scratch directories
    pub temp_dir: PathBuf,
    /// How explicit overlay sizes are interpreted
    pub size_mode: SizeMode,
    /// How an unspecified end time is derived
    pub end_time_mode: EndTimeMode,
    /// Per-invocation FFmpeg timeout (`None` = unbounded)
    pub ffmpeg_timeout: Option<Duration>,
    /// Serve identical requests from an existing output
    pub reuse_output: bool,
    /// Encoder settings
    pub encoding: EncodingConfig,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("input"),
            output_dir: PathBuf::from("output"),
            temp_dir: PathBuf::from("temp"),
            size_mode: SizeMode::default(),
            end_time_mode: EndTimeMode::default(),
            ffmpeg_timeout: None,
            reuse_output: false,
            encoding: EncodingConfig::default(),
        }
    }
}

impl NodeConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let encoding = EncodingConfig::default();

        Self {
            input_dir: env_path("PIP_INPUT_DIR").unwrap_or(defaults.input_dir),
            output_dir: env_path("PIP_OUTPUT_DIR").unwrap_or(defaults.output_dir),
            temp_dir: env_path("PIP_TEMP_DIR").unwrap_or(defaults.temp_dir),
            size_mode: env_parsed("PIP_SIZE_MODE").unwrap_or(defaults.size_mode),
            end_time_mode: env_parsed("PIP_END_TIME_MODE").unwrap_or(defaults.end_time_mode),
            ffmpeg_timeout: std::env::var("PIP_FFMPEG_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse::<u64>().ok())
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs),
            reuse_output: std::env::var("PIP_REUSE_OUTPUT")
                .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes"))
                .unwrap_or(false),
            encoding: EncodingConfig {
                codec: std::env::var("PIP_VIDEO_CODEC").unwrap_or(encoding.codec),
                audio_codec: std::env::var("PIP_AUDIO_CODEC").unwrap_or(encoding.audio_codec),
                preset: std::env::var("PIP_PRESET").unwrap_or(encoding.preset),
                crf: std::env::var("PIP_CRF")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(encoding.crf),
                ..encoding
            },
        }
    }

    pub fn semantics(&self) -> ResolveSemantics {
        ResolveSemantics::default()
            .with_size_mode(self.size_mode)
            .with_end_time_mode(self.end_time_mode)
    }

    /// Pipeline options derived from this config.
    pub fn overlay_options(&self) -> OverlayOptions {
        OverlayOptions::new(&self.output_dir)
            .with_scratch_dir(&self.temp_dir)
            .with_semantics(self.semantics())
            .with_encoding(self.encoding.clone())
            .with_reuse_existing_output(self.reuse_output)
    }
}

fn env_path(key: &str) -> Option<PathBuf> {
    std::env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .map(PathBuf::from)
}

/// Parse an enum-valued variable; unknown values fall back to the default.
fn env_parsed<T>(key: &str) -> Option<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let raw = std::env::var(key).ok()?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(key = key, value = %raw, "Ignoring invalid setting: {}", e);
            None
        }
    }
}
