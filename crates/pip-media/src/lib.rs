#![deny(unreachable_patterns)]
//! FFmpeg CLI wrapper for picture-in-picture composition.
//!
//! This crate provides:
//! - Type-safe FFmpeg command building
//! - Progress parsing from `-progress pipe:2`
//! - Cancellation and timeouts via tokio
//! - Overlay parameter resolution (size, position, timing)
//! - Filter graph construction and multi-pass planning
//! - A staged pipeline writing outputs atomically

pub mod command;
pub mod engine;
pub mod error;
pub mod filters;
pub mod fs_utils;
pub mod library;
pub mod logging;
pub mod overlay;
pub mod plan;
pub mod probe;
pub mod progress;
pub mod resolve;

pub use command::{check_ffmpeg, check_ffprobe, FfmpegCommand, FfmpegRunner};
pub use engine::{FfmpegEngine, MediaEngine};
pub use error::{MediaError, MediaResult};
pub use filters::{audio_mix_graph, overlay_video_graph, FilterGraph};
pub use library::{is_media_filename, list_media_files, strip_path, VIDEO_EXTENSIONS};
pub use logging::RequestLogger;
pub use overlay::{
    OverlayOptions, OverlayOutcome, OverlayPipeline, OverlayStage, Resolution,
    DEFAULT_OUTPUT_PREFIX,
};
pub use plan::{plan_passes, EnginePass, PassKind, PassPaths};
pub use probe::{probe_media_info, try_probe_media_info};
pub use progress::{FfmpegProgress, ProgressParser};
pub use resolve::resolve_overlay;
