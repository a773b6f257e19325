//! Picture-in-picture overlay pipeline.
//!
//! # Stages
//!
//! `Validating -> BuildingGraph -> Encoding -> Finalizing -> Done`, with
//! `Failed` reachable from any of them.
//!
//! - **Validating**: both inputs exist and can be probed
//! - **BuildingGraph**: parameters are resolved and the engine passes planned
//! - **Encoding**: passes run strictly in order, each must leave its artifact
//! - **Finalizing**: the finished file is moved onto its canonical path
//!
//! Every pass writes inside a scratch directory. The canonical output path is
//! only touched once all passes succeed, so a failed run leaves any previous
//! output intact and never leaves partial files behind.

use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Instant;

use pip_models::{
    EncodingConfig, MediaInfo, OverlayRequest, RequestFingerprint, ResolveSemantics,
    ResolvedOverlay,
};

use crate::engine::MediaEngine;
use crate::error::{MediaError, MediaResult};
use crate::fs_utils::{ensure_dir, input_stamp, move_file};
use crate::logging::RequestLogger;
use crate::plan::{plan_passes, PassPaths};
use crate::resolve::resolve_overlay;

/// Prefix of output filenames (`pip_<fingerprint>.mp4`).
pub const DEFAULT_OUTPUT_PREFIX: &str = "pip";

/// Pipeline stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlayStage {
    Validating,
    BuildingGraph,
    Encoding,
    Finalizing,
    Done,
    Failed,
}

impl fmt::Display for OverlayStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OverlayStage::Validating => "validating",
            OverlayStage::BuildingGraph => "building_graph",
            OverlayStage::Encoding => "encoding",
            OverlayStage::Finalizing => "finalizing",
            OverlayStage::Done => "done",
            OverlayStage::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Where and how the pipeline writes.
#[derive(Debug, Clone)]
pub struct OverlayOptions {
    /// Directory receiving finished outputs
    pub output_dir: PathBuf,
    /// Parent of per-run scratch directories (defaults to `output_dir`)
    pub scratch_dir: Option<PathBuf>,
    /// Size and end-time semantics
    pub semantics: ResolveSemantics,
    /// Encoder settings
    pub encoding: EncodingConfig,
    /// Output filename prefix
    pub output_prefix: String,
    /// Return an existing output for an identical request instead of re-encoding
    pub reuse_existing_output: bool,
}

impl OverlayOptions {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            scratch_dir: None,
            semantics: ResolveSemantics::default(),
            encoding: EncodingConfig::default(),
            output_prefix: DEFAULT_OUTPUT_PREFIX.to_string(),
            reuse_existing_output: false,
        }
    }

    pub fn with_scratch_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.scratch_dir = Some(dir.into());
        self
    }

    pub fn with_semantics(mut self, semantics: ResolveSemantics) -> Self {
        self.semantics = semantics;
        self
    }

    pub fn with_encoding(mut self, encoding: EncodingConfig) -> Self {
        self.encoding = encoding;
        self
    }

    pub fn with_output_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.output_prefix = prefix.into();
        self
    }

    pub fn with_reuse_existing_output(mut self, reuse: bool) -> Self {
        self.reuse_existing_output = reuse;
        self
    }

    fn scratch_root(&self) -> &Path {
        self.scratch_dir.as_deref().unwrap_or(&self.output_dir)
    }
}

/// Probed inputs and the parameters derived from them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Resolution {
    pub main: MediaInfo,
    pub overlay: MediaInfo,
    pub resolved: ResolvedOverlay,
}

/// Result of a successful run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverlayOutcome {
    pub output_path: PathBuf,
    pub resolved: ResolvedOverlay,
    pub fingerprint: RequestFingerprint,
    /// Engine invocations performed (0 when served from an existing output)
    pub passes: usize,
    pub cached: bool,
    pub stage: OverlayStage,
}

/// Logs every stage transition of one run.
struct StageTracker<'a> {
    stage: OverlayStage,
    logger: &'a RequestLogger,
}

impl<'a> StageTracker<'a> {
    fn new(logger: &'a RequestLogger) -> Self {
        Self {
            stage: OverlayStage::Validating,
            logger,
        }
    }

    fn advance(&mut self, next: OverlayStage) {
        self.logger
            .log_progress(&format!("stage {} -> {}", self.stage, next));
        self.stage = next;
    }

    fn fail(&mut self, err: &MediaError) {
        self.logger
            .log_error(&format!("stage {} failed: {}", self.stage, err));
        self.stage = OverlayStage::Failed;
    }
}

/// Composes overlays through a [`MediaEngine`].
pub struct OverlayPipeline<E> {
    engine: E,
    options: OverlayOptions,
}

impl<E: MediaEngine> OverlayPipeline<E> {
    pub fn new(engine: E, options: OverlayOptions) -> Self {
        Self { engine, options }
    }

    pub fn options(&self) -> &OverlayOptions {
        &self.options
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Validate inputs and resolve parameters without encoding anything.
    pub async fn resolve(&self, request: &OverlayRequest) -> MediaResult<Resolution> {
        let main = self.probe_input(&request.main_media).await?;
        let overlay = self.probe_input(&request.overlay_media).await?;
        let resolved = resolve_overlay(request, &main, &overlay, &self.options.semantics)?;

        Ok(Resolution {
            main,
            overlay,
            resolved,
        })
    }

    /// Run the full pipeline for `request`.
    pub async fn run(
        &self,
        request: &OverlayRequest,
        logger: &RequestLogger,
    ) -> MediaResult<OverlayOutcome> {
        let started = Instant::now();
        let mut tracker = StageTracker::new(logger);

        logger.log_start(&format!(
            "{} over {} ({}, audio: {})",
            request.overlay_media.display(),
            request.main_media.display(),
            request.position,
            request.audio
        ));

        let result = self.execute(request, logger, &mut tracker).await;
        let audio = request.audio.as_str();

        match &result {
            Ok(outcome) => {
                metrics::counter!("pip_overlay_runs_total", "audio" => audio, "result" => "success")
                    .increment(1);
                metrics::histogram!("pip_overlay_duration_seconds")
                    .record(started.elapsed().as_secs_f64());
                logger.log_completion(&format!(
                    "output saved to {} ({} passes{})",
                    outcome.output_path.display(),
                    outcome.passes,
                    if outcome.cached { ", cached" } else { "" }
                ));
            }
            Err(e) => {
                tracker.fail(e);
                metrics::counter!("pip_overlay_runs_total", "audio" => audio, "result" => e.kind())
                    .increment(1);
            }
        }

        result
    }

    async fn execute(
        &self,
        request: &OverlayRequest,
        logger: &RequestLogger,
        tracker: &mut StageTracker<'_>,
    ) -> MediaResult<OverlayOutcome> {
        // Validating
        let main = self.probe_input(&request.main_media).await?;
        let overlay = self.probe_input(&request.overlay_media).await?;

        // BuildingGraph
        tracker.advance(OverlayStage::BuildingGraph);
        let resolved = resolve_overlay(request, &main, &overlay, &self.options.semantics)?;
        logger.log_progress(&format!(
            "resolved size {} at {},{} for {}s..{}s, {} extra loops",
            resolved.size,
            resolved.position.x,
            resolved.position.y,
            resolved.start,
            resolved.end,
            resolved.loop_count
        ));

        let stamps = [
            input_stamp(&request.main_media).await?,
            input_stamp(&request.overlay_media).await?,
        ];
        let fingerprint = RequestFingerprint::compute(
            request,
            &self.options.semantics,
            &self.options.encoding,
            &stamps,
        )?;
        let output_filename = format!("{}.mp4", fingerprint.file_stem(&self.options.output_prefix));
        let output_path = self.options.output_dir.join(&output_filename);

        ensure_dir(&self.options.output_dir).await?;

        if self.options.reuse_existing_output && output_path.exists() {
            logger.log_progress(&format!("reusing {}", output_path.display()));
            tracker.advance(OverlayStage::Done);
            return Ok(OverlayOutcome {
                output_path,
                resolved,
                fingerprint,
                passes: 0,
                cached: true,
                stage: OverlayStage::Done,
            });
        }

        let scratch_root = self.options.scratch_root();
        ensure_dir(scratch_root).await?;
        let scratch = tempfile::Builder::new()
            .prefix(".pip-")
            .tempdir_in(scratch_root)?;

        let paths = PassPaths::in_dir(scratch.path(), &output_filename);
        let passes = plan_passes(
            &request.main_media,
            &request.overlay_media,
            &resolved,
            request.audio,
            &self.options.encoding,
            &paths,
        );

        // Encoding
        tracker.advance(OverlayStage::Encoding);
        for (index, pass) in passes.iter().enumerate() {
            logger.log_progress(&format!("pass {}/{}: {}", index + 1, passes.len(), pass.kind));
            self.engine.run(&pass.command, main.duration).await?;
            metrics::counter!("pip_engine_passes_total", "kind" => pass.kind.as_str()).increment(1);

            // Later passes read this artifact
            if !pass.command.output().exists() {
                return Err(MediaError::ffmpeg_failed(
                    format!("{} pass produced no output", pass.kind),
                    None,
                    None,
                ));
            }
        }

        // Finalizing
        tracker.advance(OverlayStage::Finalizing);
        move_file(&paths.output, &output_path).await?;
        if let Err(e) = scratch.close() {
            logger.log_warning(&format!("failed to remove scratch directory: {}", e));
        }

        tracker.advance(OverlayStage::Done);
        Ok(OverlayOutcome {
            output_path,
            resolved,
            fingerprint,
            passes: passes.len(),
            cached: false,
            stage: OverlayStage::Done,
        })
    }

    /// Existence check plus probe; every probe failure becomes `ProbeFailed`.
    async fn probe_input(&self, path: &Path) -> MediaResult<MediaInfo> {
        if !path.exists() {
            return Err(MediaError::FileNotFound(path.to_path_buf()));
        }

        match self.engine.probe(path).await {
            Ok(info) => Ok(info),
            Err(e @ MediaError::ProbeFailed { .. }) | Err(e @ MediaError::FileNotFound(_)) => Err(e),
            Err(e) => Err(MediaError::probe_failed(path, e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::FfmpegCommand;
    use async_trait::async_trait;
    use pip_models::{Anchor, AudioOption, OverlayPosition, OverlaySize};
    use std::collections::HashMap;
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// Engine double: probes from a table, writes every output it is asked for.
    struct FakeEngine {
        infos: HashMap<PathBuf, MediaInfo>,
        fail_on_call: Option<usize>,
        calls: Mutex<Vec<FfmpegCommand>>,
    }

    impl FakeEngine {
        fn new(infos: HashMap<PathBuf, MediaInfo>) -> Self {
            Self {
                infos,
                fail_on_call: None,
                calls: Mutex::new(Vec::new()),
            }
        }

        fn failing_on(mut self, call: usize) -> Self {
            self.fail_on_call = Some(call);
            self
        }

        fn calls(&self) -> Vec<FfmpegCommand> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl MediaEngine for FakeEngine {
        async fn probe(&self, path: &Path) -> MediaResult<MediaInfo> {
            self.infos
                .get(path)
                .copied()
                .ok_or_else(|| MediaError::internal("no video stream"))
        }

        async fn run(&self, command: &FfmpegCommand, _expected_secs: f64) -> MediaResult<()> {
            let index = {
                let mut calls = self.calls.lock().unwrap();
                calls.push(command.clone());
                calls.len() - 1
            };
            if self.fail_on_call == Some(index) {
                return Err(MediaError::ffmpeg_failed("exit 1", None, Some(1)));
            }
            std::fs::write(command.output(), b"media")?;
            Ok(())
        }
    }

    struct Fixture {
        dir: TempDir,
        main: PathBuf,
        overlay: PathBuf,
    }

    impl Fixture {
        fn new() -> Self {
            let dir = TempDir::new().unwrap();
            let main = dir.path().join("main.mp4");
            let overlay = dir.path().join("pip.mp4");
            std::fs::write(&main, b"main").unwrap();
            std::fs::write(&overlay, b"overlay").unwrap();
            Self { dir, main, overlay }
        }

        fn output_dir(&self) -> PathBuf {
            self.dir.path().join("output")
        }

        fn engine(&self) -> FakeEngine {
            let mut infos = HashMap::new();
            infos.insert(self.main.clone(), MediaInfo::new(1920, 1080, 30.0));
            infos.insert(self.overlay.clone(), MediaInfo::new(640, 480, 5.0));
            FakeEngine::new(infos)
        }

        fn request(&self) -> OverlayRequest {
            OverlayRequest::new(&self.main, &self.overlay)
                .with_position(OverlayPosition::Anchor(Anchor::RightBottom))
                .with_window(2.0, 0.0)
        }
    }

    fn logger() -> RequestLogger {
        RequestLogger::new("test", "overlay_media")
    }

    #[tokio::test]
    async fn test_single_pass_writes_canonical_output() {
        let fx = Fixture::new();
        let pipeline = OverlayPipeline::new(fx.engine(), OverlayOptions::new(fx.output_dir()));

        let outcome = pipeline.run(&fx.request(), &logger()).await.unwrap();

        assert_eq!(outcome.stage, OverlayStage::Done);
        assert_eq!(outcome.passes, 1);
        assert!(!outcome.cached);
        assert_eq!(outcome.resolved.position.x, 1280);
        assert_eq!(outcome.resolved.position.y, 600);
        assert_eq!(outcome.resolved.end, 7.0);
        assert!(outcome.output_path.exists());
        assert_eq!(outcome.output_path.parent(), Some(fx.output_dir().as_path()));

        let name = outcome.output_path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("pip_"));
        assert!(name.ends_with(".mp4"));

        // Scratch directories are gone, only the output remains
        let entries: Vec<_> = std::fs::read_dir(fx.output_dir()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[tokio::test]
    async fn test_mix_runs_three_passes_in_order() {
        let fx = Fixture::new();
        let pipeline = OverlayPipeline::new(fx.engine(), OverlayOptions::new(fx.output_dir()));
        let request = fx.request().with_audio(AudioOption::Mix);

        let outcome = pipeline.run(&request, &logger()).await.unwrap();
        assert_eq!(outcome.passes, 3);

        let calls = pipeline.engine().calls();
        assert_eq!(calls.len(), 3);
        let mux_inputs: Vec<_> = calls[2].inputs().iter().map(|i| i.path.clone()).collect();
        assert_eq!(mux_inputs[0], calls[0].output().to_path_buf());
        assert_eq!(mux_inputs[1], calls[1].output().to_path_buf());
    }

    #[tokio::test]
    async fn test_failed_pass_keeps_previous_output() {
        let fx = Fixture::new();
        let request = fx.request().with_audio(AudioOption::Overlay);

        let first = OverlayPipeline::new(fx.engine(), OverlayOptions::new(fx.output_dir()))
            .run(&request, &logger())
            .await
            .unwrap();
        let previous = std::fs::read(&first.output_path).unwrap();

        let failing = OverlayPipeline::new(
            fx.engine().failing_on(2),
            OverlayOptions::new(fx.output_dir()),
        );
        let err = failing.run(&request, &logger()).await.unwrap_err();
        assert!(matches!(err, MediaError::FfmpegFailed { .. }));

        assert_eq!(std::fs::read(&first.output_path).unwrap(), previous);
        let entries: Vec<_> = std::fs::read_dir(fx.output_dir()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[tokio::test]
    async fn test_reuse_existing_output() {
        let fx = Fixture::new();
        let options = OverlayOptions::new(fx.output_dir()).with_reuse_existing_output(true);
        let pipeline = OverlayPipeline::new(fx.engine(), options);

        let first = pipeline.run(&fx.request(), &logger()).await.unwrap();
        let second = pipeline.run(&fx.request(), &logger()).await.unwrap();

        assert!(!first.cached);
        assert!(second.cached);
        assert_eq!(second.passes, 0);
        assert_eq!(first.output_path, second.output_path);
        assert_eq!(pipeline.engine().calls().len(), 1);
    }

    #[tokio::test]
    async fn test_missing_input_fails_before_engine() {
        let fx = Fixture::new();
        let pipeline = OverlayPipeline::new(fx.engine(), OverlayOptions::new(fx.output_dir()));
        let request = OverlayRequest::new(fx.dir.path().join("absent.mp4"), &fx.overlay);

        let err = pipeline.run(&request, &logger()).await.unwrap_err();
        assert!(matches!(err, MediaError::FileNotFound(_)));
        assert!(pipeline.engine().calls().is_empty());
    }

    #[tokio::test]
    async fn test_unprobeable_input_is_probe_failure() {
        let fx = Fixture::new();
        let mut engine = fx.engine();
        engine.infos.remove(&fx.overlay);
        let pipeline = OverlayPipeline::new(engine, OverlayOptions::new(fx.output_dir()));

        let err = pipeline.run(&fx.request(), &logger()).await.unwrap_err();
        assert!(matches!(err, MediaError::ProbeFailed { .. }));
    }

    #[tokio::test]
    async fn test_invalid_parameters_produce_no_engine_calls() {
        let fx = Fixture::new();
        let pipeline = OverlayPipeline::new(fx.engine(), OverlayOptions::new(fx.output_dir()));

        let degenerate = fx.request().with_size(OverlaySize::Explicit {
            width: 0,
            height: 100,
        });
        let err = pipeline.run(&degenerate, &logger()).await.unwrap_err();
        assert!(matches!(err, MediaError::InvalidSize(_)));

        let late = fx.request().with_window(40.0, 0.0);
        let err = pipeline.run(&late, &logger()).await.unwrap_err();
        assert!(matches!(err, MediaError::InvalidTimeWindow(_)));

        assert!(pipeline.engine().calls().is_empty());
    }

    #[tokio::test]
    async fn test_resolve_only() {
        let fx = Fixture::new();
        let pipeline = OverlayPipeline::new(fx.engine(), OverlayOptions::new(fx.output_dir()));

        let resolution = pipeline.resolve(&fx.request()).await.unwrap();
        assert_eq!(resolution.main.width, 1920);
        assert_eq!(resolution.resolved.size.width, 640);
        assert!(pipeline.engine().calls().is_empty());
        assert!(!fx.output_dir().exists());
    }
}
