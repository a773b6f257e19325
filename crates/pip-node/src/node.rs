//! Node operations exposed to the host pipeline editor.
//!
//! `load_media` and `list_media` serve the upload picker, `overlay_media`
//! composes one picture-in-picture output. Failures of `overlay_media` are
//! logged and reported as an absent output.

use std::path::{Path, PathBuf};

use tokio::sync::watch;
use tracing::info;

use pip_media::{
    list_media_files, strip_path, FfmpegEngine, MediaEngine, MediaError, OverlayOutcome,
    OverlayPipeline, RequestLogger, Resolution,
};
use pip_models::{AudioOption, OverlayPosition, OverlayRequest, OverlaySize};

use crate::config::NodeConfig;
use crate::error::{NodeError, NodeResult};

/// Host directory an annotated name refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaDir {
    Input,
    Output,
    Temp,
}

impl MediaDir {
    fn annotation(&self) -> &'static str {
        match self {
            MediaDir::Input => "[input]",
            MediaDir::Output => "[output]",
            MediaDir::Temp => "[temp]",
        }
    }
}

/// Split `"clip.mp4 [output]"` into the name and the directory it lives in.
///
/// Names without an annotation refer to the input directory.
pub fn parse_annotated(name: &str) -> (&str, MediaDir) {
    for dir in [MediaDir::Input, MediaDir::Output, MediaDir::Temp] {
        if let Some(stem) = name.strip_suffix(dir.annotation()) {
            return (stem.trim_end(), dir);
        }
    }
    (name, MediaDir::Input)
}

/// Scalar inputs as the host delivers them.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayInputs {
    pub main_media: String,
    pub overlay_media: String,
    pub overlay_position: String,
    pub overlaysize_width: i64,
    pub overlaysize_height: i64,
    pub start: f64,
    pub end: f64,
    pub audio_option: String,
}

impl OverlayInputs {
    pub fn new(main_media: impl Into<String>, overlay_media: impl Into<String>) -> Self {
        Self {
            main_media: main_media.into(),
            overlay_media: overlay_media.into(),
            overlay_position: "left-top".to_string(),
            overlaysize_width: 0,
            overlaysize_height: 0,
            start: 0.0,
            end: 0.0,
            audio_option: AudioOption::Main.as_str().to_string(),
        }
    }

    /// Both media paths exist; checked before any scalar is parsed.
    pub fn ensure_media_exist(&self) -> NodeResult<()> {
        for media in [&self.main_media, &self.overlay_media] {
            let path = Path::new(strip_path(media));
            if !path.exists() {
                return Err(MediaError::FileNotFound(path.to_path_buf()).into());
            }
        }
        Ok(())
    }

    /// Parse the host scalars into a typed request.
    pub fn to_request(&self) -> NodeResult<OverlayRequest> {
        let position: OverlayPosition = self.overlay_position.parse()?;
        let size = OverlaySize::from_dimensions(self.overlaysize_width, self.overlaysize_height)?;
        let audio: AudioOption = self.audio_option.parse()?;

        Ok(OverlayRequest::new(
            strip_path(&self.main_media),
            strip_path(&self.overlay_media),
        )
        .with_position(position)
        .with_size(size)
        .with_window(self.start, self.end)
        .with_audio(audio))
    }
}

/// Picture-in-picture node.
pub struct PipNode<E> {
    config: NodeConfig,
    pipeline: OverlayPipeline<E>,
}

impl PipNode<FfmpegEngine> {
    /// Node backed by the FFmpeg CLI.
    pub fn new(config: NodeConfig) -> Self {
        let engine = Self::ffmpeg_engine(&config);
        Self::with_engine(config, engine)
    }

    /// Node whose running FFmpeg invocation is killed once `cancel_rx`
    /// reads `true`.
    pub fn cancellable(config: NodeConfig, cancel_rx: watch::Receiver<bool>) -> Self {
        let engine = Self::ffmpeg_engine(&config).with_cancel(cancel_rx);
        Self::with_engine(config, engine)
    }

    fn ffmpeg_engine(config: &NodeConfig) -> FfmpegEngine {
        match config.ffmpeg_timeout {
            Some(timeout) => FfmpegEngine::new().with_timeout(timeout.as_secs()),
            None => FfmpegEngine::new(),
        }
    }
}

impl<E: MediaEngine> PipNode<E> {
    pub fn with_engine(config: NodeConfig, engine: E) -> Self {
        let pipeline = OverlayPipeline::new(engine, config.overlay_options());
        Self { config, pipeline }
    }

    pub fn config(&self) -> &NodeConfig {
        &self.config
    }

    fn dir(&self, dir: MediaDir) -> &Path {
        match dir {
            MediaDir::Input => &self.config.input_dir,
            MediaDir::Output => &self.config.output_dir,
            MediaDir::Temp => &self.config.temp_dir,
        }
    }

    /// Resolve a (possibly quoted or annotated) media name to an absolute path.
    pub fn load_media(&self, name: &str) -> NodeResult<PathBuf> {
        let (file_name, dir) = parse_annotated(strip_path(name));

        let candidate = Path::new(file_name);
        let is_plain = !file_name.is_empty()
            && candidate.components().count() == 1
            && candidate.file_name().is_some();
        if !is_plain {
            return Err(NodeError::invalid_media_name(name));
        }

        let path = self.dir(dir).join(file_name);
        if !path.is_file() {
            return Err(NodeError::MediaNotFound(path));
        }

        Ok(std::path::absolute(&path)?)
    }

    /// Media files available in the input directory, sorted by name.
    pub async fn list_media(&self) -> NodeResult<Vec<String>> {
        Ok(list_media_files(&self.config.input_dir).await?)
    }

    /// Probe and resolve without encoding.
    pub async fn resolve(&self, inputs: &OverlayInputs) -> NodeResult<Resolution> {
        inputs.ensure_media_exist()?;
        let request = inputs.to_request()?;
        Ok(self.pipeline.resolve(&request).await?)
    }

    /// Compose an overlay, surfacing the failure cause.
    pub async fn try_overlay_media(
        &self,
        inputs: &OverlayInputs,
        logger: &RequestLogger,
    ) -> NodeResult<OverlayOutcome> {
        inputs.ensure_media_exist()?;
        let request = inputs.to_request()?;
        Ok(self.pipeline.run(&request, logger).await?)
    }

    /// Compose an overlay; `None` when no valid output was produced.
    pub async fn overlay_media(&self, inputs: &OverlayInputs) -> Option<PathBuf> {
        let logger = RequestLogger::generate("overlay_media");

        match self.try_overlay_media(inputs, &logger).await {
            Ok(outcome) => {
                info!(
                    request_id = logger.request_id(),
                    output = %outcome.output_path.display(),
                    "Overlay output ready"
                );
                Some(outcome.output_path)
            }
            Err(e) => {
                logger.log_error(&format!("no output produced: {}", e));
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pip_models::{Anchor, ModelError};
    use tempfile::TempDir;

    fn node(dir: &TempDir) -> PipNode<FfmpegEngine> {
        let config = NodeConfig {
            input_dir: dir.path().join("input"),
            output_dir: dir.path().join("output"),
            temp_dir: dir.path().join("temp"),
            ..NodeConfig::default()
        };
        std::fs::create_dir_all(&config.input_dir).unwrap();
        std::fs::create_dir_all(&config.output_dir).unwrap();
        PipNode::new(config)
    }

    #[test]
    fn test_parse_annotated() {
        assert_eq!(parse_annotated("a.mp4"), ("a.mp4", MediaDir::Input));
        assert_eq!(parse_annotated("a.mp4 [input]"), ("a.mp4", MediaDir::Input));
        assert_eq!(parse_annotated("a.mp4 [output]"), ("a.mp4", MediaDir::Output));
        assert_eq!(parse_annotated("a.mp4[temp]"), ("a.mp4", MediaDir::Temp));
    }

    #[test]
    fn test_load_media_resolves_directories() {
        let dir = TempDir::new().unwrap();
        let node = node(&dir);
        std::fs::write(dir.path().join("input/main.mp4"), b"x").unwrap();
        std::fs::write(dir.path().join("output/done.mp4"), b"x").unwrap();

        let loaded = node.load_media("  \"main.mp4\" ").unwrap();
        assert!(loaded.is_absolute());
        assert!(loaded.ends_with("input/main.mp4"));

        let loaded = node.load_media("done.mp4 [output]").unwrap();
        assert!(loaded.ends_with("output/done.mp4"));
    }

    #[test]
    fn test_load_media_rejects_bad_names() {
        let dir = TempDir::new().unwrap();
        let node = node(&dir);

        assert!(matches!(
            node.load_media("../secret.mp4"),
            Err(NodeError::InvalidMediaName(_))
        ));
        assert!(matches!(node.load_media(""), Err(NodeError::InvalidMediaName(_))));
        assert!(matches!(
            node.load_media("missing.mp4"),
            Err(NodeError::MediaNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_list_media_filters_and_sorts() {
        let dir = TempDir::new().unwrap();
        let node = node(&dir);
        for name in ["b.MP4", "a.webm", "notes.txt", "c.gif"] {
            std::fs::write(dir.path().join("input").join(name), b"x").unwrap();
        }
        std::fs::create_dir(dir.path().join("input/folder.mp4")).unwrap();

        let files = node.list_media().await.unwrap();
        assert_eq!(files, vec!["a.webm", "b.MP4", "c.gif"]);
    }

    #[test]
    fn test_inputs_to_request() {
        let mut inputs = OverlayInputs::new("\"/m/main.mp4\"", "/m/pip.mp4");
        inputs.overlay_position = "right-bottom".to_string();
        inputs.start = 2.0;
        inputs.audio_option = "mix".to_string();

        let request = inputs.to_request().unwrap();
        assert_eq!(request.main_media, PathBuf::from("/m/main.mp4"));
        assert_eq!(request.position, OverlayPosition::Anchor(Anchor::RightBottom));
        assert_eq!(request.size, OverlaySize::Auto);
        assert_eq!(request.audio, AudioOption::Mix);
    }

    #[test]
    fn test_inputs_rejected_before_engine() {
        let mut inputs = OverlayInputs::new("main.mp4", "pip.mp4");
        inputs.audio_option = "stereo".to_string();
        assert!(matches!(
            inputs.to_request(),
            Err(NodeError::InvalidInput(ModelError::UnsupportedAudioOption(_)))
        ));

        let mut inputs = OverlayInputs::new("main.mp4", "pip.mp4");
        inputs.overlay_position = "center".to_string();
        assert!(matches!(
            inputs.to_request(),
            Err(NodeError::InvalidInput(ModelError::InvalidPositionFormat(_)))
        ));
    }

    #[tokio::test]
    async fn test_missing_file_reported_before_bad_scalars() {
        let dir = TempDir::new().unwrap();
        let node = node(&dir);
        let mut inputs = OverlayInputs::new(
            dir.path().join("input/absent.mp4").display().to_string(),
            dir.path().join("input/also_absent.mp4").display().to_string(),
        );
        inputs.audio_option = "stereo".to_string();
        inputs.overlay_position = "center".to_string();

        let logger = RequestLogger::new("test", "overlay_media");
        assert!(matches!(
            node.try_overlay_media(&inputs, &logger).await,
            Err(NodeError::Media(MediaError::FileNotFound(_)))
        ));
        assert!(matches!(
            node.resolve(&inputs).await,
            Err(NodeError::Media(MediaError::FileNotFound(_)))
        ));
    }

    #[tokio::test]
    async fn test_overlay_media_missing_input_yields_none() {
        let dir = TempDir::new().unwrap();
        let node = node(&dir);
        let inputs = OverlayInputs::new(
            dir.path().join("input/absent.mp4").display().to_string(),
            dir.path().join("input/also_absent.mp4").display().to_string(),
        );

        assert!(node.overlay_media(&inputs).await.is_none());
    }
}
