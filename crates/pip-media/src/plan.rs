//! Engine pass planning.
//!
//! Turns a resolved overlay into the ordered FFmpeg invocations that produce
//! the output. `none` and `main` need a single pass; `overlay` and `mix`
//! render video, then audio, then mux the two intermediates.

use std::fmt;
use std::path::{Path, PathBuf};

use pip_models::{AudioOption, EncodingConfig, ResolvedOverlay};

use crate::command::FfmpegCommand;
use crate::filters::{audio_mix_graph, map_label, overlay_video_graph, AUDIO_OUT, VIDEO_OUT};

/// Intermediate video-only artifact name.
pub const VIDEO_ONLY_FILENAME: &str = "pip_video.mp4";
/// Intermediate audio-only artifact name.
pub const AUDIO_ONLY_FILENAME: &str = "pip_audio.aac";

/// Which step of the sequence a pass performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PassKind {
    /// Composite video (and, for `main`, the main audio) straight to the output
    Composite,
    /// Composite video only, to an intermediate
    VideoOnly,
    /// Mixed audio only, to an intermediate
    AudioMix,
    /// Combine the two intermediates
    Mux,
}

impl PassKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PassKind::Composite => "composite",
            PassKind::VideoOnly => "video_only",
            PassKind::AudioMix => "audio_mix",
            PassKind::Mux => "mux",
        }
    }
}

impl fmt::Display for PassKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One engine invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct EnginePass {
    pub kind: PassKind,
    pub command: FfmpegCommand,
}

/// Where each pass writes.
#[derive(Debug, Clone, PartialEq)]
pub struct PassPaths {
    pub output: PathBuf,
    pub video_only: PathBuf,
    pub audio_only: PathBuf,
}

impl PassPaths {
    /// Output plus intermediates inside `scratch_dir`.
    pub fn in_dir(scratch_dir: &Path, output_filename: &str) -> Self {
        Self {
            output: scratch_dir.join(output_filename),
            video_only: scratch_dir.join(VIDEO_ONLY_FILENAME),
            audio_only: scratch_dir.join(AUDIO_ONLY_FILENAME),
        }
    }
}

/// Plan the passes for an overlay.
pub fn plan_passes(
    main_media: &Path,
    overlay_media: &Path,
    resolved: &ResolvedOverlay,
    audio: AudioOption,
    encoding: &EncodingConfig,
    paths: &PassPaths,
) -> Vec<EnginePass> {
    let video_graph = overlay_video_graph(resolved).render();
    let composite = |output: &Path| {
        FfmpegCommand::new(output)
            .input(main_media)
            .looped_input(overlay_media, resolved.loop_count)
            .filter_complex(video_graph.clone())
            .map(map_label(VIDEO_OUT))
    };

    match audio {
        AudioOption::None => vec![EnginePass {
            kind: PassKind::Composite,
            command: composite(&paths.output)
                .output_args(encoding.video_args())
                .no_audio(),
        }],
        AudioOption::Main => vec![EnginePass {
            kind: PassKind::Composite,
            // Main audio is stream-copied untouched; a silent main yields no audio
            command: composite(&paths.output)
                .map("0:a?")
                .output_args(encoding.video_args())
                .audio_codec("copy"),
        }],
        AudioOption::Overlay | AudioOption::Mix => {
            let main_volume = audio.main_volume().unwrap_or(1);

            let video = EnginePass {
                kind: PassKind::VideoOnly,
                command: composite(&paths.video_only)
                    .output_args(encoding.video_args())
                    .no_audio(),
            };

            let mixed = EnginePass {
                kind: PassKind::AudioMix,
                command: FfmpegCommand::new(&paths.audio_only)
                    .input(main_media)
                    .input(overlay_media)
                    .filter_complex(audio_mix_graph(resolved, main_volume).render())
                    .map(map_label(AUDIO_OUT))
                    .output_args(encoding.audio_args()),
            };

            let mux = EnginePass {
                kind: PassKind::Mux,
                command: FfmpegCommand::new(&paths.output)
                    .input(&paths.video_only)
                    .input(&paths.audio_only)
                    .map("0:v")
                    .map("1:a")
                    .output_args(encoding.video_args())
                    .output_args(encoding.audio_args()),
            };

            vec![video, mixed, mux]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pip_models::{FrameSize, PixelPosition};

    fn resolved(loop_count: u32) -> ResolvedOverlay {
        ResolvedOverlay {
            size: FrameSize::new(640, 480),
            position: PixelPosition::new(1280, 600),
            start: 2.0,
            end: 7.0,
            loop_count,
        }
    }

    fn plan(audio: AudioOption, loop_count: u32) -> Vec<EnginePass> {
        let paths = PassPaths::in_dir(Path::new("/scratch"), "pip_out.mp4");
        plan_passes(
            Path::new("/in/main.mp4"),
            Path::new("/in/pip.mp4"),
            &resolved(loop_count),
            audio,
            &EncodingConfig::default(),
            &paths,
        )
    }

    #[test]
    fn test_none_is_single_silent_pass() {
        let passes = plan(AudioOption::None, 0);
        assert_eq!(passes.len(), 1);
        let cmd = &passes[0].command;
        assert_eq!(passes[0].kind, PassKind::Composite);
        assert!(cmd.has_output_arg("-an"));
        assert_eq!(cmd.output_value("-map"), Some("[vout]"));
        assert_eq!(cmd.output(), Path::new("/scratch/pip_out.mp4"));
    }

    #[test]
    fn test_main_copies_main_audio() {
        let passes = plan(AudioOption::Main, 0);
        assert_eq!(passes.len(), 1);
        let args = passes[0].command.build_args();
        assert!(args.windows(2).any(|w| w[0] == "-map" && w[1] == "0:a?"));
        assert_eq!(passes[0].command.output_value("-c:a"), Some("copy"));
        assert_eq!(passes[0].command.output_value("-c:v"), Some("libx264"));
        assert!(!passes[0].command.has_output_arg("-an"));
    }

    #[test]
    fn test_loop_count_becomes_stream_loop() {
        let passes = plan(AudioOption::Main, 3);
        let inputs = passes[0].command.inputs();
        assert!(inputs[0].args.is_empty());
        assert_eq!(inputs[1].args, vec!["-stream_loop", "3"]);
        assert_eq!(inputs[1].path, Path::new("/in/pip.mp4"));
    }

    #[test]
    fn test_mix_is_three_ordered_passes() {
        let passes = plan(AudioOption::Mix, 0);
        let kinds: Vec<_> = passes.iter().map(|p| p.kind).collect();
        assert_eq!(kinds, vec![PassKind::VideoOnly, PassKind::AudioMix, PassKind::Mux]);

        assert_eq!(passes[0].command.output(), Path::new("/scratch/pip_video.mp4"));
        assert_eq!(passes[1].command.output(), Path::new("/scratch/pip_audio.aac"));
        assert!(passes[1]
            .command
            .output_value("-filter_complex")
            .unwrap()
            .contains("volume=1[main_a]"));

        let mux_inputs: Vec<_> = passes[2].command.inputs().iter().map(|i| i.path.clone()).collect();
        assert_eq!(
            mux_inputs,
            vec![PathBuf::from("/scratch/pip_video.mp4"), PathBuf::from("/scratch/pip_audio.aac")]
        );
        assert_eq!(passes[2].command.output(), Path::new("/scratch/pip_out.mp4"));
    }

    #[test]
    fn test_overlay_mutes_main_in_window() {
        let passes = plan(AudioOption::Overlay, 0);
        let graph = passes[1].command.output_value("-filter_complex").unwrap();
        assert!(graph.contains("volume=0[main_a]"));
        assert!(graph.contains("duration=first"));
    }
}
