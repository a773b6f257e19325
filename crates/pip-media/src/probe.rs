//! FFprobe media information.

use serde::Deserialize;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, warn};

use pip_models::MediaInfo;

use crate::command::check_ffprobe;
use crate::error::{MediaError, MediaResult};

/// FFprobe JSON output format.
#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    #[serde(default)]
    format: Option<FfprobeFormat>,
    #[serde(default)]
    streams: Vec<FfprobeStream>,
}

#[derive(Debug, Deserialize)]
struct FfprobeFormat {
    duration: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    codec_type: Option<String>,
    codec_name: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    duration: Option<String>,
}

/// Probe a media file for the dimensions and duration of its first video stream.
///
/// Stream duration is preferred; containers that only record a duration at
/// the format level (mkv, webm) fall back to it. Missing or zero fields are
/// a probe failure, never a partial result.
pub async fn probe_media_info(path: impl AsRef<Path>) -> MediaResult<MediaInfo> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(MediaError::FileNotFound(path.to_path_buf()));
    }

    check_ffprobe()?;

    let output = Command::new("ffprobe")
        .args([
            "-v",
            "quiet",
            "-print_format",
            "json",
            "-show_format",
            "-show_streams",
        ])
        .arg(path)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(MediaError::probe_failed(
            path,
            format!("ffprobe exited with {:?}: {}", output.status.code(), stderr.trim()),
        ));
    }

    parse_probe_output(path, &output.stdout)
}

/// Probe, converting any failure into "no info".
pub async fn try_probe_media_info(path: impl AsRef<Path>) -> Option<MediaInfo> {
    let path = path.as_ref();
    match probe_media_info(path).await {
        Ok(info) => Some(info),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Media probe failed");
            None
        }
    }
}

/// Extract `MediaInfo` from raw ffprobe JSON.
pub(crate) fn parse_probe_output(path: &Path, stdout: &[u8]) -> MediaResult<MediaInfo> {
    let probe: FfprobeOutput = serde_json::from_slice(stdout)?;

    let stream = probe
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
        .ok_or_else(|| MediaError::probe_failed(path, "no video stream found"))?;

    debug!(
        path = %path.display(),
        codec = ?stream.codec_name,
        width = ?stream.width,
        height = ?stream.height,
        duration = ?stream.duration,
        "Probed video stream"
    );

    let width = stream
        .width
        .filter(|w| *w > 0)
        .ok_or_else(|| MediaError::probe_failed(path, "video stream has no width"))?;
    let height = stream
        .height
        .filter(|h| *h > 0)
        .ok_or_else(|| MediaError::probe_failed(path, "video stream has no height"))?;

    let duration = stream
        .duration
        .as_deref()
        .and_then(parse_duration)
        .or_else(|| {
            probe
                .format
                .as_ref()
                .and_then(|f| f.duration.as_deref())
                .and_then(parse_duration)
        })
        .ok_or_else(|| MediaError::probe_failed(path, "no duration reported"))?;

    Ok(MediaInfo::new(width, height, duration))
}

fn parse_duration(s: &str) -> Option<f64> {
    s.trim()
        .parse::<f64>()
        .ok()
        .filter(|d| d.is_finite() && *d >= 0.0)
}
