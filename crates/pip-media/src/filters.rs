//! FFmpeg filter graph construction.
//!
//! Graphs refer to inputs by index: `0` is the main media, `1` the overlay.

use pip_models::ResolvedOverlay;

/// Label of the composed video stream.
pub const VIDEO_OUT: &str = "vout";
/// Label of the mixed audio stream.
pub const AUDIO_OUT: &str = "aout";

/// A `-filter_complex` graph built chain by chain.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterGraph {
    chains: Vec<String>,
}

impl FilterGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a `[in]filter,filter[out]` chain.
    pub fn chain(mut self, chain: impl Into<String>) -> Self {
        self.chains.push(chain.into());
        self
    }

    pub fn render(&self) -> String {
        self.chains.join(";")
    }
}

/// Seconds as a compact filter argument (`2`, `7.5`, `0.333`).
pub fn format_seconds(secs: f64) -> String {
    let s = format!("{:.3}", secs);
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s.is_empty() || s == "-" {
        "0".to_string()
    } else {
        s.to_string()
    }
}

/// Time-gate expression, inclusive at both ends.
pub fn time_gate(start: f64, end: f64) -> String {
    format!("between(t,{},{})", format_seconds(start), format_seconds(end))
}

/// Scale and shift the overlay, then composite it onto the main video while
/// the time-gate is open. Outside the window the overlay is not drawn.
pub fn overlay_video_graph(resolved: &ResolvedOverlay) -> FilterGraph {
    let start = format_seconds(resolved.start);
    FilterGraph::new()
        .chain(format!(
            "[1:v]scale={}:{},setpts=PTS-STARTPTS+{}/TB[ovl]",
            resolved.size.width, resolved.size.height, start
        ))
        .chain(format!(
            "[0:v][ovl]overlay=x={}:y={}:enable='{}'[{}]",
            resolved.position.x,
            resolved.position.y,
            time_gate(resolved.start, resolved.end),
            VIDEO_OUT
        ))
}

/// Mix the main track (at `main_volume` during the window) with the
/// overlay's audio trimmed to the window and delayed to its start. The mix
/// lasts as long as the main track.
pub fn audio_mix_graph(resolved: &ResolvedOverlay, main_volume: u8) -> FilterGraph {
    let delay_ms = (resolved.start * 1000.0).floor() as u64;
    FilterGraph::new()
        .chain(format!(
            "[0:a]volume=enable='{}':volume={}[main_a]",
            time_gate(resolved.start, resolved.end),
            main_volume
        ))
        .chain(format!(
            "[1:a]atrim=start=0:end={},adelay={}|{}[ovl_a]",
            format_seconds(resolved.window()),
            delay_ms,
            delay_ms
        ))
        .chain(format!(
            "[main_a][ovl_a]amix=inputs=2:duration=first:dropout_transition=2[{}]",
            AUDIO_OUT
        ))
}

/// `[label]` form used with `-map`.
pub fn map_label(label: &str) -> String {
    format!("[{}]", label)
}
