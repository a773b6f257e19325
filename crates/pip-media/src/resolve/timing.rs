//! Overlay time window and loop count.

use pip_models::EndTimeMode;

use crate::error::{MediaError, MediaResult};

/// Effective overlay window on the main timeline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeWindow {
    pub start: f64,
    pub end: f64,
    pub loop_count: u32,
}

/// Resolve the effective window for a request.
///
/// An explicit `end > 0` is clamped to the main duration. `end == 0` is
/// derived per `mode`. The window must satisfy
/// `0 <= start < end <= main_duration`.
pub fn resolve_timing(
    start: f64,
    end: f64,
    main_duration: f64,
    overlay_duration: f64,
    mode: EndTimeMode,
) -> MediaResult<TimeWindow> {
    if !start.is_finite() || !end.is_finite() || start < 0.0 || end < 0.0 {
        return Err(MediaError::invalid_time_window(format!(
            "start ({}) and end ({}) must be non-negative seconds",
            start, end
        )));
    }

    let effective_end = if end > 0.0 {
        end.min(main_duration)
    } else {
        match mode {
            EndTimeMode::OverlayDuration => (start + overlay_duration).min(main_duration),
            EndTimeMode::MainDuration => main_duration,
        }
    };

    if start >= main_duration {
        return Err(MediaError::invalid_time_window(format!(
            "overlay start {}s exceeds main video length {}s",
            start, main_duration
        )));
    }
    if start >= effective_end {
        return Err(MediaError::invalid_time_window(format!(
            "start {}s is not before end {}s",
            start, effective_end
        )));
    }

    Ok(TimeWindow {
        start,
        end: effective_end,
        loop_count: loop_count(effective_end - start, overlay_duration),
    })
}

/// Additional repetitions of an overlay clip for a window of `span` seconds.
///
/// `floor(span / overlay_duration)` when the span is longer than one clip,
/// else 0. The clip then plays `loop_count + 1` times, which always covers
/// the span; the time-gate trims the excess.
pub fn loop_count(span: f64, overlay_duration: f64) -> u32 {
    if overlay_duration > 0.0 && span > overlay_duration {
        let loops = (span / overlay_duration).floor();
        if loops >= f64::from(u32::MAX) {
            u32::MAX
        } else {
            loops as u32
        }
    } else {
        0
    }
}
