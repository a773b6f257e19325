//! Parameter resolution.
//!
//! Pure functions turning an [`OverlayRequest`] and the two probed inputs
//! into a [`ResolvedOverlay`]: timing first, then size, then position (the
//! anchors depend on the resolved size).

pub mod position;
pub mod size;
pub mod timing;

use pip_models::{MediaInfo, OverlayRequest, ResolveSemantics, ResolvedOverlay};

use crate::error::MediaResult;

pub use position::{resolve_position, resolve_position_token};
pub use size::{fit_within, resolve_size};
pub use timing::{loop_count, resolve_timing, TimeWindow};

/// Resolve every overlay parameter for a request.
pub fn resolve_overlay(
    request: &OverlayRequest,
    main: &MediaInfo,
    overlay: &MediaInfo,
    semantics: &ResolveSemantics,
) -> MediaResult<ResolvedOverlay> {
    let window = resolve_timing(
        request.start,
        request.end,
        main.duration,
        overlay.duration,
        semantics.end_time_mode,
    )?;

    let size = resolve_size(
        request.size,
        semantics.size_mode,
        overlay.frame_size(),
        main.frame_size(),
    )?;

    let position = resolve_position(request.position, main.frame_size(), size)?;

    Ok(ResolvedOverlay {
        size,
        position,
        start: window.start,
        end: window.end,
        loop_count: window.loop_count,
    })
}
