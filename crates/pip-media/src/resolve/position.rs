//! Overlay pixel position.

use pip_models::{Anchor, FrameSize, OverlayPosition, PixelPosition};

use crate::error::{MediaError, MediaResult};

/// Top-left pixel coordinates for `position` on a `main` frame.
///
/// Anchors subtract the overlay's resolved size on the right/bottom edges,
/// so an overlay larger than the frame gets a negative offset and stays
/// aligned to that edge. Literal
/// coordinates must satisfy `0 <= x <= main width` and
/// `0 <= y <= main height`; they are not checked against the overlay size.
pub fn resolve_position(
    position: OverlayPosition,
    main: FrameSize,
    overlay: FrameSize,
) -> MediaResult<PixelPosition> {
    let right = i64::from(main.width) - i64::from(overlay.width);
    let bottom = i64::from(main.height) - i64::from(overlay.height);

    match position {
        OverlayPosition::Anchor(Anchor::LeftTop) => Ok(PixelPosition::new(0, 0)),
        OverlayPosition::Anchor(Anchor::LeftBottom) => Ok(PixelPosition::new(0, bottom)),
        OverlayPosition::Anchor(Anchor::RightTop) => Ok(PixelPosition::new(right, 0)),
        OverlayPosition::Anchor(Anchor::RightBottom) => Ok(PixelPosition::new(right, bottom)),
        OverlayPosition::Custom { x, y } => {
            let in_range = (0..=i64::from(main.width)).contains(&x)
                && (0..=i64::from(main.height)).contains(&y);
            if !in_range {
                return Err(MediaError::invalid_position(format!(
                    "custom coordinates {},{} are out of the main video's {} range",
                    x, y, main
                )));
            }
            Ok(PixelPosition::new(x, y))
        }
    }
}

/// Parse a host position token and resolve it.
pub fn resolve_position_token(
    token: &str,
    main: FrameSize,
    overlay: FrameSize,
) -> MediaResult<PixelPosition> {
    let position: OverlayPosition = token.parse()?;
    resolve_position(position, main, overlay)
}
