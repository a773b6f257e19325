//! Target overlay size.

use pip_models::{FrameSize, OverlaySize, SizeMode};

use crate::error::{MediaError, MediaResult};

/// Fit `overlay` inside `bound`, preserving aspect ratio.
///
/// Sizes that already fit are returned unchanged (no upscaling). Otherwise
/// the overlay is scaled so one axis matches the bound; the derived axis is
/// truncated, never rounded. Integer arithmetic keeps the truncation exact.
pub fn fit_within(overlay: FrameSize, bound: FrameSize) -> MediaResult<FrameSize> {
    if overlay.width == 0 || overlay.height == 0 {
        return Err(MediaError::invalid_size(format!(
            "overlay dimensions {} are degenerate",
            overlay
        )));
    }
    if bound.width == 0 || bound.height == 0 {
        return Err(MediaError::invalid_size(format!(
            "bounding box {} is degenerate",
            bound
        )));
    }

    if overlay.fits_within(bound) {
        return Ok(overlay);
    }

    let (ow, oh) = (u64::from(overlay.width), u64::from(overlay.height));
    let (bw, bh) = (u64::from(bound.width), u64::from(bound.height));

    // Height when the width is pinned to the bound: bw / (ow / oh)
    let size = if bw * oh <= bh * ow {
        FrameSize::new(bound.width, derived(bw * oh / ow))
    } else {
        FrameSize::new(derived(bh * ow / oh), bound.height)
    };

    Ok(size)
}

/// Truncated dimension, kept at least one pixel for extreme aspect ratios.
fn derived(value: u64) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX).max(1)
}

/// Render size for a request.
///
/// `Auto` fits the overlay into the main frame. Explicit sizes are used
/// verbatim under `SizeMode::Exact` and as a bounding box under
/// `SizeMode::FitWithin`.
pub fn resolve_size(
    requested: OverlaySize,
    mode: SizeMode,
    overlay: FrameSize,
    main: FrameSize,
) -> MediaResult<FrameSize> {
    match (requested, mode) {
        (OverlaySize::Auto, _) => fit_within(overlay, main),
        (OverlaySize::Explicit { width, height }, _) if width == 0 || height == 0 => Err(
            MediaError::invalid_size(format!("requested size {}x{} is degenerate", width, height)),
        ),
        (OverlaySize::Explicit { width, height }, SizeMode::Exact) => Ok(FrameSize::new(width, height)),
        (OverlaySize::Explicit { width, height }, SizeMode::FitWithin) => {
            fit_within(overlay, FrameSize::new(width, height))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAIN: FrameSize = FrameSize { width: 1920, height: 1080 };

    #[test]
    fn test_fitting_overlay_is_unchanged() {
        for (w, h) in [(640, 480), (1920, 1080), (1, 1), (1920, 10), (10, 1080)] {
            let overlay = FrameSize::new(w, h);
            assert_eq!(fit_within(overlay, MAIN).unwrap(), overlay);
        }
    }

    #[test]
    fn test_wide_overlay_pins_width() {
        // 3840x1080 -> aspect 3.55, width-bound
        let size = fit_within(FrameSize::new(3840, 1080), MAIN).unwrap();
        assert_eq!(size, FrameSize::new(1920, 540));
    }

    #[test]
    fn test_tall_overlay_pins_height() {
        let size = fit_within(FrameSize::new(1080, 1920), MAIN).unwrap();
        assert_eq!(size, FrameSize::new(607, 1080)); // 1080 * 1080 / 1920 = 607.5
    }

    #[test]
    fn test_same_aspect_downscale_is_exact() {
        let size = fit_within(FrameSize::new(3840, 2160), MAIN).unwrap();
        assert_eq!(size, MAIN);
    }

    #[test]
    fn test_oversized_results_fit_and_keep_aspect() {
        let cases = [(2000, 1500), (5000, 400), (333, 4000), (1921, 1081), (4096, 2160)];
        for (w, h) in cases {
            let overlay = FrameSize::new(w, h);
            let size = fit_within(overlay, MAIN).unwrap();
            assert!(size.fits_within(MAIN), "{} does not fit for {}", size, overlay);

            // Aspect preserved within one pixel of truncation
            let expected_h = f64::from(size.width) * f64::from(h) / f64::from(w);
            let expected_w = f64::from(size.height) * f64::from(w) / f64::from(h);
            assert!(
                (f64::from(size.height) - expected_h).abs() <= 1.0
                    || (f64::from(size.width) - expected_w).abs() <= 1.0,
                "aspect drifted for {}: {}",
                overlay,
                size
            );
        }
    }

    #[test]
    fn test_zero_overlay_is_invalid() {
        assert!(matches!(
            fit_within(FrameSize::new(640, 0), MAIN),
            Err(MediaError::InvalidSize(_))
        ));
        assert!(matches!(
            fit_within(FrameSize::new(0, 480), MAIN),
            Err(MediaError::InvalidSize(_))
        ));
    }

    #[test]
    fn test_resolve_auto() {
        let size = resolve_size(OverlaySize::Auto, SizeMode::Exact, FrameSize::new(3840, 1080), MAIN).unwrap();
        assert_eq!(size, FrameSize::new(1920, 540));
    }

    #[test]
    fn test_resolve_explicit_exact_ignores_aspect() {
        let requested = OverlaySize::Explicit { width: 300, height: 300 };
        let size = resolve_size(requested, SizeMode::Exact, FrameSize::new(640, 480), MAIN).unwrap();
        assert_eq!(size, FrameSize::new(300, 300));

        // Exact may exceed the main frame when asked to
        let requested = OverlaySize::Explicit { width: 2500, height: 1200 };
        let size = resolve_size(requested, SizeMode::Exact, FrameSize::new(640, 480), MAIN).unwrap();
        assert_eq!(size, FrameSize::new(2500, 1200));
    }

    #[test]
    fn test_resolve_explicit_fit_within() {
        let requested = OverlaySize::Explicit { width: 320, height: 320 };
        let size = resolve_size(requested, SizeMode::FitWithin, FrameSize::new(640, 480), MAIN).unwrap();
        assert_eq!(size, FrameSize::new(320, 240));
    }
}
