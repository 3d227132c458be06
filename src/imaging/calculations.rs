//! Pure calculation functions for display fitting, placement, and clipping.
//!
//! All functions here are pure and testable without any I/O or images.
//! They are the only place the pipeline converts between its three
//! coordinate spaces (source pixels, display units, canvas pixels).

use super::params::{BoundingBox, CanvasSize, DisplayDimensions, ViewportTransform};

/// Fit a source size into the display box, preserving aspect ratio.
///
/// The longer side is capped at `max_display`; the shorter side scales by
/// the same ratio and rounds to the nearest pixel. Images already within
/// the cap come back unchanged.
///
/// # Examples
/// ```
/// # use cutout_studio::imaging::{fit_to_display, MAX_DISPLAY_SIZE};
/// // 1000x400 landscape → 500x200
/// let fit = fit_to_display(1000, 400, MAX_DISPLAY_SIZE);
/// assert_eq!((fit.width, fit.height), (500, 200));
///
/// // Already small enough → unchanged
/// let fit = fit_to_display(300, 200, MAX_DISPLAY_SIZE);
/// assert_eq!((fit.width, fit.height), (300, 200));
/// ```
pub fn fit_to_display(width: u32, height: u32, max_display: u32) -> DisplayDimensions {
    if width > height {
        let new_width = width.min(max_display);
        let new_height = (height as f64 * new_width as f64 / width as f64).round() as u32;
        DisplayDimensions {
            width: new_width,
            height: new_height,
        }
    } else {
        let new_height = height.min(max_display);
        let new_width = (width as f64 * new_height as f64 / height as f64).round() as u32;
        DisplayDimensions {
            width: new_width,
            height: new_height,
        }
    }
}

/// Place a display-fitted image at the center of the canvas.
pub fn center_transform(display: DisplayDimensions, canvas: CanvasSize) -> ViewportTransform {
    ViewportTransform {
        x: (canvas.width as f64 - display.width as f64) / 2.0,
        y: (canvas.height as f64 - display.height as f64) / 2.0,
        width: display.width as f64,
        height: display.height as f64,
    }
}

/// The on-canvas rectangle a clipped foreground draw covers.
///
/// Always lies within `[0, canvas.width] × [0, canvas.height]` and has
/// strictly positive extent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClipRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Sub-rectangle of the foreground source that maps onto a [`ClipRect`].
///
/// Fractional source pixels — callers round when extracting actual pixel
/// regions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SourceWindow {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Intersect a placed foreground rectangle with the canvas bounds.
///
/// Returns `None` when the rectangles do not overlap — the clipping policy
/// is to omit such a foreground entirely, never to wrap or clamp it into
/// view.
pub fn intersect_canvas(transform: &ViewportTransform, canvas: CanvasSize) -> Option<ClipRect> {
    let x = transform.x.max(0.0);
    let y = transform.y.max(0.0);
    let right = (transform.x + transform.width).min(canvas.width as f64);
    let bottom = (transform.y + transform.height).min(canvas.height as f64);

    if right <= x || bottom <= y {
        return None;
    }
    Some(ClipRect {
        x,
        y,
        width: right - x,
        height: bottom - y,
    })
}

/// Map a clip rectangle back to the foreground's source space.
///
/// The mapping is proportional: a clip covering the leftmost tenth of the
/// placed rectangle selects the leftmost tenth of the source, so the
/// visible portion is drawn undistorted and off-canvas source pixels are
/// never sampled.
pub fn source_window(
    clip: &ClipRect,
    transform: &ViewportTransform,
    source_width: u32,
    source_height: u32,
) -> SourceWindow {
    SourceWindow {
        x: (clip.x - transform.x) / transform.width * source_width as f64,
        y: (clip.y - transform.y) / transform.height * source_height as f64,
        width: clip.width / transform.width * source_width as f64,
        height: clip.height / transform.height * source_height as f64,
    }
}

/// Display fit and centered placement for a freshly cropped box.
///
/// Convenience combining [`fit_to_display`] and [`center_transform`] the
/// way the crop stage publishes its result.
pub fn placement_for_box(
    bounds: &BoundingBox,
    max_display: u32,
    canvas: CanvasSize,
) -> (DisplayDimensions, ViewportTransform) {
    let display = fit_to_display(bounds.width, bounds.height, max_display);
    (display, center_transform(display, canvas))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::params::MAX_DISPLAY_SIZE;

    fn canvas() -> CanvasSize {
        CanvasSize::default()
    }

    // =========================================================================
    // fit_to_display tests
    // =========================================================================

    #[test]
    fn fit_landscape_caps_width() {
        let fit = fit_to_display(2000, 1000, MAX_DISPLAY_SIZE);
        assert_eq!(fit.width, 500);
        assert_eq!(fit.height, 250);
    }

    #[test]
    fn fit_portrait_caps_height() {
        let fit = fit_to_display(1000, 2000, MAX_DISPLAY_SIZE);
        assert_eq!(fit.width, 250);
        assert_eq!(fit.height, 500);
    }

    #[test]
    fn fit_square_caps_both() {
        let fit = fit_to_display(900, 900, MAX_DISPLAY_SIZE);
        assert_eq!((fit.width, fit.height), (500, 500));
    }

    #[test]
    fn fit_small_image_unchanged() {
        let fit = fit_to_display(320, 240, MAX_DISPLAY_SIZE);
        assert_eq!((fit.width, fit.height), (320, 240));
    }

    #[test]
    fn fit_preserves_ratio_within_rounding() {
        // Awkward ratio: 1357x864 → width capped at 500
        let fit = fit_to_display(1357, 864, MAX_DISPLAY_SIZE);
        assert_eq!(fit.width, 500);
        let expected = 864.0 * 500.0 / 1357.0;
        assert!((fit.height as f64 - expected).abs() <= 1.0);
    }

    // =========================================================================
    // center_transform tests
    // =========================================================================

    #[test]
    fn center_on_default_canvas() {
        let t = center_transform(
            DisplayDimensions {
                width: 500,
                height: 400,
            },
            canvas(),
        );
        assert_eq!((t.x, t.y), (150.0, 100.0));
        assert_eq!((t.width, t.height), (500.0, 400.0));
    }

    #[test]
    fn center_full_size_is_origin() {
        let t = center_transform(
            DisplayDimensions {
                width: 800,
                height: 600,
            },
            canvas(),
        );
        assert_eq!((t.x, t.y), (0.0, 0.0));
    }

    // =========================================================================
    // intersect_canvas tests
    // =========================================================================

    #[test]
    fn intersect_fully_inside() {
        let t = ViewportTransform {
            x: 100.0,
            y: 50.0,
            width: 200.0,
            height: 100.0,
        };
        let clip = intersect_canvas(&t, canvas()).unwrap();
        assert_eq!((clip.x, clip.y), (100.0, 50.0));
        assert_eq!((clip.width, clip.height), (200.0, 100.0));
    }

    #[test]
    fn intersect_fully_outside_right_is_none() {
        let t = ViewportTransform {
            x: 900.0,
            y: 0.0,
            width: 100.0,
            height: 100.0,
        };
        assert!(intersect_canvas(&t, canvas()).is_none());
    }

    #[test]
    fn intersect_fully_outside_negative_is_none() {
        let t = ViewportTransform {
            x: -300.0,
            y: -300.0,
            width: 200.0,
            height: 200.0,
        };
        assert!(intersect_canvas(&t, canvas()).is_none());
    }

    #[test]
    fn intersect_touching_edge_is_none() {
        // Right edge exactly at x=800: zero-width overlap
        let t = ViewportTransform {
            x: 800.0,
            y: 0.0,
            width: 100.0,
            height: 100.0,
        };
        assert!(intersect_canvas(&t, canvas()).is_none());
    }

    #[test]
    fn intersect_straddling_right_edge() {
        let t = ViewportTransform {
            x: 790.0,
            y: 0.0,
            width: 100.0,
            height: 100.0,
        };
        let clip = intersect_canvas(&t, canvas()).unwrap();
        assert_eq!(clip.x, 790.0);
        assert_eq!(clip.width, 10.0);
    }

    #[test]
    fn intersect_straddling_top_left() {
        let t = ViewportTransform {
            x: -50.0,
            y: -20.0,
            width: 100.0,
            height: 100.0,
        };
        let clip = intersect_canvas(&t, canvas()).unwrap();
        assert_eq!((clip.x, clip.y), (0.0, 0.0));
        assert_eq!((clip.width, clip.height), (50.0, 80.0));
    }

    // =========================================================================
    // source_window tests
    // =========================================================================

    #[test]
    fn source_window_full_overlap_is_full_source() {
        let t = ViewportTransform {
            x: 100.0,
            y: 100.0,
            width: 200.0,
            height: 100.0,
        };
        let clip = intersect_canvas(&t, canvas()).unwrap();
        let win = source_window(&clip, &t, 400, 300);
        assert_eq!((win.x, win.y), (0.0, 0.0));
        assert_eq!((win.width, win.height), (400.0, 300.0));
    }

    #[test]
    fn source_window_right_edge_slice() {
        // Placed at x=790 with width 100, only 10 canvas px visible:
        // the leftmost tenth of the source.
        let t = ViewportTransform {
            x: 790.0,
            y: 0.0,
            width: 100.0,
            height: 100.0,
        };
        let clip = intersect_canvas(&t, canvas()).unwrap();
        let win = source_window(&clip, &t, 200, 160);
        assert_eq!(win.x, 0.0);
        assert_eq!(win.width, 20.0); // 10/100 of 200
        assert_eq!(win.height, 160.0);
    }

    #[test]
    fn source_window_left_overhang_skips_hidden_source() {
        // Left half hangs off the canvas: the visible part starts at the
        // horizontal middle of the source.
        let t = ViewportTransform {
            x: -100.0,
            y: 0.0,
            width: 200.0,
            height: 100.0,
        };
        let clip = intersect_canvas(&t, canvas()).unwrap();
        let win = source_window(&clip, &t, 300, 80);
        assert_eq!(win.x, 150.0);
        assert_eq!(win.width, 150.0);
    }

    // =========================================================================
    // placement_for_box tests
    // =========================================================================

    #[test]
    fn placement_fits_and_centers() {
        let bounds = BoundingBox {
            x: 12,
            y: 40,
            width: 1000,
            height: 500,
        };
        let (display, t) = placement_for_box(&bounds, MAX_DISPLAY_SIZE, canvas());
        assert_eq!((display.width, display.height), (500, 250));
        assert_eq!((t.x, t.y), (150.0, 175.0));
    }
}
