//! Per-pixel color adjustments for the foreground layer.
//!
//! The adjustments mirror the CSS filter functions the original editor
//! exposed — `brightness()`, `contrast()`, `saturate()` — applied in that
//! order, each taking a percentage where 100 is the identity. The filter is
//! an explicit parameter of the layer draw: it operates on a copy of the
//! layer and never leaks into any other draw.
//!
//! Saturation uses the 0.213/0.715/0.072 luminance weights of the CSS/SVG
//! `saturate` color matrix. Alpha is never touched.

use super::params::{ColorAdjustments, DEFAULT_COLOR_VALUE};
use image::RgbaImage;

/// Apply `adjustments` to a copy of `image`.
///
/// Stages at exactly 100 are skipped outright, so a neutral adjustment
/// returns pixel-identical output.
pub fn apply_adjustments(image: &RgbaImage, adjustments: &ColorAdjustments) -> RgbaImage {
    if adjustments.is_neutral() {
        return image.clone();
    }

    let brightness = adjustments.brightness as f32 / 100.0;
    let contrast = adjustments.contrast as f32 / 100.0;
    let saturation = adjustments.saturation as f32 / 100.0;

    let mut out = image.clone();
    for px in out.pixels_mut() {
        let mut rgb = [px[0] as f32, px[1] as f32, px[2] as f32];

        if adjustments.brightness != DEFAULT_COLOR_VALUE {
            for c in &mut rgb {
                *c = (*c * brightness).clamp(0.0, 255.0);
            }
        }
        if adjustments.contrast != DEFAULT_COLOR_VALUE {
            for c in &mut rgb {
                *c = ((*c - 127.5) * contrast + 127.5).clamp(0.0, 255.0);
            }
        }
        if adjustments.saturation != DEFAULT_COLOR_VALUE {
            rgb = saturate(rgb, saturation);
        }

        px[0] = rgb[0].round() as u8;
        px[1] = rgb[1].round() as u8;
        px[2] = rgb[2].round() as u8;
    }
    out
}

fn saturate([r, g, b]: [f32; 3], s: f32) -> [f32; 3] {
    let inv = 1.0 - s;
    let (lr, lg, lb) = (0.213 * inv, 0.715 * inv, 0.072 * inv);
    [
        ((lr + s) * r + lg * g + lb * b).clamp(0.0, 255.0),
        (lr * r + (lg + s) * g + lb * b).clamp(0.0, 255.0),
        (lr * r + lg * g + (lb + s) * b).clamp(0.0, 255.0),
    ]
}
