//! Final composition: background + transformed, filtered foreground.
//!
//! Stage 3 of the post-processing pipeline. The background is stretched to
//! exactly fill the fixed-size canvas (no aspect preservation); the
//! foreground is drawn at its viewport transform, clipped pixel-accurately
//! against the canvas edges, with the color adjustments applied to that
//! draw only.
//!
//! Clipping works by intersecting the placed rectangle with the canvas and
//! mapping the intersection back to a proportional source sub-rectangle.
//! The foreground is physically cropped to that sub-rectangle before
//! scaling, so pixels outside the visible slice are never sampled, and a
//! fully off-canvas transform draws nothing at all.

use super::calculations::{intersect_canvas, source_window};
use super::filter::apply_adjustments;
use super::params::{CanvasSize, ColorAdjustments, ViewportTransform};
use image::imageops::FilterType;
use image::{ImageFormat, Rgba, RgbaImage, imageops};
use std::io::Cursor;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ComposeError {
    #[error("PNG encode failed: {0}")]
    Encode(#[from] image::ImageError),
}

/// Render background + foreground into a canvas-sized image.
///
/// The adjustments parameterize the foreground draw only; the background
/// is always drawn unfiltered.
pub fn compose(
    background: &RgbaImage,
    foreground: &RgbaImage,
    transform: &ViewportTransform,
    adjustments: &ColorAdjustments,
    canvas: CanvasSize,
) -> RgbaImage {
    let mut output = if background.dimensions() == (canvas.width, canvas.height) {
        background.clone()
    } else {
        imageops::resize(background, canvas.width, canvas.height, FilterType::Lanczos3)
    };

    draw_foreground(&mut output, foreground, transform, adjustments, canvas);
    output
}

/// Compose and PNG-encode in one step.
pub fn compose_to_png(
    background: &RgbaImage,
    foreground: &RgbaImage,
    transform: &ViewportTransform,
    adjustments: &ColorAdjustments,
    canvas: CanvasSize,
) -> Result<Vec<u8>, ComposeError> {
    encode_png(&compose(
        background,
        foreground,
        transform,
        adjustments,
        canvas,
    ))
}

/// A solid single-color background sized to the canvas.
///
/// The default composite uses a white one, standing in for the stock
/// white background template.
pub fn solid_background(color: Rgba<u8>, canvas: CanvasSize) -> RgbaImage {
    RgbaImage::from_pixel(canvas.width, canvas.height, color)
}

/// Encode an image as PNG bytes.
pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, ComposeError> {
    let mut bytes = Vec::new();
    image.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
    Ok(bytes)
}

fn draw_foreground(
    output: &mut RgbaImage,
    foreground: &RgbaImage,
    transform: &ViewportTransform,
    adjustments: &ColorAdjustments,
    canvas: CanvasSize,
) {
    let (fg_width, fg_height) = foreground.dimensions();
    if fg_width == 0 || fg_height == 0 || transform.width <= 0.0 || transform.height <= 0.0 {
        return;
    }

    // Fully off-canvas placements are omitted entirely, never clamped back
    // into view.
    let Some(clip) = intersect_canvas(transform, canvas) else {
        return;
    };
    let window = source_window(&clip, transform, fg_width, fg_height);

    let src_x = (window.x.round() as u32).min(fg_width - 1);
    let src_y = (window.y.round() as u32).min(fg_height - 1);
    let src_w = (window.width.round() as u32).clamp(1, fg_width - src_x);
    let src_h = (window.height.round() as u32).clamp(1, fg_height - src_y);

    let dest_x = (clip.x.round() as u32).min(canvas.width - 1);
    let dest_y = (clip.y.round() as u32).min(canvas.height - 1);
    let dest_w = (clip.width.round() as u32).clamp(1, canvas.width - dest_x);
    let dest_h = (clip.height.round() as u32).clamp(1, canvas.height - dest_y);

    let visible = imageops::crop_imm(foreground, src_x, src_y, src_w, src_h).to_image();
    let filtered = apply_adjustments(&visible, adjustments);
    let scaled = if filtered.dimensions() == (dest_w, dest_h) {
        filtered
    } else {
        imageops::resize(&filtered, dest_w, dest_h, FilterType::Lanczos3)
    };

    imageops::overlay(output, &scaled, dest_x as i64, dest_y as i64);
}
