//! Content-bounds scanning of decoded cutouts.
//!
//! A background-removal service returns an RGBA image where removed areas
//! are pure fully-transparent black. The scanner finds the tight rectangle
//! enclosing everything else, so the crop stage can trim the dead margin.
//!
//! ## Content predicate
//!
//! A pixel is **content** if any of R, G, B, or A is non-zero. Only pure
//! transparent black (`0,0,0,0`) is excluded — deliberately permissive so
//! anti-aliased, semi-transparent edge pixels stay inside the box.
//!
//! The scan is a complete pass over every pixel (no early exit); rows are
//! scanned in parallel and reduced to a single box. An image with no
//! content pixels at all is rejected with [`BoundsError::DegenerateBounds`]
//! — callers never see a zero- or negative-size box.

use super::params::BoundingBox;
use image::RgbaImage;
use rayon::prelude::*;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BoundsError {
    #[error("image has zero dimensions ({0}x{1})")]
    EmptyImage(u32, u32),
    #[error("no content pixels found (image is entirely transparent black)")]
    DegenerateBounds,
}

/// Horizontal extent of content within one row.
struct RowSpan {
    y: u32,
    min_x: u32,
    max_x: u32,
}

/// Scan every pixel of `image` and return the bounding box of its content,
/// expanded by `padding` pixels on each side (clamped to the image).
///
/// Row-major full scan; `min`/`max` tracking is inclusive, so a single
/// content pixel at `(px, py)` yields `{px, py, 1, 1}` and a fully opaque
/// image yields the full extent.
pub fn scan_content_bounds(image: &RgbaImage, padding: u32) -> Result<BoundingBox, BoundsError> {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return Err(BoundsError::EmptyImage(width, height));
    }

    let stride = width as usize * 4;
    let spans: Vec<RowSpan> = image
        .as_raw()
        .par_chunks_exact(stride)
        .enumerate()
        .filter_map(|(y, row)| scan_row(y as u32, row))
        .collect();

    // Rows come back in order, so the first/last spans give the vertical
    // extent directly.
    let (first, last) = match (spans.first(), spans.last()) {
        (Some(first), Some(last)) => (first, last),
        _ => return Err(BoundsError::DegenerateBounds),
    };

    let min_x = spans.iter().map(|s| s.min_x).min().unwrap_or(0);
    let max_x = spans.iter().map(|s| s.max_x).max().unwrap_or(0);
    let (min_y, max_y) = (first.y, last.y);

    let x = min_x.saturating_sub(padding);
    let y = min_y.saturating_sub(padding);
    let right = (max_x + padding).min(width - 1);
    let bottom = (max_y + padding).min(height - 1);

    Ok(BoundingBox {
        x,
        y,
        width: right - x + 1,
        height: bottom - y + 1,
    })
}

fn scan_row(y: u32, row: &[u8]) -> Option<RowSpan> {
    let mut min_x: Option<u32> = None;
    let mut max_x = 0u32;

    for (x, px) in row.chunks_exact(4).enumerate() {
        if px[0] > 0 || px[1] > 0 || px[2] > 0 || px[3] > 0 {
            let x = x as u32;
            if min_x.is_none() {
                min_x = Some(x);
            }
            max_x = x;
        }
    }

    min_x.map(|min_x| RowSpan { y, min_x, max_x })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn blank(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_pixel(width, height, Rgba([0, 0, 0, 0]))
    }

    #[test]
    fn single_opaque_pixel_yields_unit_box() {
        let mut img = blank(64, 48);
        img.put_pixel(17, 29, Rgba([255, 255, 255, 255]));

        let b = scan_content_bounds(&img, 0).unwrap();
        assert_eq!(
            b,
            BoundingBox {
                x: 17,
                y: 29,
                width: 1,
                height: 1
            }
        );
    }

    #[test]
    fn fully_opaque_image_yields_full_extent() {
        let img = RgbaImage::from_pixel(120, 80, Rgba([10, 20, 30, 255]));
        let b = scan_content_bounds(&img, 0).unwrap();
        assert!(b.is_full_extent(120, 80));
    }

    #[test]
    fn all_transparent_black_is_degenerate() {
        let img = blank(32, 32);
        let result = scan_content_bounds(&img, 0);
        assert!(matches!(result, Err(BoundsError::DegenerateBounds)));
    }

    #[test]
    fn transparent_but_colored_pixel_is_content() {
        // Alpha 0 but RGB non-zero still counts — the predicate excludes
        // only pure transparent black.
        let mut img = blank(10, 10);
        img.put_pixel(3, 4, Rgba([1, 0, 0, 0]));

        let b = scan_content_bounds(&img, 0).unwrap();
        assert_eq!((b.x, b.y, b.width, b.height), (3, 4, 1, 1));
    }

    #[test]
    fn black_but_semitransparent_pixel_is_content() {
        let mut img = blank(10, 10);
        img.put_pixel(7, 2, Rgba([0, 0, 0, 1]));

        let b = scan_content_bounds(&img, 0).unwrap();
        assert_eq!((b.x, b.y), (7, 2));
    }

    #[test]
    fn scattered_content_spans_extremes() {
        let mut img = blank(100, 60);
        img.put_pixel(5, 10, Rgba([0, 255, 0, 255]));
        img.put_pixel(90, 50, Rgba([0, 0, 255, 128]));
        img.put_pixel(40, 3, Rgba([255, 0, 0, 255]));

        let b = scan_content_bounds(&img, 0).unwrap();
        assert_eq!(
            b,
            BoundingBox {
                x: 5,
                y: 3,
                width: 86,
                height: 48
            }
        );
    }

    #[test]
    fn padding_expands_and_clamps() {
        let mut img = blank(20, 20);
        img.put_pixel(1, 1, Rgba([255, 255, 255, 255]));

        let b = scan_content_bounds(&img, 4).unwrap();
        // Left/top clamp at 0, right/bottom extend by the padding
        assert_eq!((b.x, b.y), (0, 0));
        assert_eq!((b.width, b.height), (6, 6));
    }

    #[test]
    fn padding_clamps_at_far_edges() {
        let mut img = blank(20, 20);
        img.put_pixel(19, 19, Rgba([255, 255, 255, 255]));

        let b = scan_content_bounds(&img, 5).unwrap();
        assert_eq!((b.x, b.y), (14, 14));
        assert_eq!((b.right(), b.bottom()), (20, 20));
    }

    #[test]
    fn zero_size_image_is_rejected() {
        let img = RgbaImage::new(0, 0);
        assert!(matches!(
            scan_content_bounds(&img, 0),
            Err(BoundsError::EmptyImage(0, 0))
        ));
    }
}
