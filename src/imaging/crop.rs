//! Cropping a cutout to its content bounds.
//!
//! Stage 2 of the post-processing pipeline. Takes the bounding box from the
//! scan stage, copies that region into a fresh buffer (no scaling), and
//! publishes the derived display fit and centered canvas placement the
//! editing session starts from.

use super::calculations::placement_for_box;
use super::params::{BoundingBox, CanvasSize, DisplayDimensions, ViewportTransform};
use image::{RgbaImage, imageops};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CropError {
    #[error("bounding box has zero area ({width}x{height})")]
    ZeroArea { width: u32, height: u32 },
    #[error("bounding box {0:?} exceeds image bounds {1}x{2}")]
    OutOfBounds(BoundingBox, u32, u32),
}

/// A cropped cutout together with its derived editing geometry.
#[derive(Debug, Clone)]
pub struct CroppedAsset {
    /// The cropped pixels, sized exactly to the bounding box.
    pub image: RgbaImage,
    /// The box the crop was taken from, in source coordinates.
    pub bounds: BoundingBox,
    /// Aspect fit of the cropped size into the display box.
    pub display: DisplayDimensions,
    /// Centered starting placement on the composition canvas.
    pub placement: ViewportTransform,
}

/// Copy the `bounds` region of `source` into a new buffer at origin.
///
/// The box must be well-formed: strictly positive extent, fully inside the
/// source. Cropping an image by its own full extent returns a
/// pixel-identical copy.
pub fn crop_to_bounds(source: &RgbaImage, bounds: &BoundingBox) -> Result<RgbaImage, CropError> {
    if bounds.width == 0 || bounds.height == 0 {
        return Err(CropError::ZeroArea {
            width: bounds.width,
            height: bounds.height,
        });
    }
    let (width, height) = source.dimensions();
    if bounds.right() > width || bounds.bottom() > height {
        return Err(CropError::OutOfBounds(*bounds, width, height));
    }

    Ok(imageops::crop_imm(source, bounds.x, bounds.y, bounds.width, bounds.height).to_image())
}

/// Crop and derive the editing geometry in one step.
///
/// On failure the caller keeps working with the uncropped source — nothing
/// here mutates it.
pub fn crop_for_editing(
    source: &RgbaImage,
    bounds: &BoundingBox,
    max_display: u32,
    canvas: CanvasSize,
) -> Result<CroppedAsset, CropError> {
    let image = crop_to_bounds(source, bounds)?;
    let (display, placement) = placement_for_box(bounds, max_display, canvas);

    Ok(CroppedAsset {
        image,
        bounds: *bounds,
        display,
        placement,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::params::MAX_DISPLAY_SIZE;
    use image::Rgba;

    fn gradient(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_fn(width, height, |x, y| {
            Rgba([(x % 256) as u8, (y % 256) as u8, 64, 255])
        })
    }

    #[test]
    fn crop_copies_exact_region() {
        let src = gradient(40, 30);
        let bounds = BoundingBox {
            x: 10,
            y: 5,
            width: 8,
            height: 6,
        };

        let cropped = crop_to_bounds(&src, &bounds).unwrap();
        assert_eq!(cropped.dimensions(), (8, 6));
        for y in 0..6 {
            for x in 0..8 {
                assert_eq!(cropped.get_pixel(x, y), src.get_pixel(x + 10, y + 5));
            }
        }
    }

    #[test]
    fn crop_full_extent_is_identity() {
        let src = gradient(25, 17);
        let bounds = BoundingBox {
            x: 0,
            y: 0,
            width: 25,
            height: 17,
        };

        let cropped = crop_to_bounds(&src, &bounds).unwrap();
        assert_eq!(cropped.as_raw(), src.as_raw());
    }

    #[test]
    fn crop_zero_area_is_rejected() {
        let src = gradient(10, 10);
        let bounds = BoundingBox {
            x: 2,
            y: 2,
            width: 0,
            height: 3,
        };
        assert!(matches!(
            crop_to_bounds(&src, &bounds),
            Err(CropError::ZeroArea { .. })
        ));
    }

    #[test]
    fn crop_out_of_bounds_is_rejected() {
        let src = gradient(10, 10);
        let bounds = BoundingBox {
            x: 6,
            y: 0,
            width: 5,
            height: 5,
        };
        assert!(matches!(
            crop_to_bounds(&src, &bounds),
            Err(CropError::OutOfBounds(..))
        ));
    }

    #[test]
    fn crop_for_editing_centers_the_fit() {
        let src = gradient(2000, 1000);
        let bounds = BoundingBox {
            x: 0,
            y: 0,
            width: 2000,
            height: 1000,
        };

        let asset =
            crop_for_editing(&src, &bounds, MAX_DISPLAY_SIZE, CanvasSize::default()).unwrap();
        assert_eq!(asset.image.dimensions(), (2000, 1000));
        assert_eq!((asset.display.width, asset.display.height), (500, 250));
        assert_eq!((asset.placement.x, asset.placement.y), (150.0, 175.0));
    }
}
