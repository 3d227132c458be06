//! Raster post-processing — pure Rust, in-memory pipeline.
//!
//! | Stage | Module | Operation |
//! |---|---|---|
//! | **Scan** | [`bounds`] | full-pixel content bounding box |
//! | **Crop** | [`crop`] | trim to bounds + derive editing geometry |
//! | **Compose** | [`compose`] | background + clipped, filtered foreground → PNG |
//!
//! The module is split into:
//! - **Calculations**: pure functions for fit/placement/clipping math (unit testable)
//! - **Params**: the value types and fixed limits of the three coordinate spaces
//! - **Bounds / Crop / Compose**: the pipeline stages themselves
//! - **Filter**: per-pixel color adjustments, an explicit draw parameter

pub mod bounds;
pub mod calculations;
pub mod compose;
pub mod crop;
pub mod filter;
pub mod params;

pub use bounds::{BoundsError, scan_content_bounds};
pub use calculations::{
    ClipRect, SourceWindow, center_transform, fit_to_display, intersect_canvas, placement_for_box,
    source_window,
};
pub use compose::{ComposeError, compose, compose_to_png, encode_png, solid_background};
pub use crop::{CropError, CroppedAsset, crop_for_editing, crop_to_bounds};
pub use filter::apply_adjustments;
pub use params::{
    BoundingBox, CONTAINER_HEIGHT, CONTAINER_WIDTH, CanvasSize, ColorAdjustments,
    DisplayDimensions, MAX_DISPLAY_SIZE, ViewportTransform,
};
