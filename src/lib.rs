//! # Cutout Studio
//!
//! A command-line studio for background-removal cutouts. An external task
//! service does the actual removal; this crate drives the service and owns
//! everything that happens to the result afterwards: trimming the cutout
//! to its content, fitting it for display, and compositing it over a new
//! background for download.
//!
//! # Architecture: Three-Stage Pipeline
//!
//! The post-processing core runs three stages against in-memory bitmaps:
//!
//! ```text
//! 1. Scan      cutout   →  BoundingBox      (content pixels only)
//! 2. Crop      bounds   →  CroppedAsset     (trimmed pixels + editing geometry)
//! 3. Compose   session  →  composed-image.png (background + clipped foreground)
//! ```
//!
//! This separation exists for three reasons:
//!
//! - **Testability**: scan, crop, and compose are pure functions over pixel
//!   buffers, so unit tests assert exact pixels without any service or disk.
//! - **Recoverability**: each stage fails with its own typed error at its
//!   own boundary; a failed composite never invalidates a finished crop.
//! - **Coordinate hygiene**: source pixels, display units, and canvas
//!   pixels are distinct types with explicit conversions — the three
//!   spaces never mix silently.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`task`] | Task service boundary — upload, create, bounded/cancellable polling, fetch |
//! | [`pipeline`] | Orchestrates upload → poll → fetch → scan → crop, with progress events |
//! | [`imaging`] | The raster stages: bounds scan, crop, color filter, composite |
//! | [`session`] | Editing session state machine (upload through download) |
//! | [`templates`] | Background template gallery scan |
//! | [`cache`] | URL-addressed disk cache for fetched result images |
//! | [`config`] | `config.toml` loading, validation, and the documented stock config |
//! | [`output`] | CLI output formatting — pure format functions per stage |
//!
//! # Design Decisions
//!
//! ## Explicit filter parameter, no ambient draw state
//!
//! The original canvas editor set a filter on a shared drawing context,
//! drew, and reset it — a leak waiting to happen. Here color adjustments
//! are a value passed into the one function that draws the foreground
//! layer; the background draw cannot observe them by construction.
//!
//! ## Bounded, cancellable polling
//!
//! Task completion is observed by polling, but the loop owns its
//! lifecycle: a fixed interval, a maximum attempt budget surfacing
//! [`task::TaskError::PollExhausted`], and a [`task::CancelToken`] checked
//! before every request and sleep. No self-rescheduling timer survives its
//! owner.
//!
//! ## Degenerate cutouts are errors
//!
//! An all-transparent result would have produced a negative-size bounding
//! box upstream. The scanner rejects it with
//! [`imaging::BoundsError::DegenerateBounds`] instead — an empty cutout
//! means the removal failed, and composing the invisible is not a
//! recovery.

pub mod cache;
pub mod config;
pub mod imaging;
pub mod output;
pub mod pipeline;
pub mod session;
pub mod task;
pub mod templates;
