//! Remote processing pipeline orchestration.
//!
//! Drives one image through the whole flow:
//!
//! ```text
//! upload → create task → poll → fetch result → scan bounds → crop
//! ```
//!
//! The function is generic over [`TaskApi`] so tests run against the
//! recorded mock, and reports progress over an optional mpsc sender that
//! the CLI printer consumes — the pipeline itself never prints.
//!
//! Failures are staged: transport problems surface as [`TaskError`],
//! an undecodable result as [`PipelineError::Decode`], an all-transparent
//! cutout as [`PipelineError::Bounds`]. Nothing here is fatal to the
//! process — callers retry by re-running.

use crate::cache::DownloadCache;
use crate::imaging::{
    BoundingBox, CanvasSize, CroppedAsset, DisplayDimensions, bounds::BoundsError, crop::CropError,
    crop_for_editing, scan_content_bounds,
};
use crate::task::{
    CancelToken, CreateTaskRequest, ImagePayload, PollConfig, TaskApi, TaskError, TaskStatus,
    poll_until_complete_with,
};
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("source image not found: {0}")]
    SourceNotFound(PathBuf),
    #[error("task service error: {0}")]
    Task(#[from] TaskError),
    #[error("failed to decode image: {0}")]
    Decode(#[from] image::ImageError),
    #[error("cutout scan failed: {0}")]
    Bounds(#[from] BoundsError),
    #[error("crop failed: {0}")]
    Crop(#[from] CropError),
}

/// Progress notifications emitted while the pipeline runs.
#[derive(Debug, Clone)]
pub enum PipelineEvent {
    Uploaded { url: String },
    TaskCreated { id: u64 },
    StatusPolled { attempt: u32, status: TaskStatus },
    ResultFetched { url: String, from_cache: bool },
    BoundsScanned { bounds: BoundingBox },
    Cropped { display: DisplayDimensions },
}

/// Knobs for a pipeline run. Defaults match the portrait product.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Display name for created tasks.
    pub task_name: String,
    /// Template the service runs the job against.
    pub template_name: String,
    pub poll: PollConfig,
    /// Extra margin kept around the content bounds.
    pub padding: u32,
    /// Longer-side cap for the display fit.
    pub max_display: u32,
    pub canvas: CanvasSize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            task_name: "Remove Background".to_string(),
            template_name: "portrait".to_string(),
            poll: PollConfig::default(),
            padding: 0,
            max_display: crate::imaging::MAX_DISPLAY_SIZE,
            canvas: CanvasSize::default(),
        }
    }
}

/// Everything the editing stage needs from a finished pipeline run.
#[derive(Debug)]
pub struct ProcessedCutout {
    pub task_id: u64,
    pub result_url: String,
    /// Dimensions of the uncropped result image.
    pub result_dimensions: (u32, u32),
    pub asset: CroppedAsset,
}

/// Run the full remote pipeline for one source image.
pub fn process_upload(
    api: &impl TaskApi,
    source: &Path,
    config: &PipelineConfig,
    cache: &mut DownloadCache,
    cancel: &CancelToken,
    events: Option<Sender<PipelineEvent>>,
) -> Result<ProcessedCutout, PipelineError> {
    if !source.exists() {
        return Err(PipelineError::SourceNotFound(source.to_path_buf()));
    }

    let uploaded = api.upload_image(source)?;
    emit(&events, PipelineEvent::Uploaded {
        url: uploaded.url.clone(),
    });

    let data = serde_json::to_string(&ImagePayload {
        image_url: uploaded.url,
    })
    .map_err(TaskError::from)?;
    let created = api.create_task(&CreateTaskRequest {
        name: config.task_name.clone(),
        data,
        template_name: config.template_name.clone(),
    })?;
    emit(&events, PipelineEvent::TaskCreated { id: created.id });

    let finished = poll_until_complete_with(api, created.id, &config.poll, cancel, |attempt, status| {
        emit(&events, PipelineEvent::StatusPolled { attempt, status });
    })?;

    let result_url = finished.result_image_url()?;
    let fetched = cache.fetch(api, &result_url)?;
    emit(&events, PipelineEvent::ResultFetched {
        url: result_url.clone(),
        from_cache: fetched.from_cache,
    });

    let cutout = image::load_from_memory(&fetched.bytes)?.to_rgba8();
    let result_dimensions = cutout.dimensions();

    let bounds = scan_content_bounds(&cutout, config.padding)?;
    emit(&events, PipelineEvent::BoundsScanned { bounds });

    let asset = crop_for_editing(&cutout, &bounds, config.max_display, config.canvas)?;
    emit(&events, PipelineEvent::Cropped {
        display: asset.display,
    });

    Ok(ProcessedCutout {
        task_id: finished.id,
        result_url,
        result_dimensions,
        asset,
    })
}

/// Run scan + crop on a local image, no service round-trip.
///
/// Backs the `trim`/`bounds` commands and any workflow that already has a
/// cutout on disk.
pub fn process_local(
    source: &Path,
    config: &PipelineConfig,
) -> Result<CroppedAsset, PipelineError> {
    if !source.exists() {
        return Err(PipelineError::SourceNotFound(source.to_path_buf()));
    }
    let cutout = image::open(source)?.to_rgba8();
    let bounds = scan_content_bounds(&cutout, config.padding)?;
    Ok(crop_for_editing(
        &cutout,
        &bounds,
        config.max_display,
        config.canvas,
    )?)
}

fn emit(events: &Option<Sender<PipelineEvent>>, event: PipelineEvent) {
    if let Some(tx) = events {
        // A dropped receiver just means nobody is listening anymore.
        tx.send(event).ok();
    }
}
