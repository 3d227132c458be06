//! CLI output formatting for all pipeline stages.
//!
//! Output is information-centric: the primary display for every entity is
//! its semantic identity (task status, bounds, dimensions), with filesystem
//! paths as secondary context via indented `Source:` lines.
//!
//! Each stage has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure — no I/O, no side effects.
//!
//! ```text
//! Uploaded: https://host/upload/123.png
//! Task 42 created
//!     poll 1: running
//!     poll 2: success
//! Result: https://host/result.png (fetched)
//! Bounds: 20x10 at (30, 20)
//! Cropped: 20x10, display fit 500x250
//! ```

use crate::imaging::{BoundingBox, CanvasSize, CroppedAsset};
use crate::pipeline::PipelineEvent;
use crate::templates::Template;
use std::path::Path;

/// One line per pipeline event; poll attempts are indented under their task.
pub fn format_pipeline_event(event: &PipelineEvent) -> Vec<String> {
    match event {
        PipelineEvent::Uploaded { url } => vec![format!("Uploaded: {url}")],
        PipelineEvent::TaskCreated { id } => vec![format!("Task {id} created")],
        PipelineEvent::StatusPolled { attempt, status } => {
            vec![format!("    poll {attempt}: {status}")]
        }
        PipelineEvent::ResultFetched { url, from_cache } => {
            let provenance = if *from_cache { "cached" } else { "fetched" };
            vec![format!("Result: {url} ({provenance})")]
        }
        PipelineEvent::BoundsScanned { bounds } => {
            vec![format!(
                "Bounds: {}x{} at ({}, {})",
                bounds.width, bounds.height, bounds.x, bounds.y
            )]
        }
        PipelineEvent::Cropped { display } => {
            vec![format!(
                "Cropped, display fit {}x{}",
                display.width, display.height
            )]
        }
    }
}

pub fn print_pipeline_event(event: &PipelineEvent) {
    for line in format_pipeline_event(event) {
        println!("{line}");
    }
}

/// Summary of a local trim: box, crop size, derived editing geometry.
pub fn format_trim_summary(source: &Path, asset: &CroppedAsset) -> Vec<String> {
    vec![
        format!(
            "Trimmed to {}x{} at ({}, {})",
            asset.bounds.width, asset.bounds.height, asset.bounds.x, asset.bounds.y
        ),
        format!("    Source: {}", source.display()),
        format!(
            "    Display fit: {}x{}",
            asset.display.width, asset.display.height
        ),
        format!(
            "    Centered at: ({}, {})",
            asset.placement.x, asset.placement.y
        ),
    ]
}

pub fn print_trim_summary(source: &Path, asset: &CroppedAsset) {
    for line in format_trim_summary(source, asset) {
        println!("{line}");
    }
}

/// Bare bounds line for the `bounds` command.
pub fn format_bounds(source: &Path, bounds: &BoundingBox) -> Vec<String> {
    vec![
        format!(
            "{}x{} at ({}, {})",
            bounds.width, bounds.height, bounds.x, bounds.y
        ),
        format!("    Source: {}", source.display()),
    ]
}

pub fn print_bounds(source: &Path, bounds: &BoundingBox) {
    for line in format_bounds(source, bounds) {
        println!("{line}");
    }
}

/// Template gallery listing: index + name, with path and size as context.
pub fn format_template_list(dir: &Path, templates: &[Template]) -> Vec<String> {
    let mut lines = vec![format!("Templates in {}", dir.display())];
    if templates.is_empty() {
        lines.push("    (none found)".to_string());
        return lines;
    }
    for (index, template) in templates.iter().enumerate() {
        let name = template
            .path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| template.path.display().to_string());
        lines.push(format!(
            "{:03} {} ({}x{})",
            index + 1,
            name,
            template.width,
            template.height
        ));
        lines.push(format!("    Source: {}", template.path.display()));
    }
    lines
}

pub fn print_template_list(dir: &Path, templates: &[Template]) {
    for line in format_template_list(dir, templates) {
        println!("{line}");
    }
}

/// Final line after a composite is written.
pub fn format_compose_summary(output: &Path, canvas: CanvasSize) -> Vec<String> {
    vec![format!(
        "Composed {}x{} → {}",
        canvas.width,
        canvas.height,
        output.display()
    )]
}

pub fn print_compose_summary(output: &Path, canvas: CanvasSize) {
    for line in format_compose_summary(output, canvas) {
        println!("{line}");
    }
}
