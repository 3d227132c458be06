//! Background template discovery.
//!
//! The compositor accepts any decodable raster image as a background. This
//! module scans a templates directory and produces the selectable gallery:
//! every image file that actually decodes, sorted by file name. Files with
//! an image extension that fail the dimension probe are skipped rather
//! than failing the scan — a broken template should not take the gallery
//! down.

use image::RgbaImage;
use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

/// Extensions whose decoders are compiled in.
const TEMPLATE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "tif", "tiff", "webp"];

#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("walk error: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("templates directory not found: {0}")]
    DirNotFound(PathBuf),
    #[error("failed to decode template {path}: {source}")]
    Decode {
        path: PathBuf,
        source: image::ImageError,
    },
}

/// One selectable background image.
#[derive(Debug, Clone, Serialize)]
pub struct Template {
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
}

/// Scan `dir` for usable background templates.
///
/// Walks up to one subdirectory level, probes dimensions without decoding
/// full pixel data, and returns entries sorted by path.
pub fn scan_templates(dir: &Path) -> Result<Vec<Template>, TemplateError> {
    if !dir.is_dir() {
        return Err(TemplateError::DirNotFound(dir.to_path_buf()));
    }

    let mut templates = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(2).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() || !has_template_extension(entry.path()) {
            continue;
        }
        if let Ok((width, height)) = image::image_dimensions(entry.path()) {
            templates.push(Template {
                path: entry.path().to_path_buf(),
                width,
                height,
            });
        }
    }

    Ok(templates)
}

/// Decode a template (or any background image) into RGBA pixels.
pub fn load_background(path: &Path) -> Result<RgbaImage, TemplateError> {
    let decoded = image::open(path).map_err(|source| TemplateError::Decode {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(decoded.to_rgba8())
}

fn has_template_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| {
            TEMPLATE_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};
    use tempfile::TempDir;

    fn write_png(path: &Path, width: u32, height: u32) {
        RgbaImage::from_pixel(width, height, Rgba([200, 200, 200, 255]))
            .save(path)
            .unwrap();
    }

    #[test]
    fn scan_finds_decodable_images_sorted() {
        let tmp = TempDir::new().unwrap();
        write_png(&tmp.path().join("b-sunset.png"), 40, 30);
        write_png(&tmp.path().join("a-white.png"), 20, 20);
        std::fs::write(tmp.path().join("notes.txt"), "not an image").unwrap();

        let templates = scan_templates(tmp.path()).unwrap();
        assert_eq!(templates.len(), 2);
        assert!(templates[0].path.ends_with("a-white.png"));
        assert_eq!((templates[0].width, templates[0].height), (20, 20));
        assert!(templates[1].path.ends_with("b-sunset.png"));
    }

    #[test]
    fn scan_recurses_one_level() {
        let tmp = TempDir::new().unwrap();
        let sub = tmp.path().join("studio");
        std::fs::create_dir(&sub).unwrap();
        write_png(&sub.join("gray.png"), 10, 10);

        let templates = scan_templates(tmp.path()).unwrap();
        assert_eq!(templates.len(), 1);
    }

    #[test]
    fn scan_skips_undecodable_files_with_image_extension() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("broken.png"), b"png? no").unwrap();
        write_png(&tmp.path().join("good.png"), 10, 10);

        let templates = scan_templates(tmp.path()).unwrap();
        assert_eq!(templates.len(), 1);
        assert!(templates[0].path.ends_with("good.png"));
    }

    #[test]
    fn scan_missing_dir_errors() {
        let result = scan_templates(Path::new("/nonexistent/templates"));
        assert!(matches!(result, Err(TemplateError::DirNotFound(_))));
    }

    #[test]
    fn load_background_decodes_to_rgba() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("bg.png");
        write_png(&path, 12, 9);

        let bg = load_background(&path).unwrap();
        assert_eq!(bg.dimensions(), (12, 9));
    }

    #[test]
    fn load_background_decode_failure_errors() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("bad.png");
        std::fs::write(&path, b"nope").unwrap();

        assert!(matches!(
            load_background(&path),
            Err(TemplateError::Decode { .. })
        ));
    }
}
