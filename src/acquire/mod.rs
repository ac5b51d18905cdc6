use std::path::{Path, PathBuf};

use anyhow::{Result, bail};

use crate::config::Capabilities;
use crate::model::AcquiredDocument;

mod image;
mod pdf;
mod sheet;

pub(crate) use pdf::extract_layout_text;

pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tif", "tiff", "webp"];
pub const SHEET_EXTENSIONS: &[&str] = &["xlsx", "xls", "ods", "csv"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Image,
    Pdf,
    Spreadsheet,
}

#[derive(Debug, Clone)]
pub struct DocumentSource {
    pub path: PathBuf,
    pub kind: SourceKind,
}

impl DocumentSource {
    pub fn classify(path: &Path) -> Result<Self> {
        if !path.exists() {
            bail!("file not found: {}", path.display());
        }

        let extension = path
            .extension()
            .and_then(|value| value.to_str())
            .map(|value| value.to_ascii_lowercase())
            .unwrap_or_default();

        let kind = if IMAGE_EXTENSIONS.contains(&extension.as_str()) {
            SourceKind::Image
        } else if extension == "pdf" {
            SourceKind::Pdf
        } else if SHEET_EXTENSIONS.contains(&extension.as_str()) {
            SourceKind::Spreadsheet
        } else {
            bail!("unsupported file type: .{extension}");
        };

        Ok(Self {
            path: path.to_path_buf(),
            kind,
        })
    }
}

#[derive(Debug, Clone)]
pub struct AcquireOptions {
    pub work_dir: PathBuf,
    pub max_pages: Option<usize>,
    pub ocr_lang: String,
}

/// Produce plain text, page images and bold-total hints for one document.
/// Per-stage failures degrade to empty contributions; only input-level
/// failures (unreadable document) propagate.
pub fn acquire(
    source: &DocumentSource,
    capabilities: &Capabilities,
    options: &AcquireOptions,
) -> Result<AcquiredDocument> {
    match source.kind {
        SourceKind::Image => image::acquire_image(&source.path, capabilities, options),
        SourceKind::Pdf => pdf::acquire_pdf(&source.path, capabilities, options),
        SourceKind::Spreadsheet => sheet::acquire_sheet(&source.path),
    }
}
