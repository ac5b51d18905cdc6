use std::path::Path;

use anyhow::Result;
use tracing::warn;

use crate::config::Capabilities;
use crate::model::{AcquiredDocument, PageImage};
use crate::ocr;

use super::AcquireOptions;

/// A photographed or scanned document: recognize the whole image and keep it
/// as the single page image for the table strategies.
pub(super) fn acquire_image(
    image_path: &Path,
    capabilities: &Capabilities,
    options: &AcquireOptions,
) -> Result<AcquiredDocument> {
    let text = match ocr::recognize_text(capabilities, image_path, &options.ocr_lang) {
        Ok(recognized) => recognized,
        Err(error) => {
            warn!(path = %image_path.display(), error = %error, "image ocr failed");
            String::new()
        }
    };

    Ok(AcquiredDocument {
        text,
        page_images: vec![PageImage {
            page_number: 1,
            png_path: image_path.to_path_buf(),
        }],
        bold_total_lines: Vec::new(),
    })
}
