use tracing::warn;

use crate::acquire::DocumentSource;
use crate::cloud::ocrspace::OcrSpaceClient;
use crate::config::Capabilities;
use crate::model::{AcquiredDocument, ItemRow};
use crate::ocr;

use super::TableStrategy;
use super::grid;

/// OCR-table reader: tesseract word output over page images, with the
/// OCR.space overlay as a table-aware fallback when the key is configured and
/// local recognition yielded no rows.
pub(crate) struct OcrTableStrategy {
    capabilities: Capabilities,
    ocr_lang: String,
}

impl OcrTableStrategy {
    pub(crate) fn new(capabilities: Capabilities, ocr_lang: String) -> Self {
        Self {
            capabilities,
            ocr_lang,
        }
    }

    fn tesseract_rows(&self, acquired: &AcquiredDocument) -> Vec<ItemRow> {
        let mut rows = Vec::new();
        for image in &acquired.page_images {
            let words =
                match ocr::recognize_words(&self.capabilities, &image.png_path, &self.ocr_lang) {
                    Ok(words) => words,
                    Err(error) => {
                        warn!(page = image.page_number, error = %error, "ocr word extraction failed");
                        continue;
                    }
                };
            let lines = ocr::words_into_lines(words);
            rows.extend(grid::rows_from_word_lines(&lines));
        }
        rows
    }

    fn ocr_space_rows(&self, acquired: &AcquiredDocument) -> Vec<ItemRow> {
        let Some(api_key) = &self.capabilities.ocr_space_api_key else {
            return Vec::new();
        };
        let client = match OcrSpaceClient::new(api_key.clone()) {
            Ok(client) => client,
            Err(error) => {
                warn!(error = %error, "ocr.space client construction failed");
                return Vec::new();
            }
        };

        let mut rows = Vec::new();
        for image in &acquired.page_images {
            let words = match client.detect_words(&image.png_path) {
                Ok(words) => words,
                Err(error) => {
                    warn!(page = image.page_number, error = %error, "ocr.space call failed");
                    continue;
                }
            };
            let tolerance = grid::adaptive_line_tolerance(&words);
            let lines = grid::group_into_lines(words, tolerance);
            rows.extend(grid::rows_from_word_lines(&lines));
        }
        rows
    }
}

impl TableStrategy for OcrTableStrategy {
    fn name(&self) -> &'static str {
        "ocr-table"
    }

    fn extract(&self, _source: &DocumentSource, acquired: &AcquiredDocument) -> Vec<ItemRow> {
        if acquired.page_images.is_empty() {
            return Vec::new();
        }

        let rows = self.tesseract_rows(acquired);
        if !rows.is_empty() {
            return rows;
        }
        self.ocr_space_rows(acquired)
    }
}
