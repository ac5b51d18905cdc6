use tracing::warn;

use crate::acquire::DocumentSource;
use crate::cloud::vision::VisionClient;
use crate::model::{AcquiredDocument, ItemRow};

use super::TableStrategy;
use super::grid;

/// Cloud-vision reader: word bounding boxes from document text detection.
/// Gated on the API key being configured; tried only after every local
/// strategy came up empty.
pub(crate) struct VisionTableStrategy {
    api_key: Option<String>,
}

impl VisionTableStrategy {
    pub(crate) fn new(api_key: Option<String>) -> Self {
        Self { api_key }
    }
}

impl TableStrategy for VisionTableStrategy {
    fn name(&self) -> &'static str {
        "cloud-vision"
    }

    fn extract(&self, _source: &DocumentSource, acquired: &AcquiredDocument) -> Vec<ItemRow> {
        let Some(api_key) = &self.api_key else {
            return Vec::new();
        };
        if acquired.page_images.is_empty() {
            return Vec::new();
        }

        let client = match VisionClient::new(api_key.clone()) {
            Ok(client) => client,
            Err(error) => {
                warn!(error = %error, "vision client construction failed");
                return Vec::new();
            }
        };

        let mut rows = Vec::new();
        for image in &acquired.page_images {
            let words = match client.detect_words(&image.png_path) {
                Ok(words) => words,
                Err(error) => {
                    warn!(page = image.page_number, error = %error, "vision call failed");
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
