use tracing::{debug, info};

use crate::acquire::DocumentSource;
use crate::config::Capabilities;
use crate::model::{AcquiredDocument, ItemRow};

mod grid;
pub(crate) mod layout;
mod ocr_table;
#[cfg(test)]
mod tests;
mod vision_table;
mod word_grid;

/// One item-row extractor. Strategies share a single input/output contract
/// and are tried in a fixed priority order; the first non-empty result wins
/// and partial results are never merged across strategies.
pub trait TableStrategy {
    fn name(&self) -> &'static str;
    fn extract(&self, source: &DocumentSource, acquired: &AcquiredDocument) -> Vec<ItemRow>;
}

/// The cascade in priority order: structural layout reader, coordinate
/// clustering, OCR words, cloud vision. Cheapest and most deterministic
/// sources come first; network fallbacks last.
pub fn strategies(
    capabilities: &Capabilities,
    max_pages: Option<usize>,
    ocr_lang: &str,
) -> Vec<Box<dyn TableStrategy>> {
    vec![
        Box::new(layout::LayoutTableStrategy::new(
            capabilities.clone(),
            max_pages,
        )),
        Box::new(word_grid::WordGridStrategy::new(
            capabilities.clone(),
            max_pages,
        )),
        Box::new(ocr_table::OcrTableStrategy::new(
            capabilities.clone(),
            ocr_lang.to_string(),
        )),
        Box::new(vision_table::VisionTableStrategy::new(
            capabilities.vision_api_key.clone(),
        )),
    ]
}

pub fn run_cascade(
    strategies: &[Box<dyn TableStrategy>],
    source: &DocumentSource,
    acquired: &AcquiredDocument,
) -> Vec<ItemRow> {
    for strategy in strategies {
        let rows = strategy
            .extract(source, acquired)
            .into_iter()
            .filter(ItemRow::is_acceptable)
            .collect::<Vec<ItemRow>>();

        if rows.is_empty() {
            debug!(strategy = strategy.name(), "strategy produced no rows");
            continue;
        }

        info!(
            strategy = strategy.name(),
            rows = rows.len(),
            "table strategy produced rows"
        );
        return rows;
    }

    Vec::new()
}
