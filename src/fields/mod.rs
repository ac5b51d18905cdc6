use crate::model::{AcquiredDocument, FieldSet, ItemRow};
use crate::text;

mod breakdown;
mod date;
mod identifiers;
mod items;
mod number_words;
mod parties;
mod total;
#[cfg(test)]
mod tests;

/// Ordered heuristic passes over the plain text. Each pass fills only fields
/// still unset; arithmetic derivation runs after items so subtotal sums are
/// available, and records provenance for every value it fabricates.
pub fn extract(acquired: &AcquiredDocument, table_rows: &[ItemRow]) -> FieldSet {
    let mut found = FieldSet::default();
    let text_content = acquired.text.as_str();

    found.currency = text::detect_currency(text_content);
    date::fill(&mut found, text_content);
    identifiers::fill(&mut found, text_content);
    parties::fill(&mut found, text_content);
    total::fill(&mut found, text_content, &acquired.bold_total_lines);
    breakdown::fill_labels(&mut found, text_content);
    items::fill(&mut found, text_content, table_rows);
    breakdown::derive(&mut found);
    items::cleanup(&mut found);
    breakdown::cleanup(&mut found);

    found.grand_total = found.total;
    found
}
