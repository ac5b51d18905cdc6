use regex::Regex;

use crate::model::FieldSet;

/// First line matching any recognized date shape wins: ISO-like, day-first
/// numeric, or month-name forms.
pub(super) fn fill(found: &mut FieldSet, text_content: &str) {
    if found.date.is_some() {
        return;
    }

    let patterns = [
        r"\b\d{4}[-/.]\d{1,2}[-/.]\d{1,2}\b",
        r"\b\d{1,2}[-/.]\d{1,2}[-/.]\d{2,4}\b",
        r"(?i)\b(?:jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)[a-z]*\.?\s+\d{1,2},?\s+\d{4}\b",
        r"(?i)\b\d{1,2}\s+(?:jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)[a-z]*\.?,?\s+\d{4}\b",
    ];
    let regexes = patterns
        .iter()
        .filter_map(|pattern| Regex::new(pattern).ok())
        .collect::<Vec<Regex>>();

    for line in text_content.lines() {
        for regex in &regexes {
            if let Some(matched) = regex.find(line) {
                found.date = Some(matched.as_str().to_string());
                return;
            }
        }
    }
}
