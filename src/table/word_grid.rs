use std::process::Command;

use regex::Regex;
use tracing::warn;

use crate::acquire::{DocumentSource, SourceKind};
use crate::config::Capabilities;
use crate::model::{AcquiredDocument, ItemRow, WordBox};
use crate::text;

use super::TableStrategy;
use super::grid;

/// Coordinate-clustering reader over the embedded text layer's word boxes.
/// Handles documents whose tables are visible but not tagged.
pub(crate) struct WordGridStrategy {
    capabilities: Capabilities,
    max_pages: Option<usize>,
}

impl WordGridStrategy {
    pub(crate) fn new(capabilities: Capabilities, max_pages: Option<usize>) -> Self {
        Self {
            capabilities,
            max_pages,
        }
    }

    fn word_pages(&self, source: &DocumentSource) -> Vec<Vec<WordBox>> {
        let mut command = Command::new(&self.capabilities.pdftotext);
        command.arg("-bbox").arg("-enc").arg("UTF-8").arg("-f").arg("1");
        if let Some(max_pages) = self.max_pages {
            command.arg("-l").arg(max_pages.to_string());
        }
        command.arg(&source.path).arg("-");

        let output = match command.output() {
            Ok(output) => output,
            Err(error) => {
                warn!(error = %error, "pdftotext -bbox execution failed");
                return Vec::new();
            }
        };
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            warn!(stderr = %stderr.trim(), "pdftotext -bbox returned non-zero exit status");
            return Vec::new();
        }

        pages_from_bbox_xml(&String::from_utf8_lossy(&output.stdout))
    }
}

impl TableStrategy for WordGridStrategy {
    fn name(&self) -> &'static str {
        "word-grid"
    }

    fn extract(&self, source: &DocumentSource, _acquired: &AcquiredDocument) -> Vec<ItemRow> {
        if source.kind != SourceKind::Pdf {
            return Vec::new();
        }

        let mut rows = Vec::new();
        for words in self.word_pages(source) {
            let lines = grid::group_into_lines(words, grid::LINE_GROUP_TOLERANCE);
            rows.extend(grid::rows_from_word_lines(&lines));
        }
        rows
    }
}

/// Parse the XHTML emitted by `pdftotext -bbox` into per-page word boxes.
pub(crate) fn pages_from_bbox_xml(xml: &str) -> Vec<Vec<WordBox>> {
    let word_regex = match Regex::new(
        r#"<word xMin="([-0-9.]+)" yMin="([-0-9.]+)" xMax="([-0-9.]+)" yMax="([-0-9.]+)">([^<]*)</word>"#,
    ) {
        Ok(regex) => regex,
        Err(_) => return Vec::new(),
    };

    let mut pages = Vec::new();
    for chunk in xml.split("<page").skip(1) {
        let mut words = Vec::new();
        for captures in word_regex.captures_iter(chunk) {
            let x0 = captures[1].parse::<f64>().unwrap_or(0.0);
            let y0 = captures[2].parse::<f64>().unwrap_or(0.0);
            let x1 = captures[3].parse::<f64>().unwrap_or(0.0);
            let y1 = captures[4].parse::<f64>().unwrap_or(0.0);
            let token = text::unescape_xml(&captures[5]).trim().to_string();
            if token.is_empty() {
                continue;
            }
            words.push(WordBox {
                x0,
                y0,
                x1,
                y1,
                text: token,
            });
        }
        pages.push(words);
    }

    pages
}
