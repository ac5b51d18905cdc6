use std::path::Path;
use std::process::Command;

use anyhow::{Context, Result, bail};

use crate::config::Capabilities;
use crate::model::WordBox;

#[cfg(test)]
mod tests;

/// Words below this tesseract confidence are dropped before table analysis.
pub const MIN_WORD_CONFIDENCE: f64 = 40.0;

/// One recognized word with its tesseract line coordinates, so callers can
/// regroup words into the lines the engine itself detected.
#[derive(Debug, Clone)]
pub struct OcrWord {
    pub word: WordBox,
    pub confidence: f64,
    pub line_key: (u32, u32, u32),
}

pub fn recognize_text(
    capabilities: &Capabilities,
    image_path: &Path,
    ocr_lang: &str,
) -> Result<String> {
    let output = Command::new(&capabilities.tesseract)
        .arg(image_path)
        .arg("stdout")
        .arg("-l")
        .arg(ocr_lang)
        .output()
        .with_context(|| format!("failed to execute tesseract for {}", image_path.display()))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!(
            "tesseract returned non-zero exit status for {}: {}",
            image_path.display(),
            stderr.trim()
        );
    }

    Ok(String::from_utf8_lossy(&output.stdout)
        .replace('\u{0000}', "")
        .trim()
        .to_string())
}

pub fn recognize_words(
    capabilities: &Capabilities,
    image_path: &Path,
    ocr_lang: &str,
) -> Result<Vec<OcrWord>> {
    let output = Command::new(&capabilities.tesseract)
        .arg(image_path)
        .arg("stdout")
        .arg("-l")
        .arg(ocr_lang)
        .arg("tsv")
        .output()
        .with_context(|| {
            format!("failed to execute tesseract tsv for {}", image_path.display())
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!(
            "tesseract tsv returned non-zero exit status for {}: {}",
            image_path.display(),
            stderr.trim()
        );
    }

    let raw = String::from_utf8_lossy(&output.stdout).to_string();
    Ok(parse_tsv(&raw)
        .into_iter()
        .filter(|entry| entry.confidence >= MIN_WORD_CONFIDENCE)
        .collect())
}

/// Parse tesseract TSV output. Word entries are level 5 rows; the line key is
/// (block, paragraph, line) as reported by the engine.
pub(crate) fn parse_tsv(raw: &str) -> Vec<OcrWord> {
    let mut words = Vec::new();

    for line in raw.lines().skip(1) {
        let columns = line.split('\t').collect::<Vec<&str>>();
        if columns.len() < 12 {
            continue;
        }
        if columns[0].trim() != "5" {
            continue;
        }

        let block = columns[2].trim().parse::<u32>().unwrap_or(0);
        let paragraph = columns[3].trim().parse::<u32>().unwrap_or(0);
        let line_number = columns[4].trim().parse::<u32>().unwrap_or(0);
        let left = columns[6].trim().parse::<f64>().unwrap_or(0.0);
        let top = columns[7].trim().parse::<f64>().unwrap_or(0.0);
        let width = columns[8].trim().parse::<f64>().unwrap_or(0.0);
        let height = columns[9].trim().parse::<f64>().unwrap_or(0.0);
        let confidence = columns[10].trim().parse::<f64>().unwrap_or(-1.0);
        let token = columns[11].trim();
        if token.is_empty() {
            continue;
        }

        words.push(OcrWord {
            word: WordBox {
                x0: left,
                y0: top,
                x1: left + width,
                y1: top + height,
                text: token.to_string(),
            },
            confidence,
            line_key: (block, paragraph, line_number),
        });
    }

    words
}

/// Regroup OCR words into the engine's own lines, ordered top to bottom and
/// left to right.
pub fn words_into_lines(words: Vec<OcrWord>) -> Vec<Vec<WordBox>> {
    let mut lines: Vec<((u32, u32, u32), Vec<OcrWord>)> = Vec::new();

    for entry in words {
        match lines.iter_mut().find(|(key, _)| *key == entry.line_key) {
            Some((_, bucket)) => bucket.push(entry),
            None => lines.push((entry.line_key, vec![entry])),
        }
    }

    lines.sort_by(|(_, a), (_, b)| {
        let top_a = a
            .iter()
            .map(|entry| entry.word.y0)
            .fold(f64::INFINITY, f64::min);
        let top_b = b
            .iter()
            .map(|entry| entry.word.y0)
            .fold(f64::INFINITY, f64::min);
        top_a.total_cmp(&top_b)
    });

    lines
        .into_iter()
        .map(|(_, mut bucket)| {
            bucket.sort_by(|a, b| a.word.x0.total_cmp(&b.word.x0));
            bucket.into_iter().map(|entry| entry.word).collect()
        })
        .collect()
}
