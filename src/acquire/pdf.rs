use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{Context, Result, bail};
use regex::Regex;
use tracing::{debug, warn};

use crate::config::Capabilities;
use crate::model::{AcquiredDocument, PageImage};
use crate::ocr;
use crate::text;

use super::AcquireOptions;

pub(super) fn acquire_pdf(
    pdf_path: &Path,
    capabilities: &Capabilities,
    options: &AcquireOptions,
) -> Result<AcquiredDocument> {
    let pages = extract_pages_with_pdftotext(capabilities, pdf_path, options.max_pages)?;

    let mut text = String::new();
    let mut page_images = Vec::new();

    for (index, page) in pages.iter().enumerate() {
        let page_number = index + 1;
        if non_whitespace_char_count(page) > 0 {
            text.push_str(page);
            text.push('\n');
            continue;
        }

        // Empty text layer: rasterize and recognize, degrading to nothing.
        match rasterize_page(capabilities, pdf_path, page_number, &options.work_dir) {
            Ok(png_path) => {
                match ocr::recognize_text(capabilities, &png_path, &options.ocr_lang) {
                    Ok(recognized) => {
                        if !recognized.is_empty() {
                            text.push_str(&recognized);
                            text.push('\n');
                        }
                    }
                    Err(error) => {
                        warn!(page = page_number, error = %error, "page ocr failed");
                    }
                }
                page_images.push(PageImage {
                    page_number,
                    png_path,
                });
            }
            Err(error) => {
                warn!(page = page_number, error = %error, "page rasterization failed");
            }
        }
    }

    let bold_total_lines = scan_bold_total_lines(capabilities, pdf_path);

    Ok(AcquiredDocument {
        text: text.trim().to_string(),
        page_images,
        bold_total_lines,
    })
}

pub(super) fn extract_pages_with_pdftotext(
    capabilities: &Capabilities,
    pdf_path: &Path,
    max_pages: Option<usize>,
) -> Result<Vec<String>> {
    let mut command = Command::new(&capabilities.pdftotext);
    command.arg("-enc").arg("UTF-8").arg("-f").arg("1");
    if let Some(max_pages) = max_pages {
        command.arg("-l").arg(max_pages.to_string());
    }
    command.arg(pdf_path).arg("-");

    let output = command
        .output()
        .with_context(|| format!("failed to execute pdftotext for {}", pdf_path.display()))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!(
            "pdftotext returned non-zero exit status for {}: {}",
            pdf_path.display(),
            stderr.trim()
        );
    }

    let raw = String::from_utf8_lossy(&output.stdout);
    let mut pages: Vec<String> = raw
        .split('\u{000C}')
        .map(|chunk| chunk.replace('\u{0000}', ""))
        .collect();

    while let Some(last_page) = pages.last() {
        if last_page.trim().is_empty() {
            pages.pop();
            continue;
        }
        break;
    }

    Ok(pages)
}

/// Layout-preserving text for the structural table reader.
pub(crate) fn extract_layout_text(
    capabilities: &Capabilities,
    pdf_path: &Path,
    max_pages: Option<usize>,
) -> Result<String> {
    let mut command = Command::new(&capabilities.pdftotext);
    command.arg("-layout").arg("-enc").arg("UTF-8").arg("-f").arg("1");
    if let Some(max_pages) = max_pages {
        command.arg("-l").arg(max_pages.to_string());
    }
    command.arg(pdf_path).arg("-");

    let output = command
        .output()
        .with_context(|| format!("failed to execute pdftotext -layout for {}", pdf_path.display()))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!(
            "pdftotext -layout returned non-zero exit status for {}: {}",
            pdf_path.display(),
            stderr.trim()
        );
    }

    Ok(String::from_utf8_lossy(&output.stdout).replace('\u{0000}', ""))
}

/// Render one page to PNG, preferring pdftoppm and falling back to pdftocairo.
fn rasterize_page(
    capabilities: &Capabilities,
    pdf_path: &Path,
    page_number: usize,
    work_dir: &Path,
) -> Result<PathBuf> {
    let output_root = work_dir.join(format!("page_{page_number:04}"));
    let png_path = PathBuf::from(format!("{}.png", output_root.display()));

    if let Some(pdftoppm) = &capabilities.pdftoppm {
        let output = Command::new(pdftoppm)
            .arg("-f")
            .arg(page_number.to_string())
            .arg("-l")
            .arg(page_number.to_string())
            .arg("-singlefile")
            .arg("-png")
            .arg("-r")
            .arg("200")
            .arg(pdf_path)
            .arg(&output_root)
            .output()
            .with_context(|| format!("failed to execute pdftoppm for {}", pdf_path.display()))?;

        if output.status.success() && png_path.exists() {
            return Ok(png_path);
        }
        let stderr = String::from_utf8_lossy(&output.stderr);
        debug!(page = page_number, stderr = %stderr.trim(), "pdftoppm failed, trying pdftocairo");
    }

    let Some(pdftocairo) = &capabilities.pdftocairo else {
        bail!(
            "no rasterizer available for {} page {}",
            pdf_path.display(),
            page_number
        );
    };

    let output = Command::new(pdftocairo)
        .arg("-png")
        .arg("-singlefile")
        .arg("-f")
        .arg(page_number.to_string())
        .arg("-l")
        .arg(page_number.to_string())
        .arg("-r")
        .arg("200")
        .arg(pdf_path)
        .arg(&output_root)
        .output()
        .with_context(|| format!("failed to execute pdftocairo for {}", pdf_path.display()))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!(
            "pdftocairo returned non-zero exit status for {} page {}: {}",
            pdf_path.display(),
            page_number,
            stderr.trim()
        );
    }
    if !png_path.exists() {
        bail!(
            "pdftocairo did not produce expected image for {} page {}",
            pdf_path.display(),
            page_number
        );
    }

    Ok(png_path)
}

/// Bold styled runs that mention a currency or "total" are high-confidence
/// hints for grand-total detection. pdftohtml being unavailable or failing
/// yields no hints.
fn scan_bold_total_lines(capabilities: &Capabilities, pdf_path: &Path) -> Vec<String> {
    let Some(pdftohtml) = &capabilities.pdftohtml else {
        return Vec::new();
    };

    let output = match Command::new(pdftohtml)
        .arg("-xml")
        .arg("-stdout")
        .arg("-i")
        .arg(pdf_path)
        .output()
    {
        Ok(output) => output,
        Err(error) => {
            warn!(error = %error, "pdftohtml execution failed");
            return Vec::new();
        }
    };

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        warn!(stderr = %stderr.trim(), "pdftohtml returned non-zero exit status");
        return Vec::new();
    }

    bold_total_lines_from_xml(&String::from_utf8_lossy(&output.stdout))
}

pub(super) fn bold_total_lines_from_xml(xml: &str) -> Vec<String> {
    let text_regex = match Regex::new(r"<text[^>]*>(?s)(.*?)</text>") {
        Ok(regex) => regex,
        Err(_) => return Vec::new(),
    };
    let tag_regex = match Regex::new(r"<[^>]+>") {
        Ok(regex) => regex,
        Err(_) => return Vec::new(),
    };

    let mut lines = Vec::new();
    for captures in text_regex.captures_iter(xml) {
        let Some(body) = captures.get(1) else {
            continue;
        };
        if !body.as_str().contains("<b>") {
            continue;
        }

        let stripped = tag_regex.replace_all(body.as_str(), " ");
        let line = text::unescape_xml(&stripped)
            .split_whitespace()
            .collect::<Vec<&str>>()
            .join(" ");
        if line.is_empty() {
            continue;
        }

        let lowered = line.to_lowercase();
        if text::has_currency_marker(&line) || lowered.contains("total") {
            if !lines.contains(&line) {
                lines.push(line);
            }
        }
    }

    lines
}

fn non_whitespace_char_count(text: &str) -> usize {
    text.chars()
        .filter(|character| !character.is_whitespace())
        .count()
}
