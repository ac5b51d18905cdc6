use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use base64::{Engine, engine::general_purpose::STANDARD as BASE64};

use crate::model::WordBox;

const PARSE_URL: &str = "https://api.ocr.space/parse/image";

/// OCR-as-a-service client used as the table-aware fallback of the OCR table
/// strategy when local word recognition produced nothing.
pub struct OcrSpaceClient {
    api_key: String,
    client: reqwest::blocking::Client,
}

impl OcrSpaceClient {
    pub fn new(api_key: String) -> Result<Self> {
        Ok(Self {
            api_key,
            client: super::blocking_client()?,
        })
    }

    pub fn detect_words(&self, image_path: &Path) -> Result<Vec<WordBox>> {
        let bytes = fs::read(image_path)
            .with_context(|| format!("failed to read image {}", image_path.display()))?;
        let encoded = format!("data:image/png;base64,{}", BASE64.encode(&bytes));

        let response = self
            .client
            .post(PARSE_URL)
            .form(&[
                ("apikey", self.api_key.as_str()),
                ("base64Image", encoded.as_str()),
                ("isOverlayRequired", "true"),
                ("isTable", "true"),
                ("OCREngine", "2"),
            ])
            .send()
            .context("ocr.space request failed")?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().unwrap_or_default();
            bail!("ocr.space request returned {}: {}", status, detail.trim());
        }

        let payload = response
            .json::<serde_json::Value>()
            .context("ocr.space response was not valid json")?;
        words_from_response(&payload)
    }
}

pub(crate) fn words_from_response(payload: &serde_json::Value) -> Result<Vec<WordBox>> {
    if payload
        .get("IsErroredOnProcessing")
        .and_then(|value| value.as_bool())
        .unwrap_or(false)
    {
        let message = payload
            .get("ErrorMessage")
            .map(|value| value.to_string())
            .unwrap_or_else(|| "unknown error".to_string());
        bail!("ocr.space reported a processing error: {message}");
    }

    let lines = payload
        .get("ParsedResults")
        .and_then(|results| results.as_array())
        .and_then(|results| results.first())
        .and_then(|result| result.get("TextOverlay"))
        .and_then(|overlay| overlay.get("Lines"))
        .and_then(|lines| lines.as_array());

    let Some(lines) = lines else {
        return Ok(Vec::new());
    };

    let mut words = Vec::new();
    for line in lines {
        let Some(line_words) = line.get("Words").and_then(|value| value.as_array()) else {
            continue;
        };
        for word in line_words {
            let Some(text) = word.get("WordText").and_then(|value| value.as_str()) else {
                continue;
            };
            let left = word.get("Left").and_then(|value| value.as_f64()).unwrap_or(0.0);
            let top = word.get("Top").and_then(|value| value.as_f64()).unwrap_or(0.0);
            let width = word.get("Width").and_then(|value| value.as_f64()).unwrap_or(0.0);
            let height = word.get("Height").and_then(|value| value.as_f64()).unwrap_or(0.0);
            if text.trim().is_empty() {
                continue;
            }

            words.push(WordBox {
                x0: left,
                y0: top,
                x1: left + width,
                y1: top + height,
                text: text.trim().to_string(),
            });
        }
    }

    Ok(words)
}
