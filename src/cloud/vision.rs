use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use serde_json::json;

use crate::model::WordBox;

const ANNOTATE_URL: &str = "https://vision.googleapis.com/v1/images:annotate";

/// Cloud document-text-detection client. Constructed only when an API key is
/// configured; invoked at most once per page image.
pub struct VisionClient {
    api_key: String,
    client: reqwest::blocking::Client,
}

impl VisionClient {
    pub fn new(api_key: String) -> Result<Self> {
        Ok(Self {
            api_key,
            client: super::blocking_client()?,
        })
    }

    /// Word bounding boxes for one image, in reading order as returned by the
    /// service.
    pub fn detect_words(&self, image_path: &Path) -> Result<Vec<WordBox>> {
        let bytes = fs::read(image_path)
            .with_context(|| format!("failed to read image {}", image_path.display()))?;

        let body = json!({
            "requests": [{
                "image": { "content": BASE64.encode(&bytes) },
                "features": [{ "type": "DOCUMENT_TEXT_DETECTION" }]
            }]
        });

        let response = self
            .client
            .post(format!("{}?key={}", ANNOTATE_URL, self.api_key))
            .json(&body)
            .send()
            .context("vision request failed")?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().unwrap_or_default();
            bail!("vision request returned {}: {}", status, detail.trim());
        }

        let payload = response
            .json::<serde_json::Value>()
            .context("vision response was not valid json")?;
        Ok(words_from_response(&payload))
    }
}

/// The first text annotation is the full-page text; the rest are individual
/// words with bounding polygons.
pub(crate) fn words_from_response(payload: &serde_json::Value) -> Vec<WordBox> {
    let annotations = payload
        .get("responses")
        .and_then(|responses| responses.as_array())
        .and_then(|responses| responses.first())
        .and_then(|response| response.get("textAnnotations"))
        .and_then(|annotations| annotations.as_array());

    let Some(annotations) = annotations else {
        return Vec::new();
    };

    let mut words = Vec::new();
    for annotation in annotations.iter().skip(1) {
        let Some(text) = annotation.get("description").and_then(|value| value.as_str()) else {
            continue;
        };
        let Some(vertices) = annotation
            .get("boundingPoly")
            .and_then(|poly| poly.get("vertices"))
            .and_then(|vertices| vertices.as_array())
        else {
            continue;
        };

        let xs = vertices
            .iter()
            .map(|vertex| vertex.get("x").and_then(|value| value.as_f64()).unwrap_or(0.0))
            .collect::<Vec<f64>>();
        let ys = vertices
            .iter()
            .map(|vertex| vertex.get("y").and_then(|value| value.as_f64()).unwrap_or(0.0))
            .collect::<Vec<f64>>();
        if xs.is_empty() || ys.is_empty() || text.trim().is_empty() {
            continue;
        }

        words.push(WordBox {
            x0: xs.iter().copied().fold(f64::INFINITY, f64::min),
            y0: ys.iter().copied().fold(f64::INFINITY, f64::min),
            x1: xs.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            y1: ys.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            text: text.trim().to_string(),
        });
    }

    words
}
