use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use tracing::{info, warn};

use crate::acquire::{self, AcquireOptions, DocumentSource};
use crate::config::Capabilities;
use crate::fields;
use crate::model::ExtractionReport;
use crate::overview;
use crate::table;
use crate::util::utc_compact_string;

#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub max_pages: Option<usize>,
    pub ocr_lang: String,
}

/// One self-contained extraction run: acquisition, table cascade, field
/// heuristics, overview normalization. Capabilities are resolved by the
/// caller exactly once and injected here.
pub struct Pipeline {
    capabilities: Capabilities,
    options: PipelineOptions,
}

impl Pipeline {
    pub fn new(capabilities: Capabilities, options: PipelineOptions) -> Self {
        Self {
            capabilities,
            options,
        }
    }

    pub fn run(&self, input_path: &Path) -> Result<ExtractionReport> {
        let source = DocumentSource::classify(input_path)?;
        let work_dir = create_work_dir()?;

        let result = self.run_inner(&source, &work_dir);

        if let Err(error) = fs::remove_dir_all(&work_dir) {
            warn!(path = %work_dir.display(), error = %error, "failed to remove work directory");
        }
        result
    }

    fn run_inner(&self, source: &DocumentSource, work_dir: &Path) -> Result<ExtractionReport> {
        let acquire_options = AcquireOptions {
            work_dir: work_dir.to_path_buf(),
            max_pages: self.options.max_pages,
            ocr_lang: self.options.ocr_lang.clone(),
        };

        let acquired = acquire::acquire(source, &self.capabilities, &acquire_options)?;
        info!(
            text_chars = acquired.text.chars().count(),
            page_images = acquired.page_images.len(),
            bold_hints = acquired.bold_total_lines.len(),
            "document acquired"
        );

        let strategies = table::strategies(
            &self.capabilities,
            self.options.max_pages,
            &self.options.ocr_lang,
        );
        let table_rows = table::run_cascade(&strategies, source, &acquired);

        let structured = fields::extract(&acquired, &table_rows);
        let standard_overview = overview::build(&structured);

        Ok(ExtractionReport {
            success: true,
            error: None,
            text: acquired.text,
            structured,
            standard_overview,
        })
    }
}

fn create_work_dir() -> Result<PathBuf> {
    let stamp = utc_compact_string(Utc::now());
    let work_dir = std::env::temp_dir().join(format!(
        "docextract_{}_{}",
        std::process::id(),
        stamp
    ));
    fs::create_dir_all(&work_dir)
        .with_context(|| format!("failed to create work directory {}", work_dir.display()))?;
    Ok(work_dir)
}
