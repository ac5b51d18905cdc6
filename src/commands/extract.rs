use anyhow::{Context, Result};
use tracing::info;

use crate::cli::ExtractArgs;
use crate::config::Capabilities;
use crate::pipeline::{Pipeline, PipelineOptions};

pub fn run(args: ExtractArgs) -> Result<()> {
    // Environment check happens before the input file is touched.
    let capabilities = Capabilities::resolve()?;

    info!(input = %args.input.display(), "extraction requested");

    let pipeline = Pipeline::new(
        capabilities,
        PipelineOptions {
            max_pages: args.max_pages,
            ocr_lang: args.ocr_lang.clone(),
        },
    );
    let report = pipeline.run(&args.input)?;

    let payload = if args.pretty {
        serde_json::to_string_pretty(&report).context("failed to serialize report")?
    } else {
        serde_json::to_string(&report).context("failed to serialize report")?
    };
    println!("{payload}");

    Ok(())
}
