use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::cli::ToolsArgs;
use crate::config::Capabilities;

/// Report the resolved external tools and configured network collaborators.
pub fn run(args: ToolsArgs) -> Result<()> {
    let report = Capabilities::report();

    if args.json {
        let payload = serde_json::to_string_pretty(&report).context("failed to serialize report")?;
        println!("{payload}");
        return Ok(());
    }

    log_tool("pdftotext", &report.tools.pdftotext, true);
    log_tool("tesseract", &report.tools.tesseract, true);
    log_tool("pdftoppm", &report.tools.pdftoppm, false);
    log_tool("pdftocairo", &report.tools.pdftocairo, false);
    log_tool("pdftohtml", &report.tools.pdftohtml, false);

    info!(configured = report.vision_configured, "cloud vision fallback");
    info!(configured = report.ocr_space_configured, "ocr.space fallback");

    Ok(())
}

fn log_tool(name: &str, version: &Option<String>, required: bool) {
    match version {
        Some(version) => info!(tool = name, version = %version, "tool available"),
        None if required => warn!(tool = name, "required tool missing"),
        None => info!(tool = name, "optional tool missing"),
    }
}
