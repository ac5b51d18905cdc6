use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{Result, bail};

use crate::model::{CapabilityReport, ToolVersions};
use crate::util::now_utc_string;

/// External tools and optional network collaborators, resolved exactly once
/// before any input is read. Absence of an optional entry disables the
/// matching fallback instead of failing.
#[derive(Debug, Clone)]
pub struct Capabilities {
    pub pdftotext: PathBuf,
    pub tesseract: PathBuf,
    pub pdftoppm: Option<PathBuf>,
    pub pdftocairo: Option<PathBuf>,
    pub pdftohtml: Option<PathBuf>,
    pub vision_api_key: Option<String>,
    pub ocr_space_api_key: Option<String>,
}

impl Capabilities {
    pub fn resolve() -> Result<Self> {
        let tesseract = env_path("TESSERACT_PATH").unwrap_or_else(|| PathBuf::from("tesseract"));
        let poppler_dir = env_path("POPPLER_PATH");
        let pdftotext = poppler_tool(&poppler_dir, "pdftotext");

        if !command_available(&pdftotext) {
            bail!(
                "pdftotext is not available ({}); install poppler-utils or set POPPLER_PATH",
                pdftotext.display()
            );
        }
        if !command_available(&tesseract) {
            bail!(
                "tesseract is not available ({}); install tesseract-ocr or set TESSERACT_PATH",
                tesseract.display()
            );
        }

        Ok(Self {
            pdftotext,
            tesseract,
            pdftoppm: optional_tool(poppler_tool(&poppler_dir, "pdftoppm")),
            pdftocairo: optional_tool(poppler_tool(&poppler_dir, "pdftocairo")),
            pdftohtml: optional_tool(poppler_tool(&poppler_dir, "pdftohtml")),
            vision_api_key: env_value("VISION_API_KEY"),
            ocr_space_api_key: env_value("OCRSPACE_API_KEY"),
        })
    }

    pub fn report() -> CapabilityReport {
        let poppler_dir = env_path("POPPLER_PATH");
        let tesseract = env_path("TESSERACT_PATH").unwrap_or_else(|| PathBuf::from("tesseract"));
        CapabilityReport {
            generated_at: now_utc_string(),
            tools: ToolVersions {
                pdftotext: command_version(&poppler_tool(&poppler_dir, "pdftotext"), &["-v"]),
                tesseract: command_version(&tesseract, &["--version"]),
                pdftoppm: command_version(&poppler_tool(&poppler_dir, "pdftoppm"), &["-v"]),
                pdftocairo: command_version(&poppler_tool(&poppler_dir, "pdftocairo"), &["-v"]),
                pdftohtml: command_version(&poppler_tool(&poppler_dir, "pdftohtml"), &["-v"]),
            },
            vision_configured: env_value("VISION_API_KEY").is_some(),
            ocr_space_configured: env_value("OCRSPACE_API_KEY").is_some(),
        }
    }
}

fn env_value(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn env_path(name: &str) -> Option<PathBuf> {
    env_value(name).map(PathBuf::from)
}

fn poppler_tool(poppler_dir: &Option<PathBuf>, name: &str) -> PathBuf {
    match poppler_dir {
        Some(dir) => dir.join(name),
        None => PathBuf::from(name),
    }
}

fn optional_tool(path: PathBuf) -> Option<PathBuf> {
    if command_available(&path) { Some(path) } else { None }
}

pub fn command_available(program: &Path) -> bool {
    Command::new(program).arg("--version").output().is_ok()
}

/// First line of a tool's version banner, whichever stream it prints to.
pub fn command_version(program: &Path, args: &[&str]) -> Option<String> {
    let output = Command::new(program).args(args).output().ok()?;

    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    let source = if stdout.trim().is_empty() {
        stderr.trim()
    } else {
        stdout.trim()
    };

    source
        .lines()
        .next()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| line.to_string())
}
