use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "docextract",
    version,
    about = "Document field and table extraction to normalized JSON"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    Extract(ExtractArgs),
    Tools(ToolsArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ExtractArgs {
    #[arg(long)]
    pub input: PathBuf,

    #[arg(long, default_value_t = false)]
    pub pretty: bool,

    #[arg(long)]
    pub max_pages: Option<usize>,

    #[arg(long, default_value = "eng")]
    pub ocr_lang: String,
}

#[derive(Args, Debug, Clone)]
pub struct ToolsArgs {
    #[arg(long, default_value_t = false)]
    pub json: bool,
}
