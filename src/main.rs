mod acquire;
mod cli;
mod cloud;
mod commands;
mod config;
mod fields;
mod model;
mod ocr;
mod overview;
mod pipeline;
mod table;
mod text;
mod util;

use anyhow::Result;
use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands};
use crate::model::FailureReport;

fn main() {
    init_tracing();
    let _ = dotenvy::dotenv();

    if let Err(err) = run() {
        error!(error = %err, "command failed");
        for cause in err.chain().skip(1) {
            error!(cause = %cause, "caused by");
        }

        let failure = FailureReport {
            success: false,
            error: err.to_string(),
            text: String::new(),
        };
        if let Ok(payload) = serde_json::to_string(&failure) {
            println!("{payload}");
        }
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Extract(args) => commands::extract::run(args),
        Commands::Tools(args) => commands::tools::run(args),
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
