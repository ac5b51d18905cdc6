pub mod ocrspace;
pub mod vision;

#[cfg(test)]
mod tests;

use std::time::Duration;

use anyhow::{Context, Result};

pub(crate) fn blocking_client() -> Result<reqwest::blocking::Client> {
    reqwest::blocking::Client::builder()
        .timeout(Duration::from_secs(60))
        .build()
        .context("failed to build http client")
}
