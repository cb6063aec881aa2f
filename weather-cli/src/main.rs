//! Binary crate for the `weather` command-line tool.
//!
//! This crate focuses on:
//! - Parsing CLI arguments
//! - Interactive configuration
//! - Human-friendly output formatting

use clap::Parser;

mod cli;

const DEFAULT_LOG_FILTER: &str = "warn";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cmd = cli::Cli::parse();
    let _telemetry =
        weather_core::telemetry::init_tracing("weather-cli", cmd.log_level.as_deref(), DEFAULT_LOG_FILTER)?;
    cmd.run().await
}
