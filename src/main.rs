mod args;
mod commands;
mod shared;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use args::Cli;
use commands::run_cli;

// Parse CLI args, set up stderr logging, and run the single requested exchange batch.
fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging();
    run_cli(cli)
}

// Diagnostics go to stderr so stdout carries only sentences and receiver output.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
