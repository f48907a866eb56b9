//! ical2org CLI entry point.

use std::process::ExitCode;

use clap::Parser;
use tracing::info;

use ical2org_cli::cli::Cli;
use ical2org_cli::config::{ClientConfig, RunOptions};
use ical2org_cli::error::CliResult;
use ical2org_core::init_tracing;

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize tracing
    if let Err(e) = init_tracing(cli.tracing_config()) {
        eprintln!("warning: {}", e);
    }

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> CliResult<()> {
    // Load configuration
    let config = match cli.config {
        Some(ref path) => ClientConfig::load_from(path)?,
        None => ClientConfig::load()?,
    };

    let options = RunOptions::resolve(cli, config)?;
    let report = ical2org_cli::run(&options)?;

    info!(
        accepted = report.accepted,
        skipped = report.total_skipped(),
        "Conversion finished"
    );
    Ok(())
}
