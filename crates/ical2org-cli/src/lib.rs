//! CLI, configuration and run orchestration
//!
//! This crate provides the `ical2org` command-line interface.

pub mod cli;
pub mod config;
pub mod error;
pub mod run;

pub use cli::Cli;
pub use config::{ClientConfig, OutputFormat, OutputTarget, RunOptions};
pub use error::{CliError, CliResult};
pub use run::{run, run_at, write_output};
