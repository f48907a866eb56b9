//! Configuration.
//!
//! Settings can live in an optional `config.toml` at
//! `~/.config/ical2org/config.toml` (or the path given with `--config`).
//! Every value there is a default; command-line flags win.
//!
//! ```toml
//! base_url = "school.instructure.com"
//! timezone = "America/New_York"
//! file_prefix = "#+TITLE: Coursework"
//! org_ignore_file = "/home/me/org/school.org"
//! time_delta = 21
//! ignore = ["HIST101"]
//! todo_keyword = "TODO"
//! ```

use std::path::{Path, PathBuf};

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use tracing::debug;

use ical2org_core::{DEFAULT_LOOKAHEAD_DAYS, DEFAULT_TODO_KEYWORD, EmitOptions, PipelineOptions};

use crate::cli::Cli;
use crate::error::{CliError, CliResult};

/// Timezone used when neither the command line nor the config file sets one.
pub const DEFAULT_TIMEZONE: &str = "America/New_York";

// ---------------------------------------------------------------------------
// ClientConfig (config.toml)
// ---------------------------------------------------------------------------

/// Contents of `config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL of the Canvas instance.
    pub base_url: Option<String>,

    /// IANA timezone name.
    pub timezone: Option<String>,

    /// Text written at the top of the output.
    pub file_prefix: Option<String>,

    /// Dedup reference document.
    pub org_ignore_file: Option<PathBuf>,

    /// Lookahead in days.
    pub time_delta: Option<u32>,

    /// Course titles to ignore.
    pub ignore: Vec<String>,

    /// Keyword for assignment headings.
    pub todo_keyword: Option<String>,
}

impl ClientConfig {
    /// Loads configuration from the default path, if it exists.
    pub fn load() -> CliResult<Self> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Loads configuration from a specific path.
    pub fn load_from(path: &Path) -> CliResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| CliError::read(path, e))?;
        let config: Self = toml::from_str(&content).map_err(|e| {
            CliError::config(format!("failed to parse {}: {}", path.display(), e))
        })?;
        debug!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Returns the default configuration file path.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("ical2org")
            .join("config.toml")
    }
}

// ---------------------------------------------------------------------------
// RunOptions (resolved)
// ---------------------------------------------------------------------------

/// Where the document goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    /// Standard output.
    Stdout,
    /// A file, replaced atomically.
    File(PathBuf),
}

/// Rendering of the output document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Org outline.
    #[default]
    Org,
    /// Grouped records as JSON.
    Json,
}

/// Everything one run needs, after merging flags and config file.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub ics: PathBuf,
    pub output: OutputTarget,
    pub format: OutputFormat,
    pub dedup_reference: Option<PathBuf>,
    pub pipeline: PipelineOptions,
    pub emit: EmitOptions,
}

impl RunOptions {
    /// Merges command-line flags over config file values.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if no base URL is given or the timezone
    /// is unknown.
    pub fn resolve(cli: Cli, config: ClientConfig) -> CliResult<Self> {
        let base_url = cli.url.or(config.base_url).ok_or_else(|| {
            CliError::config(format!(
                "no Canvas base URL given. Pass it as the third argument or set base_url in {}",
                ClientConfig::default_path().display()
            ))
        })?;

        let timezone_name = cli
            .timezone
            .or(config.timezone)
            .unwrap_or_else(|| DEFAULT_TIMEZONE.to_string());
        let timezone = parse_timezone(&timezone_name)?;

        let lookahead_days = cli
            .time_delta
            .or(config.time_delta)
            .unwrap_or(DEFAULT_LOOKAHEAD_DAYS);

        let pipeline = PipelineOptions::new(timezone, &base_url)
            .with_lookahead_days(lookahead_days)
            .with_excluded(config.ignore.into_iter().chain(cli.ignore));

        let emit = EmitOptions::default()
            .with_prefix(cli.file_prefix.or(config.file_prefix).unwrap_or_default())
            .with_todo_keyword(
                cli.todo_keyword
                    .or(config.todo_keyword)
                    .unwrap_or_else(|| DEFAULT_TODO_KEYWORD.to_string()),
            );

        let output = if cli.org.as_os_str() == "-" {
            OutputTarget::Stdout
        } else {
            OutputTarget::File(cli.org)
        };

        Ok(Self {
            ics: cli.ics,
            output,
            format: if cli.json {
                OutputFormat::Json
            } else {
                OutputFormat::Org
            },
            dedup_reference: cli.org_ignore_file.or(config.org_ignore_file),
            pipeline,
            emit,
        })
    }
}

/// Parses an IANA timezone name.
pub fn parse_timezone(name: &str) -> CliResult<Tz> {
    name.trim()
        .parse::<Tz>()
        .map_err(|_| CliError::config(format!("unknown timezone: {name:?}")))
}
