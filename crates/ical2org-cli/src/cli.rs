//! Command-line interface definition.

use std::path::PathBuf;

use clap::Parser;
use ical2org_core::{TracingConfig, TracingOutputFormat};

/// ical2org - Canvas calendar feed to Org outline
#[derive(Debug, Parser)]
#[command(name = "ical2org")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the downloaded ICS file
    #[arg(value_name = "ICS")]
    pub ics: PathBuf,

    /// Path to the Org file to write (`-` for stdout)
    #[arg(value_name = "ORG")]
    pub org: PathBuf,

    /// Base URL of the Canvas instance (e.g. school.instructure.com)
    #[arg(value_name = "URL")]
    pub url: Option<String>,

    /// Text to put at the beginning of the file (e.g. an org-roam id)
    #[arg(long, short = 'p', visible_alias = "fileprefix")]
    pub file_prefix: Option<String>,

    /// Org file listing items already in progress; their links are not emitted again
    #[arg(long, short = 'i', visible_alias = "orgignorefile")]
    pub org_ignore_file: Option<PathBuf>,

    /// How many days to look into the future
    #[arg(long, short = 't', visible_alias = "timedelta")]
    pub time_delta: Option<u32>,

    /// Course title(s) to ignore (can be repeated)
    #[arg(long, short = 'g', num_args = 1.., action = clap::ArgAction::Append)]
    pub ignore: Vec<String>,

    /// IANA timezone all times are shown in
    #[arg(long, env = "ICAL2ORG_TIMEZONE")]
    pub timezone: Option<String>,

    /// Keyword for assignment headings
    #[arg(long)]
    pub todo_keyword: Option<String>,

    /// Write the grouped records as JSON instead of Org
    #[arg(long)]
    pub json: bool,

    /// Path to configuration file
    #[arg(long, short, env = "ICAL2ORG_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable debug output
    #[arg(long, short = 'v')]
    pub debug: bool,

    /// Write log lines as JSON objects
    #[arg(long)]
    pub log_json: bool,

    /// Log filter directive (e.g. `ical2org_core=trace`), overrides RUST_LOG
    #[arg(long, env = "ICAL2ORG_LOG")]
    pub log_filter: Option<String>,
}

impl Cli {
    /// Builds the logging setup requested on the command line.
    pub fn tracing_config(&self) -> TracingConfig {
        let mut config = if self.debug {
            TracingConfig::cli_debug()
        } else {
            TracingConfig::default()
        };
        if self.log_json {
            config = config.with_format(TracingOutputFormat::Json);
        }
        if let Some(filter) = &self.log_filter {
            config = config.with_env_filter(filter.as_str());
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positional_arguments() {
        let cli = Cli::try_parse_from([
            "ical2org",
            "feed.ics",
            "gcal.org",
            "school.instructure.com",
        ])
        .unwrap();
        assert_eq!(cli.ics, PathBuf::from("feed.ics"));
        assert_eq!(cli.org, PathBuf::from("gcal.org"));
        assert_eq!(cli.url.as_deref(), Some("school.instructure.com"));
        assert!(cli.ignore.is_empty());
        assert!(cli.time_delta.is_none());
        assert!(!cli.json);
    }

    #[test]
    fn url_is_optional() {
        let cli = Cli::try_parse_from(["ical2org", "feed.ics", "-"]).unwrap();
        assert!(cli.url.is_none());
    }

    #[test]
    fn options_and_aliases() {
        let cli = Cli::try_parse_from([
            "ical2org",
            "feed.ics",
            "gcal.org",
            "school.instructure.com",
            "--fileprefix",
            "#+TITLE: School",
            "--orgignorefile",
            "tracked.org",
            "-t",
            "7",
            "-g",
            "HIST101",
            "MATH",
            "--ignore",
            "BIO",
        ])
        .unwrap();
        assert_eq!(cli.file_prefix.as_deref(), Some("#+TITLE: School"));
        assert_eq!(cli.org_ignore_file, Some(PathBuf::from("tracked.org")));
        assert_eq!(cli.time_delta, Some(7));
        assert_eq!(cli.ignore, ["HIST101", "MATH", "BIO"]);
    }

    #[test]
    fn logging_flags() {
        let cli = Cli::try_parse_from(["ical2org", "feed.ics", "-"]).unwrap();
        let config = cli.tracing_config();
        assert_eq!(config.output_format, TracingOutputFormat::Compact);
        assert!(!config.include_location);

        let cli = Cli::try_parse_from([
            "ical2org",
            "feed.ics",
            "-",
            "-v",
            "--log-json",
            "--log-filter",
            "ical2org_core=trace",
        ])
        .unwrap();
        let config = cli.tracing_config();
        assert_eq!(config.output_format, TracingOutputFormat::Json);
        assert!(config.include_location);
        assert_eq!(config.env_filter.as_deref(), Some("ical2org_core=trace"));
    }

    #[test]
    fn missing_output_is_rejected() {
        assert!(Cli::try_parse_from(["ical2org", "feed.ics"]).is_err());
    }
}
