//! CLI commands and argument parsing

use crate::types::LogLevel;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Turso platform API tap
#[derive(Parser, Debug)]
#[command(name = "tap-tursoapi")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (JSON)
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,

    /// Inline config JSON
    #[arg(long, global = true)]
    pub config_json: Option<String>,

    /// State file (JSON), written back after a successful read
    #[arg(short, long, global = true)]
    pub state: Option<PathBuf>,

    /// Inline state JSON
    #[arg(long, global = true)]
    pub state_json: Option<String>,

    /// Verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Default log level, raised by `--verbose`
    pub fn log_level(&self) -> LogLevel {
        if self.verbose {
            LogLevel::Debug
        } else {
            LogLevel::Info
        }
    }
}

/// CLI subcommands
#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Show the configuration specification
    Spec,

    /// Test the API token against the Turso API
    Check,

    /// Print the stream catalog
    Discover,

    /// Sync streams to stdout
    Read {
        /// Streams to sync (comma-separated, empty = all)
        #[arg(long)]
        streams: Option<String>,

        /// Maximum records per stream and parent (0 = unlimited)
        #[arg(long, default_value = "0")]
        max_records: usize,
    },
}

/// Split a comma-separated stream list, `None` when nothing is named
pub fn parse_stream_list(streams: Option<&str>) -> Option<Vec<String>> {
    let names: Vec<String> = streams?
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect();
    if names.is_empty() {
        None
    } else {
        Some(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    #[test]
    fn test_parse_read_with_options() {
        let cli = Cli::try_parse_from([
            "tap-tursoapi",
            "--config",
            "config.json",
            "read",
            "--streams",
            "groups,databases",
            "--max-records",
            "10",
        ])
        .unwrap();

        assert_eq!(cli.config, Some(PathBuf::from("config.json")));
        assert_eq!(
            cli.command,
            Commands::Read {
                streams: Some("groups,databases".to_string()),
                max_records: 10,
            }
        );
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "tap-tursoapi",
            "check",
            "--config-json",
            r#"{"token":"t"}"#,
            "-v",
        ])
        .unwrap();

        assert_eq!(cli.command, Commands::Check);
        assert_eq!(cli.config_json.as_deref(), Some(r#"{"token":"t"}"#));
        assert!(cli.verbose);
        assert_eq!(cli.log_level(), LogLevel::Debug);
    }

    #[test]
    fn test_read_defaults() {
        let cli = Cli::try_parse_from(["tap-tursoapi", "read"]).unwrap();
        assert_eq!(cli.log_level(), LogLevel::Info);
        assert_eq!(
            cli.command,
            Commands::Read {
                streams: None,
                max_records: 0,
            }
        );
    }

    #[test]
    fn test_subcommand_required() {
        assert!(Cli::try_parse_from(["tap-tursoapi"]).is_err());
    }

    #[test_case(None, None; "absent")]
    #[test_case(Some(""), None; "empty")]
    #[test_case(Some(" , "), None; "only separators")]
    #[test_case(Some("groups"), Some(vec!["groups"]); "single")]
    #[test_case(Some("groups, audit_logs"), Some(vec!["groups", "audit_logs"]); "trimmed")]
    fn test_parse_stream_list(input: Option<&str>, expected: Option<Vec<&str>>) {
        let expected = expected.map(|v| v.into_iter().map(String::from).collect::<Vec<_>>());
        assert_eq!(parse_stream_list(input), expected);
    }
}
