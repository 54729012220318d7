//! CLI runner - executes commands

use crate::cli::commands::{parse_stream_list, Cli, Commands};
use crate::config::TapConfig;
use crate::connector::{Connector, ConnectorSpec, TursoTap};
use crate::engine::SyncConfig;
use crate::error::{Result, ResultExt};
use crate::output::JsonLinesSink;
use crate::state::StateManager;
use crate::streams;
use serde_json::{json, Value};
use std::io::{self, BufWriter, Write};
use tracing::info;

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Spec => self.spec(),
            Commands::Check => self.check().await,
            Commands::Discover => self.discover(),
            Commands::Read {
                streams,
                max_records,
            } => self.read(streams.as_deref(), *max_records).await,
        }
    }

    /// Load configuration: `--config`, then `--config-json`, then the environment
    fn load_config(&self) -> Result<TapConfig> {
        if let Some(path) = &self.cli.config {
            return TapConfig::from_file(path);
        }
        if let Some(json_str) = &self.cli.config_json {
            return TapConfig::from_json(json_str);
        }
        TapConfig::from_env()
    }

    /// Load state
    fn load_state(&self) -> Result<StateManager> {
        // Inline state takes precedence
        if let Some(state_json) = &self.cli.state_json {
            StateManager::from_json(state_json)
        } else if let Some(path) = &self.cli.state {
            StateManager::from_file(path)
        } else {
            Ok(StateManager::in_memory())
        }
    }

    /// Show spec
    fn spec(&self) -> Result<()> {
        let spec = ConnectorSpec::current();
        output_message(&json!({
            "type": "SPEC",
            "spec": {
                "name": spec.name,
                "version": spec.version,
                "connectionSpecification": spec.spec.to_json_schema(),
            }
        }))
    }

    /// Check connection
    async fn check(&self) -> Result<()> {
        let tap = TursoTap::new(self.load_config()?);
        let result = tap.check().await?;

        let status = if result.success {
            json!({"status": "SUCCEEDED", "message": "Connection successful"})
        } else {
            json!({
                "status": "FAILED",
                "message": format!(
                    "Connection failed: {}",
                    result.message.unwrap_or_default()
                )
            })
        };
        output_message(&json!({"type": "CONNECTION_STATUS", "connectionStatus": status}))
    }

    /// Discover streams
    fn discover(&self) -> Result<()> {
        let catalog = streams::registry()?.catalog();
        let catalog = serde_json::to_value(&catalog).context("Failed to serialize catalog")?;
        output_message(&json!({"type": "CATALOG", "catalog": catalog}))
    }

    /// Read streams to stdout
    async fn read(&self, streams: Option<&str>, max_records: usize) -> Result<()> {
        let tap = TursoTap::new(self.load_config()?);
        let state = self.load_state()?;

        let mut sync = SyncConfig::new().with_max_records(max_records);
        if let Some(names) = parse_stream_list(streams) {
            sync = sync.with_streams(names);
        }

        let mut sink = JsonLinesSink::new(BufWriter::new(io::stdout()));
        let stats = tap.read(&mut sink, state, sync).await?;

        info!(
            records = stats.records_emitted,
            pages = stats.pages_fetched,
            partitions = stats.partitions_synced,
            "read finished"
        );
        Ok(())
    }
}

/// Print one JSON message on stdout
fn output_message(msg: &Value) -> Result<()> {
    let line = serde_json::to_string(msg).context("Failed to serialize message")?;
    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{line}")?;
    stdout.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use pretty_assertions::assert_eq;

    fn runner(args: &[&str]) -> Runner {
        let mut argv = vec!["tap-tursoapi"];
        argv.extend_from_slice(args);
        Runner::new(Cli::try_parse_from(argv).unwrap())
    }

    #[test]
    fn test_config_file_takes_precedence() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"token": "from-file"}"#).unwrap();

        let runner = runner(&[
            "--config",
            path.to_str().unwrap(),
            "--config-json",
            r#"{"token": "inline"}"#,
            "check",
        ]);
        assert_eq!(runner.load_config().unwrap().token, "from-file");
    }

    #[test]
    fn test_inline_config() {
        let runner = runner(&["--config-json", r#"{"token": "inline"}"#, "check"]);
        assert_eq!(runner.load_config().unwrap().token, "inline");
    }

    #[test]
    fn test_inline_config_missing_token() {
        let runner = runner(&["--config-json", "{}", "check"]);
        assert!(matches!(
            runner.load_config(),
            Err(crate::Error::MissingConfigField { .. })
        ));
    }

    #[tokio::test]
    async fn test_inline_state() {
        let runner = runner(&[
            "--state-json",
            r#"{"streams": {"audit_logs": {"partitions": {}}}}"#,
            "read",
        ]);
        let state = runner.load_state().unwrap();
        assert!(state.is_in_memory());
        assert!(state.snapshot().await.get_stream("audit_logs").is_some());
    }

    #[test]
    fn test_state_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");

        let runner = runner(&["--state", path.to_str().unwrap(), "read"]);
        let state = runner.load_state().unwrap();
        assert_eq!(state.path(), Some(path.as_path()));
    }

    #[test]
    fn test_no_state() {
        let state = runner(&["read"]).load_state().unwrap();
        assert!(state.is_in_memory());
    }
}
