//! State manager implementation
//!
//! Provides file-based state persistence with atomic writes.

use super::types::State;
use crate::context::Context;
use crate::error::{Error, Result};
use crate::types::JsonValue;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// State manager for persisting and loading state
#[derive(Debug, Clone)]
pub struct StateManager {
    /// Path to the state file; `None` keeps state in memory only
    path: Option<PathBuf>,
    /// Current state
    state: Arc<RwLock<State>>,
}

impl StateManager {
    /// Create an in-memory state manager (no file persistence)
    pub fn in_memory() -> Self {
        Self::with_state(State::new())
    }

    /// Create an in-memory state manager seeded with `state`
    pub fn with_state(state: State) -> Self {
        Self {
            path: None,
            state: Arc::new(RwLock::new(state)),
        }
    }

    /// Create a state manager from a file, loading existing state if present
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let state = if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .map_err(|e| Error::state(format!("Failed to read state file: {e}")))?;
            if contents.trim().is_empty() {
                State::new()
            } else {
                serde_json::from_str(&contents)
                    .map_err(|e| Error::state(format!("Failed to parse state file: {e}")))?
            }
        } else {
            State::new()
        };

        Ok(Self {
            path: Some(path),
            state: Arc::new(RwLock::new(state)),
        })
    }

    /// Create a state manager from inline JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        let state: State = serde_json::from_str(json)
            .map_err(|e| Error::state(format!("Failed to parse state JSON: {e}")))?;
        Ok(Self::with_state(state))
    }

    /// Save current state to the backing file, if any
    ///
    /// Writes a temp file first, then renames it over the target.
    pub async fn save(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let contents = {
            let state = self.state.read().await;
            serde_json::to_string_pretty(&*state)
                .map_err(|e| Error::state(format!("Failed to serialize state: {e}")))?
        };

        let temp_path = path.with_extension("tmp");
        tokio::fs::write(&temp_path, &contents)
            .await
            .map_err(|e| Error::state(format!("Failed to write state file: {e}")))?;

        tokio::fs::rename(&temp_path, path)
            .await
            .map_err(|e| Error::state(format!("Failed to rename state file: {e}")))?;

        debug!(path = %path.display(), "state saved");
        Ok(())
    }

    /// Copy of the current state
    pub async fn snapshot(&self) -> State {
        self.state.read().await.clone()
    }

    /// Current state as a JSON value
    pub async fn to_value(&self) -> JsonValue {
        self.state.read().await.to_value()
    }

    /// Stored bookmark for one (stream, context) partition
    pub async fn get_bookmark(&self, stream: &str, ctx: &Context) -> Option<JsonValue> {
        let state = self.state.read().await;
        state.get_bookmark(stream, ctx).cloned()
    }

    /// Record the bookmark for one (stream, context) partition
    pub async fn set_bookmark(
        &self,
        stream: &str,
        ctx: &Context,
        replication_key: &str,
        cursor: JsonValue,
    ) {
        let mut state = self.state.write().await;
        state.set_bookmark(stream, ctx, replication_key, cursor);
    }

    /// Get the state file path
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Check if using in-memory mode
    pub fn is_in_memory(&self) -> bool {
        self.path.is_none()
    }
}
