#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(
    clippy::cast_lossless,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::doc_markdown,
    clippy::items_after_statements,
    clippy::match_same_arms,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::needless_pass_by_value,
    clippy::ref_option,
    clippy::too_many_lines,
    clippy::unnecessary_wraps,
    clippy::unused_async,
    clippy::unused_self
)]

//! # tap-tursoapi
//!
//! Extracts organizations, groups, databases, locations and audit logs from
//! the Turso platform API and writes them as SCHEMA / RECORD / STATE
//! messages.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use tap_tursoapi::{Connector, JsonLinesSink, StateManager, SyncConfig, TapConfig, TursoTap};
//!
//! #[tokio::main]
//! async fn main() -> tap_tursoapi::Result<()> {
//!     let tap = TursoTap::new(TapConfig::new("my-token")?);
//!
//!     let status = tap.check().await?;
//!     let catalog = tap.discover().await?;
//!
//!     let mut sink = JsonLinesSink::new(std::io::stdout());
//!     tap.read(&mut sink, StateManager::in_memory(), SyncConfig::new()).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Layout
//!
//! ```text
//! cli ─► connector ─► engine ─┬─► streams / stream   (definitions, registry)
//!                             ├─► http + auth         (retry, pacing, bearer token)
//!                             ├─► pagination          (page number, total pages)
//!                             ├─► decode + schema     (record selection, conform)
//!                             ├─► state + context     (bookmarks per partition)
//!                             └─► output              (SCHEMA / RECORD / STATE)
//! ```

// ============================================================================
// Module declarations
// ============================================================================

/// Error types for the tap
pub mod error;

/// Common types and type aliases
pub mod types;

/// Parent to child sync context
pub mod context;

/// Path template rendering
pub mod template;

/// Bearer token authentication
pub mod auth;

/// HTTP client with retry and rate limiting
pub mod http;

/// Pagination strategies
pub mod pagination;

/// Response decoders
pub mod decode;

/// Stream schemas
pub mod schema;

/// State management and checkpointing
pub mod state;

/// Stream definitions and registry
pub mod stream;

/// Turso API stream catalog
pub mod streams;

/// Output messages and sinks
pub mod output;

/// Main execution engine
pub mod engine;

/// Configuration and catalog types
pub mod config;

/// Connector trait and the Turso tap
pub mod connector;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

pub use config::{Catalog, TapConfig};
pub use connector::{CheckResult, Connector, ConnectorSpec, TursoTap};
pub use context::Context;
pub use engine::{SyncConfig, SyncEngine, SyncStats};
pub use output::{JsonLinesSink, MemorySink, Message, RecordSink};
pub use state::StateManager;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
