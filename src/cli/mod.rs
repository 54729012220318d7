//! CLI module
//!
//! Command-line interface for the tap.
//!
//! # Commands
//!
//! - `spec` - Print the configuration specification
//! - `check` - Test the token against the API
//! - `discover` - Print the stream catalog
//! - `read` - Sync streams to stdout as JSON lines

mod commands;
mod runner;

pub use commands::{parse_stream_list, Cli, Commands};
pub use runner::Runner;
