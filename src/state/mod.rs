//! State management module
//!
//! Handles bookmark tracking and persistence between runs.
//!
//! # Overview
//!
//! The state module provides:
//! - `State` - Bookmarks per stream and per context partition
//! - `StateManager` - Shared, file-backed state with atomic saves
//! - `compare_cursors` - Ordering of replication values

mod manager;
mod types;

pub use manager::StateManager;
pub use types::{compare_cursors, PartitionState, State, StreamState};

#[cfg(test)]
mod manager_tests;
