//! Output module
//!
//! Messages produced by a sync and the sinks that receive them.
//!
//! # Overview
//!
//! This module provides:
//! - `Message` - SCHEMA, RECORD and STATE messages
//! - `RecordSink` - destination trait for messages
//! - `JsonLinesSink` - one JSON object per line on any writer
//! - `MemorySink` - collects messages in memory

mod message;
mod sink;

pub use message::Message;
pub use sink::{JsonLinesSink, MemorySink, RecordSink};

#[cfg(test)]
mod tests;
