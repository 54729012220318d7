//! Message sinks

use super::message::Message;
use crate::error::Result;
use crate::types::JsonObject;
use std::io::Write;

/// Destination for sync messages
pub trait RecordSink: Send {
    /// Write one message
    fn write(&mut self, message: &Message) -> Result<()>;

    /// Flush buffered output
    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

// ============================================================================
// JSON Lines
// ============================================================================

/// Writes one JSON object per line
#[derive(Debug)]
pub struct JsonLinesSink<W: Write + Send> {
    writer: W,
    written: u64,
}

impl<W: Write + Send> JsonLinesSink<W> {
    /// Wrap a writer
    pub fn new(writer: W) -> Self {
        Self { writer, written: 0 }
    }

    /// Number of messages written so far
    pub fn written(&self) -> u64 {
        self.written
    }

    /// Unwrap the inner writer
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write + Send> RecordSink for JsonLinesSink<W> {
    fn write(&mut self, message: &Message) -> Result<()> {
        serde_json::to_writer(&mut self.writer, message)?;
        self.writer.write_all(b"\n")?;
        self.written += 1;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

// ============================================================================
// In-memory
// ============================================================================

/// Collects messages in memory
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    messages: Vec<Message>,
}

impl MemorySink {
    /// Create an empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Every message, in order
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Records of one stream, in order
    pub fn records(&self, stream: &str) -> Vec<&JsonObject> {
        self.messages
            .iter()
            .filter_map(|m| match m {
                Message::Record {
                    stream: s, record, ..
                } if s == stream => Some(record),
                _ => None,
            })
            .collect()
    }

    /// Streams that received a SCHEMA message, in order
    pub fn schema_streams(&self) -> Vec<&str> {
        self.messages
            .iter()
            .filter_map(|m| match m {
                Message::Schema { stream, .. } => Some(stream.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Values of every STATE message, in order
    pub fn states(&self) -> Vec<&serde_json::Value> {
        self.messages
            .iter()
            .filter_map(|m| match m {
                Message::State { value } => Some(value),
                _ => None,
            })
            .collect()
    }
}

impl RecordSink for MemorySink {
    fn write(&mut self, message: &Message) -> Result<()> {
        self.messages.push(message.clone());
        Ok(())
    }
}
