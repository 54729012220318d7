//! State types for tracking sync progress
//!
//! These types are serialized to JSON and persisted between runs:
//!
//! ```json
//! {"streams": {"audit_logs": {"partitions": {
//!   "organization_name=acme": {"context": {"organization_name": "acme"},
//!                              "replication_key": "created_at",
//!                              "cursor": "2024-03-01T10:00:00Z"}}}}}
//! ```

use crate::context::{value_to_string, Context};
use crate::types::JsonValue;
use chrono::DateTime;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Complete state for the tap
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct State {
    /// Per-stream state
    #[serde(default)]
    pub streams: BTreeMap<String, StreamState>,
}

impl State {
    /// Create a new empty state
    pub fn new() -> Self {
        Self::default()
    }

    /// Get state for a stream
    pub fn get_stream(&self, stream: &str) -> Option<&StreamState> {
        self.streams.get(stream)
    }

    /// Get mutable state for a stream, creating if needed
    pub fn get_stream_mut(&mut self, stream: &str) -> &mut StreamState {
        self.streams.entry(stream.to_string()).or_default()
    }

    /// Stored bookmark for one (stream, context) partition
    pub fn get_bookmark(&self, stream: &str, ctx: &Context) -> Option<&JsonValue> {
        self.streams
            .get(stream)?
            .partitions
            .get(&ctx.id())?
            .cursor
            .as_ref()
    }

    /// Record the bookmark for one (stream, context) partition
    ///
    /// The stored value never moves backwards.
    pub fn set_bookmark(
        &mut self,
        stream: &str,
        ctx: &Context,
        replication_key: &str,
        cursor: JsonValue,
    ) {
        let partition = self
            .get_stream_mut(stream)
            .partitions
            .entry(ctx.id())
            .or_insert_with(|| PartitionState::new(ctx.clone()));

        partition.context = ctx.clone();
        partition.replication_key = Some(replication_key.to_string());
        partition.cursor = Some(match partition.cursor.take() {
            Some(old) if compare_cursors(&old, &cursor) == Ordering::Greater => old,
            _ => cursor,
        });
    }

    /// Convert to a JSON value
    pub fn to_value(&self) -> JsonValue {
        serde_json::to_value(self).unwrap_or_default()
    }
}

/// State for a single stream
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StreamState {
    /// Per-partition state keyed by context id
    #[serde(default)]
    pub partitions: BTreeMap<String, PartitionState>,
}

/// State for a single partition
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PartitionState {
    /// Context the partition was synced with
    #[serde(default)]
    pub context: Context,

    /// Field the cursor was taken from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replication_key: Option<String>,

    /// Highest replication value seen
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cursor: Option<JsonValue>,
}

impl PartitionState {
    /// Create an empty partition state for a context
    pub fn new(context: Context) -> Self {
        Self {
            context,
            replication_key: None,
            cursor: None,
        }
    }
}

/// Order two replication values
///
/// Values compare as RFC 3339 timestamps when both parse, otherwise as
/// numbers, otherwise as strings.
pub fn compare_cursors(a: &JsonValue, b: &JsonValue) -> Ordering {
    let (sa, sb) = (value_to_string(a), value_to_string(b));

    if let (Ok(da), Ok(db)) = (
        DateTime::parse_from_rfc3339(&sa),
        DateTime::parse_from_rfc3339(&sb),
    ) {
        return da.cmp(&db);
    }

    if let (Some(na), Some(nb)) = (as_number(a), as_number(b)) {
        if let Some(ord) = na.partial_cmp(&nb) {
            return ord;
        }
    }

    sa.cmp(&sb)
}

fn as_number(value: &JsonValue) -> Option<f64> {
    match value {
        JsonValue::Number(n) => n.as_f64(),
        JsonValue::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
