//! Engine types
//!
//! Configuration and statistics for the sync engine.

use std::collections::BTreeMap;

/// Configuration for sync operation
#[derive(Debug, Clone, Default)]
pub struct SyncConfig {
    /// Maximum records per (stream, context) partition (0 = unlimited)
    pub max_records: usize,
    /// Streams to emit (`None` = all)
    pub streams: Option<Vec<String>>,
}

impl SyncConfig {
    /// Create a new sync config
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set max records
    #[must_use]
    pub fn with_max_records(mut self, max: usize) -> Self {
        self.max_records = max;
        self
    }

    /// Restrict the run to the named streams
    #[must_use]
    pub fn with_streams<I, S>(mut self, streams: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.streams = Some(streams.into_iter().map(Into::into).collect());
        self
    }

    /// Check whether a partition has reached the record limit
    pub fn limit_reached(&self, taken: usize) -> bool {
        self.max_records > 0 && taken >= self.max_records
    }
}

/// Statistics from a sync operation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncStats {
    /// Records written to the sink
    pub records_emitted: usize,
    /// Records older than the stored bookmark
    pub records_skipped: usize,
    /// Pages fetched
    pub pages_fetched: usize,
    /// (stream, context) partitions completed
    pub partitions_synced: usize,
    /// Records emitted per stream
    pub per_stream: BTreeMap<String, usize>,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

impl SyncStats {
    /// Create new stats
    pub fn new() -> Self {
        Self::default()
    }

    /// Count an emitted record
    pub fn add_record(&mut self, stream: &str) {
        self.records_emitted += 1;
        *self.per_stream.entry(stream.to_string()).or_default() += 1;
    }

    /// Count a record skipped by the bookmark filter
    pub fn add_skipped(&mut self) {
        self.records_skipped += 1;
    }

    /// Add a page
    pub fn add_page(&mut self) {
        self.pages_fetched += 1;
    }

    /// Add a partition
    pub fn add_partition(&mut self) {
        self.partitions_synced += 1;
    }

    /// Records emitted for one stream
    pub fn records_for(&self, stream: &str) -> usize {
        self.per_stream.get(stream).copied().unwrap_or(0)
    }

    /// Set duration
    pub fn set_duration(&mut self, ms: u64) {
        self.duration_ms = ms;
    }
}
