//! Execution engine module
//!
//! Main read loop and stream orchestration.
//!
//! # Overview
//!
//! The engine module provides:
//! - `SyncEngine` - Walks the stream tree depth-first and emits messages
//! - `SyncConfig` - Record limit and stream selection
//! - `SyncStats` - Counters for a finished run
//!
//! Root streams are synced in declaration order. Each record of a parent
//! stream immediately drives a full sync of every child stream for that
//! record's context before the next parent record is looked at.

mod types;

pub use types::{SyncConfig, SyncStats};

use crate::context::Context;
use crate::decode::RecordDecoder;
use crate::error::{Error, Result};
use crate::http::{HttpClient, RequestBuilder};
use crate::output::{Message, RecordSink};
use crate::pagination::{Page, Paginator};
use crate::schema::check_primary_key;
use crate::state::{compare_cursors, StateManager};
use crate::stream::{Selection, StreamDefinition, StreamRegistry};
use crate::types::{JsonObject, JsonValue};
use futures::future::BoxFuture;
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Decoder and paginator built once per stream
struct StreamPlan {
    decoder: Box<dyn RecordDecoder>,
    paginator: Box<dyn Paginator>,
}

/// Mutable bookkeeping for one run
struct Run<'s> {
    sink: &'s mut dyn RecordSink,
    selection: Selection,
    schema_sent: BTreeSet<String>,
    warned: BTreeSet<String>,
    stats: SyncStats,
}

impl Run<'_> {
    fn emit_schema(&mut self, stream: &StreamDefinition) -> Result<()> {
        if !self.schema_sent.insert(stream.name.clone()) {
            return Ok(());
        }
        self.sink.write(&Message::schema(
            stream.name.clone(),
            stream.schema.to_json(),
            stream.primary_keys.clone(),
            stream.replication_key.iter().cloned().collect(),
        ))
    }

    fn emit_record(&mut self, stream: &str, record: JsonObject) -> Result<()> {
        self.sink.write(&Message::record(stream, record))?;
        self.stats.add_record(stream);
        Ok(())
    }

    fn emit_state(&mut self, value: JsonValue) -> Result<()> {
        self.sink.write(&Message::state(value))
    }
}

/// Sync engine for orchestrating data extraction
pub struct SyncEngine {
    /// HTTP client
    client: HttpClient,
    /// Request construction
    requests: RequestBuilder,
    /// Streams in declaration order
    registry: StreamRegistry,
    /// Per-stream decoder and paginator
    plans: BTreeMap<String, StreamPlan>,
    /// State manager
    state: StateManager,
    /// Sync configuration
    config: SyncConfig,
    /// Statistics of the last run
    stats: SyncStats,
}

impl SyncEngine {
    /// Create a new sync engine
    ///
    /// Fails if a stream's record selector cannot be compiled.
    pub fn new(
        client: HttpClient,
        requests: RequestBuilder,
        registry: StreamRegistry,
        state: StateManager,
    ) -> Result<Self> {
        let mut plans = BTreeMap::new();
        for stream in registry.streams() {
            plans.insert(
                stream.name.clone(),
                StreamPlan {
                    decoder: stream.selector.build()?,
                    paginator: stream.pagination.build(),
                },
            );
        }

        Ok(Self {
            client,
            requests,
            registry,
            plans,
            state,
            config: SyncConfig::default(),
            stats: SyncStats::default(),
        })
    }

    /// Set sync configuration
    #[must_use]
    pub fn with_config(mut self, config: SyncConfig) -> Self {
        self.config = config;
        self
    }

    /// Get the state manager
    pub fn state(&self) -> &StateManager {
        &self.state
    }

    /// Get statistics of the last run
    pub fn stats(&self) -> &SyncStats {
        &self.stats
    }

    /// Run a full sync, writing every message to `sink`
    ///
    /// An error aborts the run. Messages already written stay in the sink.
    pub async fn run(&mut self, sink: &mut dyn RecordSink) -> Result<SyncStats> {
        let start = Instant::now();
        let selection = self.registry.select(self.config.streams.as_deref())?;

        let mut run = Run {
            sink,
            selection,
            schema_sent: BTreeSet::new(),
            warned: BTreeSet::new(),
            stats: SyncStats::new(),
        };

        let result = self.sync_roots(&mut run).await;
        let flushed = run.sink.flush();
        result?;
        flushed?;

        run.emit_state(self.state.to_value().await)?;
        run.sink.flush()?;
        self.state.save().await?;

        run.stats.set_duration(start.elapsed().as_millis() as u64);
        info!(
            records = run.stats.records_emitted,
            skipped = run.stats.records_skipped,
            pages = run.stats.pages_fetched,
            duration_ms = run.stats.duration_ms,
            "sync completed"
        );

        self.stats = run.stats.clone();
        Ok(run.stats)
    }

    async fn sync_roots(&self, run: &mut Run<'_>) -> Result<()> {
        for stream in self.registry.roots() {
            if !run.selection.is_traversed(&stream.name) {
                debug!(stream = %stream.name, "stream not selected, skipping");
                continue;
            }

            info!(stream = %stream.name, "starting stream");
            let before = run.stats.records_emitted;
            self.sync_partition(run, stream, Context::empty()).await?;
            info!(
                stream = %stream.name,
                records = run.stats.records_emitted - before,
                "finished stream"
            );
        }
        Ok(())
    }

    /// Sync one (stream, context) partition, recursing into children per record
    fn sync_partition<'a>(
        &'a self,
        run: &'a mut Run<'_>,
        stream: &'a StreamDefinition,
        ctx: Context,
    ) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            let plan = self
                .plans
                .get(&stream.name)
                .ok_or_else(|| Error::StreamNotFound {
                    stream: stream.name.clone(),
                })?;
            let selected = run.selection.is_selected(&stream.name);
            let children: Vec<&StreamDefinition> = self
                .registry
                .children(&stream.name)
                .filter(|c| run.selection.is_traversed(&c.name))
                .collect();

            if selected {
                run.emit_schema(stream)?;
            }

            let bookmark = match &stream.replication_key {
                Some(_) => self.state.get_bookmark(&stream.name, &ctx).await,
                None => None,
            };
            let mut max_seen = bookmark.clone();
            let mut taken = 0usize;
            let mut token = plan.paginator.first_token();

            debug!(stream = %stream.name, context = %ctx.id(), ?bookmark, "syncing partition");

            'pages: loop {
                let request =
                    self.requests
                        .build(&stream.path, &ctx, plan.paginator.query_params(token))?;
                let body = self.client.execute_json(&request).await?;
                run.stats.add_page();

                let mut count = 0usize;
                for mut record in plan.decoder.decode(&body)? {
                    count += 1;

                    ctx.enrich(&mut record);
                    let dropped = stream.schema.conform(&mut record);
                    if !dropped.is_empty() && run.warned.insert(stream.name.clone()) {
                        warn!(
                            stream = %stream.name,
                            properties = ?dropped,
                            "dropping properties not declared in schema"
                        );
                    }
                    check_primary_key(&stream.name, &stream.primary_keys, &record)?;

                    if let Some(key) = &stream.replication_key {
                        if let Some(value) = record.get(key).filter(|v| !v.is_null()) {
                            if let Some(mark) = &bookmark {
                                if compare_cursors(value, mark) == Ordering::Less {
                                    run.stats.add_skipped();
                                    continue;
                                }
                            }
                            let newer = max_seen
                                .as_ref()
                                .map_or(true, |m| compare_cursors(value, m) == Ordering::Greater);
                            if newer {
                                max_seen = Some(value.clone());
                            }
                        }
                    }

                    let child_ctx = match &stream.child_context {
                        Some(rule) if !children.is_empty() => Some(rule.context_for(&record)?),
                        _ => None,
                    };

                    if selected {
                        run.emit_record(&stream.name, record)?;
                    }
                    taken += 1;

                    if let Some(child_ctx) = child_ctx {
                        for child in &children {
                            self.sync_partition(run, child, child_ctx.clone()).await?;
                        }
                    }

                    if self.config.limit_reached(taken) {
                        debug!(stream = %stream.name, taken, "record limit reached");
                        break 'pages;
                    }
                }

                match plan.paginator.next_token(token, &Page::new(&body, count)) {
                    Some(next) => token = Some(next),
                    None => break,
                }
            }

            run.stats.add_partition();

            if let Some(key) = &stream.replication_key {
                if let Some(cursor) = max_seen {
                    self.state.set_bookmark(&stream.name, &ctx, key, cursor).await;
                }
                run.emit_state(self.state.to_value().await)?;
            }

            debug!(stream = %stream.name, context = %ctx.id(), taken, "partition done");
            Ok(())
        })
    }
}

impl std::fmt::Debug for SyncEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncEngine")
            .field("client", &self.client)
            .field("streams", &self.registry.len())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
