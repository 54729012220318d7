//! Stream definition types

use crate::config::CatalogStream;
use crate::context::Context;
use crate::decode::RecordSelector;
use crate::error::{Error, Result};
use crate::pagination::PaginationConfig;
use crate::schema::JsonSchema;
use crate::types::{JsonObject, SyncMode};

/// One context entry taken from a parent record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextField {
    /// Field read from the parent record
    pub parent_field: String,
    /// Key the value is stored under in the child context
    pub context_key: String,
}

/// Builds the context handed to child streams from one parent record
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChildContextRule {
    fields: Vec<ContextField>,
}

impl ChildContextRule {
    /// Rule with no fields
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy `parent_field` of the parent record into `context_key`
    #[must_use]
    pub fn field(mut self, parent_field: impl Into<String>, context_key: impl Into<String>) -> Self {
        self.fields.push(ContextField {
            parent_field: parent_field.into(),
            context_key: context_key.into(),
        });
        self
    }

    /// Context keys this rule produces
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.context_key.as_str())
    }

    /// Build the child context for one parent record
    ///
    /// A missing or null parent field is an error.
    pub fn context_for(&self, record: &JsonObject) -> Result<Context> {
        let mut pairs = Vec::with_capacity(self.fields.len());
        for field in &self.fields {
            match record.get(&field.parent_field) {
                Some(value) if !value.is_null() => {
                    pairs.push((field.context_key.clone(), value.clone()));
                }
                _ => return Err(Error::undefined_var(field.parent_field.clone())),
            }
        }
        Ok(Context::from_pairs(pairs))
    }
}

/// A named resource listing and everything needed to sync it
#[derive(Debug, Clone)]
pub struct StreamDefinition {
    /// Stream name
    pub name: String,
    /// URL path, may contain `{placeholder}` segments
    pub path: String,
    /// Primary key fields
    pub primary_keys: Vec<String>,
    /// Field used for incremental bookmarks
    pub replication_key: Option<String>,
    /// Where records sit in a response
    pub selector: RecordSelector,
    /// Pagination strategy
    pub pagination: PaginationConfig,
    /// Parent stream name
    pub parent: Option<String>,
    /// Output schema
    pub schema: JsonSchema,
    /// Context handed to children, one per record
    pub child_context: Option<ChildContextRule>,
}

impl StreamDefinition {
    /// Create a stream reading `$[*]` from `path`, unpaginated
    pub fn new(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            primary_keys: Vec::new(),
            replication_key: None,
            selector: RecordSelector::default(),
            pagination: PaginationConfig::None,
            parent: None,
            schema: JsonSchema::new(),
            child_context: None,
        }
    }

    #[must_use]
    pub fn primary_key(mut self, key: impl Into<String>) -> Self {
        self.primary_keys.push(key.into());
        self
    }

    #[must_use]
    pub fn replication_key(mut self, key: impl Into<String>) -> Self {
        self.replication_key = Some(key.into());
        self
    }

    #[must_use]
    pub fn selector(mut self, selector: RecordSelector) -> Self {
        self.selector = selector;
        self
    }

    #[must_use]
    pub fn pagination(mut self, pagination: PaginationConfig) -> Self {
        self.pagination = pagination;
        self
    }

    #[must_use]
    pub fn parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    #[must_use]
    pub fn schema(mut self, schema: JsonSchema) -> Self {
        self.schema = schema;
        self
    }

    #[must_use]
    pub fn child_context(mut self, rule: ChildContextRule) -> Self {
        self.child_context = Some(rule);
        self
    }

    /// Incremental when a replication key is declared
    pub fn sync_mode(&self) -> SyncMode {
        if self.replication_key.is_some() {
            SyncMode::Incremental
        } else {
            SyncMode::FullRefresh
        }
    }

    /// Check whether the stream has no parent
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Catalog entry describing this stream
    pub fn catalog_entry(&self) -> CatalogStream {
        CatalogStream {
            tap_stream_id: self.name.clone(),
            schema: self.schema.to_json(),
            key_properties: self.primary_keys.clone(),
            replication_key: self.replication_key.clone(),
            replication_method: self.sync_mode(),
            parent_stream: self.parent.clone(),
        }
    }
}
