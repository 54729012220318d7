//! Sync context passed from a parent stream to its children
//!
//! A [`Context`] is created from one parent record and handed by value to
//! every child sync for that record. It fills the child's path template,
//! tags the child's records, and identifies the child's state partition.

use crate::types::{JsonObject, JsonValue};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Immutable placeholder → value mapping
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Context {
    values: BTreeMap<String, JsonValue>,
}

impl Context {
    /// The empty context used for root streams
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a context from key/value pairs
    pub fn from_pairs<K, V, I>(pairs: I) -> Self
    where
        K: Into<String>,
        V: Into<JsonValue>,
        I: IntoIterator<Item = (K, V)>,
    {
        Self {
            values: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Get a value by key
    pub fn get(&self, key: &str) -> Option<&JsonValue> {
        self.values.get(key)
    }

    /// Check whether the context carries no values
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate over entries in key order
    pub fn iter(&self) -> impl Iterator<Item = (&String, &JsonValue)> {
        self.values.iter()
    }

    /// Stable identifier, used as the state partition key
    ///
    /// Entries are rendered `key=value` in key order and joined with `,`.
    pub fn id(&self) -> String {
        self.values
            .iter()
            .map(|(k, v)| format!("{k}={}", value_to_string(v)))
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Copy every context entry into a record, overwriting existing fields
    pub fn enrich(&self, record: &mut JsonObject) {
        for (key, value) in &self.values {
            record.insert(key.clone(), value.clone());
        }
    }
}

/// Convert a JSON value to a string for template substitution and ids
pub(crate) fn value_to_string(value: &JsonValue) -> String {
    match value {
        JsonValue::String(s) => s.clone(),
        JsonValue::Number(n) => n.to_string(),
        JsonValue::Bool(b) => b.to_string(),
        JsonValue::Null => String::new(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
