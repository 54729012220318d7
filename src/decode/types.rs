//! Decoder types and traits
//!
//! Defines the core decoder abstractions.

use super::decoders::{JsonPathDecoder, KeyValueDecoder};
use crate::error::Result;
use crate::types::JsonObject;
use serde_json::Value;

/// Lazy, single-pass sequence of records borrowed from a response body
pub type Records<'a> = Box<dyn Iterator<Item = JsonObject> + Send + 'a>;

/// How a stream locates its records in a response body
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordSelector {
    /// JSON-path expression such as `$[*]` or `$.groups[*]`
    JsonPath(String),

    /// Reshape a `{key: value}` map into one record per entry
    KeyValue {
        /// Dotted path to the map
        map_path: String,
        /// Field receiving each entry's key
        key_field: String,
        /// Field receiving each entry's value
        value_field: String,
    },
}

impl RecordSelector {
    /// JSON-path selector
    pub fn json_path(expr: impl Into<String>) -> Self {
        Self::JsonPath(expr.into())
    }

    /// Key/value reshape selector
    pub fn key_value(
        map_path: impl Into<String>,
        key_field: impl Into<String>,
        value_field: impl Into<String>,
    ) -> Self {
        Self::KeyValue {
            map_path: map_path.into(),
            key_field: key_field.into(),
            value_field: value_field.into(),
        }
    }

    /// Build the decoder this selector describes
    ///
    /// Fails on a malformed JSON-path expression.
    pub fn build(&self) -> Result<Box<dyn RecordDecoder>> {
        let decoder: Box<dyn RecordDecoder> = match self {
            Self::JsonPath(expr) => Box::new(JsonPathDecoder::new(expr)?),
            Self::KeyValue {
                map_path,
                key_field,
                value_field,
            } => Box::new(KeyValueDecoder::new(
                map_path.clone(),
                key_field.clone(),
                value_field.clone(),
            )),
        };
        Ok(decoder)
    }
}

impl Default for RecordSelector {
    fn default() -> Self {
        Self::JsonPath("$[*]".to_string())
    }
}

/// Trait for decoding response bodies into records
pub trait RecordDecoder: Send + Sync + std::fmt::Debug {
    /// Extract the records of `body`
    ///
    /// A path that does not exist yields no records. Items that are not
    /// JSON objects are skipped.
    fn decode<'a>(&self, body: &'a Value) -> Result<Records<'a>>;
}
