//! Decoder implementations
//!
//! Each decoder handles a specific record layout.

use super::types::{RecordDecoder, Records};
use crate::error::{Error, Result};
use crate::types::JsonObject;
use serde_json::Value;
use tracing::trace;

/// Parse a response body, mapping failures to a decode error
pub fn parse_json(body: &str) -> Result<Value> {
    serde_json::from_str(body).map_err(|e| Error::decode(format!("Failed to parse JSON: {e}")))
}

// ============================================================================
// JSON-path Decoder
// ============================================================================

/// Compiled form of a JSON-path expression
#[derive(Debug, Clone, PartialEq, Eq)]
enum PathExpr {
    /// `$`
    Root,
    /// `$.a.b`
    Field(Vec<String>),
    /// `$[*]` (empty segments) or `$.a.b[*]`
    Wildcard(Vec<String>),
    /// Anything else, evaluated by jsonpath-rust
    Complex(String),
}

impl PathExpr {
    fn parse(expr: &str) -> Result<Self> {
        let trimmed = expr.trim();
        let Some(rest) = trimmed.strip_prefix('$') else {
            return Self::complex(trimmed);
        };

        if rest.is_empty() {
            return Ok(Self::Root);
        }

        let (rest, wildcard) = match rest.strip_suffix("[*]") {
            Some(r) => (r, true),
            None => (rest, false),
        };

        let segments = if rest.is_empty() {
            Vec::new()
        } else {
            match rest.strip_prefix('.') {
                Some(dotted) => dotted.split('.').map(str::to_string).collect(),
                None => return Self::complex(trimmed),
            }
        };

        if !segments.iter().all(|s| is_plain_segment(s)) {
            return Self::complex(trimmed);
        }

        Ok(match (segments.is_empty(), wildcard) {
            (_, true) => Self::Wildcard(segments),
            (true, false) => Self::Root,
            (false, false) => Self::Field(segments),
        })
    }

    fn complex(expr: &str) -> Result<Self> {
        // Parse once up front so a bad expression fails at construction
        find_jsonpath(&Value::Null, expr)?;
        Ok(Self::Complex(expr.to_string()))
    }
}

fn is_plain_segment(segment: &str) -> bool {
    !segment.is_empty()
        && segment
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// JSON decoder selecting records with a JSON-path expression
///
/// `$`, `$[*]`, `$.a.b[*]` and `$.a.b` are resolved directly; filters,
/// recursive descent and other expressions go through jsonpath-rust.
#[derive(Debug, Clone)]
pub struct JsonPathDecoder {
    expr: String,
    path: PathExpr,
}

impl JsonPathDecoder {
    /// Create a decoder, validating the expression
    pub fn new(expr: impl Into<String>) -> Result<Self> {
        let expr = expr.into();
        let path = PathExpr::parse(&expr)?;
        Ok(Self { expr, path })
    }

    /// The expression this decoder was built from
    pub fn expr(&self) -> &str {
        &self.expr
    }
}

impl RecordDecoder for JsonPathDecoder {
    fn decode<'a>(&self, body: &'a Value) -> Result<Records<'a>> {
        let records: Records<'a> = match &self.path {
            PathExpr::Root => objects_of(Some(body)),
            PathExpr::Field(segments) => objects_of(walk(body, segments)),
            PathExpr::Wildcard(segments) => match walk(body, segments) {
                Some(Value::Array(items)) => Box::new(items.iter().filter_map(as_record)),
                _ => Box::new(std::iter::empty()),
            },
            PathExpr::Complex(expr) => {
                let found = match find_jsonpath(body, expr)? {
                    Value::Array(items) => items,
                    Value::Null => Vec::new(),
                    other => vec![other],
                };
                Box::new(found.into_iter().filter_map(|v| match v {
                    Value::Object(map) => Some(map),
                    _ => None,
                }))
            }
        };
        trace!(expr = %self.expr, "decoding records");
        Ok(records)
    }
}

/// A single object is one record; an array contributes its object items
fn objects_of(value: Option<&Value>) -> Records<'_> {
    match value {
        Some(Value::Object(map)) => Box::new(std::iter::once(map.clone())),
        Some(Value::Array(items)) => Box::new(items.iter().filter_map(as_record)),
        _ => Box::new(std::iter::empty()),
    }
}

fn as_record(value: &Value) -> Option<JsonObject> {
    value.as_object().cloned()
}

// ============================================================================
// Key/Value Decoder
// ============================================================================

/// Reshapes a `{key: value}` map into `{key_field: key, value_field: value}`
/// records, one per entry, in the map's order
#[derive(Debug, Clone)]
pub struct KeyValueDecoder {
    map_path: String,
    key_field: String,
    value_field: String,
}

impl KeyValueDecoder {
    /// Create a new key/value decoder
    pub fn new(
        map_path: impl Into<String>,
        key_field: impl Into<String>,
        value_field: impl Into<String>,
    ) -> Self {
        Self {
            map_path: map_path.into(),
            key_field: key_field.into(),
            value_field: value_field.into(),
        }
    }
}

impl RecordDecoder for KeyValueDecoder {
    fn decode<'a>(&self, body: &'a Value) -> Result<Records<'a>> {
        let Some(Value::Object(map)) = lookup_path(body, &self.map_path) else {
            return Ok(Box::new(std::iter::empty()));
        };

        let key_field = self.key_field.clone();
        let value_field = self.value_field.clone();
        let records: Records<'a> = Box::new(map.iter().map(move |(key, value)| {
            let mut record = JsonObject::new();
            record.insert(key_field.clone(), Value::String(key.clone()));
            record.insert(value_field.clone(), value.clone());
            record
        }));
        Ok(records)
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Resolve a dotted path such as `pagination.total_pages` or `$.locations`
pub fn lookup_path<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    let path = path.trim();
    let path = path
        .strip_prefix("$.")
        .or_else(|| path.strip_prefix('$'))
        .unwrap_or(path);
    if path.is_empty() {
        return Some(value);
    }

    path.split('.').try_fold(value, |current, part| current.get(part))
}

fn walk<'a>(value: &'a Value, segments: &[String]) -> Option<&'a Value> {
    segments
        .iter()
        .try_fold(value, |current, part| current.get(part.as_str()))
}

fn find_jsonpath(value: &Value, expr: &str) -> Result<Value> {
    use jsonpath_rust::JsonPath;

    let jp = JsonPath::try_from(expr)
        .map_err(|e| Error::json_path(format!("Invalid JSONPath '{expr}': {e}")))?;
    Ok(jp.find(value))
}
