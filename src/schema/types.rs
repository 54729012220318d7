//! JSON Schema subset used in SCHEMA messages

use crate::error::{Error, Result};
use crate::types::{JsonObject, JsonValue};
use serde::{Deserialize, Serialize};
use indexmap::IndexMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JsonType {
    String,
    Number,
    Integer,
    Boolean,
    Object,
    Array,
    Null,
}

/// `"type"` is either one name or a list such as `["string", "null"]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum JsonTypeOrArray {
    Single(JsonType),
    Multiple(Vec<JsonType>),
}

impl JsonTypeOrArray {
    /// `[t, "null"]`, or plain `"null"` when `t` is already null
    pub fn nullable(t: JsonType) -> Self {
        if t == JsonType::Null {
            JsonTypeOrArray::Single(JsonType::Null)
        } else {
            JsonTypeOrArray::Multiple(vec![t, JsonType::Null])
        }
    }

    pub fn is_nullable(&self) -> bool {
        match self {
            JsonTypeOrArray::Single(t) => *t == JsonType::Null,
            JsonTypeOrArray::Multiple(types) => types.contains(&JsonType::Null),
        }
    }

    /// First non-null member
    pub fn primary_type(&self) -> Option<JsonType> {
        match self {
            JsonTypeOrArray::Single(t) => Some(*t),
            JsonTypeOrArray::Multiple(types) => {
                types.iter().copied().find(|t| *t != JsonType::Null)
            }
        }
    }
}

/// One declared field of a stream record
///
/// Every constructor yields a nullable property: the API omits or nulls
/// fields freely.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaProperty {
    #[serde(rename = "type")]
    pub json_type: JsonTypeOrArray,

    /// `date-time` for timestamps
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<IndexMap<String, SchemaProperty>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<SchemaProperty>>,

    /// Allowed values
    #[serde(rename = "enum", skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<JsonValue>>,
}

impl SchemaProperty {
    /// Base for the typed shorthands below
    pub fn nullable(json_type: JsonType) -> Self {
        Self {
            json_type: JsonTypeOrArray::nullable(json_type),
            format: None,
            properties: None,
            items: None,
            enum_values: None,
        }
    }

    pub fn string() -> Self {
        Self::nullable(JsonType::String)
    }

    pub fn boolean() -> Self {
        Self::nullable(JsonType::Boolean)
    }

    pub fn integer() -> Self {
        Self::nullable(JsonType::Integer)
    }

    /// Nullable object with free-form content
    pub fn object() -> Self {
        Self {
            properties: Some(IndexMap::new()),
            ..Self::nullable(JsonType::Object)
        }
    }

    /// Nullable array of `items`
    pub fn array(items: SchemaProperty) -> Self {
        Self {
            items: Some(Box::new(items)),
            ..Self::nullable(JsonType::Array)
        }
    }

    #[must_use]
    pub fn with_format(mut self, format: &str) -> Self {
        self.format = Some(format.to_string());
        self
    }

    /// Restrict to a set of string values
    #[must_use]
    pub fn with_enum<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.enum_values = Some(
            values
                .into_iter()
                .map(|v| JsonValue::String(v.into()))
                .collect(),
        );
        self
    }

    pub fn is_nullable(&self) -> bool {
        self.json_type.is_nullable()
    }
}

/// Top-level object schema of a stream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonSchema {
    /// Always `object`
    #[serde(rename = "type")]
    pub json_type: JsonType,

    #[serde(default)]
    pub properties: IndexMap<String, SchemaProperty>,
}

impl Default for JsonSchema {
    fn default() -> Self {
        Self::new()
    }
}

impl JsonSchema {
    pub fn new() -> Self {
        Self {
            json_type: JsonType::Object,
            properties: IndexMap::new(),
        }
    }

    /// Add a property, builder style
    #[must_use]
    pub fn property(mut self, name: &str, property: SchemaProperty) -> Self {
        self.properties.insert(name.to_string(), property);
        self
    }

    pub fn has_property(&self, name: &str) -> bool {
        self.properties.contains_key(name)
    }

    /// Drop undeclared properties from `record`, returning their names
    pub fn conform(&self, record: &mut JsonObject) -> Vec<String> {
        let dropped: Vec<String> = record
            .keys()
            .filter(|k| !self.properties.contains_key(k.as_str()))
            .cloned()
            .collect();
        record.retain(|k, _| self.properties.contains_key(k.as_str()));
        dropped
    }

    /// Value for the `schema` field of a SCHEMA message
    pub fn to_json(&self) -> JsonValue {
        serde_json::to_value(self).unwrap_or_default()
    }
}

/// Ensure every primary key field is present and non-null
pub fn check_primary_key(stream: &str, keys: &[String], record: &JsonObject) -> Result<()> {
    for key in keys {
        match record.get(key) {
            None | Some(JsonValue::Null) => return Err(Error::missing_primary_key(stream, key)),
            Some(_) => {}
        }
    }
    Ok(())
}
