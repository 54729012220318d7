//! Configuration and catalog types
//!
//! The tap recognizes a single configuration option, `token`, the bearer
//! credential for the Turso platform API. This module loads and validates
//! it, describes it for the `spec` command, and defines the catalog
//! structures printed by `discover`.

use crate::error::{Error, Result};
use crate::types::{JsonValue, OptionStringExt, SyncMode};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::warn;

/// Environment variable consulted when no config file or inline JSON is given
pub const TOKEN_ENV_VAR: &str = "TAP_TURSOAPI_TOKEN";

/// Name of the single configuration field
const TOKEN_FIELD: &str = "token";

// ============================================================================
// Tap Config
// ============================================================================

/// Validated tap configuration
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TapConfig {
    /// API token for the Turso API
    pub token: String,
}

impl std::fmt::Debug for TapConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TapConfig")
            .field("token", &"<redacted>")
            .finish()
    }
}

impl TapConfig {
    /// Create a config from a token, validating it is non-empty
    pub fn new(token: impl Into<String>) -> Result<Self> {
        let token = Some(token.into())
            .none_if_empty()
            .ok_or_else(|| Error::invalid_value(TOKEN_FIELD, "must not be empty"))?;
        Ok(Self { token })
    }

    /// Validate a raw JSON config object
    pub fn from_value(value: &JsonValue) -> Result<Self> {
        let object = value
            .as_object()
            .ok_or_else(|| Error::config("Config must be a JSON object"))?;

        for key in object.keys().filter(|k| k.as_str() != TOKEN_FIELD) {
            warn!("Ignoring unrecognized config option '{key}'");
        }

        match object.get(TOKEN_FIELD) {
            None | Some(JsonValue::Null) => Err(Error::missing_field(TOKEN_FIELD)),
            Some(JsonValue::String(token)) => Self::new(token.clone()),
            Some(other) => Err(Error::invalid_value(
                TOKEN_FIELD,
                format!("expected a string, got {other}"),
            )),
        }
    }

    /// Parse and validate an inline JSON config
    pub fn from_json(json: &str) -> Result<Self> {
        let value: JsonValue = serde_json::from_str(json)
            .map_err(|e| Error::config(format!("Invalid config JSON: {e}")))?;
        Self::from_value(&value)
    }

    /// Read, parse and validate a JSON config file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| Error::config(format!("Failed to read config file: {e}")))?;
        Self::from_json(&content)
    }

    /// Build the config from the environment
    pub fn from_env() -> Result<Self> {
        match std::env::var(TOKEN_ENV_VAR) {
            Ok(token) => Self::new(token),
            Err(_) => Err(Error::missing_field(TOKEN_FIELD)),
        }
    }

    /// Configuration specification shown by the `spec` command
    pub fn spec() -> SpecConfig {
        let mut properties = BTreeMap::new();
        properties.insert(
            TOKEN_FIELD.to_string(),
            PropertyConfig {
                property_type: "string".to_string(),
                title: Some("API Token".to_string()),
                description: Some("API Token for Turso API".to_string()),
                secret: true,
                required: true,
            },
        );
        SpecConfig { properties }
    }
}

// ============================================================================
// Spec Config
// ============================================================================

/// Configuration specification for connector setup
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpecConfig {
    /// Configuration properties
    #[serde(default)]
    pub properties: BTreeMap<String, PropertyConfig>,
}

impl SpecConfig {
    /// Names of the required properties
    pub fn required(&self) -> Vec<&str> {
        self.properties
            .iter()
            .filter(|(_, p)| p.required)
            .map(|(name, _)| name.as_str())
            .collect()
    }

    /// Render as a JSON schema document
    pub fn to_json_schema(&self) -> JsonValue {
        let properties: serde_json::Map<String, JsonValue> = self
            .properties
            .iter()
            .map(|(name, p)| {
                let mut prop = serde_json::json!({ "type": p.property_type });
                if let Some(title) = &p.title {
                    prop["title"] = title.clone().into();
                }
                if let Some(description) = &p.description {
                    prop["description"] = description.clone().into();
                }
                if p.secret {
                    prop["secret"] = true.into();
                }
                (name.clone(), prop)
            })
            .collect();

        serde_json::json!({
            "type": "object",
            "properties": properties,
            "required": self.required(),
        })
    }
}

/// Configuration property definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertyConfig {
    /// Property type
    #[serde(rename = "type")]
    pub property_type: String,

    /// Human-readable title
    #[serde(default)]
    pub title: Option<String>,

    /// Property description
    #[serde(default)]
    pub description: Option<String>,

    /// Whether this is a secret (should be masked)
    #[serde(default)]
    pub secret: bool,

    /// Whether this property is required
    #[serde(default)]
    pub required: bool,
}

// ============================================================================
// Catalog Types
// ============================================================================

/// Discovered catalog (available streams)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
    /// Available streams
    pub streams: Vec<CatalogStream>,
}

impl Catalog {
    /// Find a stream entry by name
    pub fn get(&self, name: &str) -> Option<&CatalogStream> {
        self.streams.iter().find(|s| s.tap_stream_id == name)
    }
}

/// Stream in the catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogStream {
    /// Stream identifier
    pub tap_stream_id: String,

    /// JSON schema for the stream
    #[serde(default)]
    pub schema: JsonValue,

    /// Primary key fields
    #[serde(default)]
    pub key_properties: Vec<String>,

    /// Replication key, if the stream supports incremental sync
    #[serde(default)]
    pub replication_key: Option<String>,

    /// Replication method used by the stream
    #[serde(default)]
    pub replication_method: SyncMode,

    /// Parent stream, for streams synced once per parent record
    #[serde(default)]
    pub parent_stream: Option<String>,
}
