//! Small shared vocabulary: JSON aliases, request method, sync mode,
//! log level and retry backoff shape.

use serde::{Deserialize, Serialize};

// ============================================================================
// JSON
// ============================================================================

pub type JsonValue = serde_json::Value;

/// One record as it flows from decoder to sink
pub type JsonObject = serde_json::Map<String, JsonValue>;

// ============================================================================
// Requests
// ============================================================================

/// Request method. Every Turso endpoint the tap touches is a read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    #[default]
    GET,
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::GET => reqwest::Method::GET,
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Method::GET => write!(f, "GET"),
        }
    }
}

// ============================================================================
// Sync Mode
// ============================================================================

/// How a stream decides which records to emit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncMode {
    /// Every record on every run
    #[default]
    FullRefresh,
    /// Records at or after the partition bookmark
    Incremental,
}

// ============================================================================
// Log Level
// ============================================================================

/// Verbosity of the stderr log. Messages on stdout are unaffected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
}

impl From<LogLevel> for tracing::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Debug => Self::DEBUG,
            LogLevel::Info => Self::INFO,
        }
    }
}

// ============================================================================
// Backoff Type
// ============================================================================

/// Growth of the delay between retry attempts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackoffType {
    Constant,
    Linear,
    /// Doubles per attempt, capped at the maximum backoff
    #[default]
    Exponential,
}

// ============================================================================
// Config helpers
// ============================================================================

/// Treats blank config strings as absent
pub trait OptionStringExt {
    fn none_if_empty(self) -> Option<String>;
}

impl OptionStringExt for Option<String> {
    fn none_if_empty(self) -> Option<String> {
        self.filter(|s| !s.trim().is_empty())
    }
}
