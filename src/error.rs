//! Error types for tap-tursoapi
//!
//! One `Error` enum covers configuration, transport, decoding, state and
//! stream wiring. Every fallible function in the crate returns
//! [`Result<T>`].

use thiserror::Error;

/// Everything that can stop a tap command
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Configuration
    // ============================================================================
    /// Generic configuration problem (bad JSON, unknown stream selection)
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// A required option such as `token` is absent
    #[error("Missing required config field: {field}")]
    MissingConfigField { field: String },

    /// An option is present but unusable
    #[error("Invalid config value for '{field}': {message}")]
    InvalidConfigValue { field: String, message: String },

    #[error("Invalid JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    // ============================================================================
    // Turso API transport
    // ============================================================================
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success status after the retry policy gave up (or never applied)
    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("Rate limited by the API, retry after {retry_after_seconds}s")]
    RateLimited { retry_after_seconds: u64 },

    #[error("Request timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    /// Connection kept failing through every retry
    #[error("Gave up after {max_retries} retries: {last}")]
    MaxRetriesExceeded { max_retries: u32, last: String },

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ============================================================================
    // Response data
    // ============================================================================
    /// A record selector expression failed to compile
    #[error("JSONPath error: {message}")]
    JsonPath { message: String },

    /// A response body could not be turned into records
    #[error("Failed to decode response: {message}")]
    Decode { message: String },

    #[error("Record in stream '{stream}' is missing primary key '{key}'")]
    MissingPrimaryKey { stream: String, key: String },

    // ============================================================================
    // Bookmarks
    // ============================================================================
    /// Reading, parsing or persisting the state document failed
    #[error("State error: {message}")]
    State { message: String },

    // ============================================================================
    // Stream wiring
    // ============================================================================
    /// A stream name that no definition carries
    #[error("Unknown stream '{stream}'")]
    StreamNotFound { stream: String },

    /// A path placeholder or child context field had no value
    #[error("Undefined variable in template: {variable}")]
    UndefinedVariable { variable: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Foreign error wrapped with context by [`ResultExt`]
    #[error("{0}")]
    Other(String),
}

impl Error {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingConfigField {
            field: field.into(),
        }
    }

    pub fn invalid_value(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfigValue {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn http_status(status: u16, body: impl Into<String>) -> Self {
        Self::HttpStatus {
            status,
            body: body.into(),
        }
    }

    pub fn json_path(message: impl Into<String>) -> Self {
        Self::JsonPath {
            message: message.into(),
        }
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    pub fn missing_primary_key(stream: impl Into<String>, key: impl Into<String>) -> Self {
        Self::MissingPrimaryKey {
            stream: stream.into(),
            key: key.into(),
        }
    }

    pub fn undefined_var(variable: impl Into<String>) -> Self {
        Self::UndefinedVariable {
            variable: variable.into(),
        }
    }

    pub fn state(message: impl Into<String>) -> Self {
        Self::State {
            message: message.into(),
        }
    }

    /// Whether the failure is transient on the API side
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Http(_) | Error::RateLimited { .. } | Error::Timeout { .. } => true,
            Error::HttpStatus { status, .. } => is_retryable_status(*status),
            _ => false,
        }
    }

    /// Whether the failure happened before any request could be made
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            Error::Config { .. }
                | Error::MissingConfigField { .. }
                | Error::InvalidConfigValue { .. }
                | Error::StreamNotFound { .. }
        )
    }
}

/// Statuses worth another attempt: throttling and gateway/server trouble
pub(crate) fn is_retryable_status(status: u16) -> bool {
    matches!(status, 429 | 500 | 502 | 503 | 504)
}

/// Result type alias for the tap
pub type Result<T> = std::result::Result<T, Error>;

/// Attach a message to an error from another crate
pub trait ResultExt<T> {
    fn context(self, message: impl Into<String>) -> Result<T>;

    /// Lazy variant of [`ResultExt::context`]
    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T>;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, message: impl Into<String>) -> Result<T> {
        self.with_context(|| message.into())
    }

    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T> {
        self.map_err(|e| Error::Other(format!("{}: {}", f(), e.into())))
    }
}
