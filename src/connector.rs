//! Connector trait and the Turso tap
//!
//! Defines the `Connector` contract (spec, check, discover, read) and
//! `TursoTap`, which wires configuration, HTTP client, stream registry and
//! sync engine together.

use crate::auth::{AuthConfig, Authenticator};
use crate::config::{Catalog, SpecConfig, TapConfig};
use crate::context::Context;
use crate::engine::{SyncConfig, SyncEngine, SyncStats};
use crate::error::Result;
use crate::http::{HttpClient, HttpClientConfig, RequestBuilder};
use crate::output::RecordSink;
use crate::state::StateManager;
use crate::streams;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{info, warn};

/// Endpoint probed by `check`
const CHECK_PATH: &str = "/v1/organizations";

// ============================================================================
// Connector Spec
// ============================================================================

/// Connector specification returned by spec()
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectorSpec {
    /// Connector name
    pub name: String,

    /// Crate version
    pub version: String,

    /// Configuration specification
    pub spec: SpecConfig,
}

impl ConnectorSpec {
    /// Specification of this tap
    pub fn current() -> Self {
        Self {
            name: crate::NAME.to_string(),
            version: crate::VERSION.to_string(),
            spec: TapConfig::spec(),
        }
    }
}

// ============================================================================
// Check Result
// ============================================================================

/// Result of a connection check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckResult {
    /// Whether the check succeeded
    pub success: bool,

    /// Error message if failed
    pub message: Option<String>,
}

impl CheckResult {
    /// Create a successful check result
    pub fn success() -> Self {
        Self {
            success: true,
            message: None,
        }
    }

    /// Create a failed check result
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
        }
    }
}

// ============================================================================
// Connector Trait
// ============================================================================

/// Core trait the tap implements
#[async_trait]
pub trait Connector: Send + Sync {
    /// Returns the connector specification
    fn spec(&self) -> ConnectorSpec;

    /// Tests if the credentials are accepted by the API
    async fn check(&self) -> Result<CheckResult>;

    /// Lists available streams
    async fn discover(&self) -> Result<Catalog>;

    /// Syncs the configured streams into `sink`
    async fn read(
        &self,
        sink: &mut dyn RecordSink,
        state: StateManager,
        sync: SyncConfig,
    ) -> Result<SyncStats>;
}

// ============================================================================
// Turso Tap
// ============================================================================

/// The Turso platform API tap
#[derive(Debug, Clone)]
pub struct TursoTap {
    config: TapConfig,
    http: HttpClientConfig,
}

impl TursoTap {
    /// Create a tap against the public Turso API
    pub fn new(config: TapConfig) -> Self {
        Self::with_http_config(config, HttpClientConfig::default())
    }

    /// Create a tap with custom HTTP settings (base URL, retries, rate limit)
    pub fn with_http_config(config: TapConfig, http: HttpClientConfig) -> Self {
        Self { config, http }
    }

    /// Tap configuration
    pub fn config(&self) -> &TapConfig {
        &self.config
    }

    fn client(&self) -> Result<HttpClient> {
        HttpClient::new(self.http.clone())
    }

    fn requests(&self) -> Result<RequestBuilder> {
        RequestBuilder::new(
            self.http.base_url.clone(),
            Authenticator::new(AuthConfig::from(&self.config)),
            self.http.user_agent.clone(),
        )
    }

    /// Build a sync engine over every stream
    pub fn engine(&self, state: StateManager, sync: SyncConfig) -> Result<SyncEngine> {
        Ok(
            SyncEngine::new(self.client()?, self.requests()?, streams::registry()?, state)?
                .with_config(sync),
        )
    }
}

#[async_trait]
impl Connector for TursoTap {
    fn spec(&self) -> ConnectorSpec {
        ConnectorSpec::current()
    }

    async fn check(&self) -> Result<CheckResult> {
        let client = self.client()?;
        let request = self
            .requests()?
            .build(CHECK_PATH, &Context::empty(), BTreeMap::new())?;

        match client.execute_json(&request).await {
            Ok(_) => {
                info!("connection check succeeded");
                Ok(CheckResult::success())
            }
            Err(e) => {
                warn!(error = %e, "connection check failed");
                Ok(CheckResult::failure(e.to_string()))
            }
        }
    }

    async fn discover(&self) -> Result<Catalog> {
        Ok(streams::registry()?.catalog())
    }

    async fn read(
        &self,
        sink: &mut dyn RecordSink,
        state: StateManager,
        sync: SyncConfig,
    ) -> Result<SyncStats> {
        self.engine(state, sync)?.run(sink).await
    }
}
