//! Authenticator implementation
//!
//! Turns the auth configuration into HTTP headers.

use super::types::AuthConfig;
use reqwest::header::AUTHORIZATION;
use std::collections::BTreeMap;

/// Authenticator handles applying authentication to HTTP requests
#[derive(Debug, Clone, Default)]
pub struct Authenticator {
    /// Auth configuration
    config: AuthConfig,
}

impl Authenticator {
    /// Create a new authenticator with the given config
    pub fn new(config: AuthConfig) -> Self {
        Self { config }
    }

    /// Get the auth configuration
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    /// Headers to attach to every request
    ///
    /// Pure: the same config always yields the same headers.
    pub fn headers(&self) -> BTreeMap<String, String> {
        let mut headers = BTreeMap::new();
        match &self.config {
            AuthConfig::None => {}
            AuthConfig::Bearer { token } => {
                headers.insert(AUTHORIZATION.as_str().to_string(), format!("Bearer {token}"));
            }
        }
        headers
    }
}
