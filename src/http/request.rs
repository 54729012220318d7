//! Request construction
//!
//! [`RequestBuilder`] turns a path template, a [`Context`] and paginator
//! query parameters into a [`PreparedRequest`]. Building is pure: nothing is
//! sent, and the same inputs always produce an identical request.

use crate::auth::Authenticator;
use crate::context::Context;
use crate::error::{Error, Result};
use crate::template;
use crate::types::Method;
use std::collections::BTreeMap;
use url::Url;

/// Production API host
pub const DEFAULT_BASE_URL: &str = "https://api.turso.tech";

/// `User-Agent` sent with every request
pub fn default_user_agent() -> String {
    format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
}

/// A fully resolved request, ready to be executed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedRequest {
    /// HTTP method
    pub method: Method,
    /// Absolute URL without query string
    pub url: Url,
    /// Query parameters, in key order
    pub query: BTreeMap<String, String>,
    /// Headers with lowercase names, in key order
    pub headers: BTreeMap<String, String>,
}

impl PreparedRequest {
    /// Absolute URL including the encoded query string
    pub fn full_url(&self) -> Url {
        let mut url = self.url.clone();
        if !self.query.is_empty() {
            url.query_pairs_mut().extend_pairs(self.query.iter());
        }
        url
    }
}

/// Builds requests against one API host
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    base_url: String,
    authenticator: Authenticator,
    user_agent: String,
}

impl RequestBuilder {
    /// Create a builder, validating the base URL
    pub fn new(
        base_url: impl Into<String>,
        authenticator: Authenticator,
        user_agent: impl Into<String>,
    ) -> Result<Self> {
        let base_url = base_url.into();
        Url::parse(&base_url)?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            authenticator,
            user_agent: user_agent.into(),
        })
    }

    /// Base URL requests are resolved against
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build a GET request for `path_template` rendered with `ctx`
    pub fn build(
        &self,
        path_template: &str,
        ctx: &Context,
        query: BTreeMap<String, String>,
    ) -> Result<PreparedRequest> {
        let segments = template::render_segments(path_template, ctx)?;
        let mut url = Url::parse(&self.base_url)?;
        url.path_segments_mut()
            .map_err(|()| Error::invalid_value("base_url", "cannot carry a path"))?
            .pop_if_empty()
            .extend(&segments);

        let mut headers = self.authenticator.headers();
        headers.insert("user-agent".to_string(), self.user_agent.clone());

        Ok(PreparedRequest {
            method: Method::GET,
            url,
            query,
            headers,
        })
    }
}
