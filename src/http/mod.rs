//! HTTP module
//!
//! Request construction plus a client with retry, rate limiting, and backoff.
//!
//! # Features
//!
//! - **Pure request building**: [`RequestBuilder`] resolves path templates,
//!   query parameters and headers without touching the network
//! - **Automatic Retries**: 429, 5xx, timeouts and connect errors, with backoff
//! - **Rate Limiting**: Token bucket rate limiter using governor

mod client;
mod rate_limit;
mod request;

pub use client::{HttpClient, HttpClientConfig, HttpClientConfigBuilder};
pub use rate_limit::{RateLimiter, RateLimiterConfig};
pub use request::{default_user_agent, PreparedRequest, RequestBuilder, DEFAULT_BASE_URL};

#[cfg(test)]
mod tests;
