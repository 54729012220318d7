//! Authentication module
//!
//! Supports: Bearer token
//!
//! The token comes straight from configuration; it is never fetched or
//! refreshed by the tap. The `Authenticator` turns it into request headers.

mod authenticator;
mod types;

pub use authenticator::Authenticator;
pub use types::AuthConfig;

#[cfg(test)]
mod tests;
