//! Tests for the auth module

use super::*;
use crate::config::TapConfig;

#[test]
fn test_no_auth_headers() {
    let auth = Authenticator::new(AuthConfig::None);
    assert!(auth.headers().is_empty());
}

#[test]
fn test_bearer_headers() {
    let auth = Authenticator::new(AuthConfig::bearer("my-token"));
    let headers = auth.headers();

    assert_eq!(headers.len(), 1);
    assert_eq!(
        headers.get("authorization"),
        Some(&"Bearer my-token".to_string())
    );
}

#[test]
fn test_bearer_from_tap_config() {
    let config = TapConfig::new("cfg-token").unwrap();
    let auth = Authenticator::new(AuthConfig::from(&config));
    assert_eq!(auth.config(), &AuthConfig::bearer("cfg-token"));
}

#[test]
fn test_debug_redacts_token() {
    let debug = format!("{:?}", AuthConfig::bearer("secret-value"));
    assert!(!debug.contains("secret-value"));
}
