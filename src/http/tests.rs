//! Tests for the HTTP module

use super::*;
use crate::auth::{AuthConfig, Authenticator};
use crate::context::Context;
use crate::error::Error;
use crate::types::{BackoffType, Method};
use pretty_assertions::assert_eq;
use std::collections::BTreeMap;
use std::time::Duration;
use test_case::test_case;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn builder(base_url: &str) -> RequestBuilder {
    RequestBuilder::new(
        base_url,
        Authenticator::new(AuthConfig::bearer("secret-token")),
        "tap-tursoapi/test",
    )
    .unwrap()
}

fn fast_client(base_url: &str, max_retries: u32) -> HttpClient {
    let config = HttpClientConfig::builder()
        .base_url(base_url)
        .max_retries(max_retries)
        .backoff(
            BackoffType::Constant,
            Duration::from_millis(1),
            Duration::from_millis(10),
        )
        .no_rate_limit()
        .build();
    HttpClient::new(config).unwrap()
}

// ============================================================================
// Config Tests
// ============================================================================

#[test]
fn test_http_client_config_default() {
    let config = HttpClientConfig::default();
    assert_eq!(config.base_url, "https://api.turso.tech");
    assert_eq!(config.timeout, Duration::from_secs(30));
    assert_eq!(config.max_retries, 3);
    assert!(config.rate_limit.is_some());
    assert!(config.user_agent.starts_with("tap-tursoapi/"));
}

#[test]
fn test_http_client_config_builder() {
    let config = HttpClientConfig::builder()
        .base_url("http://localhost:1234")
        .timeout(Duration::from_secs(5))
        .max_retries(1)
        .backoff(
            BackoffType::Linear,
            Duration::from_millis(200),
            Duration::from_secs(30),
        )
        .rate_limit(RateLimiterConfig::new(2, 2))
        .user_agent("custom/1.0")
        .build();

    assert_eq!(config.base_url, "http://localhost:1234");
    assert_eq!(config.timeout, Duration::from_secs(5));
    assert_eq!(config.max_retries, 1);
    assert_eq!(config.backoff_type, BackoffType::Linear);
    assert_eq!(config.rate_limit, Some(RateLimiterConfig::new(2, 2)));
    assert_eq!(config.user_agent, "custom/1.0");
}

#[test]
fn test_calculate_backoff() {
    let exponential = HttpClient::new(
        HttpClientConfig::builder()
            .backoff(
                BackoffType::Exponential,
                Duration::from_millis(100),
                Duration::from_millis(500),
            )
            .build(),
    )
    .unwrap();
    assert_eq!(exponential.calculate_backoff(0), Duration::from_millis(100));
    assert_eq!(exponential.calculate_backoff(1), Duration::from_millis(200));
    assert_eq!(exponential.calculate_backoff(2), Duration::from_millis(400));
    assert_eq!(exponential.calculate_backoff(5), Duration::from_millis(500));

    let linear = HttpClient::new(
        HttpClientConfig::builder()
            .backoff(
                BackoffType::Linear,
                Duration::from_millis(100),
                Duration::from_secs(10),
            )
            .build(),
    )
    .unwrap();
    assert_eq!(linear.calculate_backoff(2), Duration::from_millis(300));

    let constant = HttpClient::new(
        HttpClientConfig::builder()
            .backoff(
                BackoffType::Constant,
                Duration::from_millis(100),
                Duration::from_secs(10),
            )
            .no_rate_limit()
            .build(),
    )
    .unwrap();
    assert_eq!(constant.calculate_backoff(7), Duration::from_millis(100));
    assert!(!constant.has_rate_limiter());
}

// ============================================================================
// Request Builder Tests
// ============================================================================

#[test]
fn test_build_request_substitutes_context() {
    let ctx = Context::from_pairs([("organization_name", "acme")]);
    let request = builder("https://api.turso.tech")
        .build(
            "/v1/organizations/{organization_name}/groups",
            &ctx,
            BTreeMap::new(),
        )
        .unwrap();

    assert_eq!(request.method, Method::GET);
    assert_eq!(
        request.url.as_str(),
        "https://api.turso.tech/v1/organizations/acme/groups"
    );
    assert!(request.query.is_empty());
    assert_eq!(
        request.headers.get("authorization"),
        Some(&"Bearer secret-token".to_string())
    );
    assert_eq!(
        request.headers.get("user-agent"),
        Some(&"tap-tursoapi/test".to_string())
    );
}

#[test]
fn test_build_request_is_deterministic() {
    let ctx = Context::from_pairs([("organization_name", "acme")]);
    let query: BTreeMap<String, String> = [("page", "3"), ("page_size", "500")]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    let b = builder("https://api.turso.tech/");

    let first = b
        .build("/v1/organizations/{organization_name}/audit-logs", &ctx, query.clone())
        .unwrap();
    let second = b
        .build("/v1/organizations/{organization_name}/audit-logs", &ctx, query)
        .unwrap();

    assert_eq!(first, second);
    assert_eq!(
        first.full_url().as_str(),
        "https://api.turso.tech/v1/organizations/acme/audit-logs?page=3&page_size=500"
    );
}

#[test_case("a/b", "a%2Fb"; "slash")]
#[test_case("a?x=1", "a%3Fx=1"; "question mark")]
#[test_case("a#b", "a%23b"; "hash")]
#[test_case("50% off", "50%25%20off"; "percent and space")]
fn test_build_request_encodes_context_values(value: &str, encoded: &str) {
    let ctx = Context::from_pairs([("organization_name", value)]);
    let request = builder("https://api.turso.tech")
        .build(
            "/v1/organizations/{organization_name}/groups",
            &ctx,
            BTreeMap::new(),
        )
        .unwrap();

    assert_eq!(
        request.url.as_str(),
        format!("https://api.turso.tech/v1/organizations/{encoded}/groups")
    );
    assert_eq!(request.url.query(), None);
    assert_eq!(request.url.fragment(), None);
    assert_eq!(request.url.path_segments().unwrap().count(), 4);
}

#[test]
fn test_build_request_keeps_base_path() {
    let request = builder("http://localhost:8080/proxy/")
        .build("/v1/locations", &Context::empty(), BTreeMap::new())
        .unwrap();
    assert_eq!(request.url.as_str(), "http://localhost:8080/proxy/v1/locations");
}

#[test]
fn test_build_request_missing_placeholder() {
    let err = builder("https://api.turso.tech")
        .build(
            "/v1/organizations/{organization_name}/groups",
            &Context::empty(),
            BTreeMap::new(),
        )
        .unwrap_err();
    assert!(matches!(err, Error::UndefinedVariable { .. }));
}

#[test]
fn test_builder_rejects_invalid_base_url() {
    let result = RequestBuilder::new("not a url", Authenticator::default(), "ua");
    assert!(matches!(result, Err(Error::InvalidUrl(_))));
}

#[test]
fn test_build_request_without_auth() {
    let b = RequestBuilder::new("https://api.turso.tech", Authenticator::default(), "ua").unwrap();
    let request = b.build("/v1/locations", &Context::empty(), BTreeMap::new()).unwrap();
    assert!(!request.headers.contains_key("authorization"));
    assert_eq!(request.full_url().as_str(), "https://api.turso.tech/v1/locations");
}

// ============================================================================
// Client Tests
// ============================================================================

#[tokio::test]
async fn test_execute_sends_headers_and_query() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/organizations/acme/audit-logs"))
        .and(query_param("page", "2"))
        .and(query_param("page_size", "500"))
        .and(header("authorization", "Bearer secret-token"))
        .and(header("user-agent", "tap-tursoapi/test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "audit_logs": []
        })))
        .expect(1)
        .mount(&server)
        .await;

    let ctx = Context::from_pairs([("organization_name", "acme")]);
    let query: BTreeMap<String, String> = [("page", "2"), ("page_size", "500")]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    let request = builder(&server.uri())
        .build("/v1/organizations/{organization_name}/audit-logs", &ctx, query)
        .unwrap();

    let body = fast_client(&server.uri(), 0)
        .execute_json(&request)
        .await
        .unwrap();
    assert_eq!(body, serde_json::json!({"audit_logs": []}));
}

#[tokio::test]
async fn test_execute_retries_server_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/locations"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/locations"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "locations": {"ams": "Amsterdam"}
        })))
        .mount(&server)
        .await;

    let request = builder(&server.uri())
        .build("/v1/locations", &Context::empty(), BTreeMap::new())
        .unwrap();
    let body = fast_client(&server.uri(), 3)
        .execute_json(&request)
        .await
        .unwrap();
    assert_eq!(body["locations"]["ams"], "Amsterdam");
}

#[tokio::test]
async fn test_execute_server_error_after_retries() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/locations"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .expect(3)
        .mount(&server)
        .await;

    let request = builder(&server.uri())
        .build("/v1/locations", &Context::empty(), BTreeMap::new())
        .unwrap();
    let err = fast_client(&server.uri(), 2)
        .execute(&request)
        .await
        .unwrap_err();

    match err {
        Error::HttpStatus { status, body } => {
            assert_eq!(status, 500);
            assert_eq!(body, "boom");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_execute_client_error_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/organizations"))
        .respond_with(ResponseTemplate::new(401).set_body_string("unauthorized"))
        .expect(1)
        .mount(&server)
        .await;

    let request = builder(&server.uri())
        .build("/v1/organizations", &Context::empty(), BTreeMap::new())
        .unwrap();
    let err = fast_client(&server.uri(), 3)
        .execute(&request)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::HttpStatus { status: 401, .. }));
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn test_execute_rate_limited_then_ok() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/organizations"))
        .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "0"))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/organizations"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .mount(&server)
        .await;

    let request = builder(&server.uri())
        .build("/v1/organizations", &Context::empty(), BTreeMap::new())
        .unwrap();
    let body = fast_client(&server.uri(), 2)
        .execute_json(&request)
        .await
        .unwrap();
    assert_eq!(body, serde_json::json!([]));
}

#[tokio::test]
async fn test_execute_rate_limited_exhausted() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/organizations"))
        .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "0"))
        .mount(&server)
        .await;

    let request = builder(&server.uri())
        .build("/v1/organizations", &Context::empty(), BTreeMap::new())
        .unwrap();
    let err = fast_client(&server.uri(), 1)
        .execute(&request)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        Error::RateLimited {
            retry_after_seconds: 0
        }
    ));
}

/// Serves a response whose body never finishes on the first connection and
/// a complete one afterwards
async fn stalled_body_then_ok(body: &'static str) -> String {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let mut held = Vec::new();
        for connection in 0u32.. {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 4096];
            let _ = socket.read(&mut buf).await;
            if connection == 0 {
                let head = format!(
                    "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\n\r\n{{",
                    body.len()
                );
                socket.write_all(head.as_bytes()).await.unwrap();
                held.push(socket);
            } else {
                let response = format!(
                    "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                    body.len()
                );
                socket.write_all(response.as_bytes()).await.unwrap();
            }
        }
    });
    format!("http://{addr}")
}

#[tokio::test]
async fn test_execute_retries_stalled_body() {
    let base = stalled_body_then_ok(r#"{"locations":{"ams":"Amsterdam"}}"#).await;
    let client = HttpClient::new(
        HttpClientConfig::builder()
            .base_url(base.as_str())
            .timeout(Duration::from_millis(200))
            .max_retries(1)
            .backoff(
                BackoffType::Constant,
                Duration::from_millis(1),
                Duration::from_millis(10),
            )
            .no_rate_limit()
            .build(),
    )
    .unwrap();

    let request = builder(&base)
        .build("/v1/locations", &Context::empty(), BTreeMap::new())
        .unwrap();
    let body = client.execute_json(&request).await.unwrap();
    assert_eq!(body["locations"]["ams"], "Amsterdam");
}

#[tokio::test]
async fn test_execute_stalled_body_exhausts_as_timeout() {
    let base = stalled_body_then_ok(r#"{"locations":{}}"#).await;
    let client = HttpClient::new(
        HttpClientConfig::builder()
            .base_url(base.as_str())
            .timeout(Duration::from_millis(200))
            .max_retries(0)
            .no_rate_limit()
            .build(),
    )
    .unwrap();

    let request = builder(&base)
        .build("/v1/locations", &Context::empty(), BTreeMap::new())
        .unwrap();
    let err = client.execute(&request).await.unwrap_err();
    assert!(matches!(err, Error::Timeout { timeout_ms: 200 }));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_execute_json_invalid_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/locations"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
        .mount(&server)
        .await;

    let request = builder(&server.uri())
        .build("/v1/locations", &Context::empty(), BTreeMap::new())
        .unwrap();
    let err = fast_client(&server.uri(), 0)
        .execute_json(&request)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Decode { .. }));
}
