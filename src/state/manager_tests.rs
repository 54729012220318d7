//! Tests for StateManager

use super::*;
use crate::context::Context;
use crate::error::Error;
use pretty_assertions::assert_eq;
use serde_json::json;
use tempfile::tempdir;

fn acme() -> Context {
    Context::from_pairs([("organization_name", "acme")])
}

// ============================================================================
// Construction Tests
// ============================================================================

#[test]
fn test_state_manager_in_memory() {
    let manager = StateManager::in_memory();
    assert!(manager.is_in_memory());
    assert!(manager.path().is_none());
}

#[test]
fn test_from_file_missing_is_empty() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("state.json");

    let manager = StateManager::from_file(&path).unwrap();
    assert!(!manager.is_in_memory());
    assert_eq!(manager.path(), Some(path.as_path()));
}

#[test]
fn test_from_file_invalid_json() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("state.json");
    std::fs::write(&path, "{not json").unwrap();

    let err = StateManager::from_file(&path).unwrap_err();
    assert!(matches!(err, Error::State { .. }));
}

#[test]
fn test_from_json_invalid() {
    let err = StateManager::from_json("[1, 2").unwrap_err();
    assert!(matches!(err, Error::State { .. }));
}

// ============================================================================
// Bookmark Tests
// ============================================================================

#[tokio::test]
async fn test_get_set_bookmark() {
    let manager = StateManager::in_memory();
    assert!(manager.get_bookmark("audit_logs", &acme()).await.is_none());

    manager
        .set_bookmark("audit_logs", &acme(), "created_at", json!("2024-03-01T10:00:00Z"))
        .await;

    assert_eq!(
        manager.get_bookmark("audit_logs", &acme()).await,
        Some(json!("2024-03-01T10:00:00Z"))
    );
}

#[tokio::test]
async fn test_from_json_loads_bookmarks() {
    let manager = StateManager::from_json(
        r#"{"streams": {"audit_logs": {"partitions": {"organization_name=acme": {
            "context": {"organization_name": "acme"},
            "replication_key": "created_at",
            "cursor": "2024-02-01T00:00:00Z"}}}}}"#,
    )
    .unwrap();

    assert!(manager.is_in_memory());
    assert_eq!(
        manager.get_bookmark("audit_logs", &acme()).await,
        Some(json!("2024-02-01T00:00:00Z"))
    );
}

#[tokio::test]
async fn test_clones_share_state() {
    let manager = StateManager::in_memory();
    let clone = manager.clone();

    clone
        .set_bookmark("audit_logs", &acme(), "created_at", json!("2024-01-01T00:00:00Z"))
        .await;
    assert!(manager.get_bookmark("audit_logs", &acme()).await.is_some());
}

// ============================================================================
// Persistence Tests
// ============================================================================

#[tokio::test]
async fn test_save_and_reload() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("state.json");

    let manager = StateManager::from_file(&path).unwrap();
    manager
        .set_bookmark("audit_logs", &acme(), "created_at", json!("2024-03-01T10:00:00Z"))
        .await;
    manager.save().await.unwrap();

    assert!(path.exists());
    assert!(!path.with_extension("tmp").exists());

    let reloaded = StateManager::from_file(&path).unwrap();
    assert_eq!(reloaded.snapshot().await, manager.snapshot().await);
    assert_eq!(
        reloaded.get_bookmark("audit_logs", &acme()).await,
        Some(json!("2024-03-01T10:00:00Z"))
    );
}

#[tokio::test]
async fn test_save_in_memory_is_noop() {
    let manager = StateManager::in_memory();
    manager
        .set_bookmark("audit_logs", &acme(), "created_at", json!(1))
        .await;
    manager.save().await.unwrap();
}

#[tokio::test]
async fn test_empty_file_is_empty_state() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("state.json");
    std::fs::write(&path, "").unwrap();

    let manager = StateManager::from_file(&path).unwrap();
    assert_eq!(manager.to_value().await, json!({"streams": {}}));
}
