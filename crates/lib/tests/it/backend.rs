//! In-memory document store and its JSON file persistence.

use std::fs;

use serde_json::json;
use tempfile::TempDir;

use binderkit::backend::{BatchOp, DocumentStore, InMemory};

#[tokio::test]
async fn test_put_get_delete() {
    let store = InMemory::new();
    assert!(store.get_document("alice_b1").await.unwrap().is_none());

    store
        .put_document("alice_b1", json!({ "name": "Trades" }))
        .await
        .unwrap();
    let doc = store.get_document("alice_b1").await.unwrap().unwrap();
    assert_eq!(doc["name"], "Trades");

    store.delete_document("alice_b1").await.unwrap();
    assert!(store.is_empty().await);
    // Deleting again is fine.
    store.delete_document("alice_b1").await.unwrap();
}

#[tokio::test]
async fn test_write_batch_applies_in_order() {
    let store = InMemory::new();
    store.put_document("a", json!(1)).await.unwrap();

    store
        .write_batch(vec![
            BatchOp::Put {
                key: "b".to_string(),
                document: json!(2),
            },
            BatchOp::Delete {
                key: "a".to_string(),
            },
            BatchOp::Put {
                key: "b".to_string(),
                document: json!(3),
            },
        ])
        .await
        .unwrap();

    assert_eq!(store.keys().await, vec!["b".to_string()]);
    assert_eq!(store.get_document("b").await.unwrap(), Some(json!(3)));
}

#[tokio::test]
async fn test_save_and_load() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("binders.json");

    {
        let store = InMemory::new();
        store
            .put_document("alice_b1", json!({ "cards": { "0": { "cardId": "x" } } }))
            .await
            .unwrap();
        store.put_document("alice_b2", json!({})).await.unwrap();
        store.save_to_file(&path).await.unwrap();
    }
    assert!(path.exists());

    let loaded = InMemory::load_from_file(&path).await.unwrap();
    assert_eq!(loaded.len().await, 2);
    let doc = loaded.get_document("alice_b1").await.unwrap().unwrap();
    assert_eq!(doc["cards"]["0"]["cardId"], "x");
}

#[tokio::test]
async fn test_load_non_existent_file() {
    let dir = TempDir::new().unwrap();
    let store = InMemory::load_from_file(dir.path().join("missing.json"))
        .await
        .unwrap();
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn test_load_invalid_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("invalid.json");
    fs::write(&path, "{invalid json").unwrap();

    let err = InMemory::load_from_file(&path).await.unwrap_err();
    assert!(err.is_io_error());
}

#[tokio::test]
async fn test_load_rejects_unknown_version() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("future.json");
    fs::write(&path, r#"{ "_v": 7, "documents": {} }"#).unwrap();

    assert!(InMemory::load_from_file(&path).await.is_err());
}
