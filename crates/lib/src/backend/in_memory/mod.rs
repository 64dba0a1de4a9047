//! In-memory document store.
//!
//! Suitable for tests, for the local storage port of a workspace, and for the
//! CLI, which saves the whole store to a JSON file between runs.

mod persistence;

use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use super::{BatchOp, DocumentStore};
use crate::Result;

/// A `HashMap`-backed [`DocumentStore`].
#[derive(Debug, Default)]
pub struct InMemory {
    pub(crate) documents: RwLock<HashMap<String, Value>>,
}

impl InMemory {
    /// Creates a new, empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Keys of every stored document, sorted.
    pub async fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.documents.read().await.keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Number of stored documents.
    pub async fn len(&self) -> usize {
        self.documents.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.documents.read().await.is_empty()
    }

    /// Saves every document to `path` as JSON.
    pub async fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        persistence::save_to_file(self, path).await
    }

    /// Loads a store from `path`. A missing file yields an empty store.
    pub async fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        persistence::load_from_file(path).await
    }
}

#[async_trait]
impl DocumentStore for InMemory {
    async fn get_document(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.documents.read().await.get(key).cloned())
    }

    async fn put_document(&self, key: &str, document: Value) -> Result<()> {
        self.documents
            .write()
            .await
            .insert(key.to_string(), document);
        Ok(())
    }

    async fn delete_document(&self, key: &str) -> Result<()> {
        self.documents.write().await.remove(key);
        Ok(())
    }

    async fn write_batch(&self, ops: Vec<BatchOp>) -> Result<()> {
        // Single write lock: readers never observe a partial batch.
        let mut documents = self.documents.write().await;
        for op in ops {
            match op {
                BatchOp::Put { key, document } => {
                    documents.insert(key, document);
                }
                BatchOp::Delete { key } => {
                    documents.remove(&key);
                }
            }
        }
        Ok(())
    }
}
