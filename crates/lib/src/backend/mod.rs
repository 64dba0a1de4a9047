//! Document store port.
//!
//! The engine never talks to a concrete persistence service. Both the remote
//! store used by the sync coordinator and the local store used by the
//! workspace are injected as [`DocumentStore`] trait objects, so tests can
//! substitute in-memory fakes.
//!
//! Documents are opaque JSON values addressed by string keys.

mod errors;
pub mod in_memory;

use async_trait::async_trait;
use serde_json::Value;

pub use errors::BackendError;
pub use in_memory::InMemory;

use crate::Result;

/// One operation of an atomic [`DocumentStore::write_batch`].
#[derive(Debug, Clone, PartialEq)]
pub enum BatchOp {
    Put { key: String, document: Value },
    Delete { key: String },
}

impl BatchOp {
    pub fn key(&self) -> &str {
        match self {
            BatchOp::Put { key, .. } | BatchOp::Delete { key } => key,
        }
    }
}

/// Key/value document storage.
///
/// Implementations must be `Send + Sync` so a store can be shared between a
/// workspace and in-flight sync tasks.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch a document. `Ok(None)` means the key has never been written or
    /// was deleted.
    async fn get_document(&self, key: &str) -> Result<Option<Value>>;

    /// Create or replace a document.
    async fn put_document(&self, key: &str, document: Value) -> Result<()>;

    /// Delete a document. Deleting a missing key is not an error.
    async fn delete_document(&self, key: &str) -> Result<()>;

    /// Apply every operation or none of them.
    async fn write_batch(&self, ops: Vec<BatchOp>) -> Result<()>;
}
