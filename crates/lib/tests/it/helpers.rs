use std::sync::{
    Arc, Mutex,
    atomic::{AtomicBool, AtomicUsize, Ordering},
};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Notify;

use binderkit::{
    Binder, CardData, CardEntry, FixedClock, GridRegistry, Result,
    backend::{BackendError, BatchOp, DocumentStore, InMemory},
    store::{PositionalCardStore, Snapshot},
};

// Re-export tokio test macro for convenience
pub use tokio;

/// A card whose id and name are both `name`.
pub fn card(name: &str) -> CardEntry {
    CardEntry::new(name, CardData::named(name))
}

pub fn test_clock() -> Arc<FixedClock> {
    Arc::new(FixedClock::default())
}

/// A store holding the given cards, addressable up to `extent`.
pub fn store_with(cards: &[(usize, &str)], extent: usize) -> PositionalCardStore {
    let snapshot = Snapshot::from_cards(cards.iter().map(|(p, name)| (*p, card(name))))
        .expect("cards should have distinct instances")
        .with_extent(extent);
    PositionalCardStore::from_snapshot(snapshot, 0, test_clock())
}

/// `(position, card name)` for every occupied slot.
pub fn layout(store: &PositionalCardStore) -> Vec<(usize, String)> {
    store
        .iter()
        .map(|(p, e)| (p, e.name().to_string()))
        .collect()
}

/// Asserts that no instance id appears at two positions.
pub fn assert_unique_instances(store: &PositionalCardStore) {
    let mut seen = std::collections::HashSet::new();
    for (position, entry) in store.iter() {
        assert!(
            seen.insert(entry.instance_id()),
            "instance {} appears twice (again at {position})",
            entry.instance_id()
        );
    }
}

/// A fresh 3x3 binder owned by `alice`.
pub fn new_binder(clock: Arc<FixedClock>) -> Binder {
    Binder::create("alice", "Trade binder", "3x3", &GridRegistry::default(), clock)
        .expect("3x3 is a registered grid")
}

/// How a [`FlakyStore`] fails requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Failure {
    Network,
    Permission,
}

/// An in-memory store that can be told to fail or to hold requests until
/// released.
#[derive(Debug, Default)]
pub struct FlakyStore {
    pub inner: InMemory,
    failure: Mutex<Option<Failure>>,
    stall_reads: AtomicBool,
    stall_writes: AtomicBool,
    release: Notify,
    writes: AtomicUsize,
}

impl FlakyStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn fail_with(&self, failure: Option<Failure>) {
        *self.failure.lock().unwrap() = failure;
    }

    pub fn stall_reads(&self) {
        self.stall_reads.store(true, Ordering::SeqCst);
    }

    pub fn stall_writes(&self) {
        self.stall_writes.store(true, Ordering::SeqCst);
    }

    /// Let one stalled request through and stop stalling new ones.
    pub fn release(&self) {
        self.stall_reads.store(false, Ordering::SeqCst);
        self.stall_writes.store(false, Ordering::SeqCst);
        self.release.notify_one();
    }

    /// Number of successful writes.
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    fn check(&self, key: &str) -> Result<()> {
        match *self.failure.lock().unwrap() {
            Some(Failure::Network) => Err(BackendError::Network {
                reason: "connection reset".to_string(),
            }
            .into()),
            Some(Failure::Permission) => Err(BackendError::PermissionDenied {
                key: key.to_string(),
                reason: "read-only share".to_string(),
            }
            .into()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl DocumentStore for FlakyStore {
    async fn get_document(&self, key: &str) -> Result<Option<Value>> {
        if self.stall_reads.load(Ordering::SeqCst) {
            self.release.notified().await;
        }
        self.check(key)?;
        self.inner.get_document(key).await
    }

    async fn put_document(&self, key: &str, document: Value) -> Result<()> {
        if self.stall_writes.load(Ordering::SeqCst) {
            self.release.notified().await;
        }
        self.check(key)?;
        self.inner.put_document(key, document).await?;
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn delete_document(&self, key: &str) -> Result<()> {
        self.check(key)?;
        self.inner.delete_document(key).await
    }

    async fn write_batch(&self, ops: Vec<BatchOp>) -> Result<()> {
        for op in &ops {
            self.check(op.key())?;
        }
        self.inner.write_batch(ops).await
    }
}
