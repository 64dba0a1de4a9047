//! Per-binder sync state.
//!
//! The state travels inside the binder document, so a pulled binder knows who
//! wrote it last and at which revision.

use serde::{Deserialize, Serialize};

use crate::clock::Millis;

/// Where a binder stands relative to its remote copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncStatus {
    /// Never pushed.
    #[default]
    Local,
    /// Matches the remote copy as of `last_synced`.
    Synced,
    /// The remote copy moved under us; needs confirmation.
    Conflict,
    /// The last push failed.
    Error,
}

impl SyncStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncStatus::Local => "local",
            SyncStatus::Synced => "synced",
            SyncStatus::Conflict => "conflict",
            SyncStatus::Error => "error",
        }
    }
}

impl std::fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity of one remote write: which session wrote it, and its revision.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RemoteMarker {
    pub writer: String,
    pub revision: u64,
}

/// Sync bookkeeping for one binder.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncState {
    #[serde(default)]
    pub status: SyncStatus,
    #[serde(default)]
    pub last_synced: Option<Millis>,
    #[serde(default)]
    pub last_error: Option<String>,
    /// Mutations applied since the last successful push or pull.
    #[serde(default)]
    pub pending_changes: u64,
    /// Marker of the remote copy this binder last agreed with.
    #[serde(default)]
    pub remote: Option<RemoteMarker>,
}

impl SyncState {
    /// Whether local state may differ from the remote copy.
    ///
    /// Pure: looks only at this state and the store's `last_modified`.
    pub fn has_drift(&self, last_modified: Millis) -> bool {
        matches!(self.status, SyncStatus::Local | SyncStatus::Error)
            || self.pending_changes > 0
            || self.last_synced.is_none_or(|synced| last_modified > synced)
    }

    /// Revision the next push will write.
    pub fn next_revision(&self) -> u64 {
        self.remote.as_ref().map_or(1, |m| m.revision + 1)
    }
}
