//! Error types for the synchronization module.

use thiserror::Error;

use super::state::RemoteMarker;

/// Errors that can occur during push, pull and checkout.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SyncError {
    /// The binder has never been written to the remote store.
    #[error("No remote version of binder '{key}'")]
    NoRemoteVersion { key: String },

    /// A push or pull for this binder is already running.
    #[error("A sync operation for binder '{key}' is already in progress")]
    OperationInProgress { key: String },

    /// The remote copy was written by another session since our last sync.
    #[error("Remote binder '{key}' changed since last sync (expected {expected:?}, found {found:?})")]
    Conflict {
        key: String,
        expected: Option<RemoteMarker>,
        found: Option<RemoteMarker>,
    },

    /// Network communication error.
    #[error("Network error: {0}")]
    Network(String),

    /// The remote store refused the operation.
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// The remote document could not be interpreted.
    #[error("Invalid remote document '{key}': {reason}")]
    InvalidDocument { key: String, reason: String },

    /// The background sync task panicked or was aborted.
    #[error("Sync task failed: {0}")]
    TaskFailed(String),
}

impl SyncError {
    /// Check if this is a network/connection error.
    pub fn is_network_error(&self) -> bool {
        matches!(self, SyncError::Network(_))
    }

    /// Check if this error needs user confirmation before retrying.
    pub fn is_conflict(&self) -> bool {
        matches!(self, SyncError::Conflict { .. })
    }

    /// Check if this is a not found error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, SyncError::NoRemoteVersion { .. })
    }

    /// Check if the request was rejected because another one is running.
    pub fn is_busy(&self) -> bool {
        matches!(self, SyncError::OperationInProgress { .. })
    }

    /// Check if the remote store refused access.
    pub fn is_permission_denied(&self) -> bool {
        matches!(self, SyncError::PermissionDenied(_))
    }
}

impl From<SyncError> for crate::Error {
    fn from(err: SyncError) -> Self {
        crate::Error::Sync(err)
    }
}
