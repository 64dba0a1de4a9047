//!
//! Binderkit: the positional engine behind a card-collection binder.
//!
//! A binder is a sparse, ordered arrangement of cards on fixed-size grid pages.
//! This crate provides the engine that keeps that arrangement consistent under
//! editing, undo/redo and synchronization with a remote document store.
//!
//! ## Core Concepts
//!
//! * **Grid geometry (`grid`)**: Maps flat slot positions onto binder pages. Page 0 is the
//!   single-sided cover page; later pages are two-sided spreads.
//! * **Positional card store (`store::PositionalCardStore`)**: The sparse position-to-card
//!   map with add, remove, move, bulk-move and compaction.
//! * **History ledger (`history::HistoryLedger`)**: Bounded linear undo/redo over full
//!   before/after snapshots of the store.
//! * **Clipboard (`clipboard::Clipboard`)**: Staging area for moving cards between binders.
//! * **Binders (`binder::Binder`)**: One store, its history and its sync state, driven by
//!   UI intents.
//! * **Sync (`sync::SyncCoordinator`)**: Drift detection, push and pull against a remote
//!   [`DocumentStore`](backend::DocumentStore).
//! * **Workspace (`workspace::Workspace`)**: The process-wide session owning the clipboard
//!   and every open binder.

pub mod backend;
pub mod binder;
pub mod card;
pub mod clipboard;
pub mod clock;
pub mod config;
pub mod constants;
pub mod grid;
pub mod history;
pub mod store;
pub mod sync;
pub mod workspace;

pub use binder::{Binder, BinderId, SharedBinder};
pub use card::{CardData, CardEntry, CardId, InstanceId};
pub use clock::{Clock, Millis, SystemClock};
#[cfg(any(test, feature = "testing"))]
pub use clock::FixedClock;
pub use config::WorkspaceConfig;
pub use grid::{GridRegistry, GridSize};
pub use store::{BulkMode, MoveMode, Placement};
pub use workspace::Workspace;

/// Result type used throughout the binderkit library.
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for the binderkit library.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Structured grid errors from the grid module
    #[error(transparent)]
    Grid(grid::GridError),

    /// Structured store errors from the store module
    #[error(transparent)]
    Store(store::StoreError),

    /// Structured history errors from the history module
    #[error(transparent)]
    History(history::HistoryError),

    /// Structured clipboard errors from the clipboard module
    #[error(transparent)]
    Clipboard(clipboard::ClipboardError),

    /// Structured binder errors from the binder module
    #[error(transparent)]
    Binder(binder::BinderError),

    /// Structured sync errors from the sync module
    #[error(transparent)]
    Sync(sync::SyncError),

    /// Structured document store errors from the backend module
    #[error(transparent)]
    Backend(backend::BackendError),
}

/// Flat classification of every failure the engine reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ErrorKind {
    InvalidPosition,
    UnknownGridSize,
    SlotEmpty,
    CapacityExceeded,
    DuplicateInstance,
    NotFound,
    NothingToUndo,
    NothingToRedo,
    NoRemoteVersion,
    OperationInProgress,
    NetworkError,
    PermissionDenied,
    Conflict,
    /// Serialization or local I/O.
    Storage,
    /// A sync task died before reporting.
    Internal,
}

impl Error {
    /// Get the originating module for this error.
    pub fn module(&self) -> &'static str {
        match self {
            Error::Grid(_) => "grid",
            Error::Store(_) => "store",
            Error::History(_) => "history",
            Error::Clipboard(_) => "clipboard",
            Error::Binder(_) => "binder",
            Error::Sync(_) => "sync",
            Error::Backend(_) => "backend",
            Error::Io(_) => "io",
            Error::Serialize(_) => "serialize",
        }
    }

    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        use backend::BackendError;
        use binder::BinderError;
        use clipboard::ClipboardError;
        use grid::GridError;
        use store::StoreError;
        use sync::SyncError;

        match self {
            Error::Grid(
                GridError::InvalidPosition { .. } | GridError::MalformedPosition { .. },
            ) => ErrorKind::InvalidPosition,
            Error::Grid(GridError::UnknownGridSize { .. } | GridError::EmptyGrid { .. }) => {
                ErrorKind::UnknownGridSize
            }
            Error::Store(StoreError::InvalidPosition { .. }) => ErrorKind::InvalidPosition,
            Error::Store(StoreError::SlotEmpty { .. }) => ErrorKind::SlotEmpty,
            Error::Store(StoreError::CapacityExceeded { .. }) => ErrorKind::CapacityExceeded,
            Error::Store(StoreError::DuplicateInstance { .. }) => ErrorKind::DuplicateInstance,
            Error::History(history::HistoryError::NothingToUndo) => ErrorKind::NothingToUndo,
            Error::History(history::HistoryError::NothingToRedo) => ErrorKind::NothingToRedo,
            Error::History(history::HistoryError::InvalidLedger { .. }) => ErrorKind::Storage,
            Error::Clipboard(ClipboardError::NotFound { .. }) => ErrorKind::NotFound,
            Error::Clipboard(ClipboardError::EmptyEntry { .. }) => ErrorKind::Storage,
            Error::Binder(BinderError::NotFound { .. }) => ErrorKind::NotFound,
            Error::Binder(BinderError::AlreadyOpen { .. }) => ErrorKind::Conflict,
            Error::Sync(SyncError::NoRemoteVersion { .. }) => ErrorKind::NoRemoteVersion,
            Error::Sync(SyncError::OperationInProgress { .. }) => ErrorKind::OperationInProgress,
            Error::Sync(SyncError::Conflict { .. }) => ErrorKind::Conflict,
            Error::Sync(SyncError::Network(_)) => ErrorKind::NetworkError,
            Error::Sync(SyncError::PermissionDenied(_)) => ErrorKind::PermissionDenied,
            Error::Sync(SyncError::InvalidDocument { .. }) => ErrorKind::Storage,
            Error::Sync(SyncError::TaskFailed(_)) => ErrorKind::Internal,
            Error::Backend(BackendError::Network { .. }) => ErrorKind::NetworkError,
            Error::Backend(BackendError::PermissionDenied { .. }) => ErrorKind::PermissionDenied,
            Error::Backend(_) | Error::Io(_) | Error::Serialize(_) => ErrorKind::Storage,
        }
    }

    /// Check if this error is an out-of-range or malformed position.
    pub fn is_invalid_position(&self) -> bool {
        match self {
            Error::Grid(grid_err) => grid_err.is_invalid_position(),
            Error::Store(store_err) => store_err.is_invalid_position(),
            _ => false,
        }
    }

    /// Check if this error names an unregistered grid size.
    pub fn is_unknown_grid_size(&self) -> bool {
        match self {
            Error::Grid(grid_err) => grid_err.is_unknown_grid_size(),
            _ => false,
        }
    }

    /// Check if an operation needed an occupied slot.
    pub fn is_slot_empty(&self) -> bool {
        match self {
            Error::Store(store_err) => store_err.is_slot_empty(),
            _ => false,
        }
    }

    /// Check if this error is the binder card ceiling.
    pub fn is_capacity_exceeded(&self) -> bool {
        match self {
            Error::Store(store_err) => store_err.is_capacity_exceeded(),
            _ => false,
        }
    }

    /// Check if this error indicates a resource was not found.
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::Clipboard(clipboard_err) => clipboard_err.is_not_found(),
            Error::Binder(binder_err) => binder_err.is_not_found(),
            Error::Sync(sync_err) => sync_err.is_not_found(),
            _ => false,
        }
    }

    /// Check if this error means the history cursor is at an end.
    pub fn is_history_exhausted(&self) -> bool {
        match self {
            Error::History(history_err) => history_err.is_exhausted(),
            _ => false,
        }
    }

    /// Check if this error indicates permission was denied.
    pub fn is_permission_denied(&self) -> bool {
        match self {
            Error::Sync(sync_err) => sync_err.is_permission_denied(),
            Error::Backend(backend_err) => backend_err.is_permission_denied(),
            _ => false,
        }
    }

    /// Check if this error is a network failure worth retrying.
    pub fn is_network_error(&self) -> bool {
        match self {
            Error::Sync(sync_err) => sync_err.is_network_error(),
            Error::Backend(backend_err) => backend_err.is_network_error(),
            _ => false,
        }
    }

    /// Check if this error needs user confirmation before retrying.
    pub fn is_conflict(&self) -> bool {
        match self {
            Error::Sync(sync_err) => sync_err.is_conflict(),
            _ => false,
        }
    }

    /// Check if this error rejected an overlapping sync request.
    pub fn is_busy(&self) -> bool {
        match self {
            Error::Sync(sync_err) => sync_err.is_busy(),
            _ => false,
        }
    }

    /// Check if this error is I/O related.
    pub fn is_io_error(&self) -> bool {
        match self {
            Error::Io(_) => true,
            Error::Backend(backend_err) => backend_err.is_io_error(),
            _ => false,
        }
    }
}
