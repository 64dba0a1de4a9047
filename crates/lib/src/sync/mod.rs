//! Synchronization of binders with a remote document store.
//!
//! Each binder is stored remotely as one document under
//! `${owner_id}_${binder_id}`. A [`SyncCoordinator`] pushes and pulls whole
//! documents; [`SyncState`] inside each binder records how far the local copy
//! has drifted since the last successful exchange.

mod coordinator;
pub mod error;
pub mod state;

pub use coordinator::{ConflictResolution, PullOutcome, PushOutcome, SyncCoordinator};
pub use error::SyncError;
pub use state::{RemoteMarker, SyncState, SyncStatus};
