//! Push/pull coordination between open binders and the remote document store.
//!
//! At most one push or pull per binder runs at a time. The network half of
//! each operation runs on its own tokio task which owns the in-flight claim,
//! so dropping the caller's future neither aborts the write nor leaves the
//! binder locked out.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::SyncError;
use crate::{
    Error, Result,
    backend::DocumentStore,
    binder::{Binder, BinderDocument, BinderId, SharedBinder, document_key},
    clock::{Clock, Millis},
    constants::DEFAULT_HISTORY_LIMIT,
    grid::{GridRegistry, GridSize},
    store::Snapshot,
};

/// What to do when the remote copy changed since the binder last synced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConflictResolution {
    /// Fail with [`SyncError::Conflict`] and mark the binder conflicted.
    #[default]
    Abort,
    /// Take the remote copy anyway.
    Overwrite,
}

/// A completed push.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushOutcome {
    pub revision: u64,
    pub synced_at: Millis,
}

/// A completed pull.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PullOutcome {
    /// Nothing to do: the binder had no drift.
    Unchanged,
    /// A newer sync landed while the request was in flight; the response was
    /// discarded.
    Stale,
    /// Local state was replaced by the remote copy at this revision.
    Replaced { revision: u64 },
}

struct Inner {
    remote: Arc<dyn DocumentStore>,
    clock: Arc<dyn Clock>,
    writer_id: String,
    grids: GridRegistry,
    history_limit: usize,
}

/// Runs push, pull and checkout against one remote [`DocumentStore`].
#[derive(Clone)]
pub struct SyncCoordinator {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for SyncCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncCoordinator")
            .field("writer_id", &self.inner.writer_id)
            .finish_non_exhaustive()
    }
}

impl SyncCoordinator {
    /// Create a coordinator.
    ///
    /// # Arguments
    /// * `remote` - The remote document store
    /// * `clock` - Time source for sync timestamps
    /// * `writer_id` - Identifies this session in remote markers
    pub fn new(
        remote: Arc<dyn DocumentStore>,
        clock: Arc<dyn Clock>,
        writer_id: impl Into<String>,
    ) -> Self {
        Self::with_options(
            remote,
            clock,
            writer_id,
            GridRegistry::default(),
            DEFAULT_HISTORY_LIMIT,
        )
    }

    /// Create a coordinator with an explicit grid registry and history limit
    /// for checked-out binders.
    pub fn with_options(
        remote: Arc<dyn DocumentStore>,
        clock: Arc<dyn Clock>,
        writer_id: impl Into<String>,
        grids: GridRegistry,
        history_limit: usize,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                remote,
                clock,
                writer_id: writer_id.into(),
                grids,
                history_limit,
            }),
        }
    }

    pub fn writer_id(&self) -> &str {
        &self.inner.writer_id
    }

    pub fn remote(&self) -> &Arc<dyn DocumentStore> {
        &self.inner.remote
    }

    /// Whether the binder's local copy may differ from the remote one.
    pub async fn detect_drift(&self, binder: &SharedBinder) -> bool {
        binder.lock().await.detect_drift()
    }

    /// Write the binder's current state to the remote store.
    ///
    /// The state is captured when the call starts. Edits made while the write
    /// is in flight stay pending, so the binder still reports drift
    /// afterwards. On failure the binder is marked [`SyncStatus::Error`] and
    /// its data is left as it was.
    ///
    /// [`SyncStatus::Error`]: super::SyncStatus::Error
    pub async fn push(&self, binder: &SharedBinder) -> Result<PushOutcome> {
        let (key, value, capture, guard) = {
            let local = binder.lock().await;
            let guard = local.claim_sync()?;
            let key = local.document_key();
            let at = self
                .inner
                .clock
                .now_millis()
                .max(local.store().last_modified());
            let (document, capture) = local.begin_push(&self.inner.writer_id, at);
            (key, document.to_value()?, capture, guard)
        };
        debug!(key = %key, revision = capture.marker.revision, "pushing binder");

        let inner = self.inner.clone();
        let binder = binder.clone();
        let task: JoinHandle<Result<PushOutcome>> = tokio::spawn(async move {
            let _guard = guard;
            let result = inner.remote.put_document(&key, value).await;
            let mut local = binder.lock().await;
            match result {
                Ok(()) => {
                    let outcome = PushOutcome {
                        revision: capture.marker.revision,
                        synced_at: capture.at,
                    };
                    if local.finish_push(capture) {
                        info!(key = %key, revision = outcome.revision, "pushed binder");
                    } else {
                        debug!(key = %key, "push finished after a newer sync; state kept");
                    }
                    Ok(outcome)
                }
                Err(err) => {
                    let err = classify(err);
                    warn!(key = %key, error = %err, "push failed");
                    local.fail_push(err.to_string());
                    Err(err)
                }
            }
        });
        join(task).await
    }

    /// Replace the binder's local state with the remote copy.
    ///
    /// Does nothing when the binder has no drift. The remote document is
    /// fully validated before anything local changes. If the remote copy was
    /// written by someone else since this binder last synced, the pull fails
    /// with a conflict unless `resolution` is [`ConflictResolution::Overwrite`].
    pub async fn pull(
        &self,
        binder: &SharedBinder,
        resolution: ConflictResolution,
    ) -> Result<PullOutcome> {
        let (key, expected, guard) = {
            let local = binder.lock().await;
            if !local.detect_drift() {
                return Ok(PullOutcome::Unchanged);
            }
            let guard = local.claim_sync()?;
            let key = local.document_key();
            (key, local.sync_state().remote.clone(), guard)
        };
        let issued_at = self.inner.clock.now_millis();
        debug!(key = %key, "pulling binder");

        let inner = self.inner.clone();
        let binder = binder.clone();
        let task: JoinHandle<Result<PullOutcome>> = tokio::spawn(async move {
            let _guard = guard;
            let fetched = fetch(&inner, &key).await;
            let mut local = binder.lock().await;
            let (document, snapshot, grid) = match fetched {
                Ok(parts) => parts,
                Err(err) => {
                    warn!(key = %key, error = %err, "pull failed");
                    local.note_sync_error(err.to_string());
                    return Err(err);
                }
            };

            if local
                .sync_state()
                .last_synced
                .is_some_and(|synced| synced > issued_at)
            {
                debug!(key = %key, "discarding stale pull response");
                return Ok(PullOutcome::Stale);
            }

            let found = document.sync.remote.clone();
            if resolution == ConflictResolution::Abort && expected.is_some() && expected != found {
                warn!(key = %key, ?expected, ?found, "remote binder changed since last sync");
                local.mark_conflict();
                return Err(SyncError::Conflict {
                    key,
                    expected,
                    found,
                }
                .into());
            }

            let revision = found.as_ref().map_or(0, |m| m.revision);
            local.replace_from_remote(document, snapshot, grid);
            info!(key = %key, revision, "pulled binder");
            Ok(PullOutcome::Replaced { revision })
        });
        join(task).await
    }

    /// Load a binder that exists only remotely.
    ///
    /// # Arguments
    /// * `owner_id` - Owner of the binder
    /// * `binder_id` - Id of the binder
    pub async fn checkout(&self, owner_id: &str, binder_id: &BinderId) -> Result<Binder> {
        let key = document_key(owner_id, binder_id);
        let (document, _, _) = fetch(&self.inner, &key).await?;
        let binder = Binder::from_document(document, &self.inner.grids, self.inner.clock.clone())?
            .with_history_limit(self.inner.history_limit);
        info!(key = %key, "checked out binder");
        Ok(binder)
    }

    /// Delete the remote copy and return the binder to never-synced.
    pub async fn delete_remote(&self, binder: &SharedBinder) -> Result<()> {
        let (key, _guard) = {
            let local = binder.lock().await;
            (local.document_key(), local.claim_sync()?)
        };
        self.inner
            .remote
            .delete_document(&key)
            .await
            .map_err(classify)?;
        binder.lock().await.reset_to_local();
        info!(key = %key, "deleted remote binder");
        Ok(())
    }
}

/// Fetch and fully validate a remote binder document.
async fn fetch(inner: &Inner, key: &str) -> Result<(BinderDocument, Snapshot, GridSize)> {
    let value = inner
        .remote
        .get_document(key)
        .await
        .map_err(classify)?
        .ok_or_else(|| SyncError::NoRemoteVersion {
            key: key.to_string(),
        })?;
    let invalid = |reason: String| SyncError::InvalidDocument {
        key: key.to_string(),
        reason,
    };
    let document = BinderDocument::from_value(value).map_err(|e| invalid(e.to_string()))?;
    let snapshot = document.snapshot().map_err(|e| invalid(e.to_string()))?;
    let grid = inner
        .grids
        .get(&document.settings.grid_size)
        .map_err(|e| invalid(e.to_string()))?;
    Ok((document, snapshot, grid))
}

/// Map store transport failures onto sync errors.
fn classify(err: Error) -> Error {
    match err {
        Error::Backend(err) if err.is_network_error() => SyncError::Network(err.to_string()).into(),
        Error::Backend(err) if err.is_permission_denied() => {
            SyncError::PermissionDenied(err.to_string()).into()
        }
        other => other,
    }
}

async fn join<T>(task: JoinHandle<Result<T>>) -> Result<T> {
    task.await
        .map_err(|e| SyncError::TaskFailed(e.to_string()))?
}
