//! The process-wide session.
//!
//! A [`Workspace`] owns the clipboard, the grid registry, the local storage
//! port and every open binder. The clipboard is not tied to any binder, so
//! cards cut from one binder can be pasted into another after switching.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{
    Result,
    backend::{BatchOp, DocumentStore},
    binder::{Binder, BinderDocument, BinderError, BinderId, SharedBinder},
    clipboard::Clipboard,
    clock::Clock,
    config::WorkspaceConfig,
    constants::{DOCUMENT_KEY_SEPARATOR, LOCAL_RECORD_PREFIX},
    grid::GridRegistry,
    history::HistoryLedger,
    store::Placement,
    sync::SyncCoordinator,
};

/// What the local storage port keeps per binder.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct LocalRecord {
    document: BinderDocument,
    #[serde(default)]
    history: HistoryLedger,
}

pub struct Workspace {
    config: WorkspaceConfig,
    clock: Arc<dyn Clock>,
    grids: GridRegistry,
    local: Arc<dyn DocumentStore>,
    clipboard: Clipboard,
    binders: BTreeMap<BinderId, SharedBinder>,
    active: Option<BinderId>,
}

impl std::fmt::Debug for Workspace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Workspace")
            .field("config", &self.config)
            .field("open", &self.binders.len())
            .field("active", &self.active)
            .field("clipboard", &self.clipboard)
            .finish_non_exhaustive()
    }
}

impl Workspace {
    /// Create a workspace.
    ///
    /// # Arguments
    /// * `config` - Owner and per-binder defaults
    /// * `local` - Storage port for local binder records
    /// * `clock` - Time source shared by every binder
    pub fn new(
        config: WorkspaceConfig,
        local: Arc<dyn DocumentStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            config,
            clock,
            grids: GridRegistry::default(),
            local,
            clipboard: Clipboard::new(),
            binders: BTreeMap::new(),
            active: None,
        }
    }

    pub fn with_grids(mut self, grids: GridRegistry) -> Self {
        self.grids = grids;
        self
    }

    pub fn config(&self) -> &WorkspaceConfig {
        &self.config
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    pub fn grids(&self) -> &GridRegistry {
        &self.grids
    }

    pub fn clipboard(&self) -> &Clipboard {
        &self.clipboard
    }

    pub fn clipboard_mut(&mut self) -> &mut Clipboard {
        &mut self.clipboard
    }

    /// Create a binder, open it and make it active.
    ///
    /// `grid_size` falls back to the configured default.
    pub fn create_binder(
        &mut self,
        name: impl Into<String>,
        grid_size: Option<&str>,
    ) -> Result<SharedBinder> {
        let grid_size = grid_size.unwrap_or(self.config.default_grid_size.as_str());
        let binder = Binder::create(
            self.config.owner_id.clone(),
            name,
            grid_size,
            &self.grids,
            self.clock.clone(),
        )?
        .with_history_limit(self.config.history_limit)
        .with_max_cards(self.config.max_cards);
        let id = binder.id().clone();
        let shared = self.open(binder)?;
        self.active = Some(id);
        Ok(shared)
    }

    /// Add an already built binder to the open set.
    pub fn open(&mut self, binder: Binder) -> Result<SharedBinder> {
        let id = binder.id().clone();
        if self.binders.contains_key(&id) {
            return Err(BinderError::AlreadyOpen { id }.into());
        }
        let shared = binder.into_shared();
        self.binders.insert(id.clone(), shared.clone());
        debug!(binder = %id, open = self.binders.len(), "opened binder");
        Ok(shared)
    }

    pub fn binder(&self, id: &BinderId) -> Result<SharedBinder> {
        self.binders
            .get(id)
            .cloned()
            .ok_or_else(|| BinderError::NotFound { id: id.clone() }.into())
    }

    /// Ids of the open binders, sorted.
    pub fn open_binders(&self) -> impl Iterator<Item = &BinderId> {
        self.binders.keys()
    }

    pub fn active_id(&self) -> Option<&BinderId> {
        self.active.as_ref()
    }

    pub fn active(&self) -> Option<SharedBinder> {
        self.active.as_ref().and_then(|id| self.binders.get(id).cloned())
    }

    /// Make an open binder the active one. The clipboard is kept.
    pub fn switch_to(&mut self, id: &BinderId) -> Result<SharedBinder> {
        let shared = self.binder(id)?;
        self.active = Some(id.clone());
        debug!(binder = %id, staged = self.clipboard.total_units(), "switched binder");
        Ok(shared)
    }

    /// Remove a binder from the open set without saving it.
    pub fn close(&mut self, id: &BinderId) -> Result<SharedBinder> {
        let shared = self
            .binders
            .remove(id)
            .ok_or_else(|| BinderError::NotFound { id: id.clone() })?;
        if self.active.as_ref() == Some(id) {
            self.active = None;
        }
        Ok(shared)
    }

    /// Local storage key of a binder record.
    pub fn local_key(&self, id: &BinderId) -> String {
        format!(
            "{LOCAL_RECORD_PREFIX}{DOCUMENT_KEY_SEPARATOR}{}{DOCUMENT_KEY_SEPARATOR}{id}",
            self.config.owner_id
        )
    }

    /// Write one open binder, with its history, to the local store.
    pub async fn save_local(&self, id: &BinderId) -> Result<()> {
        let op = self.local_record(id).await?;
        self.local.write_batch(vec![op]).await?;
        debug!(binder = %id, "saved binder locally");
        Ok(())
    }

    /// Write every open binder to the local store in one batch.
    pub async fn save_all(&self) -> Result<usize> {
        let mut ops = Vec::with_capacity(self.binders.len());
        for id in self.binders.keys() {
            ops.push(self.local_record(id).await?);
        }
        let count = ops.len();
        self.local.write_batch(ops).await?;
        info!(count, "saved open binders locally");
        Ok(count)
    }

    /// Open a binder from its local record, history included.
    pub async fn load_local(&mut self, id: &BinderId) -> Result<SharedBinder> {
        if self.binders.contains_key(id) {
            return Err(BinderError::AlreadyOpen { id: id.clone() }.into());
        }
        let value = self
            .local
            .get_document(&self.local_key(id))
            .await?
            .ok_or_else(|| BinderError::NotFound { id: id.clone() })?;
        let record: LocalRecord = serde_json::from_value(value)?;
        let binder = Binder::from_document(record.document, &self.grids, self.clock.clone())?
            .with_history(record.history);
        self.open(binder)
    }

    /// Delete a binder's local record. The open session, if any, is kept.
    pub async fn delete_local(&self, id: &BinderId) -> Result<()> {
        self.local.delete_document(&self.local_key(id)).await
    }

    /// Cut the card at `position` of binder `id` onto the clipboard.
    pub async fn cut(&mut self, id: &BinderId, position: usize) -> Result<()> {
        let shared = self.binder(id)?;
        let mut binder = shared.lock().await;
        binder.cut_to_clipboard(position, &mut self.clipboard)
    }

    /// Paste one unit of clipboard entry `index` into binder `id`.
    pub async fn paste(
        &mut self,
        id: &BinderId,
        index: usize,
        placement: Placement,
    ) -> Result<usize> {
        let shared = self.binder(id)?;
        let mut binder = shared.lock().await;
        binder.paste_from_clipboard(&mut self.clipboard, index, placement)
    }

    /// A sync coordinator for this workspace's owner and settings.
    pub fn coordinator(&self, remote: Arc<dyn DocumentStore>) -> SyncCoordinator {
        SyncCoordinator::with_options(
            remote,
            self.clock.clone(),
            self.config.writer_id.clone(),
            self.grids.clone(),
            self.config.history_limit,
        )
    }

    /// Materialize a remote-only binder and open it.
    pub async fn checkout(
        &mut self,
        coordinator: &SyncCoordinator,
        id: &BinderId,
    ) -> Result<SharedBinder> {
        if self.binders.contains_key(id) {
            return Err(BinderError::AlreadyOpen { id: id.clone() }.into());
        }
        let binder = coordinator.checkout(&self.config.owner_id, id).await?;
        self.open(binder)
    }

    async fn local_record(&self, id: &BinderId) -> Result<BatchOp> {
        let shared = self.binder(id)?;
        let binder = shared.lock().await;
        let record = LocalRecord {
            document: binder.to_document(),
            history: binder.history().clone(),
        };
        Ok(BatchOp::Put {
            key: self.local_key(id),
            document: serde_json::to_value(&record)?,
        })
    }
}
