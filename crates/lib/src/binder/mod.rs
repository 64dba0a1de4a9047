//! A binder session: one card store, its history, and its sync bookkeeping.
//!
//! UI intents arrive here as method calls. Each call that changes the
//! arrangement records exactly one [`HistoryEntry`](crate::history::HistoryEntry)
//! and bumps the pending-change count that drift detection reads.

mod document;
mod errors;

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

pub use document::BinderDocument;
pub use errors::BinderError;

use crate::{
    Result,
    card::CardEntry,
    clipboard::Clipboard,
    clock::{Clock, Millis},
    constants::{DEFAULT_HISTORY_LIMIT, DOCUMENT_KEY_SEPARATOR},
    grid::{GridRegistry, GridSize},
    history::{ActionKind, HistoryAction, HistoryEntry, HistoryLedger, jump_to_page_for_entry},
    store::{BulkMode, BulkMoveReport, MoveMode, Placement, PositionalCardStore, Snapshot},
    sync::{RemoteMarker, SyncError, SyncState, SyncStatus},
};

/// A binder shared between the UI and in-flight sync tasks.
pub type SharedBinder = Arc<Mutex<Binder>>;

/// Identifier of a binder, unique per owner.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BinderId(String);

impl BinderId {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Mint a random binder id.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for BinderId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl std::fmt::Display for BinderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Document key of a binder: `${owner_id}_${binder_id}`.
pub fn document_key(owner_id: &str, binder_id: &BinderId) -> String {
    format!("{owner_id}{DOCUMENT_KEY_SEPARATOR}{binder_id}")
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BinderMetadata {
    pub name: String,
    pub created_at: Millis,
    pub updated_at: Millis,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BinderSettings {
    pub grid_size: String,
    /// Addressable slots, including trailing empty pages.
    #[serde(default)]
    pub extent: usize,
    /// Card ceiling enforced on add (plan or guest limits).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_cards: Option<usize>,
    /// Presentation settings the engine carries but does not read.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Where the UI should look after an undo or redo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryJump {
    pub entry_id: Uuid,
    pub action: ActionKind,
    pub description: String,
    pub page: Option<usize>,
}

impl HistoryJump {
    fn new(entry: &HistoryEntry, grid: &GridSize) -> Self {
        Self {
            entry_id: entry.id,
            action: entry.action.kind(),
            description: entry.action.describe(),
            page: jump_to_page_for_entry(entry, grid),
        }
    }
}

/// What a push captured when it started.
#[derive(Debug, Clone)]
pub(crate) struct PushCapture {
    pub(crate) at: Millis,
    pub(crate) pending: u64,
    pub(crate) marker: RemoteMarker,
}

/// Exclusive right to push or pull one binder; released on drop.
#[derive(Debug)]
pub(crate) struct SyncClaim {
    flag: Arc<AtomicBool>,
}

impl Drop for SyncClaim {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// One binder's in-memory working state.
#[derive(Debug)]
pub struct Binder {
    id: BinderId,
    owner_id: String,
    metadata: BinderMetadata,
    settings: BinderSettings,
    grid: GridSize,
    store: PositionalCardStore,
    history: HistoryLedger,
    sync: SyncState,
    sync_claim: Arc<AtomicBool>,
    clock: Arc<dyn Clock>,
}

impl Binder {
    /// Create a new, never-synced binder. The cover page is addressable from
    /// the start.
    pub fn create(
        owner_id: impl Into<String>,
        name: impl Into<String>,
        grid_size: &str,
        grids: &GridRegistry,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        let grid = grids.get(grid_size)?;
        let now = clock.now_millis();
        let mut store = PositionalCardStore::new(clock.clone());
        store.reserve(grid.cards_per_page());
        let binder = Self {
            id: BinderId::generate(),
            owner_id: owner_id.into(),
            metadata: BinderMetadata {
                name: name.into(),
                created_at: now,
                updated_at: now,
            },
            settings: BinderSettings {
                grid_size: grid_size.to_string(),
                extent: store.extent(),
                max_cards: None,
                extra: serde_json::Map::new(),
            },
            grid,
            store,
            history: HistoryLedger::with_limit(DEFAULT_HISTORY_LIMIT),
            sync: SyncState::default(),
            sync_claim: Arc::default(),
            clock,
        };
        debug!(binder = %binder.id, grid = grid_size, "created binder");
        Ok(binder)
    }

    /// Rebuild a binder from a stored document. History starts empty.
    pub fn from_document(
        document: BinderDocument,
        grids: &GridRegistry,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        let grid = grids.get(&document.settings.grid_size)?;
        let snapshot = document.snapshot()?;
        let last_modified = document
            .sync
            .last_synced
            .unwrap_or(document.metadata.updated_at);
        Ok(Self {
            id: document.id,
            owner_id: document.owner_id,
            metadata: document.metadata,
            settings: document.settings,
            grid,
            store: PositionalCardStore::from_snapshot(snapshot, last_modified, clock.clone()),
            history: HistoryLedger::with_limit(DEFAULT_HISTORY_LIMIT),
            sync: document.sync,
            sync_claim: Arc::default(),
            clock,
        })
    }

    /// Replace the history ledger, e.g. with one restored from local storage.
    pub fn with_history(mut self, history: HistoryLedger) -> Self {
        self.history = history;
        self
    }

    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history = HistoryLedger::with_limit(limit);
        self
    }

    pub fn with_max_cards(mut self, max_cards: Option<usize>) -> Self {
        self.settings.max_cards = max_cards;
        self
    }

    pub fn into_shared(self) -> SharedBinder {
        Arc::new(Mutex::new(self))
    }

    pub fn id(&self) -> &BinderId {
        &self.id
    }

    pub fn owner_id(&self) -> &str {
        &self.owner_id
    }

    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    pub fn metadata(&self) -> &BinderMetadata {
        &self.metadata
    }

    pub fn settings(&self) -> &BinderSettings {
        &self.settings
    }

    pub fn grid(&self) -> &GridSize {
        &self.grid
    }

    pub fn store(&self) -> &PositionalCardStore {
        &self.store
    }

    pub fn history(&self) -> &HistoryLedger {
        &self.history
    }

    pub fn sync_state(&self) -> &SyncState {
        &self.sync
    }

    /// Whether a push or pull for this binder is running.
    pub fn is_syncing(&self) -> bool {
        self.sync_claim.load(Ordering::Acquire)
    }

    pub fn status(&self) -> SyncStatus {
        self.sync.status
    }

    pub fn document_key(&self) -> String {
        document_key(&self.owner_id, &self.id)
    }

    /// Number of binder pages, cover included.
    pub fn page_count(&self) -> usize {
        self.grid.page_count(self.store.extent())
    }

    /// Occupied slots on `page`.
    pub fn cards_on_page(&self, page: usize) -> Vec<(usize, &CardEntry)> {
        self.store.page(&self.grid, page).collect()
    }

    /// Whether the local copy may differ from the remote one.
    pub fn detect_drift(&self) -> bool {
        self.sync.has_drift(self.store.last_modified())
    }

    /// Serialize the current state.
    pub fn to_document(&self) -> BinderDocument {
        let mut settings = self.settings.clone();
        settings.extent = self.store.extent();
        BinderDocument::new(
            self.id.clone(),
            self.owner_id.clone(),
            self.metadata.clone(),
            settings,
            &self.store.snapshot(),
            self.sync.clone(),
        )
    }

    pub fn rename(&mut self, name: impl Into<String>) {
        self.metadata.name = name.into();
        self.metadata.updated_at = self.clock.now_millis();
        self.sync.pending_changes += 1;
    }

    /// Append an empty binder page and return its index.
    pub fn add_page(&mut self) -> usize {
        let page = self.page_count();
        let (_, end) = self.grid.page_range(page);
        self.store.reserve(end + 1);
        self.mark_dirty();
        page
    }

    /// Add a card; see [`PositionalCardStore::add`].
    pub fn add_card(&mut self, entry: CardEntry, placement: Placement) -> Result<usize> {
        let ceiling = self.settings.max_cards;
        self.apply(|store, _| {
            let card_name = entry.name().to_string();
            let position = store.add(entry, placement, ceiling)?;
            Ok((
                position,
                Some(HistoryAction::Add {
                    card_name,
                    position,
                    count: 1,
                }),
            ))
        })
    }

    /// Add a card to the first free slot of `page`, else anywhere.
    pub fn add_to_page(&mut self, entry: CardEntry, page: usize) -> Result<usize> {
        let placement = Placement::on_page(&self.grid, page);
        self.add_card(entry, placement)
    }

    /// Add several cards as one history entry.
    pub fn add_cards(&mut self, entries: Vec<CardEntry>, placement: Placement) -> Result<usize> {
        let ceiling = self.settings.max_cards;
        self.apply(|store, _| {
            let count = entries.len();
            let card_name = entries
                .first()
                .map(|e| e.name().to_string())
                .unwrap_or_default();
            let position = store.add_many(entries, placement, ceiling)?;
            let action = (count > 0).then_some(HistoryAction::Add {
                card_name,
                position,
                count,
            });
            Ok((position, action))
        })
    }

    pub fn remove_card(&mut self, position: usize) -> Result<CardEntry> {
        self.apply(|store, _| {
            let entry = store.remove(position)?;
            let action = HistoryAction::Remove {
                card_name: entry.name().to_string(),
                position,
            };
            Ok((entry, Some(action)))
        })
    }

    pub fn move_card(&mut self, from: usize, to: usize, mode: MoveMode) -> Result<()> {
        self.apply(|store, _| {
            let card_name = store
                .get(from)
                .or_else(|| store.get(to))
                .map(|e| e.name().to_string());
            store.move_card(from, to, mode)?;
            let action = card_name
                .filter(|_| from != to)
                .map(|card_name| HistoryAction::Move {
                    card_name,
                    from_position: from,
                    to_position: to,
                    mode,
                });
            Ok(((), action))
        })
    }

    /// Move several cards onto `target_page` as one history entry. The cover
    /// page stays addressable even if the store trims its extent.
    pub fn bulk_move(
        &mut self,
        positions: &[usize],
        target_page: usize,
        mode: BulkMode,
    ) -> Result<BulkMoveReport> {
        self.apply(|store, grid| {
            let report = store.bulk_move(positions, target_page, mode, grid)?;
            store.reserve(grid.cards_per_page());
            let action = (!report.placed.is_empty()).then(|| HistoryAction::BulkMove {
                count: report.placed.len(),
                target_page,
                target_position: report.target_position,
                mode,
            });
            Ok((report, action))
        })
    }

    pub fn compact_page(&mut self, page: usize) -> usize {
        let before = self.store.snapshot();
        let moved = self.store.compact_page(&self.grid, page);
        if moved > 0 {
            let action = HistoryAction::Compact {
                page: Some(page),
                start_position: self.grid.page_range(page).0,
                moved,
            };
            self.record(action, before);
        }
        moved
    }

    pub fn compact(&mut self) -> usize {
        let before = self.store.snapshot();
        let moved = self.store.compact_binder();
        self.store.reserve(self.grid.cards_per_page());
        if moved > 0 {
            let action = HistoryAction::Compact {
                page: None,
                start_position: 0,
                moved,
            };
            self.record(action, before);
        }
        moved
    }

    /// Remove the card at `position` and stage it on the clipboard.
    pub fn cut_to_clipboard(&mut self, position: usize, clipboard: &mut Clipboard) -> Result<()> {
        let entry = self.remove_card(position)?;
        clipboard.put(entry);
        Ok(())
    }

    /// Place one unit of clipboard entry `index` into this binder.
    pub fn paste_from_clipboard(
        &mut self,
        clipboard: &mut Clipboard,
        index: usize,
        placement: Placement,
    ) -> Result<usize> {
        let ceiling = self.settings.max_cards;
        self.apply(|store, _| {
            let position = clipboard.move_into(index, store, placement, ceiling)?;
            let card_name = store
                .get(position)
                .map(|e| e.name().to_string())
                .unwrap_or_default();
            Ok((
                position,
                Some(HistoryAction::Add {
                    card_name,
                    position,
                    count: 1,
                }),
            ))
        })
    }

    pub fn undo(&mut self) -> Result<HistoryJump> {
        let step = self.history.undo()?;
        let jump = HistoryJump::new(step.entry, &self.grid);
        let restore = step.snapshot.clone();
        self.restore(&restore);
        debug!(binder = %self.id, action = %jump.action, "undo");
        Ok(jump)
    }

    pub fn redo(&mut self) -> Result<HistoryJump> {
        let step = self.history.redo()?;
        let jump = HistoryJump::new(step.entry, &self.grid);
        let restore = step.snapshot.clone();
        self.restore(&restore);
        debug!(binder = %self.id, action = %jump.action, "redo");
        Ok(jump)
    }

    /// Forget all history. The arrangement is unchanged.
    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    fn apply<T>(
        &mut self,
        op: impl FnOnce(&mut PositionalCardStore, &GridSize) -> Result<(T, Option<HistoryAction>)>,
    ) -> Result<T> {
        let before = self.store.snapshot();
        let (value, action) = op(&mut self.store, &self.grid)?;
        if let Some(action) = action {
            self.record(action, before);
        }
        Ok(value)
    }

    /// Record a mutation the store has already applied.
    fn record(&mut self, action: HistoryAction, before: Snapshot) {
        let after = self.store.snapshot();
        debug!(binder = %self.id, action = %action.kind(), "recorded history entry");
        self.history
            .record(action, before, after, self.store.last_modified());
        self.mark_dirty();
    }

    /// Put the store back to `snapshot`; a no-op when nothing differs.
    fn restore(&mut self, snapshot: &Snapshot) {
        if *snapshot != self.store.snapshot() {
            self.store.restore(snapshot);
            self.mark_dirty();
        }
    }

    fn mark_dirty(&mut self) {
        self.metadata.updated_at = self.metadata.updated_at.max(self.store.last_modified());
        self.sync.pending_changes += 1;
    }

    // === Sync transitions, driven by the coordinator ===

    /// Claim the binder for one push or pull. Fails while another is running,
    /// whichever coordinator started it.
    pub(crate) fn claim_sync(&self) -> Result<SyncClaim> {
        if self.sync_claim.swap(true, Ordering::AcqRel) {
            debug!(binder = %self.id, "rejecting overlapping sync request");
            return Err(SyncError::OperationInProgress {
                key: self.document_key(),
            }
            .into());
        }
        Ok(SyncClaim {
            flag: self.sync_claim.clone(),
        })
    }

    /// Document to upload and what the push must remember about it.
    pub(crate) fn begin_push(&self, writer: &str, at: Millis) -> (BinderDocument, PushCapture) {
        let marker = RemoteMarker {
            writer: writer.to_string(),
            revision: self.sync.next_revision(),
        };
        let mut document = self.to_document();
        document.sync = SyncState {
            status: SyncStatus::Synced,
            last_synced: Some(at),
            last_error: None,
            pending_changes: 0,
            remote: Some(marker.clone()),
        };
        let capture = PushCapture {
            at,
            pending: self.sync.pending_changes,
            marker,
        };
        (document, capture)
    }

    /// Apply a successful push. Returns false if a newer sync already landed.
    pub(crate) fn finish_push(&mut self, capture: PushCapture) -> bool {
        if self.sync.last_synced.is_some_and(|synced| synced > capture.at) {
            return false;
        }
        self.sync.status = SyncStatus::Synced;
        self.sync.last_synced = Some(capture.at);
        self.sync.last_error = None;
        self.sync.pending_changes = self.sync.pending_changes.saturating_sub(capture.pending);
        self.sync.remote = Some(capture.marker);
        true
    }

    pub(crate) fn fail_push(&mut self, reason: String) {
        self.sync.status = SyncStatus::Error;
        self.sync.last_error = Some(reason);
    }

    pub(crate) fn note_sync_error(&mut self, reason: String) {
        self.sync.last_error = Some(reason);
    }

    pub(crate) fn mark_conflict(&mut self) {
        self.sync.status = SyncStatus::Conflict;
    }

    /// Swap in a pulled document. Callers validate everything first; this
    /// cannot fail, so the swap is all-or-nothing.
    pub(crate) fn replace_from_remote(
        &mut self,
        document: BinderDocument,
        snapshot: Snapshot,
        grid: GridSize,
    ) {
        let before = self.store.snapshot();
        self.store.restore(&snapshot);
        self.grid = grid;
        self.metadata = document.metadata;
        self.settings = document.settings;
        let revision = document.sync.remote.as_ref().map_or(0, |m| m.revision);
        self.history.clear();
        self.history.record(
            HistoryAction::Revert { revision },
            before,
            snapshot,
            self.store.last_modified(),
        );
        self.sync = SyncState {
            status: SyncStatus::Synced,
            last_synced: Some(self.store.last_modified()),
            last_error: None,
            pending_changes: 0,
            remote: document.sync.remote,
        };
    }

    /// Forget the remote copy; the binder becomes never-synced again.
    pub(crate) fn reset_to_local(&mut self) {
        self.sync = SyncState {
            pending_changes: self.sync.pending_changes,
            ..SyncState::default()
        };
    }
}
