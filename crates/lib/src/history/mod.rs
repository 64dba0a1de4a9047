//! Undo/redo ledger for a binder.
//!
//! Each successful mutation is recorded with full before/after [`Snapshot`]s
//! of the card store. Snapshots share structure with the live store, so the
//! cost of an entry is proportional to what the mutation changed.
//!
//! The cursor follows the usual linear-undo model: `None` means every entry is
//! applied; `Some(i)` means entries `i..` have been undone and can be redone.
//! Recording while entries are undone discards them.

mod errors;

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use errors::HistoryError;

use crate::{
    Result,
    clock::Millis,
    constants::DEFAULT_HISTORY_LIMIT,
    grid::GridSize,
    store::{BulkMode, MoveMode, Snapshot},
};

/// What a history entry did, with a payload fixed per action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HistoryAction {
    Add {
        card_name: String,
        position: usize,
        count: usize,
    },
    Remove {
        card_name: String,
        position: usize,
    },
    Move {
        card_name: String,
        from_position: usize,
        to_position: usize,
        mode: MoveMode,
    },
    BulkMove {
        count: usize,
        target_page: usize,
        target_position: usize,
        mode: BulkMode,
    },
    Compact {
        page: Option<usize>,
        start_position: usize,
        moved: usize,
    },
    Revert {
        revision: u64,
    },
}

/// Discriminant of [`HistoryAction`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    Add,
    Remove,
    Move,
    BulkMove,
    Compact,
    Revert,
}

impl ActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::Add => "add",
            ActionKind::Remove => "remove",
            ActionKind::Move => "move",
            ActionKind::BulkMove => "bulk_move",
            ActionKind::Compact => "compact",
            ActionKind::Revert => "revert",
        }
    }
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl HistoryAction {
    pub fn kind(&self) -> ActionKind {
        match self {
            HistoryAction::Add { .. } => ActionKind::Add,
            HistoryAction::Remove { .. } => ActionKind::Remove,
            HistoryAction::Move { .. } => ActionKind::Move,
            HistoryAction::BulkMove { .. } => ActionKind::BulkMove,
            HistoryAction::Compact { .. } => ActionKind::Compact,
            HistoryAction::Revert { .. } => ActionKind::Revert,
        }
    }

    /// Whether undo may step back over this action. A revert replaced the
    /// whole ledger with a saved version and cannot be undone.
    pub fn is_reversible(&self) -> bool {
        !matches!(self, HistoryAction::Revert { .. })
    }

    /// The slot most relevant to this action.
    ///
    /// Priority follows the payload fields: `position`, then `to_position`,
    /// then `from_position`, then `target_position`.
    pub fn referenced_position(&self) -> Option<usize> {
        match self {
            HistoryAction::Add { position, .. } | HistoryAction::Remove { position, .. } => {
                Some(*position)
            }
            HistoryAction::Move { to_position, .. } => Some(*to_position),
            HistoryAction::BulkMove {
                target_position, ..
            } => Some(*target_position),
            HistoryAction::Compact { start_position, .. } => Some(*start_position),
            HistoryAction::Revert { .. } => None,
        }
    }

    /// One-line human description for history panels.
    pub fn describe(&self) -> String {
        match self {
            HistoryAction::Add {
                card_name,
                position,
                count,
            } => match count {
                1 => format!("Added {card_name} at slot {}", position + 1),
                n => format!("Added {n} cards starting at slot {}", position + 1),
            },
            HistoryAction::Remove {
                card_name,
                position,
            } => format!("Removed {card_name} from slot {}", position + 1),
            HistoryAction::Move {
                card_name,
                from_position,
                to_position,
                mode,
            } => {
                let verb = match mode {
                    MoveMode::Swap => "Swapped",
                    MoveMode::Shift => "Moved",
                };
                format!(
                    "{verb} {card_name} from slot {} to slot {}",
                    from_position + 1,
                    to_position + 1
                )
            }
            HistoryAction::BulkMove {
                count, target_page, ..
            } => format!("Moved {count} cards to page {}", target_page + 1),
            HistoryAction::Compact {
                page: Some(page),
                moved,
                ..
            } => format!("Compacted page {} ({moved} cards moved)", page + 1),
            HistoryAction::Compact {
                page: None, moved, ..
            } => format!("Compacted binder ({moved} cards moved)"),
            HistoryAction::Revert { revision } => {
                format!("Reverted to saved version {revision}")
            }
        }
    }
}

/// One recorded mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: Uuid,
    pub timestamp: Millis,
    pub action: HistoryAction,
    pub before: Snapshot,
    pub after: Snapshot,
}

/// An entry together with the snapshot an undo or redo restores.
#[derive(Debug)]
pub struct Step<'a> {
    pub entry: &'a HistoryEntry,
    pub snapshot: &'a Snapshot,
}

/// Bounded linear history of a binder's mutations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "LedgerRecord")]
pub struct HistoryLedger {
    entries: VecDeque<HistoryEntry>,
    cursor: Option<usize>,
    limit: usize,
}

#[derive(Deserialize)]
struct LedgerRecord {
    entries: VecDeque<HistoryEntry>,
    cursor: Option<usize>,
    limit: usize,
}

impl TryFrom<LedgerRecord> for HistoryLedger {
    type Error = HistoryError;

    fn try_from(record: LedgerRecord) -> std::result::Result<Self, Self::Error> {
        let len = record.entries.len();
        let reason = if record.limit == 0 {
            Some("limit must be at least 1".to_string())
        } else if len > record.limit {
            Some(format!("{len} entries exceed limit {}", record.limit))
        } else {
            record
                .cursor
                .filter(|&cursor| cursor >= len)
                .map(|cursor| format!("cursor {cursor} is past {len} entries"))
        };
        if let Some(reason) = reason {
            return Err(HistoryError::InvalidLedger { reason });
        }
        Ok(Self {
            entries: record.entries,
            cursor: record.cursor,
            limit: record.limit,
        })
    }
}

impl Default for HistoryLedger {
    fn default() -> Self {
        Self::with_limit(DEFAULT_HISTORY_LIMIT)
    }
}

impl HistoryLedger {
    /// Create a ledger retaining at most `limit` entries.
    pub fn with_limit(limit: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            cursor: None,
            limit: limit.max(1),
        }
    }

    /// Append a mutation, discarding any undone entries first.
    pub fn record(
        &mut self,
        action: HistoryAction,
        before: Snapshot,
        after: Snapshot,
        timestamp: Millis,
    ) -> &HistoryEntry {
        if let Some(cursor) = self.cursor.take() {
            self.entries.truncate(cursor);
        }
        self.entries.push_back(HistoryEntry {
            id: Uuid::new_v4(),
            timestamp,
            action,
            before,
            after,
        });
        while self.entries.len() > self.limit {
            self.entries.pop_front();
        }
        &self.entries[self.entries.len() - 1]
    }

    /// Step back one entry and return the state from before it.
    ///
    /// Stops at a revert: nothing before it can be undone.
    pub fn undo(&mut self) -> Result<Step<'_>> {
        let index = self.undo_index().ok_or(HistoryError::NothingToUndo)?;
        self.cursor = Some(index);
        let entry = &self.entries[index];
        Ok(Step {
            entry,
            snapshot: &entry.before,
        })
    }

    /// Re-apply the oldest undone entry and return the state after it.
    pub fn redo(&mut self) -> Result<Step<'_>> {
        let index = self.cursor.ok_or(HistoryError::NothingToRedo)?;
        self.cursor = if index + 1 >= self.entries.len() {
            None
        } else {
            Some(index + 1)
        };
        let entry = &self.entries[index];
        Ok(Step {
            entry,
            snapshot: &entry.after,
        })
    }

    pub fn can_undo(&self) -> bool {
        self.undo_index().is_some()
    }

    fn undo_index(&self) -> Option<usize> {
        self.cursor
            .unwrap_or(self.entries.len())
            .checked_sub(1)
            .filter(|&i| self.entries[i].action.is_reversible())
    }

    pub fn can_redo(&self) -> bool {
        self.cursor.is_some()
    }

    /// Index of the oldest undone entry; `None` when at the head.
    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    /// Cursor in the `-1 = head` convention used by presentation code.
    pub fn position(&self) -> i64 {
        self.cursor.map(|c| c as i64).unwrap_or(-1)
    }

    /// The most recent applied entry.
    pub fn current(&self) -> Option<&HistoryEntry> {
        let applied = self.cursor.unwrap_or(self.entries.len());
        applied.checked_sub(1).map(|i| &self.entries[i])
    }

    pub fn entries(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Drop every entry. The card store is not touched.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.cursor = None;
    }
}

/// Binder page to scroll to after undoing or redoing `entry`.
pub fn jump_to_page_for_entry(entry: &HistoryEntry, grid: &GridSize) -> Option<usize> {
    entry
        .action
        .referenced_position()
        .map(|position| grid.page_of(position))
}
