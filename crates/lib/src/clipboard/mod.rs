//! Process-wide staging area for moving cards between binders.
//!
//! Cards are aggregated per printing (card id + variant) and kept in
//! first-insertion order, so "paste next" consumes the oldest printing first.
//! Units taken off the clipboard are reissued with a fresh [`InstanceId`], so
//! two copies of one printing can land in the same binder.
//!
//! [`InstanceId`]: crate::card::InstanceId

mod errors;

use serde::{Deserialize, Serialize};
use tracing::debug;

pub use errors::ClipboardError;

use crate::{
    Result,
    card::CardEntry,
    store::{Placement, PositionalCardStore},
};

/// All staged copies of one printing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClipboardEntry {
    pub card: CardEntry,
    pub count: usize,
}

/// Ordered, aggregated bag of staged cards.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ClipboardRecord")]
pub struct Clipboard {
    entries: Vec<ClipboardEntry>,
}

#[derive(Deserialize)]
struct ClipboardRecord {
    entries: Vec<ClipboardEntry>,
}

impl TryFrom<ClipboardRecord> for Clipboard {
    type Error = ClipboardError;

    fn try_from(record: ClipboardRecord) -> std::result::Result<Self, Self::Error> {
        if let Some(index) = record.entries.iter().position(|e| e.count == 0) {
            return Err(ClipboardError::EmptyEntry { index });
        }
        Ok(Self {
            entries: record.entries,
        })
    }
}

impl Clipboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage one copy of `card`.
    pub fn put(&mut self, card: CardEntry) {
        match self.entries.iter_mut().find(|e| e.card.same_printing(&card)) {
            Some(entry) => entry.count += 1,
            None => self.entries.push(ClipboardEntry { card, count: 1 }),
        }
        debug!(entries = self.entries.len(), "card staged on clipboard");
    }

    /// Remove one unit of the entry at `index`.
    pub fn take(&mut self, index: usize) -> Result<CardEntry> {
        let len = self.entries.len();
        let entry = self
            .entries
            .get_mut(index)
            .ok_or(ClipboardError::NotFound { index, len })?;
        let card = entry.card.reissue();
        entry.count -= 1;
        if entry.count == 0 {
            self.entries.remove(index);
        }
        Ok(card)
    }

    /// Take one unit of entry `index` and add it to `store`.
    ///
    /// The clipboard is only decremented if the store accepted the card.
    pub fn move_into(
        &mut self,
        index: usize,
        store: &mut PositionalCardStore,
        placement: Placement,
        ceiling: Option<usize>,
    ) -> Result<usize> {
        let card = self
            .entries
            .get(index)
            .map(|e| e.card.reissue())
            .ok_or(ClipboardError::NotFound {
                index,
                len: self.entries.len(),
            })?;
        let position = store.add(card, placement, ceiling)?;
        self.take(index)?;
        Ok(position)
    }

    pub fn get(&self, index: usize) -> Option<&ClipboardEntry> {
        self.entries.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ClipboardEntry> {
        self.entries.iter()
    }

    /// Number of distinct printings staged.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of card copies staged.
    pub fn total_units(&self) -> usize {
        self.entries.iter().map(|e| e.count).sum()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
