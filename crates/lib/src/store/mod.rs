//! The positional card store: one binder's sparse arrangement of cards.
//!
//! Positions are zero-based slot indices. Empty slots are key absence, never a
//! placeholder value. The backing map is an [`im::OrdMap`], so taking a
//! [`Snapshot`] shares structure with the live store instead of copying it.
//!
//! Invariants held by every operation:
//! - each position holds at most one entry
//! - each [`InstanceId`] occupies at most one position
//! - `extent` is at least the highest occupied position plus one
//! - `last_modified` never decreases

mod errors;

use std::ops::RangeBounds;
use std::sync::Arc;

use im::OrdMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

pub use errors::StoreError;

use crate::{
    Result,
    card::{CardEntry, InstanceId},
    clock::{Clock, Millis},
    grid::GridSize,
};

/// Where `add` should place new cards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Insert at this position, shifting occupants forward if it is taken.
    At(usize),
    /// First empty slot anywhere in the binder.
    FirstEmpty,
    /// First empty slot in `start..=end`, else the first empty slot anywhere.
    FirstEmptyWithin { start: usize, end: usize },
}

impl Placement {
    fn window(&self) -> Option<(usize, usize)> {
        match *self {
            Placement::FirstEmptyWithin { start, end } => Some((start, end)),
            _ => None,
        }
    }

    /// First empty slot on `page`, else anywhere.
    pub fn on_page(grid: &GridSize, page: usize) -> Self {
        let (start, end) = grid.page_range(page);
        Placement::FirstEmptyWithin { start, end }
    }
}

/// How `move_card` rearranges slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveMode {
    /// Exchange the occupants of the two slots.
    Swap,
    /// Take the card out and reinsert it, sliding the slots in between.
    Shift,
}

/// How `bulk_move` places the extracted cards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BulkMode {
    /// Make a contiguous run at the page start, shifting occupants forward.
    Insert,
    /// Only use empty slots from the page start onward.
    Fill,
}

/// Result of a bulk move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkMoveReport {
    /// First slot of the target page.
    pub target_position: usize,
    /// Final position of each moved card, in original ascending order.
    pub placed: Vec<usize>,
}

/// An immutable copy of a store's contents.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Snapshot {
    cards: OrdMap<usize, CardEntry>,
    extent: usize,
}

impl Snapshot {
    /// Build a snapshot from `(position, entry)` pairs.
    ///
    /// Fails if an instance id appears twice.
    pub fn from_cards(cards: impl IntoIterator<Item = (usize, CardEntry)>) -> Result<Self> {
        let mut map = OrdMap::new();
        for (position, entry) in cards {
            if let Some(existing) = find_instance(&map, entry.instance_id()) {
                return Err(StoreError::DuplicateInstance {
                    instance_id: entry.instance_id(),
                    position: existing,
                }
                .into());
            }
            map.insert(position, entry);
        }
        let extent = upper_bound(&map);
        Ok(Self { cards: map, extent })
    }

    /// Widen the addressable range to at least `extent` slots.
    pub fn with_extent(mut self, extent: usize) -> Self {
        self.extent = self.extent.max(extent);
        self
    }

    pub fn get(&self, position: usize) -> Option<&CardEntry> {
        self.cards.get(&position)
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn extent(&self) -> usize {
        self.extent
    }

    /// Occupied slots in ascending position order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &CardEntry)> {
        self.cards.iter().map(|(p, e)| (*p, e))
    }
}

fn find_instance(cards: &OrdMap<usize, CardEntry>, instance: InstanceId) -> Option<usize> {
    cards
        .iter()
        .find(|(_, e)| e.instance_id() == instance)
        .map(|(p, _)| *p)
}

fn upper_bound(cards: &OrdMap<usize, CardEntry>) -> usize {
    cards.get_max().map(|(p, _)| p + 1).unwrap_or(0)
}

/// A binder's sparse mapping from position to card.
#[derive(Debug, Clone)]
pub struct PositionalCardStore {
    cards: OrdMap<usize, CardEntry>,
    extent: usize,
    last_modified: Millis,
    clock: Arc<dyn Clock>,
}

impl PositionalCardStore {
    /// Create an empty store.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            cards: OrdMap::new(),
            extent: 0,
            last_modified: 0,
            clock,
        }
    }

    /// Create a store holding `snapshot`, stamped `last_modified`.
    pub fn from_snapshot(
        snapshot: Snapshot,
        last_modified: Millis,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            cards: snapshot.cards,
            extent: snapshot.extent,
            last_modified,
            clock,
        }
    }

    pub fn get(&self, position: usize) -> Option<&CardEntry> {
        self.cards.get(&position)
    }

    pub fn is_occupied(&self, position: usize) -> bool {
        self.cards.contains_key(&position)
    }

    /// Number of occupied slots.
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Number of addressable slots.
    pub fn extent(&self) -> usize {
        self.extent
    }

    pub fn last_modified(&self) -> Millis {
        self.last_modified
    }

    /// Occupied slots in ascending position order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &CardEntry)> {
        self.cards.iter().map(|(p, e)| (*p, e))
    }

    /// Occupied slots shown on binder page `page`.
    pub fn page(
        &self,
        grid: &GridSize,
        page: usize,
    ) -> impl Iterator<Item = (usize, &CardEntry)> {
        let (start, end) = grid.page_range(page);
        self.cards.range(start..=end).map(|(p, e)| (*p, e))
    }

    /// Position currently holding `instance`.
    pub fn position_of(&self, instance: InstanceId) -> Option<usize> {
        find_instance(&self.cards, instance)
    }

    /// Structural-sharing copy of the current contents.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            cards: self.cards.clone(),
            extent: self.extent,
        }
    }

    /// Replace the contents with `snapshot` (undo, redo, revert).
    pub fn restore(&mut self, snapshot: &Snapshot) {
        self.cards = snapshot.cards.clone();
        self.extent = snapshot.extent;
        self.touch();
    }

    /// Grow the addressable range to at least `extent` slots.
    pub fn reserve(&mut self, extent: usize) {
        if extent > self.extent {
            self.extent = extent;
            self.touch();
        }
    }

    /// Add one card and return the position it landed on.
    pub fn add(
        &mut self,
        entry: CardEntry,
        placement: Placement,
        ceiling: Option<usize>,
    ) -> Result<usize> {
        self.add_many(vec![entry], placement, ceiling)
    }

    /// Add a run of cards and return the position of the first.
    ///
    /// With [`Placement::At`] the run is contiguous; if any slot it needs is
    /// taken, every entry at or after the target moves forward by the run
    /// length. Otherwise each card takes the next empty slot.
    pub fn add_many(
        &mut self,
        entries: Vec<CardEntry>,
        placement: Placement,
        ceiling: Option<usize>,
    ) -> Result<usize> {
        let count = entries.len();
        if let Some(ceiling) = ceiling {
            if self.cards.len() + count > ceiling {
                return Err(StoreError::CapacityExceeded {
                    current: self.cards.len(),
                    adding: count,
                    ceiling,
                }
                .into());
            }
        }
        for (i, entry) in entries.iter().enumerate() {
            let instance = entry.instance_id();
            if let Some(position) = self.position_of(instance) {
                return Err(StoreError::DuplicateInstance {
                    instance_id: instance,
                    position,
                }
                .into());
            }
            if entries[..i].iter().any(|e| e.instance_id() == instance) {
                return Err(StoreError::DuplicateInstance {
                    instance_id: instance,
                    position: usize::MAX,
                }
                .into());
            }
        }

        let first = match placement {
            Placement::At(position) => {
                let overflow = StoreError::InvalidPosition {
                    position,
                    extent: self.extent,
                };
                let end = position.checked_add(count).ok_or(overflow.clone())?;
                let run = position..end;
                if run.clone().any(|p| self.cards.contains_key(&p)) {
                    upper_bound(&self.cards)
                        .checked_add(count)
                        .ok_or(overflow)?;
                    self.shift_range(position.., count as isize);
                }
                for (p, entry) in run.zip(entries) {
                    self.cards.insert(p, entry);
                }
                position
            }
            Placement::FirstEmpty | Placement::FirstEmptyWithin { .. } => {
                let window = placement.window();
                let mut first = None;
                for entry in entries {
                    let p = self.first_empty(window);
                    self.cards.insert(p, entry);
                    first.get_or_insert(p);
                }
                match first {
                    Some(p) => p,
                    None => self.first_empty(window),
                }
            }
        };

        if count > 0 {
            self.extent = self.extent.max(upper_bound(&self.cards));
            self.touch();
            debug!(position = first, count, "added cards");
        }
        Ok(first)
    }

    /// Remove the card at `position`, leaving a hole.
    pub fn remove(&mut self, position: usize) -> Result<CardEntry> {
        let entry = self
            .cards
            .remove(&position)
            .ok_or(StoreError::SlotEmpty { position })?;
        self.touch();
        debug!(position, card = %entry.card_id(), "removed card");
        Ok(entry)
    }

    /// Reorder by swapping or shifting between two addressable positions.
    pub fn move_card(&mut self, from: usize, to: usize, mode: MoveMode) -> Result<()> {
        self.check_addressable(from)?;
        self.check_addressable(to)?;
        if from == to {
            return Ok(());
        }
        match mode {
            MoveMode::Swap => {
                let a = self.cards.remove(&from);
                let b = self.cards.remove(&to);
                if a.is_none() && b.is_none() {
                    return Ok(());
                }
                if let Some(a) = a {
                    self.cards.insert(to, a);
                }
                if let Some(b) = b {
                    self.cards.insert(from, b);
                }
            }
            MoveMode::Shift => {
                let entry = self
                    .cards
                    .remove(&from)
                    .ok_or(StoreError::SlotEmpty { position: from })?;
                if from < to {
                    self.shift_range(from + 1..=to, -1);
                } else {
                    self.shift_range(to..from, 1);
                }
                self.cards.insert(to, entry);
            }
        }
        self.touch();
        debug!(from, to, ?mode, "moved card");
        Ok(())
    }

    /// Move the cards at `positions` onto binder page `target_page`.
    ///
    /// Cards keep their relative order. Trailing slots the move emptied are
    /// trimmed from the extent; blank space that already lay past the last
    /// card is kept. With [`BulkMode::Fill`], when the page and everything
    /// after it is full the cards land past the last occupied slot.
    pub fn bulk_move(
        &mut self,
        positions: &[usize],
        target_page: usize,
        mode: BulkMode,
        grid: &GridSize,
    ) -> Result<BulkMoveReport> {
        let mut selected = positions.to_vec();
        selected.sort_unstable();
        selected.dedup();
        let (target_position, _) = grid.page_range(target_page);
        if selected.is_empty() {
            return Ok(BulkMoveReport {
                target_position,
                placed: Vec::new(),
            });
        }
        if let Some(&position) = selected.iter().find(|p| !self.cards.contains_key(*p)) {
            return Err(StoreError::SlotEmpty { position }.into());
        }

        let old_upper = upper_bound(&self.cards);
        let mut extracted = Vec::with_capacity(selected.len());
        for position in selected.iter().rev() {
            if let Some(entry) = self.cards.remove(position) {
                extracted.push(entry);
            }
        }
        extracted.reverse();

        let mut placed = Vec::with_capacity(extracted.len());
        match mode {
            BulkMode::Insert => {
                let count = extracted.len();
                if self.cards.range(target_position..).next().is_some() {
                    self.shift_range(target_position.., count as isize);
                }
                for (offset, entry) in extracted.into_iter().enumerate() {
                    self.cards.insert(target_position + offset, entry);
                    placed.push(target_position + offset);
                }
            }
            BulkMode::Fill => {
                let mut cursor = target_position;
                for entry in extracted {
                    while self.cards.contains_key(&cursor) {
                        cursor += 1;
                    }
                    self.cards.insert(cursor, entry);
                    placed.push(cursor);
                    cursor += 1;
                }
            }
        }

        let new_upper = upper_bound(&self.cards);
        self.extent = if self.extent > old_upper {
            self.extent.max(new_upper)
        } else {
            new_upper
        };
        self.touch();
        debug!(count = placed.len(), target_page, ?mode, "bulk moved cards");
        Ok(BulkMoveReport {
            target_position,
            placed,
        })
    }

    /// Close the holes on one binder page. Returns how many cards moved.
    pub fn compact_page(&mut self, grid: &GridSize, page: usize) -> usize {
        let (start, end) = grid.page_range(page);
        let on_page: Vec<(usize, CardEntry)> = self
            .cards
            .range(start..=end)
            .map(|(p, e)| (*p, e.clone()))
            .collect();
        let mut moved = 0;
        for (offset, (position, entry)) in on_page.into_iter().enumerate() {
            let target = start + offset;
            if target != position {
                self.cards.remove(&position);
                self.cards.insert(target, entry);
                moved += 1;
            }
        }
        if moved > 0 {
            self.touch();
            debug!(page, moved, "compacted page");
        }
        moved
    }

    /// Close every hole in the binder. Returns how many cards moved.
    pub fn compact_binder(&mut self) -> usize {
        let mut moved = 0;
        let compacted: OrdMap<usize, CardEntry> = self
            .cards
            .iter()
            .enumerate()
            .map(|(target, (position, entry))| {
                if target != *position {
                    moved += 1;
                }
                (target, entry.clone())
            })
            .collect();
        let extent = compacted.len();
        if moved > 0 || extent != self.extent {
            self.cards = compacted;
            self.extent = extent;
            self.touch();
            debug!(moved, "compacted binder");
        }
        moved
    }

    fn check_addressable(&self, position: usize) -> Result<()> {
        if position >= self.extent {
            return Err(StoreError::InvalidPosition {
                position,
                extent: self.extent,
            }
            .into());
        }
        Ok(())
    }

    fn first_empty(&self, window: Option<(usize, usize)>) -> usize {
        window
            .and_then(|(start, end)| (start..=end).find(|p| !self.cards.contains_key(p)))
            .or_else(|| (0..).find(|p| !self.cards.contains_key(p)))
            .unwrap_or(0)
    }

    /// Move every entry whose position falls in `range` by `delta` slots.
    fn shift_range(&mut self, range: impl RangeBounds<usize>, delta: isize) {
        let moving: Vec<(usize, CardEntry)> = self
            .cards
            .range(range)
            .map(|(p, e)| (*p, e.clone()))
            .collect();
        for (position, _) in &moving {
            self.cards.remove(position);
        }
        for (position, entry) in moving {
            self.cards.insert(position.saturating_add_signed(delta), entry);
        }
    }

    fn touch(&mut self) {
        self.last_modified = self.last_modified.max(self.clock.now_millis());
    }
}
