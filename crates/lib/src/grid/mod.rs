//! Grid geometry: mapping linear card positions onto binder pages.
//!
//! A binder is a sequence of physical card pages of `rows × cols` slots. The
//! first physical page is the cover and is shown alone on the right; every
//! following binder page shows two physical pages side by side. All functions
//! here are pure.

mod errors;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub use errors::GridError;

use crate::{Result, constants::DEFAULT_GRID_SIZE};

/// Dimensions of one physical card page.
///
/// Always holds at least one slot; build it with [`GridSize::new`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "GridDims", into = "GridDims")]
pub struct GridSize {
    rows: usize,
    cols: usize,
    total: usize,
}

/// Wire form of [`GridSize`].
#[derive(Clone, Copy, Serialize, Deserialize)]
struct GridDims {
    rows: usize,
    cols: usize,
}

impl TryFrom<GridDims> for GridSize {
    type Error = GridError;

    fn try_from(dims: GridDims) -> std::result::Result<Self, Self::Error> {
        GridSize::checked(dims.rows, dims.cols)
    }
}

impl From<GridSize> for GridDims {
    fn from(size: GridSize) -> Self {
        GridDims {
            rows: size.rows,
            cols: size.cols,
        }
    }
}

/// Which physical page of a binder spread a slot sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

/// Location of a position inside the binder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot {
    pub page: usize,
    pub side: Side,
    pub row: usize,
    pub col: usize,
}

impl GridSize {
    /// Create a grid of `rows × cols` slots.
    pub fn new(rows: usize, cols: usize) -> Result<Self> {
        Ok(Self::checked(rows, cols)?)
    }

    fn checked(rows: usize, cols: usize) -> std::result::Result<Self, GridError> {
        match rows.checked_mul(cols) {
            Some(total) if total > 0 => Ok(Self { rows, cols, total }),
            _ => Err(GridError::EmptyGrid { rows, cols }),
        }
    }

    /// Rows of slots on one physical page.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Columns of slots on one physical page.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Number of card slots on one physical page.
    pub fn cards_per_page(&self) -> usize {
        self.total
    }

    /// Binder page index that shows `position`.
    pub fn page_of(&self, position: usize) -> usize {
        let physical = position / self.total;
        if physical == 0 {
            0
        } else {
            physical.div_ceil(2)
        }
    }

    /// Inclusive `(start, end)` positions shown on binder page `page`.
    pub fn page_range(&self, page: usize) -> (usize, usize) {
        if page == 0 {
            return (0, self.total - 1);
        }
        let first_physical = 2 * page - 1;
        let start = first_physical * self.total;
        (start, start + 2 * self.total - 1)
    }

    /// Page, side, row and column of `position`.
    pub fn slot_of(&self, position: usize) -> Slot {
        let physical = position / self.total;
        let in_page = position % self.total;
        let side = if physical % 2 == 1 {
            Side::Left
        } else {
            Side::Right
        };
        Slot {
            page: self.page_of(position),
            side,
            row: in_page / self.cols,
            col: in_page % self.cols,
        }
    }

    /// Number of binder pages needed to show `extent` slots. The cover page
    /// always exists.
    pub fn page_count(&self, extent: usize) -> usize {
        match extent {
            0 => 1,
            n => self.page_of(n - 1) + 1,
        }
    }
}

/// Converts a signed position (document key, user input) to a slot index.
pub fn checked_position(raw: i64) -> Result<usize> {
    usize::try_from(raw).map_err(|_| GridError::InvalidPosition { position: raw }.into())
}

/// Parses a decimal position string, as used for document card keys.
pub fn parse_position(raw: &str) -> Result<usize> {
    let value: i64 = raw
        .trim()
        .parse()
        .map_err(|_| GridError::MalformedPosition {
            raw: raw.to_string(),
        })?;
    checked_position(value)
}

/// Named grid sizes available to binders.
#[derive(Debug, Clone)]
pub struct GridRegistry {
    sizes: BTreeMap<String, GridSize>,
    default_name: String,
}

impl Default for GridRegistry {
    fn default() -> Self {
        let mut sizes = BTreeMap::new();
        for (rows, cols) in [(2, 2), (3, 3), (4, 3), (4, 4), (5, 5)] {
            sizes.insert(
                format!("{rows}x{cols}"),
                GridSize {
                    rows,
                    cols,
                    total: rows * cols,
                },
            );
        }
        Self {
            sizes,
            default_name: DEFAULT_GRID_SIZE.to_string(),
        }
    }
}

impl GridRegistry {
    /// Look up a registered grid size by name.
    pub fn get(&self, name: &str) -> Result<GridSize> {
        self.sizes.get(name).copied().ok_or_else(|| {
            GridError::UnknownGridSize {
                name: name.to_string(),
            }
            .into()
        })
    }

    /// Look up a grid size, falling back to the registry default.
    ///
    /// For presentation code only; engine operations use [`GridRegistry::get`].
    pub fn resolve_or_default(&self, name: &str) -> GridSize {
        self.sizes
            .get(name)
            .or_else(|| self.sizes.get(&self.default_name))
            .copied()
            .unwrap_or(GridSize {
                rows: 3,
                cols: 3,
                total: 9,
            })
    }

    /// Name of the default grid size.
    pub fn default_name(&self) -> &str {
        &self.default_name
    }

    /// Register (or replace) a named grid size. Every [`GridSize`] has at
    /// least one slot, so page arithmetic on it cannot divide by zero.
    pub fn register(&mut self, name: impl Into<String>, size: GridSize) {
        self.sizes.insert(name.into(), size);
    }

    /// Check whether `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.sizes.contains_key(name)
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.sizes.keys().map(String::as_str)
    }

    /// `page_of` for a named grid size.
    pub fn page_of(&self, position: usize, grid: &str) -> Result<usize> {
        Ok(self.get(grid)?.page_of(position))
    }

    /// `page_range` for a named grid size.
    pub fn page_range(&self, page: usize, grid: &str) -> Result<(usize, usize)> {
        Ok(self.get(grid)?.page_range(page))
    }
}
