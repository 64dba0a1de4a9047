//! Error types for grid geometry.

use thiserror::Error;

/// Errors raised while mapping positions onto binder pages.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GridError {
    /// A position outside the valid range was supplied.
    #[error("Invalid position: {position}")]
    InvalidPosition {
        /// The offending position as given by the caller
        position: i64,
    },

    /// A position string that is not a decimal integer.
    #[error("Invalid position: {raw:?} is not a number")]
    MalformedPosition {
        /// The text as given by the caller
        raw: String,
    },

    /// The named grid size is not registered.
    #[error("Unknown grid size: {name}")]
    UnknownGridSize {
        /// The name that failed to resolve
        name: String,
    },

    /// A grid with zero rows or columns was described.
    #[error("Grid {rows}x{cols} has no slots")]
    EmptyGrid { rows: usize, cols: usize },
}

impl GridError {
    /// Check if this error is about an invalid position.
    pub fn is_invalid_position(&self) -> bool {
        matches!(
            self,
            GridError::InvalidPosition { .. } | GridError::MalformedPosition { .. }
        )
    }

    /// Check if this error is about an unregistered grid size.
    pub fn is_unknown_grid_size(&self) -> bool {
        matches!(self, GridError::UnknownGridSize { .. })
    }
}

impl From<GridError> for crate::Error {
    fn from(err: GridError) -> Self {
        crate::Error::Grid(err)
    }
}
