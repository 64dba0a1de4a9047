//! Error types for the history ledger.

use thiserror::Error;

/// Errors returned when stepping through a binder's history.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HistoryError {
    /// Undo requested with no applied entry left.
    #[error("Nothing to undo")]
    NothingToUndo,

    /// Redo requested with no undone entry left.
    #[error("Nothing to redo")]
    NothingToRedo,

    /// A stored ledger breaks its own bounds.
    #[error("Invalid history ledger: {reason}")]
    InvalidLedger { reason: String },
}

impl HistoryError {
    /// Check if this error means the cursor is already at an end of the ledger.
    pub fn is_exhausted(&self) -> bool {
        matches!(self, HistoryError::NothingToUndo | HistoryError::NothingToRedo)
    }
}

impl From<HistoryError> for crate::Error {
    fn from(err: HistoryError) -> Self {
        crate::Error::History(err)
    }
}
