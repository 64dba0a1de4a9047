//! Error types for the clipboard staging area.

use thiserror::Error;

/// Errors that can occur when taking cards off the clipboard.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClipboardError {
    /// No clipboard entry at this index.
    #[error("No clipboard entry at index {index} (clipboard holds {len})")]
    NotFound { index: usize, len: usize },

    /// A stored clipboard holds an entry with no copies.
    #[error("Clipboard entry at index {index} has no copies")]
    EmptyEntry { index: usize },
}

impl ClipboardError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ClipboardError::NotFound { .. })
    }
}

impl From<ClipboardError> for crate::Error {
    fn from(err: ClipboardError) -> Self {
        crate::Error::Clipboard(err)
    }
}
