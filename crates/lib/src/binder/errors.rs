//! Error types for binder sessions and the workspace.

use thiserror::Error;

use super::BinderId;

/// Errors about binders as a whole rather than their slots.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BinderError {
    /// No open or locally stored binder with this id.
    #[error("Binder not found: {id}")]
    NotFound { id: BinderId },

    /// A binder with this id is already open.
    #[error("Binder already open: {id}")]
    AlreadyOpen { id: BinderId },
}

impl BinderError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, BinderError::NotFound { .. })
    }
}

impl From<BinderError> for crate::Error {
    fn from(err: BinderError) -> Self {
        crate::Error::Binder(err)
    }
}
