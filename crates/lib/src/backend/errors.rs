//! Error types for document store backends.

use thiserror::Error;

/// Errors that can occur while talking to a document store.
///
/// # Stability
///
/// - New variants may be added in minor versions (enum is `#[non_exhaustive]`)
/// - Helper methods like `is_*()` provide stable APIs
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum BackendError {
    /// The store refused access to a document.
    #[error("Permission denied for document '{key}': {reason}")]
    PermissionDenied { key: String, reason: String },

    /// The store could not be reached.
    #[error("Network error: {reason}")]
    Network { reason: String },

    /// Serialization failed.
    #[error("Serialization failed")]
    SerializationFailed {
        #[source]
        source: serde_json::Error,
    },

    /// Deserialization failed.
    #[error("Deserialization failed")]
    DeserializationFailed {
        #[source]
        source: serde_json::Error,
    },

    /// File I/O error.
    #[error("File I/O error")]
    FileIo {
        #[source]
        source: std::io::Error,
    },
}

impl BackendError {
    /// Check if this error is a transport failure worth retrying.
    pub fn is_network_error(&self) -> bool {
        matches!(self, BackendError::Network { .. })
    }

    /// Check if this error indicates missing permission.
    pub fn is_permission_denied(&self) -> bool {
        matches!(self, BackendError::PermissionDenied { .. })
    }

    /// Check if this error is related to local I/O or encoding.
    pub fn is_io_error(&self) -> bool {
        matches!(
            self,
            BackendError::FileIo { .. }
                | BackendError::SerializationFailed { .. }
                | BackendError::DeserializationFailed { .. }
        )
    }
}

impl From<BackendError> for crate::Error {
    fn from(err: BackendError) -> Self {
        crate::Error::Backend(err)
    }
}
