//! Error types for the positional card store.

use thiserror::Error;

use crate::card::InstanceId;

/// Errors that can occur while mutating a binder's card arrangement.
///
/// `InvalidPosition`, `SlotEmpty` and `DuplicateInstance` are caller bugs and
/// are never retried. `CapacityExceeded` is an expected, user-facing limit.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Position lies outside the store's addressable range.
    #[error("Position {position} is outside the addressable range 0..{extent}")]
    InvalidPosition { position: usize, extent: usize },

    /// Operation needs an occupied slot but found none.
    #[error("Slot {position} is empty")]
    SlotEmpty { position: usize },

    /// Adding the cards would exceed the caller-supplied ceiling.
    #[error("Adding {adding} card(s) to {current} would exceed the limit of {ceiling}")]
    CapacityExceeded {
        current: usize,
        adding: usize,
        ceiling: usize,
    },

    /// The card instance is already placed in the binder.
    #[error("Card instance {instance_id} already occupies slot {position}")]
    DuplicateInstance {
        instance_id: InstanceId,
        position: usize,
    },
}

impl StoreError {
    /// Check if this error indicates an empty slot.
    pub fn is_slot_empty(&self) -> bool {
        matches!(self, StoreError::SlotEmpty { .. })
    }

    /// Check if this error indicates an out-of-range position.
    pub fn is_invalid_position(&self) -> bool {
        matches!(self, StoreError::InvalidPosition { .. })
    }

    /// Check if this error is the capacity ceiling.
    pub fn is_capacity_exceeded(&self) -> bool {
        matches!(self, StoreError::CapacityExceeded { .. })
    }

    /// Check if this error is a programming error rather than a user-facing limit.
    pub fn is_invariant_violation(&self) -> bool {
        !self.is_capacity_exceeded()
    }

    /// Get the position this error refers to, if any.
    pub fn position(&self) -> Option<usize> {
        match self {
            StoreError::InvalidPosition { position, .. }
            | StoreError::SlotEmpty { position }
            | StoreError::DuplicateInstance { position, .. } => Some(*position),
            StoreError::CapacityExceeded { .. } => None,
        }
    }
}

impl From<StoreError> for crate::Error {
    fn from(err: StoreError) -> Self {
        crate::Error::Store(err)
    }
}
