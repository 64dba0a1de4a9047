//! Persisted binder layout.
//!
//! ```json
//! {
//!   "id": "...", "ownerId": "...",
//!   "metadata": { "name": "...", "createdAt": 0, "updatedAt": 0 },
//!   "settings": { "gridSize": "3x3", "extent": 9 },
//!   "cards": { "0": { "cardId": "...", "instanceId": "...", "cardData": { ... } } },
//!   "sync": { "status": "synced", "lastSynced": 0, "pendingChanges": 0, ... }
//! }
//! ```
//!
//! Card keys are decimal positions. They are validated when the document is
//! turned back into a [`Snapshot`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{BinderId, BinderMetadata, BinderSettings};
use crate::{
    Result,
    card::CardEntry,
    grid::parse_position,
    store::Snapshot,
    sync::SyncState,
};

const DOCUMENT_VERSION: u8 = 0;

fn is_v0(v: &u8) -> bool {
    *v == 0
}

/// A binder as stored in a [`DocumentStore`](crate::backend::DocumentStore).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BinderDocument {
    #[serde(rename = "_v", default, skip_serializing_if = "is_v0")]
    pub version: u8,
    pub id: BinderId,
    pub owner_id: String,
    pub metadata: BinderMetadata,
    pub settings: BinderSettings,
    #[serde(default)]
    pub cards: BTreeMap<String, CardEntry>,
    #[serde(default)]
    pub sync: SyncState,
}

impl BinderDocument {
    pub(crate) fn new(
        id: BinderId,
        owner_id: String,
        metadata: BinderMetadata,
        settings: BinderSettings,
        snapshot: &Snapshot,
        sync: SyncState,
    ) -> Self {
        let cards = snapshot
            .iter()
            .map(|(position, entry)| (position.to_string(), entry.clone()))
            .collect();
        Self {
            version: DOCUMENT_VERSION,
            id,
            owner_id,
            metadata,
            settings,
            cards,
            sync,
        }
    }

    /// Parse a stored JSON document.
    pub fn from_value(value: Value) -> Result<Self> {
        Ok(serde_json::from_value(value)?)
    }

    pub fn to_value(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }

    /// Rebuild the card arrangement, validating every position key.
    pub fn snapshot(&self) -> Result<Snapshot> {
        let cards = self
            .cards
            .iter()
            .map(|(key, entry)| Ok((parse_position(key)?, entry.clone())))
            .collect::<Result<Vec<_>>>()?;
        Ok(Snapshot::from_cards(cards)?.with_extent(self.settings.extent))
    }
}
