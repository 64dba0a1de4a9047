//! Card values placed in binder slots.
//!
//! A [`CardEntry`] is immutable: changing anything about a placed card means
//! replacing the entry. The same logical card (`card_id`) may sit in several
//! slots, each copy carrying its own [`InstanceId`].

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier of a logical card, as issued by the card catalogue.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CardId(String);

impl CardId {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for CardId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for CardId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl std::fmt::Display for CardId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of one physical copy of a card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InstanceId(Uuid);

impl InstanceId {
    /// Mint a fresh, process-unique instance id.
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl From<Uuid> for InstanceId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for InstanceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Catalogue data shown for a card.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardData {
    pub name: String,
    /// Printing variant (foil, reverse holo, ...). Part of the clipboard key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Catalogue fields the engine does not interpret.
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl CardData {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_variant(mut self, variant: impl Into<String>) -> Self {
        self.variant = Some(variant.into());
        self
    }

    pub fn with_image_url(mut self, url: impl Into<String>) -> Self {
        self.image_url = Some(url.into());
        self
    }
}

/// A card placed (or placeable) in a binder slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardEntry {
    card_id: CardId,
    instance_id: InstanceId,
    card_data: CardData,
}

impl CardEntry {
    /// Create an entry for a new physical copy of `card_id`.
    pub fn new(card_id: impl Into<CardId>, card_data: CardData) -> Self {
        Self {
            card_id: card_id.into(),
            instance_id: InstanceId::generate(),
            card_data,
        }
    }

    /// Create an entry with a known instance id (e.g. when loading a document).
    pub fn with_instance(
        card_id: impl Into<CardId>,
        instance_id: InstanceId,
        card_data: CardData,
    ) -> Self {
        Self {
            card_id: card_id.into(),
            instance_id,
            card_data,
        }
    }

    pub fn card_id(&self) -> &CardId {
        &self.card_id
    }

    pub fn instance_id(&self) -> InstanceId {
        self.instance_id
    }

    pub fn card_data(&self) -> &CardData {
        &self.card_data
    }

    pub fn name(&self) -> &str {
        &self.card_data.name
    }

    pub fn variant(&self) -> Option<&str> {
        self.card_data.variant.as_deref()
    }

    /// A copy of this card as a distinct physical instance.
    pub fn reissue(&self) -> Self {
        Self {
            card_id: self.card_id.clone(),
            instance_id: InstanceId::generate(),
            card_data: self.card_data.clone(),
        }
    }

    /// True if both entries describe the same card and variant.
    pub fn same_printing(&self, other: &CardEntry) -> bool {
        self.card_id == other.card_id && self.variant() == other.variant()
    }
}
