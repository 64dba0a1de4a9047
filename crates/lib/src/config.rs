//! Workspace configuration.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::{ANONYMOUS_WRITER, DEFAULT_GRID_SIZE, DEFAULT_HISTORY_LIMIT};

/// Settings shared by every binder a workspace opens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WorkspaceConfig {
    /// Owner whose binders this workspace manages.
    pub owner_id: String,
    /// Identifies this session in remote write markers.
    pub writer_id: String,
    /// Grid size for binders created without one.
    pub default_grid_size: String,
    /// History entries retained per binder.
    pub history_limit: usize,
    /// Card ceiling applied to new binders, if any.
    pub max_cards: Option<usize>,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            owner_id: ANONYMOUS_WRITER.to_string(),
            writer_id: Uuid::new_v4().to_string(),
            default_grid_size: DEFAULT_GRID_SIZE.to_string(),
            history_limit: DEFAULT_HISTORY_LIMIT,
            max_cards: None,
        }
    }
}

impl WorkspaceConfig {
    pub fn for_owner(owner_id: impl Into<String>) -> Self {
        Self {
            owner_id: owner_id.into(),
            ..Self::default()
        }
    }

    pub fn with_writer_id(mut self, writer_id: impl Into<String>) -> Self {
        self.writer_id = writer_id.into();
        self
    }

    pub fn with_default_grid_size(mut self, grid_size: impl Into<String>) -> Self {
        self.default_grid_size = grid_size.into();
        self
    }

    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit;
        self
    }

    pub fn with_max_cards(mut self, max_cards: Option<usize>) -> Self {
        self.max_cards = max_cards;
        self
    }
}
