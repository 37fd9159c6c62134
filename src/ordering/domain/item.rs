//! The ranked item record and the rank mutations applied to it.

use super::{ContainerId, ItemId, Rank};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// A ranked unit belonging to exactly one container at a time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderedItem {
    id: ItemId,
    container_id: ContainerId,
    rank: Rank,
    label: String,
    created_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedItemData {
    /// Persisted item identifier.
    pub id: ItemId,
    /// Owning container.
    pub container_id: ContainerId,
    /// Persisted rank.
    pub rank: Rank,
    /// Display label (status-list name or task title).
    pub label: String,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl OrderedItem {
    /// Creates a new item with a fresh identifier.
    #[must_use]
    pub fn new(
        container_id: ContainerId,
        rank: Rank,
        label: impl Into<String>,
        clock: &impl Clock,
    ) -> Self {
        Self {
            id: ItemId::new(),
            container_id,
            rank,
            label: label.into(),
            created_at: clock.utc(),
        }
    }

    /// Reconstructs an item from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedItemData) -> Self {
        Self {
            id: data.id,
            container_id: data.container_id,
            rank: data.rank,
            label: data.label,
            created_at: data.created_at,
        }
    }

    /// Returns the item identifier.
    #[must_use]
    pub const fn id(&self) -> ItemId {
        self.id
    }

    /// Returns the owning container.
    #[must_use]
    pub const fn container_id(&self) -> ContainerId {
        self.container_id
    }

    /// Returns the current rank.
    #[must_use]
    pub const fn rank(&self) -> Rank {
        self.rank
    }

    /// Returns the display label.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Applies a rank update addressed to this item.
    ///
    /// Updates addressed to another item are ignored.
    pub fn apply(&mut self, update: &RankUpdate) {
        if update.item_id != self.id {
            return;
        }
        self.rank = update.rank;
        if let Some(container_id) = update.container_id {
            self.container_id = container_id;
        }
    }

    pub(crate) const fn place(&mut self, container_id: ContainerId, rank: Rank) {
        self.container_id = container_id;
        self.rank = rank;
    }
}

/// A single `(item, rank)` write, optionally re-parenting the item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankUpdate {
    /// Item being written.
    pub item_id: ItemId,
    /// New rank.
    pub rank: Rank,
    /// New container, present only when the item changes container.
    pub container_id: Option<ContainerId>,
}

impl RankUpdate {
    /// Creates a rank-only update.
    #[must_use]
    pub const fn rank(item_id: ItemId, rank: Rank) -> Self {
        Self {
            item_id,
            rank,
            container_id: None,
        }
    }

    /// Creates an update that also moves the item to another container.
    #[must_use]
    pub const fn relocate(item_id: ItemId, container_id: ContainerId, rank: Rank) -> Self {
        Self {
            item_id,
            rank,
            container_id: Some(container_id),
        }
    }
}
