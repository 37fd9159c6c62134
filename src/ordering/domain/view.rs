//! Read models handed to change notifiers and callers.

use super::{ContainerId, ItemId, OrderedItem, Rank};
use serde::{Deserialize, Serialize};

/// Minimal per-item payload carried in a view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemSummary {
    /// Item identifier.
    pub id: ItemId,
    /// Rank after the operation.
    pub rank: Rank,
    /// Display label.
    pub label: String,
}

impl From<&OrderedItem> for ItemSummary {
    fn from(item: &OrderedItem) -> Self {
        Self {
            id: item.id(),
            rank: item.rank(),
            label: item.label().to_owned(),
        }
    }
}

/// Final ordering of one container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerView {
    /// Container identifier.
    pub container_id: ContainerId,
    /// Items in ascending rank order.
    pub items: Vec<ItemSummary>,
}

impl ContainerView {
    /// Builds a view from items already sorted by rank.
    #[must_use]
    pub fn from_items<'a>(
        container_id: ContainerId,
        items: impl IntoIterator<Item = &'a OrderedItem>,
    ) -> Self {
        Self {
            container_id,
            items: items.into_iter().map(ItemSummary::from).collect(),
        }
    }

    /// Returns the item identifiers in rank order.
    #[must_use]
    pub fn item_ids(&self) -> Vec<ItemId> {
        self.items.iter().map(|item| item.id).collect()
    }

    /// Returns `true` when the ranks are exactly `1..=N` in order.
    #[must_use]
    pub fn is_dense(&self) -> bool {
        self.items
            .iter()
            .enumerate()
            .all(|(index, item)| item.rank == Rank::from_index(index))
    }
}

/// Every container touched by one operation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderedView {
    /// Touched containers; the source precedes the destination for transfers.
    pub containers: Vec<ContainerView>,
}

impl OrderedView {
    /// Creates a view over a single container.
    #[must_use]
    pub fn single(container: ContainerView) -> Self {
        Self {
            containers: vec![container],
        }
    }

    /// Returns the view of `container_id`, if touched.
    #[must_use]
    pub fn container(&self, container_id: ContainerId) -> Option<&ContainerView> {
        self.containers
            .iter()
            .find(|view| view.container_id == container_id)
    }

    /// Locates an item and the container it ended up in.
    #[must_use]
    pub fn find_item(&self, item_id: ItemId) -> Option<(ContainerId, &ItemSummary)> {
        self.containers.iter().find_map(|view| {
            view.items
                .iter()
                .find(|item| item.id == item_id)
                .map(|item| (view.container_id, item))
        })
    }
}
