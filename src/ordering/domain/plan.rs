//! Pure re-rank computation.
//!
//! A [`ReorderPlan`] takes the current ordering of one container, applies a
//! removal or an insertion and re-walks the sequence assigning ranks
//! `1..=N`. Plans never touch storage; the engine turns them into
//! [`RankUpdate`] batches.

use super::{ContainerId, ContainerView, ItemId, OrderedItem, Rank, RankUpdate};
use serde::{Deserialize, Serialize};

/// Which rank writes a plan emits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WritePolicy {
    /// Write only items whose rank or container changed.
    #[default]
    ChangedOnly,
    /// Write every item of every touched container.
    ///
    /// Produces the same final state as [`WritePolicy::ChangedOnly`] with
    /// more writes.
    All,
}

/// Converts a requested 1-based rank into a zero-based insertion index.
///
/// Ranks below 1 clamp to the head and ranks past the tail clamp to `len`,
/// i.e. an append.
///
/// # Examples
///
/// ```
/// use corkboard::ordering::domain::insertion_index;
///
/// assert_eq!(insertion_index(1, 3), 0);
/// assert_eq!(insertion_index(-4, 3), 0);
/// assert_eq!(insertion_index(2, 3), 1);
/// assert_eq!(insertion_index(99, 3), 3);
/// ```
#[must_use]
pub fn insertion_index(target_rank: i64, len: usize) -> usize {
    if target_rank <= 1 {
        return 0;
    }
    usize::try_from(target_rank.saturating_sub(1)).map_or(len, |index| index.min(len))
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Placement {
    item: OrderedItem,
    previous_container: ContainerId,
    previous_rank: Rank,
}

impl Placement {
    fn relocated(&self) -> bool {
        self.previous_container != self.item.container_id()
    }

    fn changed(&self) -> bool {
        self.relocated() || self.previous_rank != self.item.rank()
    }

    fn update(&self) -> RankUpdate {
        if self.relocated() {
            RankUpdate::relocate(self.item.id(), self.item.container_id(), self.item.rank())
        } else {
            RankUpdate::rank(self.item.id(), self.item.rank())
        }
    }
}

/// The final ordering of one container after a removal or insertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReorderPlan {
    container_id: ContainerId,
    placements: Vec<Placement>,
}

impl ReorderPlan {
    /// Re-walks `current` with `excluded` removed.
    ///
    /// This closes the gap left by an item leaving the container and also
    /// repairs any pre-existing gaps or duplicates.
    #[must_use]
    pub fn compact(
        container_id: ContainerId,
        current: Vec<OrderedItem>,
        excluded: Option<ItemId>,
    ) -> Self {
        let rest = current
            .into_iter()
            .filter(|item| Some(item.id()) != excluded)
            .collect();
        Self::walk(container_id, rest)
    }

    /// Places `moving` at the clamped `target_rank` of `current`.
    ///
    /// `current` may or may not already contain `moving`; any existing copy
    /// is dropped before insertion.
    #[must_use]
    pub fn insert(
        container_id: ContainerId,
        current: Vec<OrderedItem>,
        moving: OrderedItem,
        target_rank: i64,
    ) -> Self {
        let mut rest: Vec<OrderedItem> = current
            .into_iter()
            .filter(|item| item.id() != moving.id())
            .collect();
        let index = insertion_index(target_rank, rest.len());
        rest.insert(index, moving);
        Self::walk(container_id, rest)
    }

    fn walk(container_id: ContainerId, ordered: Vec<OrderedItem>) -> Self {
        let placements = ordered
            .into_iter()
            .enumerate()
            .map(|(index, mut item)| {
                let previous_container = item.container_id();
                let previous_rank = item.rank();
                item.place(container_id, Rank::from_index(index));
                Placement {
                    item,
                    previous_container,
                    previous_rank,
                }
            })
            .collect();
        Self {
            container_id,
            placements,
        }
    }

    /// Returns the container this plan orders.
    #[must_use]
    pub const fn container_id(&self) -> ContainerId {
        self.container_id
    }

    /// Returns `true` when applying the plan would not change any record.
    #[must_use]
    pub fn is_unchanged(&self) -> bool {
        !self.placements.iter().any(Placement::changed)
    }

    /// Returns the writes required under `policy`.
    #[must_use]
    pub fn updates(&self, policy: WritePolicy) -> Vec<RankUpdate> {
        self.placements
            .iter()
            .filter(|placement| policy == WritePolicy::All || placement.changed())
            .map(Placement::update)
            .collect()
    }

    /// Returns the items in their final order with final ranks.
    pub fn items(&self) -> impl Iterator<Item = &OrderedItem> {
        self.placements.iter().map(|placement| &placement.item)
    }

    /// Returns the final state of one item, if it belongs to this plan.
    #[must_use]
    pub fn find(&self, item_id: ItemId) -> Option<&OrderedItem> {
        self.items().find(|item| item.id() == item_id)
    }

    /// Returns the number of items in the container after the plan.
    #[must_use]
    pub fn len(&self) -> usize {
        self.placements.len()
    }

    /// Returns `true` when the container ends up empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.placements.is_empty()
    }

    /// Returns the container view after the plan is applied.
    #[must_use]
    pub fn view(&self) -> ContainerView {
        ContainerView::from_items(self.container_id, self.items())
    }
}
