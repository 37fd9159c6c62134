//! Diesel row models for ranked item persistence.

use chrono::{DateTime, Utc};
use diesel::prelude::*;

use crate::ordering::{
    domain::{ContainerId, ItemId, OrderedItem, PersistedItemData, Rank},
    ports::{OrderedRepositoryError, OrderedRepositoryResult},
};

/// Ranked item row shared by both levels.
///
/// Loaded positionally from `(id, <container column>, position, title,
/// created_at)`, so one model serves `status_lists` and `tasks`.
#[derive(Debug, Clone, PartialEq, Eq, Queryable)]
pub struct OrderedItemRow {
    /// Item identifier.
    pub id: uuid::Uuid,
    /// Owning container (`board_id` or `status_list_id`).
    pub container_id: uuid::Uuid,
    /// 1-based rank.
    pub position: i64,
    /// Status-list name or task title.
    pub title: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl TryFrom<OrderedItemRow> for OrderedItem {
    type Error = OrderedRepositoryError;

    fn try_from(row: OrderedItemRow) -> Result<Self, Self::Error> {
        let OrderedItemRow {
            id,
            container_id,
            position,
            title,
            created_at,
        } = row;
        let rank = position_to_rank(position)?;
        Ok(Self::from_persisted(PersistedItemData {
            id: ItemId::from_uuid(id),
            container_id: ContainerId::from_uuid(container_id),
            rank,
            label: title,
            created_at,
        }))
    }
}

impl TryFrom<&OrderedItem> for OrderedItemRow {
    type Error = OrderedRepositoryError;

    fn try_from(item: &OrderedItem) -> Result<Self, Self::Error> {
        Ok(Self {
            id: item.id().into_inner(),
            container_id: item.container_id().into_inner(),
            position: rank_to_position(item.rank())?,
            title: item.label().to_owned(),
            created_at: item.created_at(),
        })
    }
}

/// Converts a persisted position into a validated rank.
pub fn position_to_rank(position: i64) -> OrderedRepositoryResult<Rank> {
    let value = u64::try_from(position).map_err(OrderedRepositoryError::invalid_persisted_data)?;
    Rank::new(value).map_err(OrderedRepositoryError::invalid_persisted_data)
}

/// Converts a rank into the BIGINT column representation.
pub fn rank_to_position(rank: Rank) -> OrderedRepositoryResult<i64> {
    i64::try_from(rank.value()).map_err(OrderedRepositoryError::persistence)
}
