//! Validated move requests.

use super::{ContainerId, ItemId, OrderingDomainError};
use serde::{Deserialize, Serialize};

/// Wire shape of a move request as received from a client.
///
/// Identifiers arrive as strings and are parsed by
/// [`MoveItemCommand::try_from`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveItemPayload {
    /// Identifier of the item to move.
    pub item_id: String,
    /// Destination container; omitted for a reorder in place.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_container_id: Option<String>,
    /// Desired 1-based rank in the destination after the move.
    pub target_rank: i64,
}

/// Request to move an item to a rank, optionally in another container.
///
/// `target_rank` is not validated against the container size; the engine
/// clamps it into `1..=N` of the destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveItemCommand {
    item_id: ItemId,
    target_container_id: Option<ContainerId>,
    target_rank: i64,
}

impl MoveItemCommand {
    /// Creates a reorder within the item's current container.
    #[must_use]
    pub const fn within(item_id: ItemId, target_rank: i64) -> Self {
        Self {
            item_id,
            target_container_id: None,
            target_rank,
        }
    }

    /// Creates a move into `target_container_id`.
    #[must_use]
    pub const fn into_container(
        item_id: ItemId,
        target_container_id: ContainerId,
        target_rank: i64,
    ) -> Self {
        Self {
            item_id,
            target_container_id: Some(target_container_id),
            target_rank,
        }
    }

    /// Returns the item being moved.
    #[must_use]
    pub const fn item_id(&self) -> ItemId {
        self.item_id
    }

    /// Returns the requested destination, if any.
    #[must_use]
    pub const fn target_container_id(&self) -> Option<ContainerId> {
        self.target_container_id
    }

    /// Returns the requested rank before clamping.
    #[must_use]
    pub const fn target_rank(&self) -> i64 {
        self.target_rank
    }
}

impl TryFrom<MoveItemPayload> for MoveItemCommand {
    type Error = OrderingDomainError;

    fn try_from(payload: MoveItemPayload) -> Result<Self, Self::Error> {
        let item_id = payload.item_id.parse::<ItemId>()?;
        let target_container_id = payload
            .target_container_id
            .as_deref()
            .map(str::parse::<ContainerId>)
            .transpose()?;
        Ok(Self {
            item_id,
            target_container_id,
            target_rank: payload.target_rank,
        })
    }
}
