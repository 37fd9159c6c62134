//! Identifier types for boards, status lists and tasks.
//!
//! Each identifier maps onto the ordering identifiers of the level it lives
//! in. A status list maps onto both: it is an item of its board and the
//! container of its tasks.

use crate::ordering::domain::{ContainerId, ItemId};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BoardId(Uuid);

impl BoardId {
    /// Creates a new random board identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a board identifier from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the wrapped UUID.
    #[must_use]
    pub const fn into_inner(self) -> Uuid {
        self.0
    }

    /// Returns the board as the container of its status lists.
    #[must_use]
    pub const fn as_container(self) -> ContainerId {
        ContainerId::from_uuid(self.0)
    }
}

impl Default for BoardId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for BoardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a status list (a board column).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatusListId(Uuid);

impl StatusListId {
    /// Creates a status-list identifier from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the wrapped UUID.
    #[must_use]
    pub const fn into_inner(self) -> Uuid {
        self.0
    }

    /// Returns the status list as an item ranked in its board.
    #[must_use]
    pub const fn as_item(self) -> ItemId {
        ItemId::from_uuid(self.0)
    }

    /// Returns the status list as the container of its tasks.
    #[must_use]
    pub const fn as_container(self) -> ContainerId {
        ContainerId::from_uuid(self.0)
    }
}

impl From<ItemId> for StatusListId {
    fn from(item_id: ItemId) -> Self {
        Self(item_id.into_inner())
    }
}

impl fmt::Display for StatusListId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(Uuid);

impl TaskId {
    /// Creates a task identifier from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the wrapped UUID.
    #[must_use]
    pub const fn into_inner(self) -> Uuid {
        self.0
    }

    /// Returns the task as an item ranked in its status list.
    #[must_use]
    pub const fn as_item(self) -> ItemId {
        ItemId::from_uuid(self.0)
    }
}

impl From<ItemId> for TaskId {
    fn from(item_id: ItemId) -> Self {
        Self(item_id.into_inner())
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
