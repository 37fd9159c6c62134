//! Repository port for ranked item storage.

use crate::ordering::domain::{ContainerId, ItemId, OrderedItem, Rank, RankUpdate};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for ordered repository operations.
pub type OrderedRepositoryResult<T> = Result<T, OrderedRepositoryError>;

/// Ranked item persistence contract.
///
/// Implementations must be safe to call concurrently. No method is required
/// to be atomic with respect to any other; the engine tolerates interleaved
/// read-then-write sequences and re-derives density on the next write.
#[async_trait]
pub trait OrderedRepository: Send + Sync {
    /// Finds an item by identifier.
    ///
    /// Returns `None` when the item does not exist.
    async fn find_item(&self, id: ItemId) -> OrderedRepositoryResult<Option<OrderedItem>>;

    /// Returns every item of a container in ascending rank order.
    ///
    /// Items sharing a rank are ordered by creation time, then identifier.
    /// An unknown container yields an empty list.
    async fn list_ordered(
        &self,
        container_id: ContainerId,
    ) -> OrderedRepositoryResult<Vec<OrderedItem>>;

    /// Returns the highest rank in use within a container.
    ///
    /// Returns `None` for an empty or unknown container.
    async fn max_rank(&self, container_id: ContainerId) -> OrderedRepositoryResult<Option<Rank>>;

    /// Reports whether a container is known to the store.
    async fn container_exists(&self, container_id: ContainerId) -> OrderedRepositoryResult<bool>;

    /// Registers an empty container. Re-opening an existing container is a
    /// no-op.
    ///
    /// # Errors
    ///
    /// Returns [`OrderedRepositoryError::ContainerNotFound`] when the store
    /// derives containers from parent records and the parent is missing.
    async fn open_container(&self, container_id: ContainerId) -> OrderedRepositoryResult<()>;

    /// Removes a container together with every item ranked inside it.
    ///
    /// Closing an unknown container is a no-op.
    async fn close_container(&self, container_id: ContainerId) -> OrderedRepositoryResult<()>;

    /// Stores a new item.
    ///
    /// # Errors
    ///
    /// Returns [`OrderedRepositoryError::DuplicateItem`] when the identifier
    /// already exists or [`OrderedRepositoryError::ContainerNotFound`] when
    /// the owning container is unknown.
    async fn insert_item(&self, item: &OrderedItem) -> OrderedRepositoryResult<()>;

    /// Applies a batch of rank writes.
    ///
    /// The batch is best-effort: implementations may apply it atomically but
    /// callers must not rely on it.
    ///
    /// # Errors
    ///
    /// Returns [`OrderedRepositoryError::ItemNotFound`] when an update names
    /// an item that no longer exists.
    async fn batch_update_ranks(&self, updates: &[RankUpdate]) -> OrderedRepositoryResult<()>;

    /// Deletes an item record without touching its siblings.
    ///
    /// # Errors
    ///
    /// Returns [`OrderedRepositoryError::ItemNotFound`] when the item does
    /// not exist.
    async fn delete_item(&self, id: ItemId) -> OrderedRepositoryResult<()>;
}

/// Errors returned by ordered repository implementations.
#[derive(Debug, Clone, Error)]
pub enum OrderedRepositoryError {
    /// An item with the same identifier already exists.
    #[error("duplicate item identifier: {0}")]
    DuplicateItem(ItemId),

    /// The item was not found.
    #[error("item not found: {0}")]
    ItemNotFound(ItemId),

    /// The container was not found.
    #[error("container not found: {0}")]
    ContainerNotFound(ContainerId),

    /// Persisted data could not be reconstructed into domain types.
    #[error("invalid persisted data: {0}")]
    InvalidPersistedData(Arc<dyn std::error::Error + Send + Sync>),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl OrderedRepositoryError {
    /// Wraps a data-quality or deserialization error from persisted rows.
    pub fn invalid_persisted_data(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::InvalidPersistedData(Arc::new(err))
    }

    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}

impl From<diesel::result::Error> for OrderedRepositoryError {
    fn from(err: diesel::result::Error) -> Self {
        Self::persistence(err)
    }
}
