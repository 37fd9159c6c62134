//! Tail-rank allocation for newly created items.

use crate::ordering::{
    domain::{ContainerId, Rank},
    ports::{OrderedRepository, OrderedRepositoryResult},
};
use std::sync::Arc;

/// Computes the rank a new item takes when appended to a container.
///
/// The rank is free at the time of the read only. Two concurrent creates in
/// the same container can receive the same rank; a later move or
/// [`super::ReorderEngine::compact`] restores density.
#[derive(Clone)]
pub struct PositionAllocator<R>
where
    R: OrderedRepository,
{
    repository: Arc<R>,
}

impl<R> PositionAllocator<R>
where
    R: OrderedRepository,
{
    /// Creates an allocator over `repository`.
    #[must_use]
    pub const fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Returns `1` for an empty or unknown container, otherwise the highest
    /// rank in use plus one.
    ///
    /// # Errors
    ///
    /// Returns the repository error when the lookup fails.
    pub async fn next_rank(&self, container_id: ContainerId) -> OrderedRepositoryResult<Rank> {
        let max_rank = self.repository.max_rank(container_id).await?;
        Ok(max_rank.map_or(Rank::FIRST, Rank::next))
    }
}
