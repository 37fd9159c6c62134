//! The reorder engine.
//!
//! [`ReorderEngine`] is stateless between calls: every operation reads the
//! current ordering through the repository, computes a [`ReorderPlan`] and
//! writes the resulting ranks back. No lock or transaction spans the read and
//! the write. Concurrent moves in the same container can therefore lose one
//! caller's intent and leave a transient gap; the next write to that
//! container re-walks `1..=N` from a fresh read.

use crate::ordering::{
    domain::{
        ContainerId, ContainerView, ItemId, MoveItemCommand, OrderedItem, OrderedView,
        ReorderPlan,
    },
    ports::{OrderedRepository, OrderedRepositoryError},
};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

use super::ReorderConfig;

/// Errors returned by reorder operations.
#[derive(Debug, Error)]
pub enum ReorderError {
    /// The item does not exist.
    #[error("item not found: {0}")]
    ItemNotFound(ItemId),

    /// The container does not exist.
    #[error("container not found: {0}")]
    ContainerNotFound(ContainerId),

    /// The repository failed. Writes issued before the failure stay
    /// committed.
    #[error(transparent)]
    Repository(#[from] OrderedRepositoryError),
}

/// Result type for reorder operations.
pub type ReorderResult<T> = Result<T, ReorderError>;

/// Keeps item ranks dense across moves and removals.
#[derive(Clone)]
pub struct ReorderEngine<R>
where
    R: OrderedRepository,
{
    repository: Arc<R>,
    config: ReorderConfig,
}

impl<R> ReorderEngine<R>
where
    R: OrderedRepository,
{
    /// Creates an engine with the default configuration.
    #[must_use]
    pub fn new(repository: Arc<R>) -> Self {
        Self::with_config(repository, ReorderConfig::default())
    }

    /// Creates an engine with an explicit configuration.
    #[must_use]
    pub const fn with_config(repository: Arc<R>, config: ReorderConfig) -> Self {
        Self { repository, config }
    }

    /// Returns the active configuration.
    #[must_use]
    pub const fn config(&self) -> ReorderConfig {
        self.config
    }

    /// Moves an item to a rank, optionally in another container.
    ///
    /// The target rank is clamped into `1..=N` of the destination after the
    /// move. Moving an item onto its own rank in its own container writes
    /// nothing.
    ///
    /// For a transfer the returned view lists the source container first and
    /// the destination second.
    ///
    /// # Errors
    ///
    /// Returns [`ReorderError::ItemNotFound`] for an unknown item,
    /// [`ReorderError::ContainerNotFound`] for an unknown destination, or
    /// [`ReorderError::Repository`] when storage fails. A transfer whose
    /// destination write fails keeps the already-written source compaction.
    pub async fn move_item(&self, command: MoveItemCommand) -> ReorderResult<OrderedView> {
        let item = self.find_item_or_error(command.item_id()).await?;
        let source = item.container_id();
        let destination = command.target_container_id().unwrap_or(source);

        if destination == source {
            self.reorder_within(item, command.target_rank()).await
        } else {
            self.transfer(item, destination, command.target_rank()).await
        }
    }

    /// Deletes an item and closes the gap it leaves behind.
    ///
    /// # Errors
    ///
    /// Returns [`ReorderError::ItemNotFound`] for an unknown item or
    /// [`ReorderError::Repository`] when storage fails.
    pub async fn remove_item(&self, item_id: ItemId) -> ReorderResult<OrderedView> {
        let item = self.find_item_or_error(item_id).await?;
        let container_id = item.container_id();

        let current = self.repository.list_ordered(container_id).await?;
        let plan = ReorderPlan::compact(container_id, current, Some(item_id));
        self.write(&plan).await?;
        self.repository.delete_item(item_id).await?;

        info!(
            item_id = %item_id,
            container_id = %container_id,
            remaining = plan.len(),
            "removed item and compacted container"
        );
        Ok(OrderedView::single(plan.view()))
    }

    /// Re-walks a container and reassigns ranks `1..=N`.
    ///
    /// Repairs gaps and duplicate ranks left by concurrent writers. Relative
    /// order is kept as reported by the repository.
    ///
    /// # Errors
    ///
    /// Returns [`ReorderError::ContainerNotFound`] for an unknown container
    /// or [`ReorderError::Repository`] when storage fails.
    pub async fn compact(&self, container_id: ContainerId) -> ReorderResult<OrderedView> {
        self.ensure_container(container_id).await?;
        let current = self.repository.list_ordered(container_id).await?;
        let plan = ReorderPlan::compact(container_id, current, None);
        self.write(&plan).await?;
        Ok(OrderedView::single(plan.view()))
    }

    /// Returns the current ordering of a container.
    ///
    /// # Errors
    ///
    /// Returns [`ReorderError::ContainerNotFound`] for an unknown container
    /// or [`ReorderError::Repository`] when storage fails.
    pub async fn view(&self, container_id: ContainerId) -> ReorderResult<ContainerView> {
        self.ensure_container(container_id).await?;
        let current = self.repository.list_ordered(container_id).await?;
        Ok(ContainerView::from_items(container_id, &current))
    }

    async fn reorder_within(
        &self,
        item: OrderedItem,
        target_rank: i64,
    ) -> ReorderResult<OrderedView> {
        let container_id = item.container_id();
        let item_id = item.id();
        let current = self.repository.list_ordered(container_id).await?;

        if is_current_rank(&item, target_rank) {
            debug!(item_id = %item_id, target_rank, "move targets current rank; nothing to write");
            return Ok(OrderedView::single(ContainerView::from_items(
                container_id,
                &current,
            )));
        }

        let plan = ReorderPlan::insert(container_id, current, item, target_rank);
        if plan.is_unchanged() {
            debug!(item_id = %item_id, target_rank, "clamped move leaves ordering unchanged");
            return Ok(OrderedView::single(plan.view()));
        }
        self.write(&plan).await?;

        info!(
            item_id = %item_id,
            container_id = %container_id,
            target_rank,
            "reordered item within container"
        );
        Ok(OrderedView::single(plan.view()))
    }

    async fn transfer(
        &self,
        item: OrderedItem,
        destination: ContainerId,
        target_rank: i64,
    ) -> ReorderResult<OrderedView> {
        self.ensure_container(destination).await?;
        let source = item.container_id();
        let item_id = item.id();

        let source_items = self.repository.list_ordered(source).await?;
        let source_plan = ReorderPlan::compact(source, source_items, Some(item_id));
        self.write(&source_plan).await?;

        let destination_items = self.repository.list_ordered(destination).await?;
        let destination_plan =
            ReorderPlan::insert(destination, destination_items, item, target_rank);
        self.write(&destination_plan).await?;

        info!(
            item_id = %item_id,
            source = %source,
            destination = %destination,
            target_rank,
            "transferred item between containers"
        );
        Ok(OrderedView {
            containers: vec![source_plan.view(), destination_plan.view()],
        })
    }

    async fn write(&self, plan: &ReorderPlan) -> ReorderResult<()> {
        let updates = plan.updates(self.config.write_policy);
        if updates.is_empty() {
            return Ok(());
        }
        debug!(
            container_id = %plan.container_id(),
            writes = updates.len(),
            "persisting rank updates"
        );
        self.repository.batch_update_ranks(&updates).await?;
        Ok(())
    }

    async fn find_item_or_error(&self, item_id: ItemId) -> ReorderResult<OrderedItem> {
        self.repository
            .find_item(item_id)
            .await?
            .ok_or(ReorderError::ItemNotFound(item_id))
    }

    async fn ensure_container(&self, container_id: ContainerId) -> ReorderResult<()> {
        if self.repository.container_exists(container_id).await? {
            Ok(())
        } else {
            Err(ReorderError::ContainerNotFound(container_id))
        }
    }
}

fn is_current_rank(item: &OrderedItem, target_rank: i64) -> bool {
    i64::try_from(item.rank().value()).is_ok_and(|rank| rank == target_rank)
}
