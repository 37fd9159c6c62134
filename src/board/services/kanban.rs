//! Service layer for board, status-list and task ordering.
//!
//! Provides [`KanbanService`], the two call sites of the reorder engine:
//! status lists reordered inside their board and tasks reordered inside or
//! across status lists. Every mutation publishes the resulting ordering.

use crate::board::domain::{BoardDomainError, BoardId, StatusListId, TaskId, Title};
use crate::ordering::{
    domain::{
        ContainerId, ContainerView, ItemId, ItemSummary, MoveItemCommand, OrderedItem,
        OrderedView,
    },
    ports::{ChangeNotifier, OrderedRepository, OrderedRepositoryError},
    services::{PositionAllocator, ReorderConfig, ReorderEngine, ReorderError},
};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

/// Request payload for appending a status list to a board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateStatusListRequest {
    board_id: BoardId,
    title: String,
}

impl CreateStatusListRequest {
    /// Creates a request for a status list titled `title`.
    #[must_use]
    pub fn new(board_id: BoardId, title: impl Into<String>) -> Self {
        Self {
            board_id,
            title: title.into(),
        }
    }
}

/// Request payload for appending a task to a status list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTaskRequest {
    status_list_id: StatusListId,
    title: String,
}

impl CreateTaskRequest {
    /// Creates a request for a task titled `title`.
    #[must_use]
    pub fn new(status_list_id: StatusListId, title: impl Into<String>) -> Self {
        Self {
            status_list_id,
            title: title.into(),
        }
    }
}

/// Request payload for moving a status list within its board.
///
/// Status lists never change board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReorderStatusListRequest {
    status_list_id: StatusListId,
    position: i64,
}

impl ReorderStatusListRequest {
    /// Creates a request to move a status list to `position`.
    #[must_use]
    pub const fn new(status_list_id: StatusListId, position: i64) -> Self {
        Self {
            status_list_id,
            position,
        }
    }
}

/// Request payload for moving a task, optionally into another status list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReorderTaskRequest {
    task_id: TaskId,
    target_status_list: Option<StatusListId>,
    position: i64,
}

impl ReorderTaskRequest {
    /// Creates a request to move a task to `position` in its current list.
    #[must_use]
    pub const fn new(task_id: TaskId, position: i64) -> Self {
        Self {
            task_id,
            target_status_list: None,
            position,
        }
    }

    /// Sets the destination status list.
    #[must_use]
    pub const fn to_status_list(mut self, status_list_id: StatusListId) -> Self {
        self.target_status_list = Some(status_list_id);
        self
    }
}

/// Response for a reorder: the moved item's final state plus the full
/// ordering of every touched container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveOutcome {
    /// Human-readable summary.
    pub message: String,
    /// Container the item ended up in.
    pub container_id: ContainerId,
    /// The moved item after the move.
    pub item: ItemSummary,
    /// Final ordering of every touched container.
    pub view: OrderedView,
}

impl MoveOutcome {
    fn new(item_id: ItemId, view: OrderedView, message: &str) -> KanbanServiceResult<Self> {
        let (container_id, item) = view
            .find_item(item_id)
            .map(|(container_id, item)| (container_id, item.clone()))
            .ok_or(ReorderError::ItemNotFound(item_id))?;
        Ok(Self {
            message: message.to_owned(),
            container_id,
            item,
            view,
        })
    }
}

/// Service-level errors for board operations.
#[derive(Debug, Error)]
pub enum KanbanServiceError {
    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] BoardDomainError),
    /// The board is not registered.
    #[error("board not found: {0}")]
    BoardNotFound(BoardId),
    /// The status list does not exist.
    #[error("status list not found: {0}")]
    StatusListNotFound(StatusListId),
    /// A reorder failed.
    #[error(transparent)]
    Reorder(#[from] ReorderError),
    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] OrderedRepositoryError),
}

/// Result type for board service operations.
pub type KanbanServiceResult<T> = Result<T, KanbanServiceError>;

/// Board orchestration service.
///
/// `S` stores status lists ranked in boards and `T` stores tasks ranked in
/// status lists.
#[derive(Clone)]
pub struct KanbanService<S, T, N, C>
where
    S: OrderedRepository,
    T: OrderedRepository,
    N: ChangeNotifier,
    C: Clock + Send + Sync,
{
    status_repository: Arc<S>,
    status_positions: PositionAllocator<S>,
    status_lists: ReorderEngine<S>,
    task_repository: Arc<T>,
    task_positions: PositionAllocator<T>,
    tasks: ReorderEngine<T>,
    notifier: Arc<N>,
    clock: Arc<C>,
}

impl<S, T, N, C> KanbanService<S, T, N, C>
where
    S: OrderedRepository,
    T: OrderedRepository,
    N: ChangeNotifier,
    C: Clock + Send + Sync,
{
    /// Creates a board service with the default reorder configuration.
    #[must_use]
    pub fn new(
        status_repository: Arc<S>,
        task_repository: Arc<T>,
        notifier: Arc<N>,
        clock: Arc<C>,
    ) -> Self {
        Self::with_config(
            status_repository,
            task_repository,
            notifier,
            clock,
            ReorderConfig::default(),
        )
    }

    /// Creates a board service sharing `config` across both levels.
    #[must_use]
    pub fn with_config(
        status_repository: Arc<S>,
        task_repository: Arc<T>,
        notifier: Arc<N>,
        clock: Arc<C>,
        config: ReorderConfig,
    ) -> Self {
        Self {
            status_positions: PositionAllocator::new(Arc::clone(&status_repository)),
            status_lists: ReorderEngine::with_config(Arc::clone(&status_repository), config),
            status_repository,
            task_positions: PositionAllocator::new(Arc::clone(&task_repository)),
            tasks: ReorderEngine::with_config(Arc::clone(&task_repository), config),
            task_repository,
            notifier,
            clock,
        }
    }

    /// Registers a board so status lists can be created in it.
    ///
    /// # Errors
    ///
    /// Returns [`KanbanServiceError::Repository`] when persistence fails.
    pub async fn open_board(&self, board_id: BoardId) -> KanbanServiceResult<()> {
        self.status_repository
            .open_container(board_id.as_container())
            .await?;
        Ok(())
    }

    /// Appends a status list to the end of a board.
    ///
    /// # Errors
    ///
    /// Returns [`KanbanServiceError::Domain`] for an invalid title,
    /// [`KanbanServiceError::BoardNotFound`] for an unregistered board, or
    /// [`KanbanServiceError::Repository`] when persistence fails.
    pub async fn create_status_list(
        &self,
        request: CreateStatusListRequest,
    ) -> KanbanServiceResult<OrderedItem> {
        let CreateStatusListRequest { board_id, title } = request;
        let validated = Title::new(title)?;
        let board = board_id.as_container();
        if !self.status_repository.container_exists(board).await? {
            return Err(KanbanServiceError::BoardNotFound(board_id));
        }

        let rank = self.status_positions.next_rank(board).await?;
        let status_list = OrderedItem::new(board, rank, validated, &*self.clock);
        self.status_repository.insert_item(&status_list).await?;
        let status_list_id = StatusListId::from(status_list.id());
        self.task_repository
            .open_container(status_list_id.as_container())
            .await?;

        info!(board_id = %board_id, status_list_id = %status_list_id, rank = %rank, "created status list");
        let view = self.status_lists.view(board).await?;
        self.publish(&OrderedView::single(view)).await;
        Ok(status_list)
    }

    /// Appends a task to the end of a status list.
    ///
    /// # Errors
    ///
    /// Returns [`KanbanServiceError::Domain`] for an invalid title,
    /// [`KanbanServiceError::StatusListNotFound`] for an unknown status list,
    /// or [`KanbanServiceError::Repository`] when persistence fails.
    pub async fn create_task(&self, request: CreateTaskRequest) -> KanbanServiceResult<OrderedItem> {
        let CreateTaskRequest {
            status_list_id,
            title,
        } = request;
        let validated = Title::new(title)?;
        let status_list = status_list_id.as_container();
        if !self.task_repository.container_exists(status_list).await? {
            return Err(KanbanServiceError::StatusListNotFound(status_list_id));
        }

        let rank = self.task_positions.next_rank(status_list).await?;
        let task = OrderedItem::new(status_list, rank, validated, &*self.clock);
        self.task_repository.insert_item(&task).await?;

        info!(status_list_id = %status_list_id, task_id = %task.id(), rank = %rank, "created task");
        let view = self.tasks.view(status_list).await?;
        self.publish(&OrderedView::single(view)).await;
        Ok(task)
    }

    /// Moves a status list to a new position within its board.
    ///
    /// Out-of-range positions are clamped to the head or tail.
    ///
    /// # Errors
    ///
    /// Returns [`KanbanServiceError::Reorder`] when the status list does not
    /// exist or persistence fails.
    pub async fn reorder_status_list(
        &self,
        request: ReorderStatusListRequest,
    ) -> KanbanServiceResult<MoveOutcome> {
        let item_id = request.status_list_id.as_item();
        let view = self
            .status_lists
            .move_item(MoveItemCommand::within(item_id, request.position))
            .await?;
        let outcome = MoveOutcome::new(item_id, view, "Status list reordered")?;
        self.publish(&outcome.view).await;
        Ok(outcome)
    }

    /// Moves a task within its status list or into another one.
    ///
    /// Out-of-range positions are clamped to the head or tail of the
    /// destination.
    ///
    /// # Errors
    ///
    /// Returns [`KanbanServiceError::StatusListNotFound`] when the target is
    /// not a status list, or [`KanbanServiceError::Reorder`] when the task
    /// does not exist or persistence fails.
    pub async fn reorder_task(
        &self,
        request: ReorderTaskRequest,
    ) -> KanbanServiceResult<MoveOutcome> {
        let item_id = request.task_id.as_item();
        let command = match request.target_status_list {
            Some(target) => {
                self.ensure_status_list(target).await?;
                MoveItemCommand::into_container(item_id, target.as_container(), request.position)
            }
            None => MoveItemCommand::within(item_id, request.position),
        };

        let view = self.tasks.move_item(command).await?;
        let message = if view.containers.len() > 1 {
            "Task moved to another status list"
        } else {
            "Task reordered"
        };
        let outcome = MoveOutcome::new(item_id, view, message)?;
        self.publish(&outcome.view).await;
        Ok(outcome)
    }

    /// Deletes a task and closes the gap in its status list.
    ///
    /// # Errors
    ///
    /// Returns [`KanbanServiceError::Reorder`] when the task does not exist
    /// or persistence fails.
    pub async fn delete_task(&self, task_id: TaskId) -> KanbanServiceResult<OrderedView> {
        let view = self.tasks.remove_item(task_id.as_item()).await?;
        self.publish(&view).await;
        Ok(view)
    }

    /// Deletes a status list with all of its tasks and closes the gap in its
    /// board.
    ///
    /// The status list is removed before its tasks, so a failed board
    /// compaction leaves the list and its tasks untouched.
    ///
    /// # Errors
    ///
    /// Returns [`KanbanServiceError::StatusListNotFound`] for an unknown
    /// status list, or [`KanbanServiceError::Repository`] /
    /// [`KanbanServiceError::Reorder`] when persistence fails.
    pub async fn delete_status_list(
        &self,
        status_list_id: StatusListId,
    ) -> KanbanServiceResult<OrderedView> {
        self.ensure_status_list(status_list_id).await?;
        let view = self.status_lists.remove_item(status_list_id.as_item()).await?;
        self.task_repository
            .close_container(status_list_id.as_container())
            .await?;
        self.publish(&view).await;
        Ok(view)
    }

    /// Returns the ordered status lists of a board.
    ///
    /// # Errors
    ///
    /// Returns [`KanbanServiceError::BoardNotFound`] for an unregistered
    /// board or [`KanbanServiceError::Reorder`] when persistence fails.
    pub async fn board_view(&self, board_id: BoardId) -> KanbanServiceResult<ContainerView> {
        self.status_lists
            .view(board_id.as_container())
            .await
            .map_err(|err| match err {
                ReorderError::ContainerNotFound(_) => KanbanServiceError::BoardNotFound(board_id),
                other => other.into(),
            })
    }

    /// Returns the ordered tasks of a status list.
    ///
    /// # Errors
    ///
    /// Returns [`KanbanServiceError::StatusListNotFound`] for an unknown
    /// status list or [`KanbanServiceError::Reorder`] when persistence fails.
    pub async fn status_list_view(
        &self,
        status_list_id: StatusListId,
    ) -> KanbanServiceResult<ContainerView> {
        self.tasks
            .view(status_list_id.as_container())
            .await
            .map_err(|err| match err {
                ReorderError::ContainerNotFound(_) => {
                    KanbanServiceError::StatusListNotFound(status_list_id)
                }
                other => other.into(),
            })
    }

    /// Re-walks the tasks of a status list, repairing gaps left by
    /// concurrent writers.
    ///
    /// # Errors
    ///
    /// Returns [`KanbanServiceError::Reorder`] when the status list is
    /// unknown or persistence fails.
    pub async fn compact_status_list(
        &self,
        status_list_id: StatusListId,
    ) -> KanbanServiceResult<OrderedView> {
        let view = self.tasks.compact(status_list_id.as_container()).await?;
        self.publish(&view).await;
        Ok(view)
    }

    async fn ensure_status_list(&self, status_list_id: StatusListId) -> KanbanServiceResult<()> {
        self.status_repository
            .find_item(status_list_id.as_item())
            .await?
            .map(|_| ())
            .ok_or(KanbanServiceError::StatusListNotFound(status_list_id))
    }

    async fn publish(&self, view: &OrderedView) {
        if let Err(err) = self.notifier.publish(view).await {
            warn!(error = %err, containers = view.containers.len(), "failed to publish ordering change");
        }
    }
}
