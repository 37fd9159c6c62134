//! Shared test helpers for `PostgreSQL` integration tests.

pub use super::cluster::{BoxError, CleanupGuard, PostgresCluster, postgres_cluster};
use async_trait::async_trait;
use corkboard::ordering::{
    adapters::postgres::{OrderedLevel, OrderingPgPool, PostgresOrderedRepository},
    domain::{ContainerId, ItemId, OrderedItem, Rank, RankUpdate},
    ports::{OrderedRepository, OrderedRepositoryResult},
    services::{PositionAllocator, ReorderEngine},
};
use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use mockable::DefaultClock;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::runtime::Runtime;

/// SQL creating the `boards`, `status_lists` and `tasks` tables.
pub const CREATE_ORDERED_TABLES_SQL: &str =
    include_str!("../../migrations/2026-10-01-000000_create_ordered_tables/up.sql");

/// Template database holding the migrated schema.
pub const TEMPLATE_DB: &str = "corkboard_test_template";

/// Builds the runtime tests drive repository futures on.
pub fn test_runtime() -> Result<Runtime, BoxError> {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .map_err(|err| Box::new(err) as BoxError)
}

/// Ensures the migrated template database exists.
pub fn ensure_template(cluster: PostgresCluster) -> Result<(), BoxError> {
    cluster.ensure_template_exists(TEMPLATE_DB, apply_migrations)
}

fn apply_migrations(url: &str) -> Result<(), BoxError> {
    let mut connection = PgConnection::establish(url).map_err(|err| Box::new(err) as BoxError)?;
    connection
        .batch_execute(CREATE_ORDERED_TABLES_SQL)
        .map_err(|err| Box::new(err) as BoxError)
}

/// Clones the template into `database` and opens a pool on it.
pub fn setup_pool(cluster: PostgresCluster, database: &str) -> Result<OrderingPgPool, BoxError> {
    cluster.create_database_from_template(database, TEMPLATE_DB)?;
    Pool::builder()
        .max_size(4)
        .build(ConnectionManager::<PgConnection>::new(
            cluster.database_url(database),
        ))
        .map_err(|err| Box::new(err) as BoxError)
}

/// One migrated database with an engine over a single ranked level.
///
/// Task containers need a parent status list, so a status-list repository
/// on the same pool is kept alongside.
pub struct OrderingContext {
    pub level: OrderedLevel,
    pub repository: Arc<PostgresOrderedRepository>,
    pub engine: ReorderEngine<PostgresOrderedRepository>,
    pub allocator: PositionAllocator<PostgresOrderedRepository>,
    pub rt: Runtime,
    status_lists: PostgresOrderedRepository,
    guard: CleanupGuard<'static>,
}

impl OrderingContext {
    /// Creates a fresh database from the template for `level`.
    pub fn new(cluster: PostgresCluster, level: OrderedLevel) -> Result<Self, BoxError> {
        ensure_template(cluster)?;
        let database = format!("test_ordering_{}", uuid::Uuid::new_v4());
        let guard = CleanupGuard::new(cluster, database.clone());
        let pool = setup_pool(cluster, &database)?;
        let repository = Arc::new(PostgresOrderedRepository::new(pool.clone(), level));
        Ok(Self {
            level,
            engine: ReorderEngine::new(Arc::clone(&repository)),
            allocator: PositionAllocator::new(Arc::clone(&repository)),
            repository,
            rt: test_runtime()?,
            status_lists: PostgresOrderedRepository::new(pool, OrderedLevel::StatusLists),
            guard,
        })
    }

    /// Drives a future to completion on the context runtime.
    pub fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.rt.block_on(future)
    }

    /// Opens an empty container at this level.
    ///
    /// A status-list container is a board row. A task container is a status
    /// list row inside a fresh board.
    pub fn open_container(&self) -> Result<ContainerId, BoxError> {
        let board = ContainerId::new();
        self.block_on(self.status_lists.open_container(board))?;
        if self.level == OrderedLevel::StatusLists {
            return Ok(board);
        }
        let status_list = OrderedItem::new(board, Rank::FIRST, "Backlog", &DefaultClock);
        self.block_on(self.status_lists.insert_item(&status_list))?;
        let container_id = ContainerId::from_uuid(status_list.id().into_inner());
        self.block_on(self.repository.open_container(container_id))?;
        Ok(container_id)
    }

    /// Opens a container and appends one item per label at the tail.
    pub fn container_with(
        &self,
        labels: &[&str],
    ) -> Result<(ContainerId, Vec<OrderedItem>), BoxError> {
        let container_id = self.open_container()?;
        let items = labels
            .iter()
            .map(|label| self.append(container_id, label))
            .collect::<Result<Vec<_>, _>>()?;
        Ok((container_id, items))
    }

    /// Creates an item at the next free rank of `container_id`.
    pub fn append(&self, container_id: ContainerId, label: &str) -> Result<OrderedItem, BoxError> {
        let rank = self.block_on(self.allocator.next_rank(container_id))?;
        let item = OrderedItem::new(container_id, rank, label, &DefaultClock);
        self.block_on(self.repository.insert_item(&item))?;
        Ok(item)
    }

    /// Returns stored labels in rank order.
    pub fn labels(&self, container_id: ContainerId) -> Result<Vec<String>, BoxError> {
        Ok(self
            .block_on(self.repository.list_ordered(container_id))?
            .iter()
            .map(|item| item.label().to_owned())
            .collect())
    }

    /// Returns stored ranks in rank order.
    pub fn ranks(&self, container_id: ContainerId) -> Result<Vec<u64>, BoxError> {
        Ok(self
            .block_on(self.repository.list_ordered(container_id))?
            .iter()
            .map(|item| item.rank().value())
            .collect())
    }

    /// Drops the repositories and then the database.
    pub fn cleanup(self) -> Result<(), BoxError> {
        let Self {
            repository,
            engine,
            allocator,
            rt,
            status_lists,
            guard,
            ..
        } = self;
        drop((engine, allocator, repository, status_lists, rt));
        guard.cleanup()
    }
}

/// Repository wrapper that counts rank-write batches reaching the database.
pub struct CountingRepository {
    inner: Arc<PostgresOrderedRepository>,
    batches: AtomicUsize,
}

impl CountingRepository {
    pub const fn new(inner: Arc<PostgresOrderedRepository>) -> Self {
        Self {
            inner,
            batches: AtomicUsize::new(0),
        }
    }

    pub fn batches(&self) -> usize {
        self.batches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl OrderedRepository for CountingRepository {
    async fn find_item(&self, id: ItemId) -> OrderedRepositoryResult<Option<OrderedItem>> {
        self.inner.find_item(id).await
    }

    async fn list_ordered(
        &self,
        container_id: ContainerId,
    ) -> OrderedRepositoryResult<Vec<OrderedItem>> {
        self.inner.list_ordered(container_id).await
    }

    async fn max_rank(&self, container_id: ContainerId) -> OrderedRepositoryResult<Option<Rank>> {
        self.inner.max_rank(container_id).await
    }

    async fn container_exists(&self, container_id: ContainerId) -> OrderedRepositoryResult<bool> {
        self.inner.container_exists(container_id).await
    }

    async fn open_container(&self, container_id: ContainerId) -> OrderedRepositoryResult<()> {
        self.inner.open_container(container_id).await
    }

    async fn close_container(&self, container_id: ContainerId) -> OrderedRepositoryResult<()> {
        self.inner.close_container(container_id).await
    }

    async fn insert_item(&self, item: &OrderedItem) -> OrderedRepositoryResult<()> {
        self.inner.insert_item(item).await
    }

    async fn batch_update_ranks(&self, updates: &[RankUpdate]) -> OrderedRepositoryResult<()> {
        self.batches.fetch_add(1, Ordering::SeqCst);
        self.inner.batch_update_ranks(updates).await
    }

    async fn delete_item(&self, id: ItemId) -> OrderedRepositoryResult<()> {
        self.inner.delete_item(id).await
    }
}
