//! `PostgreSQL` repository implementation for ranked items.

use super::{
    OrderedLevel,
    models::{OrderedItemRow, position_to_rank, rank_to_position},
    queries,
};
use crate::ordering::{
    domain::{ContainerId, ItemId, OrderedItem, Rank, RankUpdate},
    ports::{OrderedRepository, OrderedRepositoryError, OrderedRepositoryResult},
};
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::{DatabaseErrorKind, Error as DieselError};

/// `PostgreSQL` connection pool type used by ordering adapters.
pub type OrderingPgPool = Pool<ConnectionManager<PgConnection>>;

/// `PostgreSQL`-backed ordered repository for one ranked level.
///
/// `batch_update_ranks` applies each batch inside a single transaction,
/// which is stronger than the port requires. Separate batches (for example
/// the two halves of a transfer) are still independent.
#[derive(Debug, Clone)]
pub struct PostgresOrderedRepository {
    pool: OrderingPgPool,
    level: OrderedLevel,
}

impl PostgresOrderedRepository {
    /// Creates a repository for `level` from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: OrderingPgPool, level: OrderedLevel) -> Self {
        Self { pool, level }
    }

    /// Returns the level this repository addresses.
    #[must_use]
    pub const fn level(&self) -> OrderedLevel {
        self.level
    }

    async fn run_blocking<F, T>(&self, f: F) -> OrderedRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection, OrderedLevel) -> OrderedRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        let level = self.level;
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(OrderedRepositoryError::persistence)?;
            f(&mut connection, level)
        })
        .await
        .map_err(OrderedRepositoryError::persistence)?
    }
}

#[async_trait]
impl OrderedRepository for PostgresOrderedRepository {
    async fn find_item(&self, id: ItemId) -> OrderedRepositoryResult<Option<OrderedItem>> {
        self.run_blocking(move |connection, level| {
            let row = queries::find_item(connection, level, id.into_inner())?;
            row.map(OrderedItem::try_from).transpose()
        })
        .await
    }

    async fn list_ordered(
        &self,
        container_id: ContainerId,
    ) -> OrderedRepositoryResult<Vec<OrderedItem>> {
        self.run_blocking(move |connection, level| {
            let rows = queries::list_items(connection, level, container_id.into_inner())?;
            rows.into_iter().map(OrderedItem::try_from).collect()
        })
        .await
    }

    async fn max_rank(&self, container_id: ContainerId) -> OrderedRepositoryResult<Option<Rank>> {
        self.run_blocking(move |connection, level| {
            queries::max_position(connection, level, container_id.into_inner())?
                .map(position_to_rank)
                .transpose()
        })
        .await
    }

    async fn container_exists(&self, container_id: ContainerId) -> OrderedRepositoryResult<bool> {
        self.run_blocking(move |connection, level| {
            Ok(queries::container_exists(
                connection,
                level,
                container_id.into_inner(),
            )?)
        })
        .await
    }

    async fn open_container(&self, container_id: ContainerId) -> OrderedRepositoryResult<()> {
        self.run_blocking(move |connection, level| {
            if level.owns_containers() {
                queries::insert_board(connection, container_id.into_inner())?;
                return Ok(());
            }
            // Status lists are created through the level above; opening only
            // confirms the row is there.
            if queries::container_exists(connection, level, container_id.into_inner())? {
                Ok(())
            } else {
                Err(OrderedRepositoryError::ContainerNotFound(container_id))
            }
        })
        .await
    }

    async fn close_container(&self, container_id: ContainerId) -> OrderedRepositoryResult<()> {
        self.run_blocking(move |connection, level| {
            connection.transaction::<_, OrderedRepositoryError, _>(|tx| {
                queries::delete_items_in(tx, level, container_id.into_inner())?;
                if level.owns_containers() {
                    queries::delete_board(tx, container_id.into_inner())?;
                }
                Ok(())
            })
        })
        .await
    }

    async fn insert_item(&self, item: &OrderedItem) -> OrderedRepositoryResult<()> {
        let row = OrderedItemRow::try_from(item)?;
        let item_id = item.id();
        let container_id = item.container_id();

        self.run_blocking(move |connection, level| {
            queries::insert_item(connection, level, &row).map_err(|err| match err {
                DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                    OrderedRepositoryError::DuplicateItem(item_id)
                }
                DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _) => {
                    OrderedRepositoryError::ContainerNotFound(container_id)
                }
                _ => OrderedRepositoryError::persistence(err),
            })?;
            Ok(())
        })
        .await
    }

    async fn batch_update_ranks(&self, updates: &[RankUpdate]) -> OrderedRepositoryResult<()> {
        let batch = updates
            .iter()
            .map(|update| Ok((*update, rank_to_position(update.rank)?)))
            .collect::<OrderedRepositoryResult<Vec<_>>>()?;

        self.run_blocking(move |connection, level| {
            connection.transaction::<_, OrderedRepositoryError, _>(|tx| {
                for (update, position) in &batch {
                    apply_update(tx, level, update, *position)?;
                }
                Ok(())
            })
        })
        .await
    }

    async fn delete_item(&self, id: ItemId) -> OrderedRepositoryResult<()> {
        self.run_blocking(move |connection, level| {
            let deleted = queries::delete_item(connection, level, id.into_inner())?;
            if deleted == 0 {
                return Err(OrderedRepositoryError::ItemNotFound(id));
            }
            Ok(())
        })
        .await
    }
}

fn apply_update(
    connection: &mut PgConnection,
    level: OrderedLevel,
    update: &RankUpdate,
    position: i64,
) -> OrderedRepositoryResult<()> {
    let item_id = update.item_id.into_inner();
    let affected = match update.container_id {
        Some(container_id) => queries::relocate_item(
            connection,
            level,
            item_id,
            container_id.into_inner(),
            position,
        )
        .map_err(|err| match err {
            DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _) => {
                OrderedRepositoryError::ContainerNotFound(container_id)
            }
            _ => OrderedRepositoryError::persistence(err),
        })?,
        None => queries::set_position(connection, level, item_id, position)?,
    };
    if affected == 0 {
        return Err(OrderedRepositoryError::ItemNotFound(update.item_id));
    }
    Ok(())
}
