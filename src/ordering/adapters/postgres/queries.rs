//! Typed Diesel queries for each ranked level.
//!
//! `status_lists` and `tasks` share a shape but are distinct Diesel tables,
//! so the query set is expanded once per table and dispatched on
//! [`OrderedLevel`].

use diesel::pg::PgConnection;
use diesel::prelude::*;
use uuid::Uuid;

use super::{
    OrderedLevel,
    models::OrderedItemRow,
    schema::{boards, status_lists},
};

macro_rules! ranked_table_queries {
    ($module:ident, $table:ident, $container:ident) => {
        mod $module {
            use super::super::{models::OrderedItemRow, schema::$table};
            use diesel::pg::PgConnection;
            use diesel::prelude::*;
            use uuid::Uuid;

            type Columns = (
                $table::id,
                $table::$container,
                $table::position,
                $table::title,
                $table::created_at,
            );

            const COLUMNS: Columns = (
                $table::id,
                $table::$container,
                $table::position,
                $table::title,
                $table::created_at,
            );

            pub fn find(
                connection: &mut PgConnection,
                id: Uuid,
            ) -> QueryResult<Option<OrderedItemRow>> {
                $table::table
                    .filter($table::id.eq(id))
                    .select(COLUMNS)
                    .first::<OrderedItemRow>(connection)
                    .optional()
            }

            pub fn list(
                connection: &mut PgConnection,
                container_id: Uuid,
            ) -> QueryResult<Vec<OrderedItemRow>> {
                $table::table
                    .filter($table::$container.eq(container_id))
                    .order((
                        $table::position.asc(),
                        $table::created_at.asc(),
                        $table::id.asc(),
                    ))
                    .select(COLUMNS)
                    .load::<OrderedItemRow>(connection)
            }

            pub fn max_position(
                connection: &mut PgConnection,
                container_id: Uuid,
            ) -> QueryResult<Option<i64>> {
                $table::table
                    .filter($table::$container.eq(container_id))
                    .select(diesel::dsl::max($table::position))
                    .get_result::<Option<i64>>(connection)
            }

            pub fn insert(connection: &mut PgConnection, row: &OrderedItemRow) -> QueryResult<usize> {
                diesel::insert_into($table::table)
                    .values((
                        $table::id.eq(row.id),
                        $table::$container.eq(row.container_id),
                        $table::position.eq(row.position),
                        $table::title.eq(&row.title),
                        $table::created_at.eq(row.created_at),
                    ))
                    .execute(connection)
            }

            pub fn set_position(
                connection: &mut PgConnection,
                id: Uuid,
                position: i64,
            ) -> QueryResult<usize> {
                diesel::update($table::table.filter($table::id.eq(id)))
                    .set($table::position.eq(position))
                    .execute(connection)
            }

            pub fn relocate(
                connection: &mut PgConnection,
                id: Uuid,
                container_id: Uuid,
                position: i64,
            ) -> QueryResult<usize> {
                diesel::update($table::table.filter($table::id.eq(id)))
                    .set((
                        $table::position.eq(position),
                        $table::$container.eq(container_id),
                    ))
                    .execute(connection)
            }

            pub fn delete(connection: &mut PgConnection, id: Uuid) -> QueryResult<usize> {
                diesel::delete($table::table.filter($table::id.eq(id))).execute(connection)
            }

            pub fn delete_in(connection: &mut PgConnection, container_id: Uuid) -> QueryResult<usize> {
                diesel::delete($table::table.filter($table::$container.eq(container_id)))
                    .execute(connection)
            }
        }
    };
}

ranked_table_queries!(status_list_rows, status_lists, board_id);
ranked_table_queries!(task_rows, tasks, status_list_id);

pub fn find_item(
    connection: &mut PgConnection,
    level: OrderedLevel,
    id: Uuid,
) -> QueryResult<Option<OrderedItemRow>> {
    match level {
        OrderedLevel::StatusLists => status_list_rows::find(connection, id),
        OrderedLevel::Tasks => task_rows::find(connection, id),
    }
}

pub fn list_items(
    connection: &mut PgConnection,
    level: OrderedLevel,
    container_id: Uuid,
) -> QueryResult<Vec<OrderedItemRow>> {
    match level {
        OrderedLevel::StatusLists => status_list_rows::list(connection, container_id),
        OrderedLevel::Tasks => task_rows::list(connection, container_id),
    }
}

pub fn max_position(
    connection: &mut PgConnection,
    level: OrderedLevel,
    container_id: Uuid,
) -> QueryResult<Option<i64>> {
    match level {
        OrderedLevel::StatusLists => status_list_rows::max_position(connection, container_id),
        OrderedLevel::Tasks => task_rows::max_position(connection, container_id),
    }
}

pub fn insert_item(
    connection: &mut PgConnection,
    level: OrderedLevel,
    row: &OrderedItemRow,
) -> QueryResult<usize> {
    match level {
        OrderedLevel::StatusLists => status_list_rows::insert(connection, row),
        OrderedLevel::Tasks => task_rows::insert(connection, row),
    }
}

pub fn set_position(
    connection: &mut PgConnection,
    level: OrderedLevel,
    id: Uuid,
    position: i64,
) -> QueryResult<usize> {
    match level {
        OrderedLevel::StatusLists => status_list_rows::set_position(connection, id, position),
        OrderedLevel::Tasks => task_rows::set_position(connection, id, position),
    }
}

pub fn relocate_item(
    connection: &mut PgConnection,
    level: OrderedLevel,
    id: Uuid,
    container_id: Uuid,
    position: i64,
) -> QueryResult<usize> {
    match level {
        OrderedLevel::StatusLists => {
            status_list_rows::relocate(connection, id, container_id, position)
        }
        OrderedLevel::Tasks => task_rows::relocate(connection, id, container_id, position),
    }
}

pub fn delete_item(
    connection: &mut PgConnection,
    level: OrderedLevel,
    id: Uuid,
) -> QueryResult<usize> {
    match level {
        OrderedLevel::StatusLists => status_list_rows::delete(connection, id),
        OrderedLevel::Tasks => task_rows::delete(connection, id),
    }
}

pub fn delete_items_in(
    connection: &mut PgConnection,
    level: OrderedLevel,
    container_id: Uuid,
) -> QueryResult<usize> {
    match level {
        OrderedLevel::StatusLists => status_list_rows::delete_in(connection, container_id),
        OrderedLevel::Tasks => task_rows::delete_in(connection, container_id),
    }
}

/// Checks the row that backs a container: a board for status lists, a
/// status list for tasks.
pub fn container_exists(
    connection: &mut PgConnection,
    level: OrderedLevel,
    container_id: Uuid,
) -> QueryResult<bool> {
    match level {
        OrderedLevel::StatusLists => diesel::select(diesel::dsl::exists(
            boards::table.filter(boards::id.eq(container_id)),
        ))
        .get_result::<bool>(connection),
        OrderedLevel::Tasks => diesel::select(diesel::dsl::exists(
            status_lists::table.filter(status_lists::id.eq(container_id)),
        ))
        .get_result::<bool>(connection),
    }
}

pub fn insert_board(connection: &mut PgConnection, board_id: Uuid) -> QueryResult<usize> {
    diesel::insert_into(boards::table)
        .values(boards::id.eq(board_id))
        .on_conflict_do_nothing()
        .execute(connection)
}

pub fn delete_board(connection: &mut PgConnection, board_id: Uuid) -> QueryResult<usize> {
    diesel::delete(boards::table.filter(boards::id.eq(board_id))).execute(connection)
}
