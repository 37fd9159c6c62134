//! `PostgreSQL` adapters for ordered containers.
//!
//! Both ranked levels of a board share one adapter type; [`OrderedLevel`]
//! selects which typed query set in `queries` a call runs against.

mod level;
mod models;
mod queries;
mod repository;
mod schema;

pub use level::OrderedLevel;
pub use repository::{OrderingPgPool, PostgresOrderedRepository};
