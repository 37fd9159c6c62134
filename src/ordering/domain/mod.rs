//! Domain model for ordered containers.
//!
//! Containers and items are referenced by identifier only; the engine never
//! holds object graphs, it resolves everything through the repository port.

mod command;
mod error;
mod ids;
mod item;
mod plan;
mod rank;
mod view;

pub use command::{MoveItemCommand, MoveItemPayload};
pub use error::OrderingDomainError;
pub use ids::{ContainerId, ItemId};
pub use item::{OrderedItem, PersistedItemData, RankUpdate};
pub use plan::{ReorderPlan, WritePolicy, insertion_index};
pub use rank::Rank;
pub use view::{ContainerView, ItemSummary, OrderedView};
