//! Domain model for boards, status lists and tasks.

mod error;
mod ids;
mod title;

pub use error::BoardDomainError;
pub use ids::{BoardId, StatusListId, TaskId};
pub use title::Title;
