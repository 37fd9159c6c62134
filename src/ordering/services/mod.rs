//! Application services for ordered containers.

mod allocator;
mod config;
mod reorder;

pub use allocator::PositionAllocator;
pub use config::ReorderConfig;
pub use reorder::{ReorderEngine, ReorderError, ReorderResult};
