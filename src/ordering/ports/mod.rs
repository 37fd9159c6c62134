//! Port contracts for ordered containers.
//!
//! Ports define infrastructure-agnostic interfaces used by the reorder engine
//! and its callers.

pub mod notifier;
pub mod repository;

pub use notifier::{ChangeNotifier, NotifierError, NotifierResult};
pub use repository::{OrderedRepository, OrderedRepositoryError, OrderedRepositoryResult};
