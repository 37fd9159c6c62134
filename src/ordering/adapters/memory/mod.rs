//! In-memory adapters for ordered containers.

mod repository;

pub use repository::InMemoryOrderedRepository;
