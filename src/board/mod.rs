//! Kanban boards built on the ordering engine.
//!
//! Boards own status lists and status lists own tasks. A status list is both
//! an item ranked inside its board and the container its tasks are ranked
//! in. This module wires those two levels to the reorder engine and fans
//! every resulting ordering out to a change notifier:
//!
//! - Domain types in [`domain`]
//! - Orchestration services in [`services`]

pub mod domain;
pub mod services;
