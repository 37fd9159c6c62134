//! Corkboard: ordering backend for Kanban boards.
//!
//! This crate keeps status lists ranked within a board and tasks ranked
//! within a status list. Every mutation leaves each affected container with
//! dense ranks `1..=n`.
//!
//! # Architecture
//!
//! Corkboard follows hexagonal architecture principles:
//!
//! - **Domain**: Pure ranking and planning logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for storage and change notification
//! - **Adapters**: Concrete implementations of ports (in-memory, `PostgreSQL`, broadcast)
//!
//! # Modules
//!
//! - [`ordering`]: Generic ordered-container engine shared by every level
//! - [`board`]: Boards, status lists and tasks built on the ordering engine

pub mod board;
pub mod ordering;
