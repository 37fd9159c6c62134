//! Ordered-container reordering for Corkboard.
//!
//! Items (status lists inside a board, tasks inside a status list) carry a
//! 1-based `rank` that must stay dense within their container: for a
//! container holding `N` items the ranks are exactly `1..=N` once any move or
//! removal completes. This module provides the storage-agnostic engine that
//! maintains that invariant:
//!
//! - Domain types and the pure re-rank algorithm in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - The allocator and reorder engine in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;
