//! Adapter implementations for ordered-container ports.

pub mod broadcast;
pub mod memory;
pub mod postgres;
