//! Concrete implementations of the messaging ports.

pub mod memory;
pub mod postgres;
