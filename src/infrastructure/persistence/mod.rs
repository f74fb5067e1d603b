//! Persistence adapters

pub mod memory;

pub use memory::{InMemoryCallRepository, InMemoryClientRepository, InMemoryLineRepository};
