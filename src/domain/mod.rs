//! Domain layer - Core business logic and rules
//!
//! This layer contains:
//! - Aggregates: Consistency boundaries
//! - Entities: Objects with identity
//! - Value Objects: Immutable objects without identity
//! - Repository Interfaces: Ports for persistence
//! - The media bridge port

pub mod call;
pub mod client;
pub mod line;
pub mod shared;
pub mod smb;

// Re-export commonly used types
pub use shared::{DomainError, Result};
