//! Intercom - WebRTC call orchestration on top of a media bridge SFU
//!
//! A Domain-Driven Design (DDD) service that negotiates SDP between browser
//! clients and the media bridge HTTP protocol, places calls on the least
//! loaded bridge and publishes WHIP ingests into shared lines.

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod interface;

// Re-export commonly used types
pub use domain::shared::error::DomainError;
pub use domain::shared::result::Result;
