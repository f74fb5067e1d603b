//! Infrastructure layer - Technical implementations
//!
//! This layer contains:
//! - Repository implementations
//! - Protocol implementations (SDP, ICE)
//! - The media bridge HTTP client

pub mod persistence;
pub mod protocols;
pub mod smb;
