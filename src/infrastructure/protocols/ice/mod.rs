//! ICE candidate attributes (RFC 8445 / RFC 8839)

pub mod candidate;

pub use candidate::{CandidateType, IceCandidate};
