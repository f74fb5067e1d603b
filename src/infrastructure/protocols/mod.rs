//! Protocol implementations

pub mod ice;
pub mod webrtc;
