//! SDP offer/answer engine
//!
//! Translates between client-facing SDP and the bridge's endpoint
//! descriptions.

pub mod candidates;
pub mod engine;
pub mod inbound;
pub mod offer;
pub mod whip;

#[cfg(test)]
pub(crate) mod fixtures;

pub use engine::{EndpointLocation, SdpEngine};
pub use inbound::{endpoint_from_client_answer, endpoint_from_client_offer};
pub use offer::{create_offer, flip_setup, MediaStreamDescriptor};
pub use whip::create_whip_whep_answer;
