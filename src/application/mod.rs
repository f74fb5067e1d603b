//! Application layer - Use cases and application services
//!
//! This layer orchestrates domain objects to fulfill use cases.
//! It's responsible for:
//! - SDP negotiation against bridge endpoints
//! - Routing conferences across bridge instances
//! - Coordinating the call and line lifecycles

pub mod admission_queue;
pub mod call_service;
pub mod line_service;
pub mod sdp;
pub mod sfu_router;

pub use admission_queue::ConferenceQueue;
pub use call_service::{CallService, CallSettings, InitiatedCall};
pub use line_service::{IngestSession, LineBridge, LineService};
pub use sfu_router::{SfuInstance, SfuRouter};
