//! Call bounded context - manages the lifecycle of directed calls between
//! two clients through one media bridge conference

pub mod aggregate;
pub mod repository;
pub mod value_object;

pub use aggregate::{Call, CallParty, NewCall};
pub use repository::CallRepository;
pub use value_object::{CallState, EndReason};
