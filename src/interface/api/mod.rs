//! REST and WHIP endpoints

pub mod calls_handler;
pub mod clients_handler;
pub mod dto;
pub mod error;
pub mod lines_handler;
pub mod metrics_handler;
pub mod router;
pub mod state;

pub use dto::ApiResponse;
pub use error::{ActingClient, CLIENT_ID_HEADER};
pub use metrics_handler::init_metrics;
pub use router::build_router;
pub use state::AppState;
