//! Media bridge HTTP adapter

pub mod error;
pub mod http_client;

pub use error::SmbError;
pub use http_client::SmbHttpClient;
