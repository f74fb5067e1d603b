//! Interface layer - External interfaces
//!
//! This layer handles:
//! - Client, call and line REST endpoints
//! - WHIP ingest
//! - Health and Prometheus metrics

pub mod api;
