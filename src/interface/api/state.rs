//! Shared handler state

use super::dto::ApiResponse;
use crate::application::{CallService, LineService, SfuInstance, SfuRouter};
use crate::domain::client::ClientRepository;
use axum::{extract::State, Json};
use serde::Serialize;
use std::sync::Arc;

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub calls: CallService,
    pub lines: LineService,
    pub clients: Arc<dyn ClientRepository>,
    pub router: Arc<SfuRouter>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub sfu_instances: Vec<SfuInstance>,
}

/// Health check with the load of every bridge instance
pub async fn health_check(State(state): State<AppState>) -> Json<ApiResponse<HealthResponse>> {
    Json(ApiResponse::success(HealthResponse {
        status: "OK",
        version: env!("CARGO_PKG_VERSION"),
        sfu_instances: state.router.instances(),
    }))
}
