//! API Router configuration

use super::calls_handler::{
    callee_answer, caller_answer, end_call, get_call, initiate_call, join_call, list_calls,
};
use super::clients_handler::{disconnect_client, list_clients, register_client};
use super::lines_handler::{create_line, get_line, get_participants, whip_ingest};
use super::metrics_handler::metrics_handler;
use super::state::{health_check, AppState};
use axum::{
    routing::{delete, get, patch, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Build the API router
pub fn build_router(state: AppState, prometheus_handle: PrometheusHandle) -> Router {
    let health_routes = Router::new().route("/health", get(health_check));

    let client_routes = Router::new()
        .route("/api/v1/clients", post(register_client).get(list_clients))
        .route("/api/v1/clients/:id", delete(disconnect_client));

    let line_routes = Router::new()
        .route("/api/v1/lines", post(create_line))
        .route("/api/v1/lines/:id", get(get_line))
        .route("/api/v1/lines/:id/participants", get(get_participants))
        .route("/whip/lines/:id", post(whip_ingest));

    let call_routes = Router::new()
        .route("/api/v1/calls", post(initiate_call).get(list_calls))
        .route("/api/v1/calls/:id", get(get_call).delete(end_call))
        .route("/api/v1/calls/:id/caller-answer", patch(caller_answer))
        .route("/api/v1/calls/:id/join", post(join_call))
        .route("/api/v1/calls/:id/callee-answer", patch(callee_answer));

    // Metrics route (separate state)
    let metrics_routes = Router::new()
        .route("/metrics", get(metrics_handler))
        .with_state(prometheus_handle);

    Router::new()
        .merge(health_routes)
        .merge(client_routes)
        .merge(line_routes)
        .merge(call_routes)
        .with_state(state)
        .merge(metrics_routes)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}
