//! Prometheus metrics handler

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use metrics::{describe_counter, describe_gauge};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};

/// Install the Prometheus recorder and describe the service metrics
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    let handle = PrometheusBuilder::new().install_recorder()?;
    describe_metrics();
    Ok(handle)
}

fn describe_metrics() {
    describe_gauge!("intercom_active_calls", "Number of calls not yet ended");
    describe_gauge!(
        "sfu_conferences",
        "Conferences currently placed on each media bridge instance"
    );
    describe_counter!("calls_initiated_total", "Total number of calls initiated");
    describe_counter!("calls_ended_total", "Total number of calls ended, by reason");
    describe_counter!("whip_ingests_total", "Total number of WHIP ingests into lines");
}

/// HTTP metrics handler
pub async fn metrics_handler(State(prometheus_handle): State<PrometheusHandle>) -> Response {
    (StatusCode::OK, prometheus_handle.render()).into_response()
}
