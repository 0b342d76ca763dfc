//! Prometheus metrics handler

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use metrics::{counter, describe_counter};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;

static PROMETHEUS: OnceLock<PrometheusHandle> = OnceLock::new();

/// Initialize the Prometheus metrics exporter
///
/// The recorder installs process-wide, so repeated calls share one handle.
pub fn init_metrics() -> PrometheusHandle {
    PROMETHEUS
        .get_or_init(|| {
            let handle = PrometheusBuilder::new().install_recorder().unwrap();

            // Describe metrics
            describe_counter!("calls_created_total", "Total number of calls created");
            describe_counter!(
                "calls_joined_total",
                "Total number of join URLs resolved for users"
            );
            describe_counter!("calls_ended_total", "Total number of calls ended");

            handle
        })
        .clone()
}

/// HTTP metrics handler
pub async fn metrics_handler(
    axum::extract::State(prometheus_handle): axum::extract::State<PrometheusHandle>,
) -> Response {
    let metrics = prometheus_handle.render();
    (StatusCode::OK, metrics).into_response()
}

/// Record a created call
pub fn record_call_created(call_type: &str) {
    counter!("calls_created_total", "type" => call_type.to_string()).increment(1);
}

/// Record a resolved join
pub fn record_call_joined() {
    counter!("calls_joined_total").increment(1);
}

/// Record an ended call
pub fn record_call_ended(reason: &str) {
    counter!("calls_ended_total", "reason" => reason.to_string()).increment(1);
}
