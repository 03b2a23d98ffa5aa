//! Prometheus metrics
//!
//! Recording goes through the `metrics` facade; without an installed
//! recorder every call is a no-op.

use std::time::Duration;

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use signbridge_core::{Capability, ParticipantRole};

use crate::state::AppState;
use crate::ServerError;

/// Install the global Prometheus recorder
pub fn init_metrics() -> Result<PrometheusHandle, ServerError> {
    PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| ServerError::Internal(format!("Failed to install metrics recorder: {}", e)))
}

/// `GET /metrics`
pub async fn metrics_handler(State(state): State<AppState>) -> impl IntoResponse {
    match &state.metrics {
        Some(handle) => (StatusCode::OK, handle.render()),
        None => (StatusCode::NOT_FOUND, "metrics disabled".to_string()),
    }
}

pub fn record_connection_opened(role: ParticipantRole) {
    counter!("signbridge_connections_total", "role" => role.as_str()).increment(1);
    gauge!("signbridge_active_connections", "role" => role.as_str()).increment(1.0);
}

pub fn record_connection_closed(role: ParticipantRole) {
    gauge!("signbridge_active_connections", "role" => role.as_str()).decrement(1.0);
}

pub fn record_unit(role: ParticipantRole, kind: &'static str) {
    counter!("signbridge_units_total", "role" => role.as_str(), "kind" => kind).increment(1);
}

pub fn record_unit_dropped(role: ParticipantRole, kind: &'static str) {
    counter!("signbridge_units_dropped_total", "role" => role.as_str(), "kind" => kind).increment(1);
}

pub fn record_frame_dropped() {
    counter!("signbridge_frames_dropped_total").increment(1);
}

pub fn record_backend_call(capability: Capability, elapsed: Duration, ok: bool) {
    histogram!("signbridge_backend_latency_seconds", "capability" => capability.as_str())
        .record(elapsed.as_secs_f64());
    if !ok {
        counter!("signbridge_backend_errors_total", "capability" => capability.as_str())
            .increment(1);
    }
}

pub fn record_delivery_failed(role: ParticipantRole) {
    counter!("signbridge_deliveries_failed_total", "role" => role.as_str()).increment(1);
}

pub fn record_translation() {
    counter!("signbridge_translations_total").increment(1);
}
