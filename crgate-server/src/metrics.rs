//! Prometheus metrics collection for crgate server

use crate::routes::route_label;
use axum::{extract::Request, middleware::Next, response::Response};
use crgate_core::{AuthFailure, BatchAction};
use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use std::time::Instant;

/// Initialize all metric descriptions
pub fn init_metrics() {
    // Counters
    describe_counter!("crgate_http_requests_total", "Total number of HTTP requests");
    describe_counter!("crgate_auth_attempts_total", "Login attempts by backend and outcome");
    describe_counter!("crgate_batch_actions_total", "Batch approve/reject requests");
    describe_counter!("crgate_batch_ids_total", "Change request ids named in batch requests");
    describe_counter!("crgate_errors_total", "Total number of error responses");

    // Histograms
    describe_histogram!("crgate_http_request_duration_seconds", "HTTP request latency in seconds");
    describe_histogram!("crgate_directory_latency_seconds", "Directory lookup and bind latency in seconds");

    // Gauges
    describe_gauge!("crgate_catalog_entries", "Number of change requests in the catalog");
}

/// Record a completed HTTP request
pub fn record_request(route: &str, method: &str, status: u16, latency_seconds: f64) {
    counter!(
        "crgate_http_requests_total",
        "route" => route.to_string(),
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!("crgate_http_request_duration_seconds", "route" => route.to_string())
        .record(latency_seconds);
}

/// Label for a failed login
pub fn auth_outcome_label(failure: &AuthFailure) -> &'static str {
    match failure {
        AuthFailure::MissingCredentials => "missing_credentials",
        AuthFailure::InvalidCredentials => "invalid_credentials",
        AuthFailure::UserNotFound => "user_not_found",
        AuthFailure::BindRejected => "bind_rejected",
        AuthFailure::Directory(_) => "directory_error",
    }
}

/// Record a login attempt
pub fn record_auth(mode: &str, outcome: &str) {
    counter!(
        "crgate_auth_attempts_total",
        "mode" => mode.to_string(),
        "outcome" => outcome.to_string()
    )
    .increment(1);
}

/// Record directory round-trip latency
pub fn record_directory_latency(latency_seconds: f64) {
    histogram!("crgate_directory_latency_seconds").record(latency_seconds);
}

/// Record a batch action
pub fn record_batch(action: BatchAction, ids: usize) {
    counter!("crgate_batch_actions_total", "action" => action.to_string()).increment(1);
    counter!("crgate_batch_ids_total", "action" => action.to_string()).increment(ids as u64);
}

/// Record an error
pub fn record_error(error_type: &str) {
    counter!("crgate_errors_total", "type" => error_type.to_string()).increment(1);
}

/// Update the catalog size gauge
pub fn set_catalog_entries(count: usize) {
    gauge!("crgate_catalog_entries").set(count as f64);
}

/// Middleware recording count and latency of every request
pub async fn track_requests(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().to_string();
    let route = route_label(req.uri().path());

    let response = next.run(req).await;

    record_request(
        route,
        &method,
        response.status().as_u16(),
        start.elapsed().as_secs_f64(),
    );
    response
}

/// Storage for Prometheus handle
static PROMETHEUS_HANDLE: std::sync::OnceLock<metrics_exporter_prometheus::PrometheusHandle> =
    std::sync::OnceLock::new();

/// Initialize Prometheus exporter and install it as the global recorder
pub fn init_prometheus() -> anyhow::Result<()> {
    let builder = metrics_exporter_prometheus::PrometheusBuilder::new();
    let handle = builder.install_recorder()?;
    PROMETHEUS_HANDLE
        .set(handle)
        .map_err(|_| anyhow::anyhow!("Failed to set Prometheus handle"))?;
    Ok(())
}

/// Get Prometheus metrics string
pub fn get_prometheus_metrics() -> String {
    PROMETHEUS_HANDLE
        .get()
        .map(|handle| handle.render())
        .unwrap_or_else(|| "# Prometheus metrics not initialized\n".to_string())
}
