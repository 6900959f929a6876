//! Logging and OpenTelemetry tracing for crgate server

use crgate_core::AuthMode;
use opentelemetry::KeyValue;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::{
    runtime,
    trace::{self, RandomIdGenerator, Sampler},
    Resource,
};
use std::time::Duration;
use tracing_opentelemetry::OpenTelemetryLayer;
use tracing_subscriber::{
    layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, FmtSubscriber, Registry,
};

/// Filter used when `RUST_LOG` is unset
pub const DEFAULT_FILTER: &str = "info,crgate=debug";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Console-only logging
pub fn init_console_logging() -> anyhow::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(env_filter())
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

/// Resource attached to every exported span. The login backend is part of
/// it so traces from mock and directory deployments can be told apart.
pub fn service_resource(service_name: &str, auth_mode: AuthMode) -> Resource {
    Resource::new(vec![
        KeyValue::new("service.name", service_name.to_string()),
        KeyValue::new("service.namespace", "crgate"),
        KeyValue::new("service.version", env!("CARGO_PKG_VERSION")),
        KeyValue::new("crgate.auth_mode", auth_mode.as_str()),
    ])
}

/// OTLP pipeline exporting to `OTEL_EXPORTER_OTLP_ENDPOINT`
pub fn init_telemetry(
    service_name: &str,
    auth_mode: AuthMode,
) -> anyhow::Result<opentelemetry_sdk::trace::Tracer> {
    let endpoint = std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT")
        .unwrap_or_else(|_| "http://localhost:4317".to_string());

    let exporter = opentelemetry_otlp::new_exporter()
        .tonic()
        .with_endpoint(endpoint)
        .with_timeout(Duration::from_secs(3));

    let tracer = opentelemetry_otlp::new_pipeline()
        .tracing()
        .with_exporter(exporter)
        .with_trace_config(
            trace::config()
                .with_sampler(get_sampler())
                .with_id_generator(RandomIdGenerator::default())
                .with_resource(service_resource(service_name, auth_mode)),
        )
        .install_batch(runtime::Tokio)?;

    Ok(tracer)
}

/// Sample rate from `OTEL_TRACES_SAMPLER_ARG`, everything by default
fn get_sampler() -> Sampler {
    let sample_rate = std::env::var("OTEL_TRACES_SAMPLER_ARG")
        .ok()
        .and_then(|s| s.parse::<f64>().ok())
        .unwrap_or(1.0);

    sampler_for_rate(sample_rate)
}

fn sampler_for_rate(sample_rate: f64) -> Sampler {
    if sample_rate >= 1.0 {
        Sampler::AlwaysOn
    } else if sample_rate <= 0.0 {
        Sampler::AlwaysOff
    } else {
        Sampler::TraceIdRatioBased(sample_rate)
    }
}

/// Console logging plus OTLP export, tagged with the active login backend
pub fn init_tracing_stack(service_name: &str, auth_mode: AuthMode) -> anyhow::Result<()> {
    let tracer = init_telemetry(service_name, auth_mode)?;
    let otel_layer = OpenTelemetryLayer::new(tracer);

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_thread_ids(true)
        .with_thread_names(true);

    Registry::default()
        .with(env_filter())
        .with(fmt_layer)
        .with(otel_layer)
        .init();

    Ok(())
}

/// Flush pending spans on exit
pub fn shutdown_telemetry() {
    opentelemetry::global::shutdown_tracer_provider();
}

/// Span covering one login attempt. The password never enters the span.
pub fn login_span(username: &str, mode: &str) -> tracing::Span {
    tracing::info_span!(
        "login",
        username = %username,
        auth.mode = %mode,
        otel.kind = "server",
        outcome = tracing::field::Empty,
        latency_ms = tracing::field::Empty,
        error = tracing::field::Empty,
        otel.status_code = tracing::field::Empty,
    )
}

/// Record a login outcome in the current span
pub fn record_login_outcome(outcome: &str, latency_ms: f64) {
    let span = tracing::Span::current();
    span.record("outcome", outcome);
    span.record("latency_ms", latency_ms);
    span.record("otel.status_code", "OK");
}

/// Record a login failure in the current span
pub fn record_login_error(error: &str) {
    let span = tracing::Span::current();
    span.record("outcome", "rejected");
    span.record("error", error);
    span.record("otel.status_code", "ERROR");
}
