//! HTTP request handlers

use crate::api::{
    AuthRequest, AuthResponse, BatchRequest, HealthResponse, HealthStatus, MetricsResponse,
};
use crate::error::{ApiError, ApiResult, INTERNAL_ERROR_MESSAGE};
use crate::extract::{decode, parse_body, JsonBody};
use crate::metrics;
use crate::response::json_reply;
use crate::state::AppState;
use crate::telemetry;
use axum::{
    body::to_bytes,
    extract::{Path, Request, State},
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use crgate_core::{batch::UNKNOWN_ACTOR, catalog::is_metrics_key, AuthMode, BatchAction};
use std::path::Path as FsPath;
use std::time::Instant;
use tower::ServiceExt;
use tower_http::services::ServeDir;
use tracing::{debug, error, info, Instrument};

/// List all change requests in catalog order
pub async fn list_change_requests(State(state): State<AppState>) -> Response {
    let requests = state.catalog.list();
    debug!("Listing {} change requests", requests.len());
    json_reply(StatusCode::OK, requests)
}

/// Metric report for one change request.
///
/// Only `CHG<digits>` ids are routed here; anything else is an unknown API
/// path. A well-formed id with no report yields an empty list.
pub async fn change_request_metrics(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Response> {
    if !is_metrics_key(&id) {
        return Err(ApiError::NotFound);
    }

    let results = state.catalog.metrics_for(&id).to_vec();
    debug!("Metrics for {}: {} results", id, results.len());

    Ok(json_reply(
        StatusCode::OK,
        &MetricsResponse {
            status: StatusCode::OK.as_u16(),
            results,
        },
    ))
}

/// Handle a login request
pub async fn authenticate(
    State(state): State<AppState>,
    JsonBody(body): JsonBody,
) -> ApiResult<Response> {
    let mode = state.auth.mode().as_str();

    let req: AuthRequest = decode(body).map_err(|e| {
        error!("Malformed login request: {}", e);
        metrics::record_auth(mode, "error");
        ApiError::AuthInternal(e.to_string())
    })?;

    let span = telemetry::login_span(req.username.as_deref().unwrap_or_default(), mode);
    let start = Instant::now();
    let outcome = state
        .auth
        .authenticate(req.username.as_deref(), req.password.as_deref())
        .instrument(span.clone())
        .await;

    let elapsed = start.elapsed().as_secs_f64();
    span.in_scope(|| match &outcome {
        Ok(_) => telemetry::record_login_outcome("success", elapsed * 1000.0),
        Err(failure) => telemetry::record_login_error(&failure.to_string()),
    });

    let label = match &outcome {
        Ok(_) => "success",
        Err(failure) => metrics::auth_outcome_label(failure),
    };
    metrics::record_auth(mode, label);
    if state.auth.mode() == AuthMode::Directory {
        metrics::record_directory_latency(elapsed);
    }

    let ok = outcome?;
    Ok(json_reply(
        StatusCode::OK,
        &AuthResponse {
            authenticated: true,
            token: ok.token,
            user: ok.user,
        },
    ))
}

/// Acknowledge a batch approval
pub async fn batch_approve(JsonBody(body): JsonBody) -> ApiResult<Response> {
    batch_action(BatchAction::Approve, body)
}

/// Acknowledge a batch rejection
pub async fn batch_reject(JsonBody(body): JsonBody) -> ApiResult<Response> {
    batch_action(BatchAction::Reject, body)
}

fn batch_action(action: BatchAction, body: serde_json::Value) -> ApiResult<Response> {
    let req: BatchRequest = decode(body).map_err(|e| {
        error!("Batch {} error: {}", action, e);
        ApiError::Internal(INTERNAL_ERROR_MESSAGE.to_string())
    })?;

    let actor = match action {
        BatchAction::Approve => req.approved_by,
        BatchAction::Reject => req.rejected_by,
    }
    .unwrap_or_else(|| UNKNOWN_ACTOR.to_string());

    info!(
        "Batch {}: {} change requests {:?} by {}",
        action,
        req.ids.len(),
        req.ids,
        actor
    );
    metrics::record_batch(action, req.ids.len());

    let ack = action.acknowledge(req.ids.len(), actor, Utc::now());
    Ok(json_reply(StatusCode::OK, &ack))
}

/// Everything the route table does not match.
///
/// Non-API `GET`/`HEAD` requests go to the static file server. A `POST`
/// anywhere, or any other non-API request, still gets its body checked first,
/// so an empty or malformed body is reported as such before the 404.
pub async fn fallback(State(state): State<AppState>, req: Request) -> Response {
    let is_api = req.uri().path().starts_with("/api/");
    let method = req.method().clone();
    let is_read = method == Method::GET || method == Method::HEAD;

    if is_read && !is_api {
        return serve_static(&state.static_dir, req).await;
    }

    if method == Method::POST || (!is_read && !is_api) {
        let bytes = match to_bytes(req.into_body(), state.max_body_bytes).await {
            Ok(bytes) => bytes,
            Err(e) => return ApiError::BadRequest(e.to_string()).into_response(),
        };
        if let Err(e) = parse_body(&bytes) {
            return e.into_response();
        }
    }

    ApiError::NotFound.into_response()
}

async fn serve_static(dir: &FsPath, req: Request) -> Response {
    match ServeDir::new(dir).oneshot(req).await {
        Ok(response) => response.into_response(),
        Err(never) => match never {},
    }
}

fn health(state: &AppState, status: HealthStatus) -> HealthResponse {
    HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.uptime_seconds(),
        auth_mode: state.auth.mode().as_str().to_string(),
        change_requests: state.catalog.len(),
    }
}

/// Health check - liveness probe
pub async fn health_live(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(health(&state, HealthStatus::Healthy))
}

/// Health check - readiness probe
pub async fn health_ready(State(state): State<AppState>) -> ApiResult<Json<HealthResponse>> {
    metrics::set_catalog_entries(state.catalog.len());
    if state.catalog.is_empty() {
        return Err(ApiError::ServiceUnavailable(
            "Change request catalog is empty".to_string(),
        ));
    }
    Ok(Json(health(&state, HealthStatus::Healthy)))
}

/// Prometheus metrics endpoint
pub async fn prometheus_metrics() -> String {
    metrics::get_prometheus_metrics()
}
