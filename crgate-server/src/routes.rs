//! Route table and middleware stack

use crate::handlers;
use crate::metrics;
use crate::response;
use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use crgate_core::catalog::is_metrics_key;
use tower_http::{compression::CompressionLayer, trace::TraceLayer};

/// Change request listing
pub const CHANGE_REQUESTS: &str = "/api/change-requests";
/// Per-request metric report
pub const CHANGE_REQUEST_METRICS: &str = "/api/change-requests/:id";
/// Login
pub const LDAP_AUTH: &str = "/api/ldap/auth";
/// Batch approval
pub const BATCH_APPROVE: &str = "/api/change-requests/batch-approve";
/// Batch rejection
pub const BATCH_REJECT: &str = "/api/change-requests/batch-reject";

/// Fixed API paths with their methods
pub const API_ROUTES: [(&str, &str); 4] = [
    ("GET", CHANGE_REQUESTS),
    ("POST", LDAP_AUTH),
    ("POST", BATCH_APPROVE),
    ("POST", BATCH_REJECT),
];

/// Bounded metric label for a request path
pub fn route_label(path: &str) -> &'static str {
    if let Some((_, route)) = API_ROUTES.iter().find(|(_, route)| *route == path) {
        return route;
    }
    match path {
        "/health/live" => "/health/live",
        "/health/ready" => "/health/ready",
        "/metrics" => "/metrics",
        _ => match path.strip_prefix("/api/change-requests/") {
            Some(id) if is_metrics_key(id) => CHANGE_REQUEST_METRICS,
            _ if path.starts_with("/api/") => "unknown",
            _ => "static",
        },
    }
}

/// Build the application router.
///
/// A known path called with the wrong method, like any unknown path, goes
/// through [`handlers::fallback`].
pub fn router(state: AppState) -> Router {
    let body_limit = state.max_body_bytes;

    Router::new()
        .route(
            CHANGE_REQUESTS,
            get(handlers::list_change_requests).fallback(handlers::fallback),
        )
        .route(
            CHANGE_REQUEST_METRICS,
            get(handlers::change_request_metrics).fallback(handlers::fallback),
        )
        .route(
            LDAP_AUTH,
            post(handlers::authenticate).fallback(handlers::fallback),
        )
        .route(
            BATCH_APPROVE,
            post(handlers::batch_approve).fallback(handlers::fallback),
        )
        .route(
            BATCH_REJECT,
            post(handlers::batch_reject).fallback(handlers::fallback),
        )
        // Health checks
        .route("/health/live", get(handlers::health_live))
        .route("/health/ready", get(handlers::health_ready))
        // Metrics
        .route("/metrics", get(handlers::prometheus_metrics))
        .fallback(handlers::fallback)
        .with_state(state)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(middleware::from_fn(metrics::track_requests))
        .layer(middleware::from_fn(response::cors_envelope))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_route_label() {
        assert_eq!(route_label("/api/change-requests"), CHANGE_REQUESTS);
        assert_eq!(route_label("/api/ldap/auth"), LDAP_AUTH);
        assert_eq!(
            route_label("/api/change-requests/CHG1001"),
            CHANGE_REQUEST_METRICS
        );
        assert_eq!(route_label("/api/change-requests/XYZ"), "unknown");
        assert_eq!(route_label("/api/other"), "unknown");
        assert_eq!(route_label("/index.html"), "static");
        assert_eq!(route_label("/metrics"), "/metrics");
    }

    proptest! {
        #[test]
        fn prop_metrics_paths_share_one_label(n in 0u64..u64::MAX) {
            let path = format!("/api/change-requests/CHG{}", n);
            prop_assert_eq!(route_label(&path), CHANGE_REQUEST_METRICS);
        }

        #[test]
        fn prop_non_api_paths_are_static(segment in "[a-z0-9._-]{1,20}") {
            prop_assume!(segment != "metrics");
            let path = format!("/{}", segment);
            prop_assert_eq!(route_label(&path), "static");
        }
    }
}
