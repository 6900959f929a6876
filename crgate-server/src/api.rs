//! API request and response types

use crgate_core::{AuthToken, MetricCheckResult, UserIdentity};
use serde::{Deserialize, Serialize};

/// Login request
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AuthRequest {
    /// Login name
    #[serde(default)]
    pub username: Option<String>,

    /// Password
    #[serde(default)]
    pub password: Option<String>,
}

/// Successful login response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    /// Always true on this response
    pub authenticated: bool,

    /// Informational token, never checked afterwards
    pub token: AuthToken,

    /// Resolved identity
    pub user: UserIdentity,
}

/// Metric report for one change request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsResponse {
    /// HTTP-style status mirrored in the body
    pub status: u16,

    /// Check results in declared order, empty for unknown ids
    pub results: Vec<MetricCheckResult>,
}

/// Batch approve/reject request.
///
/// Only the actor field matching the endpoint is read.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchRequest {
    /// Change request ids, any JSON scalar
    #[serde(default)]
    pub ids: Vec<serde_json::Value>,

    /// Approver name
    #[serde(default)]
    pub approved_by: Option<String>,

    /// Rejecter name
    #[serde(default)]
    pub rejected_by: Option<String>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// Service status
    pub status: HealthStatus,

    /// Service version
    pub version: String,

    /// Uptime in seconds
    pub uptime_seconds: u64,

    /// Active authentication backend
    pub auth_mode: String,

    /// Number of change requests in the catalog
    pub change_requests: usize,
}

/// Health status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// Service is healthy
    Healthy,
}
