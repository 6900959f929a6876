//! Error types for the HTTP API
//!
//! Every failure becomes a JSON payload carrying a boolean flag and a
//! `message`. Login failures use the `authenticated` flag the login form
//! branches on; everything else uses `success` plus the numeric `status`.

use crate::metrics;
use crate::response::json_reply;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use crgate_core::AuthFailure;
use serde_json::json;
use thiserror::Error;

/// Generic message for unexpected handler failures
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// POST with an empty body (400)
    #[error("No data received")]
    NoData,

    /// Body is not valid JSON (400)
    #[error("Invalid JSON: {0}")]
    InvalidJson(String),

    /// Any other malformed request (400)
    #[error("{0}")]
    BadRequest(String),

    /// Path outside the route table (404)
    #[error("API endpoint not found")]
    NotFound,

    /// Login rejected; status depends on the reason
    #[error(transparent)]
    Auth(#[from] AuthFailure),

    /// Login request could not be processed (500)
    #[error("Internal server error: {0}")]
    AuthInternal(String),

    /// Internal server error (500)
    #[error("{0}")]
    Internal(String),

    /// Service unavailable (503)
    #[error("{0}")]
    ServiceUnavailable(String),
}

/// API result type
pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    /// HTTP status for this error
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NoData | ApiError::InvalidJson(_) | ApiError::BadRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Auth(failure) => match failure {
                AuthFailure::MissingCredentials => StatusCode::BAD_REQUEST,
                AuthFailure::InvalidCredentials
                | AuthFailure::UserNotFound
                | AuthFailure::BindRejected => StatusCode::UNAUTHORIZED,
                AuthFailure::Directory(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::AuthInternal(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Short machine-readable kind, used as a metrics label
    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::NoData => "no_data",
            ApiError::InvalidJson(_) => "invalid_json",
            ApiError::BadRequest(_) => "bad_request",
            ApiError::NotFound => "not_found",
            ApiError::Auth(_) => "auth_rejected",
            ApiError::AuthInternal(_) | ApiError::Internal(_) => "internal_error",
            ApiError::ServiceUnavailable(_) => "service_unavailable",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.to_string();
        metrics::record_error(self.kind());

        let body = match self {
            ApiError::Auth(_) | ApiError::AuthInternal(_) => json!({
                "authenticated": false,
                "message": message,
            }),
            _ => json!({
                "success": false,
                "status": status.as_u16(),
                "message": message,
            }),
        };

        json_reply(status, &body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_json(err: ApiError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn test_api_error_display() {
        assert_eq!(ApiError::NoData.to_string(), "No data received");
        assert_eq!(
            ApiError::InvalidJson("expected value".into()).to_string(),
            "Invalid JSON: expected value"
        );
        assert_eq!(ApiError::NotFound.to_string(), "API endpoint not found");
        assert_eq!(
            ApiError::Auth(AuthFailure::UserNotFound).to_string(),
            "User not found"
        );
        assert_eq!(
            ApiError::AuthInternal("invalid type".into()).to_string(),
            "Internal server error: invalid type"
        );
    }

    #[test]
    fn test_error_trait_implementation() {
        let err = ApiError::BadRequest("test".to_string());
        let _error: &dyn std::error::Error = &err;
    }

    #[tokio::test]
    async fn test_no_data_response() {
        let (status, json) = body_json(ApiError::NoData).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["success"], false);
        assert_eq!(json["status"], 400);
        assert_eq!(json["message"], "No data received");
    }

    #[tokio::test]
    async fn test_not_found_response() {
        let (status, json) = body_json(ApiError::NotFound).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["message"], "API endpoint not found");
    }

    #[tokio::test]
    async fn test_auth_failure_statuses() {
        let cases = [
            (AuthFailure::MissingCredentials, StatusCode::BAD_REQUEST),
            (AuthFailure::InvalidCredentials, StatusCode::UNAUTHORIZED),
            (AuthFailure::UserNotFound, StatusCode::UNAUTHORIZED),
            (AuthFailure::BindRejected, StatusCode::UNAUTHORIZED),
            (
                AuthFailure::Directory("connection refused".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (failure, expected) in cases {
            let message = failure.to_string();
            let (status, json) = body_json(ApiError::Auth(failure)).await;
            assert_eq!(status, expected);
            assert_eq!(json["authenticated"], false);
            assert_eq!(json["message"], message.as_str());
            assert!(json.get("success").is_none());
        }
    }

    #[tokio::test]
    async fn test_directory_error_message_is_echoed() {
        let (_, json) = body_json(ApiError::Auth(AuthFailure::Directory(
            "connection refused".into(),
        )))
        .await;
        assert_eq!(json["message"], "LDAP error: connection refused");
    }

    #[tokio::test]
    async fn test_internal_response() {
        let (status, json) = body_json(ApiError::Internal(INTERNAL_ERROR_MESSAGE.into())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["success"], false);
        assert_eq!(json["message"], "Internal server error");
    }

    #[test]
    fn test_api_result_type() {
        let success: ApiResult<String> = Ok("Success".to_string());
        assert!(success.is_ok());

        let error: ApiResult<String> = Err(ApiError::BadRequest("Failed".to_string()));
        assert!(error.is_err());
    }
}
