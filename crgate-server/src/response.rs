//! JSON response writer and cross-origin envelope

use axum::{
    extract::Request,
    http::{
        header::{
            ACCESS_CONTROL_ALLOW_CREDENTIALS, ACCESS_CONTROL_ALLOW_HEADERS,
            ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN, ACCESS_CONTROL_MAX_AGE,
            CONTENT_TYPE,
        },
        HeaderMap, HeaderName, HeaderValue, Method, StatusCode,
    },
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::error;

/// Content type of every API payload
pub const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";

/// Headers stamped on every response, preflight included
pub const CORS_HEADERS: [(HeaderName, &str); 5] = [
    (ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
    (ACCESS_CONTROL_ALLOW_METHODS, "GET, POST, OPTIONS, PUT, DELETE"),
    (
        ACCESS_CONTROL_ALLOW_HEADERS,
        "Content-Type, Authorization, X-Requested-With",
    ),
    (ACCESS_CONTROL_ALLOW_CREDENTIALS, "true"),
    (ACCESS_CONTROL_MAX_AGE, "86400"),
];

const SERIALIZATION_FAILURE_BODY: &str =
    r#"{"success":false,"status":500,"message":"Internal server error"}"#;

/// Serialize `payload` as UTF-8 JSON with status `status`.
///
/// Non-ASCII text is written literally. A payload that fails to serialize is
/// logged and replaced by a generic 500 body.
pub fn json_reply<T: Serialize + ?Sized>(status: StatusCode, payload: &T) -> Response {
    let content_type = [(CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE))];
    match serde_json::to_vec(payload) {
        Ok(body) => (status, content_type, body).into_response(),
        Err(e) => {
            error!("Failed to serialize response payload: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                content_type,
                SERIALIZATION_FAILURE_BODY,
            )
                .into_response()
        }
    }
}

fn apply_cors_headers(headers: &mut HeaderMap) {
    for (name, value) in CORS_HEADERS {
        headers.insert(name, HeaderValue::from_static(value));
    }
}

/// Answer every `OPTIONS` request with an empty 200 and add the cross-origin
/// headers to every response.
pub async fn cors_envelope(req: Request, next: Next) -> Response {
    let mut response = if req.method() == Method::OPTIONS {
        StatusCode::OK.into_response()
    } else {
        next.run(req).await
    };
    apply_cors_headers(response.headers_mut());
    response
}
