//! Request body extraction

use crate::error::ApiError;
use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, Request},
};
use serde::de::{DeserializeOwned, Error as _};
use serde_json::Value;

/// POST body parsed as JSON.
///
/// Rejects an empty body with [`ApiError::NoData`] and unparsable JSON with
/// [`ApiError::InvalidJson`]. Content-Type is not checked.
#[derive(Debug, Clone)]
pub struct JsonBody(pub Value);

#[async_trait]
impl<S> FromRequest<S> for JsonBody
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| ApiError::BadRequest(e.body_text()))?;
        parse_body(&bytes).map(JsonBody)
    }
}

/// Parse a raw POST body
pub fn parse_body(bytes: &[u8]) -> Result<Value, ApiError> {
    if bytes.is_empty() {
        return Err(ApiError::NoData);
    }
    serde_json::from_slice(bytes).map_err(|e| ApiError::InvalidJson(e.to_string()))
}

/// Convert a parsed body into a typed request. The body must be a JSON object.
pub fn decode<T: DeserializeOwned>(value: Value) -> Result<T, serde_json::Error> {
    if !value.is_object() {
        return Err(serde_json::Error::custom("request body must be a JSON object"));
    }
    serde_json::from_value(value)
}
