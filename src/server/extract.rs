//! JSON body extraction for the summary API.
//!
//! Unlike `axum::Json`, a body without any `Content-Type` is still parsed as
//! JSON. An explicit non-JSON content type is rejected.

use axum::body::Bytes;
use axum::extract::{FromRequest, Request};
use axum::http::HeaderMap;
use axum::http::header::CONTENT_TYPE;
use serde::de::DeserializeOwned;

use super::error::ApiError;

/// Upper bound on request bodies. Transcripts are long; this only guards memory.
pub const MAX_BODY_BYTES: usize = 32 * 1024 * 1024;

/// Deserialized JSON request body.
#[derive(Debug)]
pub struct JsonBody<T>(pub T);

impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if !json_or_unspecified(req.headers()) {
            tracing::debug!("Rejected body with non-JSON content type");
            return Err(ApiError::Validation(
                "Expected request with `Content-Type: application/json`".to_string(),
            ));
        }

        let bytes = Bytes::from_request(req, state).await.map_err(|rejection| {
            tracing::debug!("Failed to read body: {}", rejection.body_text());
            ApiError::from(rejection)
        })?;

        serde_json::from_slice(&bytes).map(Self).map_err(|e| {
            tracing::debug!("Rejected body: {e}");
            ApiError::Validation(format!("Failed to deserialize the JSON body: {e}"))
        })
    }
}

/// True when the content type is absent or names a JSON media type.
fn json_or_unspecified(headers: &HeaderMap) -> bool {
    let Some(value) = headers.get(CONTENT_TYPE) else {
        return true;
    };
    let Ok(value) = value.to_str() else {
        return false;
    };

    let essence = value
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    essence == "application/json"
        || (essence.starts_with("application/") && essence.ends_with("+json"))
}
