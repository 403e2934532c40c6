//! Strict JSON body extractor
//!
//! Every rejection (wrong content type, unreadable body, malformed JSON) is a
//! 400 with an `{"error": ...}` body, unlike axum's `Json` which uses 415/422.

use crate::error::ApiError;
use axum::async_trait;
use axum::body::Bytes;
use axum::extract::{FromRequest, Request};
use axum::http::header::CONTENT_TYPE;
use serde::de::DeserializeOwned;

const JSON_CONTENT_TYPE: &str = "application/json";

pub struct JsonBody<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        if !is_json(&content_type) {
            return Err(ApiError::bad_request(format!(
                "expected Content-Type: {}, but got {}",
                JSON_CONTENT_TYPE, content_type
            )));
        }

        let body = Bytes::from_request(req, state)
            .await
            .map_err(|e| ApiError::bad_request(e.body_text()))?;
        let value = serde_json::from_slice(&body).map_err(|e| ApiError::bad_request(e.to_string()))?;

        Ok(JsonBody(value))
    }
}

/// `application/json`, optionally with parameters such as `charset`
fn is_json(content_type: &str) -> bool {
    content_type
        .split(';')
        .next()
        .is_some_and(|mime| mime.trim().eq_ignore_ascii_case(JSON_CONTENT_TYPE))
}
