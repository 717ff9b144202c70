use axum::{body::Body, http::Request, middleware::Next, response::Response};
use std::sync::Arc;

use crate::api::ApiError;
use crate::AppState;

/// Requires `Authorization: Bearer <key>` with one of the configured keys.
///
/// Passes every request through when no keys are configured.
pub async fn api_key_middleware(req: Request<Body>, next: Next) -> Result<Response, ApiError> {
    let state = req
        .extensions()
        .get::<Arc<AppState>>()
        .ok_or_else(|| ApiError::InternalServerError("missing application state".to_string()))?
        .clone();

    if state.api_keys.is_empty() {
        return Ok(next.run(req).await);
    }

    let presented = req
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|val| val.to_str().ok())
        .and_then(|val| val.strip_prefix("Bearer "))
        .ok_or(ApiError::Unauthorized)?;

    if !state.api_keys.iter().any(|key| key == presented) {
        tracing::warn!(path = %req.uri().path(), "rejected request with unknown API key");
        return Err(ApiError::Unauthorized);
    }

    Ok(next.run(req).await)
}
