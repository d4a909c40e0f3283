//! Analysis route handler.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap},
    Json,
};
use ideabrowser_core::{parse_request, AnalysisResult};
use serde_json::{Map, Value};
use tracing::info;

use crate::error::ApiError;
use crate::state::AppState;

/// POST /api/analyze - Validate the body and run the collaborator.
///
/// The invocation runs on its own task, so a client that disconnects early
/// does not cut the collaborator short. Its result is simply dropped.
pub async fn analyze(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<AnalysisResult>, ApiError> {
    let body = if is_json(&headers) {
        decode_body(&body)?
    } else {
        Value::Object(Map::new())
    };
    let request = parse_request(&body)?;

    info!(
        idea = request.idea(),
        industry = request.industry(),
        city = request.city(),
        "Analyzing request"
    );

    let runner = Arc::clone(&state.runner);
    let result = tokio::spawn(async move { runner.analyze(request).await }).await??;

    Ok(Json(result))
}

/// Whether the request declares a JSON body (`application/json` or `+json`).
///
/// Bodies of any other type are not parsed and read as `{}`.
fn is_json(headers: &HeaderMap) -> bool {
    let Some(value) = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
    else {
        return false;
    };
    let mime = value
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    mime == "application/json" || (mime.starts_with("application/") && mime.ends_with("+json"))
}

/// An empty body is treated as `{}` so it reports missing fields.
fn decode_body(body: &[u8]) -> Result<Value, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Object(Map::new()));
    }
    serde_json::from_slice(body).map_err(|_| ApiError::InvalidBody)
}
