//! Mapping from failures to HTTP responses.
//!
//! Every variant renders as a JSON object with an `error` key.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use ideabrowser_core::IdeaError;
use serde_json::{json, Value};
use tokio::task::JoinError;
use tracing::{error, warn};

#[derive(Debug)]
pub enum ApiError {
    /// The body was present but not JSON.
    InvalidBody,
    Core(IdeaError),
    /// The invocation task panicked or was cancelled.
    Task(JoinError),
}

impl From<IdeaError> for ApiError {
    fn from(err: IdeaError) -> Self {
        Self::Core(err)
    }
}

impl From<JoinError> for ApiError {
    fn from(err: JoinError) -> Self {
        Self::Task(err)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidBody => StatusCode::BAD_REQUEST,
            Self::Core(err) if err.is_client_error() => StatusCode::BAD_REQUEST,
            Self::Core(IdeaError::Timeout(_)) => StatusCode::GATEWAY_TIMEOUT,
            Self::Core(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Task(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn body(&self) -> Value {
        match self {
            Self::InvalidBody => json!({ "error": "Invalid JSON body" }),
            Self::Core(err) => match err {
                IdeaError::Validation { .. } => json!({ "error": "Missing required fields" }),
                IdeaError::Parse { raw, .. } => json!({ "error": "Analysis failed", "raw": raw }),
                IdeaError::Spawn { .. } => json!({ "error": "Analysis could not be started" }),
                IdeaError::Timeout(_) => json!({ "error": "Analysis timed out" }),
                IdeaError::Io(_) | IdeaError::Config(_) => json!({ "error": "Analysis failed" }),
            },
            Self::Task(_) => json!({ "error": "Analysis failed" }),
        }
    }

    fn log(&self) {
        match self {
            Self::InvalidBody => warn!("Rejected request with malformed JSON body"),
            Self::Core(IdeaError::Validation { missing }) => {
                warn!(?missing, "Rejected request with missing fields")
            }
            Self::Core(IdeaError::Parse { raw, source }) => {
                error!(%source, raw = %raw, "Failed to parse collaborator response")
            }
            Self::Core(err) => error!(error = %err, "Analysis failed"),
            Self::Task(err) => error!(error = %err, "Analysis task did not complete"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        self.log();
        (self.status(), Json(self.body())).into_response()
    }
}
