use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Failures that escape a hook handler.
///
/// Reconciliation failures are not among them: those come back as a
/// well-formed status. What is left is a body that cannot be read at all, or
/// a reconciliation task that never finished.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid hook request: {0}")]
    InvalidBody(#[from] serde_json::Error),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let detail = self.to_string();
        tracing::error!(error = %detail, "hook request failed");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "detail": detail })),
        )
            .into_response()
    }
}
