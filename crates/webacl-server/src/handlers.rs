use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};
use serde::Serialize;
use serde_json::json;
use webacl_reconciler::{FinalizeResponse, HookRequest, SyncResponse};

use crate::error::ApiError;
use crate::server::AppState;

#[derive(Serialize)]
pub struct HealthResponse<'a> {
    status: &'a str,
}

pub async fn root(State(state): State<AppState>) -> impl IntoResponse {
    let body = json!({
        "service": "WebACL Controller",
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "backend": state.controller.provider().backend_name(),
        "finalize_enabled": state.finalize_enabled,
    });
    (StatusCode::OK, Json(body))
}

pub async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, Json(HealthResponse { status: "ok" }))
}

pub async fn readyz() -> impl IntoResponse {
    (StatusCode::OK, Json(HealthResponse { status: "ready" }))
}

/// `POST /sync`: reconcile the parent and return its new status.
///
/// The cycle runs on its own task so a slow provider never holds up the
/// accept loop.
pub async fn sync(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<SyncResponse>, ApiError> {
    let request = parse_hook_request(&body)?;
    let controller = state.controller.clone();
    let response = tokio::spawn(async move { controller.sync(&request.parent).await })
        .await
        .map_err(|e| ApiError::internal(format!("sync task failed: {e}")))?;
    Ok(Json(response))
}

/// `POST /finalize`: always finalized unless the tag-based finalizer is enabled.
pub async fn finalize(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<FinalizeResponse>, ApiError> {
    if !state.finalize_enabled {
        return Ok(Json(FinalizeResponse::finalized()));
    }
    let request = parse_hook_request(&body)?;
    let controller = state.controller.clone();
    let response = tokio::spawn(async move { controller.finalize(&request.parent).await })
        .await
        .map_err(|e| ApiError::internal(format!("finalize task failed: {e}")))?;
    Ok(Json(response))
}

fn parse_hook_request(body: &[u8]) -> Result<HookRequest, ApiError> {
    Ok(serde_json::from_slice(body)?)
}
