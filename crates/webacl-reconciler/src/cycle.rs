//! Sync cycle: extraction and reconciliation behind one failure boundary.
//!
//! Failures never escape as errors. They are projected into the returned
//! status (`HEALTHY = "False"` plus `error_message`) so the orchestrator gets
//! a well-formed document and retries on its own cadence.

use webacl_provider::WebAclProvider;

use crate::extract::extract_parent_data;
use crate::model::{ParentResource, StatusRecord, SyncResponse};
use crate::reconcile::reconcile;
use crate::settings::ControllerSettings;

/// Runs one sync cycle for `parent`.
pub async fn sync(
    provider: &dyn WebAclProvider,
    settings: &ControllerSettings,
    parent: &ParentResource,
) -> SyncResponse {
    let mut data = match extract_parent_data(provider, settings, parent).await {
        Ok(data) => data,
        Err(err) => {
            let prior = parent.status.clone().unwrap_or_default();
            return failed(prior, parent.metadata.name.as_deref(), &err);
        }
    };

    match reconcile(provider, &mut data).await {
        Ok(action) => {
            tracing::info!(
                name = %data.name,
                action = action.as_str(),
                crc32 = data.checksum,
                "sync complete"
            );
            SyncResponse {
                status: data.status,
            }
        }
        Err(err) => failed(data.status, Some(&data.name), &err),
    }
}

fn failed(
    mut status: StatusRecord,
    name: Option<&str>,
    err: &crate::error::ReconcileError,
) -> SyncResponse {
    let message = err.diagnostic();
    tracing::error!(
        name = name.unwrap_or(""),
        category = %err.category(),
        error = %message,
        "sync failed"
    );
    status.mark_failed(message);
    SyncResponse { status }
}
