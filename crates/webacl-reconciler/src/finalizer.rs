//! Teardown of the external WebACL when the parent is deleted.
//!
//! The WebACL is found by tags rather than by the recorded ARN, so a parent
//! whose status was lost can still be cleaned up.

use webacl_provider::{ResourceTag, WebAclProvider};

use crate::error::{FinalizeError, ProviderStep, error_chain};
use crate::model::FinalizeResponse;

/// Deletes the single WebACL carrying `tags`.
///
/// More than one match is an ambiguous state that needs an operator; nothing
/// is deleted in that case.
pub async fn finalize_tagged(
    provider: &dyn WebAclProvider,
    tags: &[ResourceTag],
) -> Result<Option<String>, FinalizeError> {
    let arns = provider
        .lookup_by_tags(tags)
        .await
        .map_err(FinalizeError::provider(ProviderStep::TagLookup))?;

    if arns.len() > 1 {
        return Err(FinalizeError::AmbiguousState { arns });
    }
    match arns.into_iter().next() {
        Some(arn) => {
            provider
                .delete(&arn)
                .await
                .map_err(FinalizeError::provider(ProviderStep::Delete))?;
            Ok(Some(arn))
        }
        None => Ok(None),
    }
}

/// Finalize hook: reports failures as `finalized: false` so the caller retries.
pub async fn finalize(provider: &dyn WebAclProvider, tags: &[ResourceTag]) -> FinalizeResponse {
    match finalize_tagged(provider, tags).await {
        Ok(Some(arn)) => {
            tracing::info!(arn = %arn, "deleted WebACL");
            FinalizeResponse::finalized()
        }
        Ok(None) => {
            tracing::info!("no tagged WebACL left, nothing to delete");
            FinalizeResponse::finalized()
        }
        Err(err) => {
            let message = error_chain(&err);
            let category = err.category();
            if let FinalizeError::AmbiguousState { arns } = &err {
                tracing::error!(?arns, category = %category, "{message}");
            } else {
                tracing::error!(category = %category, error = %message, "finalize failed");
            }
            FinalizeResponse::pending(message)
        }
    }
}
