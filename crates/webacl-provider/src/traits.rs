//! The provider capability consumed by the reconciler.

use async_trait::async_trait;

use crate::error::ProviderError;
use crate::types::{ResourceTag, WebAclConfig, WebAclSummary};

/// Capability set every WebACL backend must implement.
///
/// Calls are treated as blocking network operations with no internal retry:
/// a failure is returned to the caller, which records it and waits for the
/// orchestrator to ask again. Implementations must be thread-safe
/// (`Send + Sync`) because one instance serves all concurrent requests.
///
/// # Example
///
/// ```ignore
/// use webacl_provider::{WebAclProvider, ProviderError, WebAclSummary};
///
/// async fn current(provider: &dyn WebAclProvider, arn: &str) -> Result<Option<WebAclSummary>, ProviderError> {
///     if !provider.exists(arn).await? {
///         return Ok(None);
///     }
///     provider.get_current(arn).await.map(Some)
/// }
/// ```
#[async_trait]
pub trait WebAclProvider: Send + Sync {
    /// Returns whether a WebACL with this ARN currently exists.
    ///
    /// # Errors
    ///
    /// Returns an error only for infrastructure issues, not for missing resources.
    async fn exists(&self, arn: &str) -> Result<bool, ProviderError>;

    /// Creates a WebACL and returns the backend's summary of it.
    ///
    /// # Errors
    ///
    /// Returns `ProviderError::AlreadyExists` if the name is taken.
    /// Returns `ProviderError::InvalidRequest` if the definition is rejected.
    async fn create(&self, config: &WebAclConfig) -> Result<WebAclSummary, ProviderError>;

    /// Reads the current state of a WebACL, including its lock token.
    ///
    /// # Errors
    ///
    /// Returns `ProviderError::NotFound` if the WebACL does not exist.
    async fn get_current(&self, arn: &str) -> Result<WebAclSummary, ProviderError>;

    /// Replaces the WebACL definition.
    ///
    /// `config.lock_token` must match the current version.
    ///
    /// # Errors
    ///
    /// Returns `ProviderError::NotFound` if the WebACL does not exist.
    /// Returns `ProviderError::OptimisticLock` if the lock token is stale.
    async fn update(&self, config: &WebAclConfig, arn: &str) -> Result<(), ProviderError>;

    /// Deletes a WebACL.
    ///
    /// # Errors
    ///
    /// Returns `ProviderError::NotFound` if the WebACL does not exist.
    async fn delete(&self, arn: &str) -> Result<(), ProviderError>;

    /// Returns the ARNs of all WebACLs carrying every tag in `tags`.
    async fn lookup_by_tags(&self, tags: &[ResourceTag]) -> Result<Vec<String>, ProviderError>;

    /// Short backend name for logs.
    fn backend_name(&self) -> &'static str;
}
