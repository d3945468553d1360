use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use webacl_provider::{ProviderError, ResourceTag, WebAclConfig, WebAclProvider, WebAclSummary};

use crate::journal::{CallJournal, ProviderCall, ProviderOperation};

/// Options shaping the ARNs minted by the in-memory backend.
#[derive(Debug, Clone)]
pub struct MemoryProviderOptions {
    pub region: String,
    pub account_id: String,
    /// `global` for CloudFront-scoped WebACLs, `regional` otherwise.
    pub scope: String,
}

impl Default for MemoryProviderOptions {
    fn default() -> Self {
        Self {
            region: "us-east-1".into(),
            account_id: "000000000000".into(),
            scope: "global".into(),
        }
    }
}

/// A WebACL held by the in-memory backend.
#[derive(Debug, Clone)]
pub(crate) struct StoredWebAcl {
    pub(crate) summary: WebAclSummary,
    pub(crate) tags: Vec<ResourceTag>,
    pub(crate) request: serde_json::Value,
}

/// In-memory WebACL backend.
///
/// This provider implements:
/// - Unique names per backend, like the cloud API
/// - Optimistic concurrency: every mutation rotates the lock token and
///   updates with a stale token are rejected
/// - Tag index lookups for finalization
/// - A call journal and per-operation failure injection for tests
#[derive(Debug)]
pub struct InMemoryWebAclProvider {
    /// WebACLs keyed by ARN
    pub(crate) acls: Arc<RwLock<HashMap<String, StoredWebAcl>>>,
    pub(crate) journal: CallJournal,
    failures: Arc<RwLock<HashMap<ProviderOperation, String>>>,
    options: MemoryProviderOptions,
}

impl Default for InMemoryWebAclProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryWebAclProvider {
    /// Creates an empty backend with default options.
    pub fn new() -> Self {
        Self::with_options(MemoryProviderOptions::default())
    }

    /// Creates an empty backend with the given options.
    pub fn with_options(options: MemoryProviderOptions) -> Self {
        Self {
            acls: Arc::new(RwLock::new(HashMap::new())),
            journal: CallJournal::default(),
            failures: Arc::new(RwLock::new(HashMap::new())),
            options,
        }
    }

    /// Makes every subsequent call of `operation` fail with `message`.
    pub async fn fail_operation(&self, operation: ProviderOperation, message: impl Into<String>) {
        self.failures.write().await.insert(operation, message.into());
    }

    /// Removes all injected failures.
    pub async fn clear_failures(&self) {
        self.failures.write().await.clear();
    }

    /// Calls recorded since creation or the last [`reset_journal`](Self::reset_journal).
    pub async fn calls(&self) -> Vec<ProviderCall> {
        self.journal.snapshot().await
    }

    /// Number of recorded calls that mutate the backend.
    pub async fn mutation_count(&self) -> usize {
        self.journal.count_where(|c| c.operation.is_mutation()).await
    }

    /// Number of recorded calls of one operation.
    pub async fn count_of(&self, operation: ProviderOperation) -> usize {
        self.journal.count_where(|c| c.operation == operation).await
    }

    pub async fn reset_journal(&self) {
        self.journal.clear().await;
    }

    /// Number of WebACLs currently held.
    pub async fn len(&self) -> usize {
        self.acls.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.acls.read().await.is_empty()
    }

    /// The last request body accepted for `arn`.
    pub async fn stored_request(&self, arn: &str) -> Option<serde_json::Value> {
        self.acls.read().await.get(arn).map(|a| a.request.clone())
    }

    /// Tags recorded for `arn` at creation.
    pub async fn stored_tags(&self, arn: &str) -> Option<Vec<ResourceTag>> {
        self.acls.read().await.get(arn).map(|a| a.tags.clone())
    }

    fn mint_arn(&self, name: &str, id: &str) -> String {
        format!(
            "arn:aws:wafv2:{}:{}:{}/webacl/{}/{}",
            self.options.region, self.options.account_id, self.options.scope, name, id
        )
    }

    /// Records the call and returns the injected failure for it, if any.
    async fn enter(&self, operation: ProviderOperation, target: &str) -> Result<(), ProviderError> {
        self.journal.record(ProviderCall::new(operation, target)).await;
        match self.failures.read().await.get(&operation) {
            Some(message) => Err(ProviderError::unavailable(message.clone())),
            None => Ok(()),
        }
    }
}

fn new_lock_token() -> String {
    uuid::Uuid::new_v4().to_string()
}

#[async_trait]
impl WebAclProvider for InMemoryWebAclProvider {
    async fn exists(&self, arn: &str) -> Result<bool, ProviderError> {
        self.enter(ProviderOperation::Exists, arn).await?;
        Ok(self.acls.read().await.contains_key(arn))
    }

    async fn create(&self, config: &WebAclConfig) -> Result<WebAclSummary, ProviderError> {
        let name = config
            .name()
            .filter(|n| !n.is_empty())
            .ok_or_else(|| ProviderError::invalid_request("WebACL definition has no Name"))?
            .to_string();
        self.enter(ProviderOperation::Create, &name).await?;

        let mut acls = self.acls.write().await;
        if acls.values().any(|a| a.summary.name == name) {
            return Err(ProviderError::already_exists(name));
        }

        let id = uuid::Uuid::new_v4().to_string();
        let summary = WebAclSummary {
            arn: self.mint_arn(&name, &id),
            name,
            id,
            lock_token: new_lock_token(),
            description: config.description().map(String::from),
        };
        acls.insert(
            summary.arn.clone(),
            StoredWebAcl {
                summary: summary.clone(),
                tags: config.tags.clone(),
                request: config.to_request(),
            },
        );
        tracing::debug!(arn = %summary.arn, "created WebACL");
        Ok(summary)
    }

    async fn get_current(&self, arn: &str) -> Result<WebAclSummary, ProviderError> {
        self.enter(ProviderOperation::GetCurrent, arn).await?;
        self.acls
            .read()
            .await
            .get(arn)
            .map(|a| a.summary.clone())
            .ok_or_else(|| ProviderError::not_found(arn))
    }

    async fn update(&self, config: &WebAclConfig, arn: &str) -> Result<(), ProviderError> {
        self.enter(ProviderOperation::Update, arn).await?;

        let mut acls = self.acls.write().await;
        let stored = acls
            .get_mut(arn)
            .ok_or_else(|| ProviderError::not_found(arn))?;
        if config.lock_token.as_deref() != Some(stored.summary.lock_token.as_str()) {
            return Err(ProviderError::optimistic_lock(arn));
        }
        // Name is immutable once created.
        if let Some(name) = config.name() {
            if name != stored.summary.name {
                return Err(ProviderError::invalid_request(format!(
                    "WebACL name cannot change from '{}' to '{name}'",
                    stored.summary.name
                )));
            }
        }

        stored.summary.lock_token = new_lock_token();
        stored.summary.description = config.description().map(String::from);
        stored.request = config.to_request();
        tracing::debug!(arn, lock_token = %stored.summary.lock_token, "updated WebACL");
        Ok(())
    }

    async fn delete(&self, arn: &str) -> Result<(), ProviderError> {
        self.enter(ProviderOperation::Delete, arn).await?;
        match self.acls.write().await.remove(arn) {
            Some(_) => {
                tracing::debug!(arn, "deleted WebACL");
                Ok(())
            }
            None => Err(ProviderError::not_found(arn)),
        }
    }

    async fn lookup_by_tags(&self, tags: &[ResourceTag]) -> Result<Vec<String>, ProviderError> {
        self.enter(ProviderOperation::LookupByTags, "").await?;
        let acls = self.acls.read().await;
        let mut arns: Vec<String> = acls
            .values()
            .filter(|a| tags.iter().all(|t| a.tags.contains(t)))
            .map(|a| a.summary.arn.clone())
            .collect();
        arns.sort();
        Ok(arns)
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
