//! Call journal for the in-memory backend.

use std::sync::Arc;

use tokio::sync::RwLock;

/// Provider operations, as recorded in the journal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderOperation {
    Exists,
    Create,
    GetCurrent,
    Update,
    Delete,
    LookupByTags,
}

impl ProviderOperation {
    /// Whether the operation changes backend state.
    pub fn is_mutation(self) -> bool {
        matches!(self, Self::Create | Self::Update | Self::Delete)
    }
}

/// A single recorded provider call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderCall {
    pub operation: ProviderOperation,
    /// ARN or name the call addressed; empty for tag lookups.
    pub target: String,
}

impl ProviderCall {
    pub fn new(operation: ProviderOperation, target: impl Into<String>) -> Self {
        Self {
            operation,
            target: target.into(),
        }
    }
}

#[derive(Debug, Default, Clone)]
pub(crate) struct CallJournal {
    calls: Arc<RwLock<Vec<ProviderCall>>>,
}

impl CallJournal {
    pub(crate) async fn record(&self, call: ProviderCall) {
        self.calls.write().await.push(call);
    }

    pub(crate) async fn snapshot(&self) -> Vec<ProviderCall> {
        self.calls.read().await.clone()
    }

    pub(crate) async fn count_where(&self, predicate: impl Fn(&ProviderCall) -> bool) -> usize {
        self.calls.read().await.iter().filter(|c| predicate(c)).count()
    }

    pub(crate) async fn clear(&self) {
        self.calls.write().await.clear();
    }
}
