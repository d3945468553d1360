//! The reconciliation state machine.
//!
//! The action is derived each cycle from `(existing_arn, checksum_changed)`:
//!
//! | existing_arn | checksum_changed | action    |
//! |--------------|------------------|-----------|
//! | absent       | any              | create    |
//! | present      | true             | update    |
//! | present      | false            | unchanged |

use webacl_provider::{WebAclConfig, WebAclProvider};

use crate::error::{ProviderStep, ReconcileError};
use crate::extract::ParentData;

/// What a successful cycle did to the external WebACL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncAction {
    Created,
    Updated,
    Unchanged,
}

impl SyncAction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Updated => "updated",
            Self::Unchanged => "unchanged",
        }
    }
}

/// Applies the action implied by `data` and stamps `data.status` on success.
///
/// Errors propagate unchanged; `data.status` then holds whatever snapshot was
/// recorded before the failing call.
pub async fn reconcile(
    provider: &dyn WebAclProvider,
    data: &mut ParentData,
) -> Result<SyncAction, ReconcileError> {
    let action = match data.existing_arn.clone() {
        None => {
            let config = WebAclConfig::new(data.definition.clone(), data.tags.clone());
            let created = provider
                .create(&config)
                .await
                .map_err(ReconcileError::provider(ProviderStep::Create))?;
            tracing::info!(name = %data.name, arn = %created.arn, "created WebACL");
            data.status.web_acl_request = Some(created);
            SyncAction::Created
        }
        Some(arn) if data.checksum_changed => {
            tracing::info!(name = %data.name, arn = %arn, "updating existing WebACL");
            // Fetch right before mutating to keep the lock token fresh.
            let current = provider
                .get_current(&arn)
                .await
                .map_err(ReconcileError::provider(ProviderStep::LockTokenFetch))?;
            let config = WebAclConfig::new(data.definition.clone(), data.tags.clone())
                .with_lock_token(current.lock_token.clone());
            data.status.web_acl_request = Some(current);

            provider
                .update(&config, &arn)
                .await
                .map_err(ReconcileError::provider(ProviderStep::Update))?;

            let updated = provider
                .get_current(&arn)
                .await
                .map_err(ReconcileError::provider(ProviderStep::PostUpdateRead))?;
            data.status.web_acl_request = Some(updated);
            SyncAction::Updated
        }
        Some(arn) => {
            tracing::info!(name = %data.name, arn = %arn, "no updates to be made");
            SyncAction::Unchanged
        }
    };

    data.status.mark_synced(data.checksum);
    Ok(action)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Health, StatusRecord};
    use serde_json::{Map, Value, json};
    use webacl_provider::ResourceTag;
    use webacl_provider_memory::{InMemoryWebAclProvider, ProviderOperation};

    fn data(existing_arn: Option<String>, checksum_changed: bool) -> ParentData {
        let mut definition = Map::new();
        definition.insert("Rules".into(), json!([]));
        definition.insert("Name".into(), Value::String("foo".into()));
        ParentData {
            name: "foo".into(),
            tags: vec![
                ResourceTag::new("kubernetes_resource_name", "foo"),
                ResourceTag::new("captain_domain", "test.example.com"),
            ],
            definition,
            status: StatusRecord::default(),
            existing_arn,
            checksum_changed,
            checksum: 42,
        }
    }

    #[tokio::test]
    async fn missing_arn_creates_even_when_checksum_changed() {
        let provider = InMemoryWebAclProvider::new();
        let mut d = data(None, true);
        assert_eq!(reconcile(&provider, &mut d).await.unwrap(), SyncAction::Created);
        assert_eq!(provider.mutation_count().await, 1);
    }

    #[tokio::test]
    async fn create_records_snapshot_and_tags() {
        let provider = InMemoryWebAclProvider::new();
        let mut d = data(None, false);
        let action = reconcile(&provider, &mut d).await.unwrap();

        assert_eq!(action, SyncAction::Created);
        let snapshot = d.status.web_acl_request.clone().unwrap();
        assert_eq!(snapshot.name, "foo");
        assert_eq!(d.status.crc32_hash, Some(42));
        assert_eq!(d.status.healthy, Health::Healthy);
        assert_eq!(provider.count_of(ProviderOperation::Create).await, 1);

        let tags = provider.stored_tags(&snapshot.arn).await.unwrap();
        assert!(tags.contains(&ResourceTag::new("captain_domain", "test.example.com")));
    }

    #[tokio::test]
    async fn update_uses_fresh_lock_token_and_records_new_state() {
        let provider = InMemoryWebAclProvider::new();
        let mut first = data(None, false);
        reconcile(&provider, &mut first).await.unwrap();
        let created = first.status.web_acl_request.clone().unwrap();

        let mut second = data(Some(created.arn.clone()), true);
        second
            .definition
            .insert("Description".into(), json!("tightened"));
        let action = reconcile(&provider, &mut second).await.unwrap();

        assert_eq!(action, SyncAction::Updated);
        let after = second.status.web_acl_request.clone().unwrap();
        assert_eq!(after.arn, created.arn);
        assert_ne!(after.lock_token, created.lock_token);
        assert_eq!(after.description.as_deref(), Some("tightened"));
        assert_eq!(provider.count_of(ProviderOperation::GetCurrent).await, 2);
        assert_eq!(provider.count_of(ProviderOperation::Update).await, 1);

        let request = provider.stored_request(&created.arn).await.unwrap();
        assert_eq!(request["LockToken"], created.lock_token.as_str());
    }

    #[tokio::test]
    async fn unchanged_makes_no_provider_calls() {
        let provider = InMemoryWebAclProvider::new();
        let mut d = data(Some("arn:whatever".into()), false);
        d.status.error_message = Some("old failure".into());

        let action = reconcile(&provider, &mut d).await.unwrap();
        assert_eq!(action, SyncAction::Unchanged);
        assert!(provider.calls().await.is_empty());
        assert!(d.status.error_message.is_none());
        assert_eq!(d.status.healthy, Health::Healthy);
    }

    #[tokio::test]
    async fn failed_update_keeps_lock_snapshot_and_does_not_stamp() {
        let provider = InMemoryWebAclProvider::new();
        let mut first = data(None, false);
        reconcile(&provider, &mut first).await.unwrap();
        let created = first.status.web_acl_request.clone().unwrap();

        provider
            .fail_operation(ProviderOperation::Update, "conflict")
            .await;
        let mut second = data(Some(created.arn.clone()), true);
        let err = reconcile(&provider, &mut second).await.unwrap_err();

        assert!(matches!(
            err,
            ReconcileError::Provider {
                step: ProviderStep::Update,
                ..
            }
        ));
        assert_eq!(second.status.web_acl_request, Some(created));
        assert_eq!(second.status.crc32_hash, None);
        assert_eq!(second.status.healthy, Health::Unhealthy);
    }
}
