//! Parent data extraction.
//!
//! Derives everything a cycle needs from the incoming parent: identity, the
//! tag set, the desired definition and its checksum, the prior status, and
//! whether the recorded WebACL still exists.

use serde_json::{Map, Value};
use webacl_provider::{ResourceTag, WebAclProvider};

use crate::checksum::definition_checksum;
use crate::error::{ProviderStep, ReconcileError};
use crate::model::{Health, ParentResource, StatusRecord};
use crate::settings::ControllerSettings;

pub const TAG_RESOURCE_NAME: &str = "kubernetes_resource_name";
pub const TAG_CAPTAIN_DOMAIN: &str = "captain_domain";

/// Inputs of one reconciliation cycle.
#[derive(Debug, Clone)]
pub struct ParentData {
    pub name: String,
    pub tags: Vec<ResourceTag>,
    /// Desired definition with `Name` injected.
    pub definition: Map<String, Value>,
    /// Working status, seeded from the parent's prior status.
    pub status: StatusRecord,
    /// ARN of the WebACL this parent owns, if it still exists.
    pub existing_arn: Option<String>,
    /// The definition differs from the last applied one.
    pub checksum_changed: bool,
    pub checksum: u32,
}

/// Tags identifying the WebACL owned by parent `name`.
pub fn resource_tags(name: &str, settings: &ControllerSettings) -> Vec<ResourceTag> {
    vec![
        ResourceTag::new(TAG_RESOURCE_NAME, name),
        ResourceTag::new(TAG_CAPTAIN_DOMAIN, settings.captain_domain.as_str()),
    ]
}

/// Name of the parent, required for every hook.
pub fn parent_name(parent: &ParentResource) -> Result<&str, ReconcileError> {
    parent
        .metadata
        .name
        .as_deref()
        .filter(|n| !n.is_empty())
        .ok_or(ReconcileError::MissingName)
}

/// Parses the embedded definition and injects the parent name as `Name`.
///
/// An existing `Name` key keeps its position; otherwise it is appended, which
/// matters because key order feeds the checksum.
pub fn parse_definition(name: &str, raw: Option<&str>) -> Result<Map<String, Value>, ReconcileError> {
    let raw = raw
        .filter(|r| !r.trim().is_empty())
        .ok_or_else(|| ReconcileError::MissingDefinition {
            name: name.to_string(),
        })?;
    let value: Value =
        serde_json::from_str(raw).map_err(|source| ReconcileError::InvalidDefinition {
            name: name.to_string(),
            source,
        })?;
    let Value::Object(mut definition) = value else {
        return Err(ReconcileError::DefinitionNotObject {
            name: name.to_string(),
        });
    };
    definition.insert("Name".to_string(), Value::String(name.to_string()));
    Ok(definition)
}

/// Builds the cycle inputs for `parent`.
///
/// The recorded ARN is validated against the provider; a WebACL deleted
/// out of band is treated as absent so the cycle recreates it.
pub async fn extract_parent_data(
    provider: &dyn WebAclProvider,
    settings: &ControllerSettings,
    parent: &ParentResource,
) -> Result<ParentData, ReconcileError> {
    let name = parent_name(parent)?.to_string();
    let tags = resource_tags(&name, settings);
    let definition = parse_definition(&name, parent.spec.web_acl_definition.as_deref())?;
    let checksum = definition_checksum(&definition).map_err(ReconcileError::Checksum)?;

    let mut status = parent.status.clone().unwrap_or_default();
    status.healthy = Health::Unhealthy;

    let checksum_changed = status.crc32_hash.is_some_and(|prior| prior != checksum);

    let existing_arn = match status.recorded_arn() {
        Some(arn) => {
            let exists = provider
                .exists(arn)
                .await
                .map_err(ReconcileError::provider(ProviderStep::ExistenceCheck))?;
            if exists {
                Some(arn.to_string())
            } else {
                tracing::warn!(name = %name, arn, "recorded WebACL no longer exists, will recreate");
                None
            }
        }
        None => None,
    };

    tracing::debug!(
        name = %name,
        checksum,
        checksum_changed,
        existing_arn = existing_arn.as_deref().unwrap_or(""),
        "extracted parent data"
    );

    Ok(ParentData {
        name,
        tags,
        definition,
        status,
        existing_arn,
        checksum_changed,
        checksum,
    })
}
