//! Documents exchanged with the orchestrator.
//!
//! The orchestrator POSTs `{parent, children}` and expects `{status}` back.
//! Only the parts of the parent the controller reads are modelled; anything
//! else is ignored on input. The status record keeps unknown fields so they
//! survive the round trip through the orchestrator.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use webacl_provider::WebAclSummary;

/// Body of a sync or finalize hook call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HookRequest {
    pub parent: ParentResource,
    /// Observed children; the controller manages no child objects.
    #[serde(default)]
    pub children: Value,
}

/// The custom resource describing the desired WebACL.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParentResource {
    #[serde(default)]
    pub metadata: ParentMetadata,
    #[serde(default)]
    pub spec: ParentSpec,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<StatusRecord>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParentMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParentSpec {
    /// JSON-encoded WebACL definition.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub web_acl_definition: Option<String>,
}

/// Health flag, string-typed like the rest of the orchestrator's conditions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Health {
    #[serde(rename = "True")]
    Healthy,
    #[default]
    #[serde(rename = "False")]
    Unhealthy,
}

/// Status carried across reconciliation cycles.
///
/// `error_message` is only present while the last cycle failed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatusRecord {
    #[serde(rename = "HEALTHY", default)]
    pub healthy: Health,
    /// Checksum of the last applied definition.
    #[serde(rename = "CRC32_HASH", default, skip_serializing_if = "Option::is_none")]
    pub crc32_hash: Option<u32>,
    /// Last provider snapshot of the WebACL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub web_acl_request: Option<WebAclSummary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    /// Fields this controller does not own, carried forward verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl StatusRecord {
    /// ARN recorded by the last successful create or update.
    pub fn recorded_arn(&self) -> Option<&str> {
        self.web_acl_request
            .as_ref()
            .map(|r| r.arn.as_str())
            .filter(|arn| !arn.is_empty())
    }

    pub fn is_healthy(&self) -> bool {
        self.healthy == Health::Healthy
    }

    /// Stamps a successful cycle that applied `checksum`.
    pub fn mark_synced(&mut self, checksum: u32) {
        if self.error_message.take().is_some() {
            tracing::info!("clearing error_message left by a previous cycle");
        }
        self.crc32_hash = Some(checksum);
        self.healthy = Health::Healthy;
    }

    /// Stamps a failed cycle.
    pub fn mark_failed(&mut self, message: impl Into<String>) {
        self.healthy = Health::Unhealthy;
        self.error_message = Some(message.into());
    }
}

/// Response to a sync hook call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncResponse {
    pub status: StatusRecord,
}

/// Response to a finalize hook call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalizeResponse {
    pub finalized: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FinalizeResponse {
    pub fn finalized() -> Self {
        Self {
            finalized: true,
            error: None,
        }
    }

    pub fn pending(error: impl Into<String>) -> Self {
        Self {
            finalized: false,
            error: Some(error.into()),
        }
    }
}
