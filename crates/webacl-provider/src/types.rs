//! Wire-neutral types exchanged with WebACL backends.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

/// A key/value tag attached to created WebACLs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ResourceTag {
    /// Tag key.
    pub key: String,
    /// Tag value.
    pub value: String,
}

impl ResourceTag {
    /// Creates a new tag.
    #[must_use]
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Snapshot of a WebACL as reported by the backend.
///
/// This is what gets recorded as `status.web_acl_request`, so field names
/// follow the cloud API's casing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct WebAclSummary {
    /// WebACL name.
    pub name: String,
    /// Backend-assigned identifier.
    pub id: String,
    /// Fully qualified resource name.
    #[serde(rename = "ARN")]
    pub arn: String,
    /// Optimistic-concurrency token of the current version.
    pub lock_token: String,
    /// Free-form description, when the definition carries one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Request payload for creating or updating a WebACL.
///
/// The definition is kept as an ordered JSON object so that whatever the
/// user wrote in the parent spec is forwarded untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct WebAclConfig {
    /// Desired definition, with `Name` already injected.
    pub definition: Map<String, Value>,
    /// Tags applied on creation.
    pub tags: Vec<ResourceTag>,
    /// Lock token of the version being replaced; `None` for creation.
    pub lock_token: Option<String>,
}

impl WebAclConfig {
    /// Builds a creation request from a definition and its tags.
    #[must_use]
    pub fn new(definition: Map<String, Value>, tags: Vec<ResourceTag>) -> Self {
        Self {
            definition,
            tags,
            lock_token: None,
        }
    }

    /// Turns the request into an update of the version identified by `lock_token`.
    #[must_use]
    pub fn with_lock_token(mut self, lock_token: impl Into<String>) -> Self {
        self.lock_token = Some(lock_token.into());
        self
    }

    /// The `Name` field of the definition.
    pub fn name(&self) -> Option<&str> {
        self.definition.get("Name").and_then(Value::as_str)
    }

    /// The `Description` field of the definition.
    pub fn description(&self) -> Option<&str> {
        self.definition.get("Description").and_then(Value::as_str)
    }

    /// Renders the request body sent to the backend.
    ///
    /// Creation requests carry `Tags`; update requests carry `LockToken`
    /// instead, since tags cannot be changed through an update.
    pub fn to_request(&self) -> Value {
        let mut request = self.definition.clone();
        match &self.lock_token {
            Some(token) => {
                request.insert("LockToken".to_string(), Value::String(token.clone()));
            }
            None => {
                let tags = self
                    .tags
                    .iter()
                    .map(|t| json!({ "Key": t.key, "Value": t.value }))
                    .collect();
                request.insert("Tags".to_string(), Value::Array(tags));
            }
        }
        Value::Object(request)
    }
}
