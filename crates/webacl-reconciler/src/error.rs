use std::error::Error as StdError;
use std::fmt;

use webacl_provider::{ErrorCategory, ProviderError};

/// Provider call made during a cycle, used to say where a cycle failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderStep {
    ExistenceCheck,
    Create,
    LockTokenFetch,
    Update,
    PostUpdateRead,
    TagLookup,
    Delete,
}

impl fmt::Display for ProviderStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let step = match self {
            Self::ExistenceCheck => "WebACL existence check",
            Self::Create => "WebACL create",
            Self::LockTokenFetch => "WebACL lock token fetch",
            Self::Update => "WebACL update",
            Self::PostUpdateRead => "WebACL post-update read",
            Self::TagLookup => "WebACL tag lookup",
            Self::Delete => "WebACL delete",
        };
        f.write_str(step)
    }
}

/// Reasons a sync cycle can fail.
#[derive(Debug, thiserror::Error)]
pub enum ReconcileError {
    #[error("parent resource has no metadata.name")]
    MissingName,

    #[error("parent '{name}' has no spec.web_acl_definition")]
    MissingDefinition { name: String },

    #[error("spec.web_acl_definition of '{name}' is not valid JSON")]
    InvalidDefinition {
        name: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("spec.web_acl_definition of '{name}' must be a JSON object")]
    DefinitionNotObject { name: String },

    #[error("failed to checksum WebACL definition")]
    Checksum(#[source] serde_json::Error),

    #[error("{step} failed")]
    Provider {
        step: ProviderStep,
        #[source]
        source: ProviderError,
    },
}

impl ReconcileError {
    pub(crate) fn provider(step: ProviderStep) -> impl FnOnce(ProviderError) -> Self {
        move |source| Self::Provider { step, source }
    }

    /// Full diagnostic, including every source in the chain.
    pub fn diagnostic(&self) -> String {
        error_chain(self)
    }

    /// Category recorded on the failure log line.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::MissingName
            | Self::MissingDefinition { .. }
            | Self::InvalidDefinition { .. }
            | Self::DefinitionNotObject { .. } => ErrorCategory::Validation,
            Self::Checksum(_) => ErrorCategory::Internal,
            Self::Provider { source, .. } => source.category(),
        }
    }
}

/// Reasons finalization could not complete.
#[derive(Debug, thiserror::Error)]
pub enum FinalizeError {
    #[error("Multiple WebACL's with the same tags. Manual cleanup is required.")]
    AmbiguousState { arns: Vec<String> },

    #[error("{step} failed")]
    Provider {
        step: ProviderStep,
        #[source]
        source: ProviderError,
    },
}

impl FinalizeError {
    pub(crate) fn provider(step: ProviderStep) -> impl FnOnce(ProviderError) -> Self {
        move |source| Self::Provider { step, source }
    }

    /// Category recorded on the failure log line.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::AmbiguousState { .. } => ErrorCategory::Conflict,
            Self::Provider { source, .. } => source.category(),
        }
    }
}

/// Joins an error and its sources with `": "`.
pub fn error_chain(err: &dyn StdError) -> String {
    let mut out = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        out.push_str(": ");
        out.push_str(&cause.to_string());
        source = cause.source();
    }
    out
}
