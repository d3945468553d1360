use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use webacl_provider::DynProvider;

use crate::{InMemoryWebAclProvider, MemoryProviderOptions};

/// Supported provider backend types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProviderBackend {
    /// Process-local backend; state is lost on restart.
    #[default]
    InMemory,
}

impl ProviderBackend {
    pub const ALL: [&'static str; 1] = ["memory"];
}

impl FromStr for ProviderBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "memory" | "in-memory" => Ok(Self::InMemory),
            other => Err(format!(
                "unknown provider backend '{other}', expected one of {:?}",
                Self::ALL
            )),
        }
    }
}

impl fmt::Display for ProviderBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InMemory => write!(f, "memory"),
        }
    }
}

/// Factory configuration to construct a provider instance.
#[derive(Debug, Clone, Default)]
pub struct ProviderConfig {
    pub backend: ProviderBackend,
    pub memory: MemoryProviderOptions,
}

/// Create a provider instance based on the provided configuration.
pub fn create_provider(config: &ProviderConfig) -> DynProvider {
    match config.backend {
        ProviderBackend::InMemory => {
            tracing::warn!("using in-memory WebACL backend; state does not survive restarts");
            Arc::new(InMemoryWebAclProvider::with_options(config.memory.clone()))
        }
    }
}
