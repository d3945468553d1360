//! In-memory WebACL backend for the WebACL controller.
//!
//! This crate provides an in-memory implementation of the `WebAclProvider`
//! trait from `webacl-provider`. It mimics the cloud API closely enough to
//! exercise the reconciler: names are unique, every mutation rotates the
//! lock token, and WebACLs can be found by tag.
//!
//! # Example
//!
//! ```ignore
//! use webacl_provider_memory::InMemoryWebAclProvider;
//! use webacl_provider::WebAclProvider;
//!
//! let provider = InMemoryWebAclProvider::new();
//! let summary = provider.create(&config).await?;
//! assert!(provider.exists(&summary.arn).await?);
//! ```

pub mod factory;
pub mod journal;
mod provider;

pub use factory::{ProviderBackend, ProviderConfig, create_provider};
pub use journal::{ProviderCall, ProviderOperation};
pub use provider::{InMemoryWebAclProvider, MemoryProviderOptions};

// Re-export the provider trait for convenience
pub use webacl_provider::{DynProvider, ProviderError, WebAclProvider};
