//! # webacl-provider
//!
//! Provider abstraction layer for the WebACL controller.
//!
//! This crate defines the capability the reconciler needs from a cloud
//! firewall backend. It does not contain any implementations - those are
//! provided by separate crates.
//!
//! ## Overview
//!
//! The main trait is [`WebAclProvider`], which covers:
//! - existence checks and reads (`exists`, `get_current`)
//! - mutations guarded by an optimistic-concurrency lock token (`create`, `update`, `delete`)
//! - tag-based discovery used during finalization (`lookup_by_tags`)

mod error;
mod traits;
mod types;

pub use error::{ErrorCategory, ProviderError};
pub use traits::WebAclProvider;
pub use types::{ResourceTag, WebAclConfig, WebAclSummary};

/// Type alias for a shareable provider instance.
pub type DynProvider = std::sync::Arc<dyn WebAclProvider>;
