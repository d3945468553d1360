//! WebACL reconciliation for a composite-controller webhook.
//!
//! Given a parent resource carrying a desired WebACL definition, a sync cycle:
//! 1. extracts identity, tags, definition checksum and prior status ([`extract`])
//! 2. creates, updates or leaves the external WebACL alone ([`reconcile`])
//! 3. projects the outcome, success or failure, into the returned status ([`cycle`])
//!
//! Deleting a parent runs the [`finalizer`], which finds the WebACL by tags.
//!
//! Nothing is kept between calls: the status returned by one cycle is the
//! orchestrator's to store and send back on the next.

pub mod checksum;
mod controller;
pub mod cycle;
pub mod error;
pub mod extract;
pub mod finalizer;
pub mod model;
pub mod reconcile;
mod settings;

pub use controller::WebAclController;
pub use error::{FinalizeError, ProviderStep, ReconcileError};
pub use extract::{ParentData, extract_parent_data, resource_tags};
pub use model::{
    FinalizeResponse, Health, HookRequest, ParentResource, StatusRecord, SyncResponse,
};
pub use reconcile::{SyncAction, reconcile};
pub use settings::ControllerSettings;
