use webacl_provider::DynProvider;

use crate::extract::{parent_name, resource_tags};
use crate::model::{FinalizeResponse, ParentResource, SyncResponse};
use crate::settings::ControllerSettings;
use crate::{cycle, finalizer};

/// Provider and settings bundled for the hook handlers.
///
/// Cheap to clone; each request gets its own copy to move onto a task.
#[derive(Clone)]
pub struct WebAclController {
    provider: DynProvider,
    settings: ControllerSettings,
}

impl WebAclController {
    pub fn new(provider: DynProvider, settings: ControllerSettings) -> Self {
        Self { provider, settings }
    }

    pub fn settings(&self) -> &ControllerSettings {
        &self.settings
    }

    pub fn provider(&self) -> &DynProvider {
        &self.provider
    }

    /// Runs one sync cycle; failures are reported through the status.
    pub async fn sync(&self, parent: &ParentResource) -> SyncResponse {
        cycle::sync(self.provider.as_ref(), &self.settings, parent).await
    }

    /// Deletes the WebACL owned by `parent`.
    pub async fn finalize(&self, parent: &ParentResource) -> FinalizeResponse {
        let name = match parent_name(parent) {
            Ok(name) => name,
            Err(err) => return FinalizeResponse::pending(err.diagnostic()),
        };
        let tags = resource_tags(name, &self.settings);
        finalizer::finalize(self.provider.as_ref(), &tags).await
    }
}

impl std::fmt::Debug for WebAclController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebAclController")
            .field("backend", &self.provider.backend_name())
            .field("settings", &self.settings)
            .finish()
    }
}
