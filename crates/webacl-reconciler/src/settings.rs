/// Controller settings injected at construction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ControllerSettings {
    /// Cluster domain, recorded as the `captain_domain` tag.
    pub captain_domain: String,
}

impl ControllerSettings {
    pub fn new(captain_domain: impl Into<String>) -> Self {
        Self {
            captain_domain: captain_domain.into(),
        }
    }
}
