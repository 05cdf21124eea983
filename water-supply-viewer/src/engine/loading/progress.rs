use bevy::prelude::*;

#[derive(Resource, Default, Debug)]
pub struct LoadingProgress {
    /// Manifest loaded, failed or timed out.
    pub manifest_resolved: bool,
    pub models_requested: usize,
    pub models_resolved: usize,
    pub infrastructure_spawned: bool,
}

impl LoadingProgress {
    pub fn models_pending(&self) -> usize {
        self.models_requested.saturating_sub(self.models_resolved)
    }

    /// Short label for the host page loading indicator.
    pub fn phase(&self) -> &'static str {
        if !self.manifest_resolved {
            "manifest"
        } else if !self.infrastructure_spawned {
            "infrastructure"
        } else if self.models_pending() > 0 {
            "models"
        } else {
            "ready"
        }
    }
}
