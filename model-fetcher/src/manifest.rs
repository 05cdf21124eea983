use std::fs;
use std::path::{Path, PathBuf};

use constants::path::MODEL_MANIFEST_FILE;
use constants::stage::StageKey;
use serde::{Deserialize, Serialize};

use crate::error::FetchError;

/// A stage model that was downloaded successfully.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelEntry {
    pub stage: StageKey,
    pub file: String,
    pub scale: f32,
    pub source_uid: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelManifest {
    pub models: Vec<ModelEntry>,
}

impl ModelManifest {
    /// Add an entry, replacing any earlier one for the same stage. Entries stay in flow order.
    pub fn insert(&mut self, entry: ModelEntry) {
        self.models.retain(|existing| existing.stage != entry.stage);
        self.models.push(entry);
        self.models.sort_by_key(|existing| existing.stage);
    }

    /// Manifest left by an earlier run, if it exists and parses.
    pub fn load(models_dir: &Path) -> Option<Self> {
        let text = fs::read_to_string(models_dir.join(MODEL_MANIFEST_FILE)).ok()?;
        serde_json::from_str(&text).ok()
    }

    /// Keep earlier entries for stages outside this run whose files are still on disk.
    pub fn carry_over(previous: Option<Self>, refetched: &[StageKey], models_dir: &Path) -> Self {
        let mut manifest = previous.unwrap_or_default();
        manifest.models.retain(|entry| {
            !refetched.contains(&entry.stage) && models_dir.join(&entry.file).is_file()
        });
        manifest
    }

    pub fn to_json(&self) -> Result<String, FetchError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write `manifest.json` into the models directory, creating it if needed.
    pub fn write(&self, models_dir: &Path) -> Result<PathBuf, FetchError> {
        fs::create_dir_all(models_dir)?;
        let path = models_dir.join(MODEL_MANIFEST_FILE);
        fs::write(&path, self.to_json()?)?;
        Ok(path)
    }
}

/// File name a stage model is stored under, e.g. `treatment_plant.glb`.
pub fn stage_file_name(stage: StageKey) -> String {
    format!("{}.glb", stage.as_str())
}
