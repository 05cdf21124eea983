use bevy::prelude::*;
use constants::stage::StageKey;
use serde::{Deserialize, Serialize};

fn default_scale() -> f32 {
    1.0
}

/// One downloaded model and where it came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelEntry {
    pub stage: StageKey,
    /// File name inside the models directory.
    pub file: String,
    #[serde(default = "default_scale")]
    pub scale: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_uid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
}

/// Model manifest as a Bevy asset. Mirrors the JSON written by the model fetcher.
#[derive(Asset, Debug, Clone, Default, Serialize, Deserialize, TypePath)]
pub struct SceneManifest {
    #[serde(default)]
    pub models: Vec<ModelEntry>,
}

impl SceneManifest {
    /// First usable entry for a stage. Entries with an empty file name or a
    /// non-positive scale are ignored.
    pub fn model_for(&self, stage: StageKey) -> Option<&ModelEntry> {
        self.models
            .iter()
            .find(|entry| entry.stage == stage && !entry.file.is_empty() && entry.scale > 0.0)
    }

    /// Whether any stage has a usable entry.
    pub fn has_models(&self) -> bool {
        StageKey::ALL.iter().any(|stage| self.model_for(*stage).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_fetcher_output() {
        let json = r#"{
            "models": [
                { "stage": "dam", "file": "dam.glb", "scale": 2.5, "source_uid": "abc", "title": "Dam", "author": "someone" },
                { "stage": "pump_station", "file": "pump_station.glb" }
            ]
        }"#;
        let manifest: SceneManifest = serde_json::from_str(json).unwrap();
        assert_eq!(manifest.models.len(), 2);

        let dam = manifest.model_for(StageKey::Dam).unwrap();
        assert_eq!(dam.scale, 2.5);
        assert_eq!(dam.file, "dam.glb");

        let pump = manifest.model_for(StageKey::PumpStation).unwrap();
        assert_eq!(pump.scale, 1.0);
        assert!(pump.author.is_none());

        assert!(manifest.model_for(StageKey::Lake).is_none());
        assert!(manifest.has_models());
    }

    #[test]
    fn empty_manifest_has_no_models() {
        let manifest: SceneManifest = serde_json::from_str("{}").unwrap();
        assert!(!manifest.has_models());

        let manifest: SceneManifest = serde_json::from_str(r#"{ "models": [] }"#).unwrap();
        assert!(manifest.models.is_empty());
    }

    #[test]
    fn unusable_entries_are_skipped() {
        let json = r#"{ "models": [
            { "stage": "canal", "file": "", "scale": 1.0 },
            { "stage": "canal", "file": "canal.glb", "scale": 0.0 },
            { "stage": "canal", "file": "canal_b.glb", "scale": 0.5 }
        ] }"#;
        let manifest: SceneManifest = serde_json::from_str(json).unwrap();
        assert_eq!(manifest.model_for(StageKey::Canal).unwrap().file, "canal_b.glb");
    }
}
