use serde::{Deserialize, Serialize};

/// Stages of the supply chain, declared in the order water passes through them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageKey {
    Lake,
    Dam,
    Canal,
    TreatmentPlant,
    PumpStation,
    Pipeline,
    Residential,
}

impl StageKey {
    /// All stages in flow order.
    pub const ALL: [StageKey; 7] = [
        StageKey::Lake,
        StageKey::Dam,
        StageKey::Canal,
        StageKey::TreatmentPlant,
        StageKey::PumpStation,
        StageKey::Pipeline,
        StageKey::Residential,
    ];

    /// Position in flow order.
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// Stable identifier used in file names, manifests and RPC payloads.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Lake => "lake",
            Self::Dam => "dam",
            Self::Canal => "canal",
            Self::TreatmentPlant => "treatment_plant",
            Self::PumpStation => "pump_station",
            Self::Pipeline => "pipeline",
            Self::Residential => "residential",
        }
    }

    /// Parse an identifier, ignoring case and accepting `-` in place of `_`.
    pub fn from_string(s: &str) -> Option<Self> {
        let normalised = s.trim().to_lowercase().replace('-', "_");
        Self::ALL
            .iter()
            .copied()
            .find(|stage| stage.as_str() == normalised)
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Lake => "Mountain Lake",
            Self::Dam => "Dam",
            Self::Canal => "Supply Canal",
            Self::TreatmentPlant => "Treatment Plant",
            Self::PumpStation => "Pump Station",
            Self::Pipeline => "Pipeline",
            Self::Residential => "Residential Area",
        }
    }

    /// Search text sent to the model hosting API.
    pub fn search_query(&self) -> &'static str {
        match self {
            Self::Lake => "lake water",
            Self::Dam => "concrete dam",
            Self::Canal => "water canal",
            Self::TreatmentPlant => "water treatment plant",
            Self::PumpStation => "pump station",
            Self::Pipeline => "pipeline",
            Self::Residential => "suburban house",
        }
    }

    /// Whether water at this stage has already passed treatment.
    pub fn is_treated(&self) -> bool {
        *self > StageKey::TreatmentPlant
    }
}

impl std::fmt::Display for StageKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_identifiers_loosely() {
        assert_eq!(StageKey::from_string("dam"), Some(StageKey::Dam));
        assert_eq!(
            StageKey::from_string("Treatment-Plant"),
            Some(StageKey::TreatmentPlant)
        );
        assert_eq!(StageKey::from_string(" PUMP_STATION "), Some(StageKey::PumpStation));
        assert_eq!(StageKey::from_string("reservoir"), None);
    }

    #[test]
    fn all_is_in_flow_order() {
        for (i, stage) in StageKey::ALL.iter().enumerate() {
            assert_eq!(stage.index(), i);
            assert_eq!(StageKey::from_string(stage.as_str()), Some(*stage));
        }
    }

    #[test]
    fn serde_uses_snake_case() {
        let json = serde_json::to_string(&StageKey::PumpStation).unwrap();
        assert_eq!(json, "\"pump_station\"");
        let back: StageKey = serde_json::from_str("\"treatment_plant\"").unwrap();
        assert_eq!(back, StageKey::TreatmentPlant);
    }

    #[test]
    fn treatment_boundary() {
        assert!(!StageKey::Canal.is_treated());
        assert!(!StageKey::TreatmentPlant.is_treated());
        assert!(StageKey::PumpStation.is_treated());
        assert!(StageKey::Residential.is_treated());
    }
}
