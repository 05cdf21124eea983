/// Where each stage of the supply chain sits and what the info card says about it.
use bevy::prelude::*;
use constants::stage::StageKey;
use constants::terrain::WATER_LEVEL;

use crate::constants::layout::{
    CANAL_POINTS, CANAL_WATER_OFFSET, DAM_POSITION, LAKE_CENTRE, PIPELINE_CLEARANCE,
    PIPELINE_POINTS, PUMP_POSITION, RESIDENTIAL_CENTRE, TREATMENT_POSITION,
};
use crate::engine::scene::height_field::{ground, terrain_height};

/// Height of the dam crest above the water line.
pub const DAM_FREEBOARD: f32 = 3.0;

pub struct StageSite {
    pub key: StageKey,
    /// Ground position `(x, z)`.
    pub anchor: [f32; 2],
    /// Yaw of the placeholder, radians.
    pub heading: f32,
    pub title: &'static str,
    pub summary: &'static str,
    pub description: &'static str,
    pub facts: &'static [&'static str],
}

pub const STAGE_SITES: [StageSite; 7] = [
    StageSite {
        key: StageKey::Lake,
        anchor: LAKE_CENTRE,
        heading: 0.0,
        title: "Mountain Lake",
        summary: "Raw water source",
        description: "Snowmelt and rain collect in a high glacial basin. The lake holds \
                      the reserve that feeds the whole valley through dry summers.",
        facts: &[
            "Catchment: 42 km² of forested slopes",
            "Usable storage: 18 million m³",
            "Water is untreated at this point",
        ],
    },
    StageSite {
        key: StageKey::Dam,
        anchor: DAM_POSITION,
        heading: std::f32::consts::FRAC_PI_4,
        title: "Dam",
        summary: "Storage and release control",
        description: "A concrete gravity dam closes the natural outflow of the lake. \
                      Gates at its base meter the flow released into the supply canal.",
        facts: &[
            "Crest length: 34 m",
            "Spillway sized for a 1 in 1000 year flood",
            "Release is adjusted to downstream demand",
        ],
    },
    StageSite {
        key: StageKey::Canal,
        anchor: CANAL_POINTS[2],
        heading: 0.0,
        title: "Supply Canal",
        summary: "Gravity-fed transport",
        description: "A lined open channel carries raw water down the valley on a gentle \
                      gradient, with no pumping needed.",
        facts: &[
            "Length: 11 km",
            "Gradient: roughly 1 m per km",
            "Concrete lining limits seepage losses",
        ],
    },
    StageSite {
        key: StageKey::TreatmentPlant,
        anchor: TREATMENT_POSITION,
        heading: -0.6,
        title: "Treatment Plant",
        summary: "Raw water becomes drinking water",
        description: "Coagulation, settling in the clarifier tanks, sand filtration and \
                      disinfection turn lake water into safe drinking water.",
        facts: &[
            "Capacity: 60 000 m³ per day",
            "Three clarifier tanks",
            "Continuous quality monitoring",
        ],
    },
    StageSite {
        key: StageKey::PumpStation,
        anchor: PUMP_POSITION,
        heading: -0.7,
        title: "Pump Station",
        summary: "Pressure for the network",
        description: "Treated water is pumped into the pressurised pipeline. A surge tower \
                      absorbs pressure spikes when pumps start and stop.",
        facts: &[
            "Four duty pumps, one standby",
            "Delivery pressure: 6 bar",
            "Surge tower height: 14 m",
        ],
    },
    StageSite {
        key: StageKey::Pipeline,
        anchor: PIPELINE_POINTS[2],
        heading: 0.0,
        title: "Pipeline",
        summary: "Pressurised trunk main",
        description: "A steel trunk main on concrete piers crosses the lowlands toward \
                      town, following the terrain to keep pressure losses small.",
        facts: &[
            "Diameter: 800 mm",
            "Supports every 12 m",
            "Isolation valves at each bend",
        ],
    },
    StageSite {
        key: StageKey::Residential,
        anchor: RESIDENTIAL_CENTRE,
        heading: 0.0,
        title: "Residential Area",
        summary: "Distribution to homes",
        description: "The trunk main feeds a looped distribution network. Every tap in the \
                      neighbourhood draws on the lake that started the journey.",
        facts: &[
            "Around 4 000 connections",
            "Average use: 140 litres per person per day",
            "Street lamps and windows light up at night",
        ],
    },
];

pub fn site(key: StageKey) -> &'static StageSite {
    &STAGE_SITES[key.index()]
}

/// Crest of the dam wall.
pub fn dam_crest() -> Vec3 {
    let [x, z] = DAM_POSITION;
    Vec3::new(x, terrain_height(x, z).max(WATER_LEVEL) + DAM_FREEBOARD, z)
}

/// Surface of the canal water at a ground position on the canal line.
pub fn canal_water_point(point: [f32; 2]) -> Vec3 {
    let [x, z] = point;
    Vec3::new(x, terrain_height(x, z) + CANAL_WATER_OFFSET, z)
}

/// Centre of the pipeline at a bend.
pub fn pipeline_point(point: [f32; 2]) -> Vec3 {
    let [x, z] = point;
    Vec3::new(x, terrain_height(x, z) + PIPELINE_CLEARANCE, z)
}

/// World position of a stage anchor. The lake sits on its water surface.
pub fn world_anchor(key: StageKey) -> Vec3 {
    let [x, z] = site(key).anchor;
    match key {
        StageKey::Lake => Vec3::new(x, WATER_LEVEL, z),
        _ => Vec3::new(x, terrain_height(x, z), z),
    }
}

/// Flow path control point tagged with the stage the water is passing through.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlowPoint {
    pub position: Vec3,
    pub stage: StageKey,
}

/// Ordered points the water follows from the lake to the houses.
pub fn flow_control_points() -> Vec<FlowPoint> {
    let surface = WATER_LEVEL + 0.3;
    let lake = ground(LAKE_CENTRE);
    let dam = ground(DAM_POSITION);
    let outflow = lake.lerp(dam, 0.6);

    let mut points = vec![
        FlowPoint {
            position: Vec3::new(lake.x, surface, lake.y),
            stage: StageKey::Lake,
        },
        FlowPoint {
            position: Vec3::new(outflow.x, surface, outflow.y),
            stage: StageKey::Lake,
        },
        FlowPoint {
            position: dam_crest() + Vec3::Y * 0.3,
            stage: StageKey::Dam,
        },
    ];

    points.extend(CANAL_POINTS.iter().map(|&point| FlowPoint {
        position: canal_water_point(point) + Vec3::Y * 0.3,
        stage: StageKey::Canal,
    }));

    points.push(FlowPoint {
        position: world_anchor(StageKey::TreatmentPlant) + Vec3::Y * 3.0,
        stage: StageKey::TreatmentPlant,
    });
    points.push(FlowPoint {
        position: world_anchor(StageKey::PumpStation) + Vec3::Y * 2.0,
        stage: StageKey::PumpStation,
    });

    points.extend(PIPELINE_POINTS.iter().map(|&point| FlowPoint {
        position: pipeline_point(point),
        stage: StageKey::Pipeline,
    }));

    points.push(FlowPoint {
        position: world_anchor(StageKey::Residential) + Vec3::Y,
        stage: StageKey::Residential,
    });

    points
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sites_are_in_flow_order() {
        for (i, site) in STAGE_SITES.iter().enumerate() {
            assert_eq!(site.key, StageKey::ALL[i]);
            assert!(!site.facts.is_empty());
        }
        assert_eq!(site(StageKey::PumpStation).title, "Pump Station");
    }

    #[test]
    fn lake_anchor_sits_on_the_water() {
        assert_eq!(world_anchor(StageKey::Lake).y, WATER_LEVEL);
        let pump = world_anchor(StageKey::PumpStation);
        assert_eq!(pump.y, terrain_height(pump.x, pump.z));
    }

    #[test]
    fn dam_crest_clears_the_water_line() {
        assert!(dam_crest().y >= WATER_LEVEL + DAM_FREEBOARD);
    }

    #[test]
    fn control_points_visit_every_stage_in_order() {
        let points = flow_control_points();
        assert_eq!(points.first().map(|p| p.stage), Some(StageKey::Lake));
        assert_eq!(points.last().map(|p| p.stage), Some(StageKey::Residential));

        let mut visited: Vec<StageKey> = points.iter().map(|p| p.stage).collect();
        assert!(visited.windows(2).all(|w| w[0] <= w[1]));
        visited.dedup();
        assert_eq!(visited, StageKey::ALL.to_vec());
    }
}
