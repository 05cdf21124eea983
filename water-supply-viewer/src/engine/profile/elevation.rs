use bevy::prelude::*;
use constants::stage::StageKey;
use constants::terrain::WATER_LEVEL;
use serde::Serialize;

use crate::engine::flow::flow_path::FlowPath;
use crate::engine::scene::height_field::terrain_height;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProfileSample {
    /// Ground distance from the start of the route.
    pub distance: f32,
    pub height: f32,
    pub stage: StageKey,
}

/// Where a stage's section of the route begins.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StageMarker {
    pub stage: StageKey,
    pub distance: f32,
}

#[derive(Resource, Debug, Clone, Default, Serialize)]
pub struct ElevationProfile {
    pub samples: Vec<ProfileSample>,
    pub markers: Vec<StageMarker>,
}

impl ElevationProfile {
    /// Sample the ground under the flow path. The lake section reads the water surface.
    pub fn along(path: &FlowPath, samples: usize) -> Self {
        let count = samples.max(2);
        let mut profile = Self::default();
        let mut distance = 0.0;
        let mut previous: Option<Vec2> = None;

        for i in 0..count {
            let u = i as f32 / (count - 1) as f32;
            let point = path.position(u);
            let stage = path.stage_at(u);
            let ground = Vec2::new(point.x, point.z);

            if let Some(previous) = previous {
                distance += previous.distance(ground);
            }
            previous = Some(ground);

            let terrain = terrain_height(point.x, point.z);
            let height = match stage {
                StageKey::Lake => terrain.max(WATER_LEVEL),
                _ => terrain,
            };

            if profile.markers.iter().all(|marker| marker.stage != stage) {
                profile.markers.push(StageMarker { stage, distance });
            }
            profile.samples.push(ProfileSample {
                distance,
                height,
                stage,
            });
        }
        profile
    }

    pub fn min_height(&self) -> f32 {
        self.samples
            .iter()
            .map(|sample| sample.height)
            .reduce(f32::min)
            .unwrap_or(0.0)
    }

    pub fn max_height(&self) -> f32 {
        self.samples
            .iter()
            .map(|sample| sample.height)
            .reduce(f32::max)
            .unwrap_or(0.0)
    }

    pub fn total_distance(&self) -> f32 {
        self.samples.last().map_or(0.0, |sample| sample.distance)
    }

    /// Height at a route distance, linearly interpolated and clamped to the ends.
    pub fn height_at(&self, distance: f32) -> Option<f32> {
        let first = self.samples.first()?;
        let last = self.samples.last()?;
        if distance <= first.distance {
            return Some(first.height);
        }
        if distance >= last.distance {
            return Some(last.height);
        }

        let upper = self
            .samples
            .partition_point(|sample| sample.distance < distance)
            .max(1);
        let a = self.samples[upper - 1];
        let b = self.samples[upper];
        let span = b.distance - a.distance;
        if span <= f32::EPSILON {
            return Some(b.height);
        }
        Some(a.height + (b.height - a.height) * (distance - a.distance) / span)
    }

    pub fn marker(&self, stage: StageKey) -> Option<&StageMarker> {
        self.markers.iter().find(|marker| marker.stage == stage)
    }
}
