use bevy::math::cubic_splines::{CubicCardinalSpline, CubicCurve, CubicGenerator};
use bevy::prelude::*;
use constants::stage::StageKey;

use crate::engine::infrastructure::sites::{FlowPoint, flow_control_points};

/// Samples used to approximate the arc length.
const LENGTH_SAMPLES: usize = 512;

/// Catmull-Rom path the water follows, parameterised over `[0, 1]`.
#[derive(Resource, Debug, Clone)]
pub struct FlowPath {
    curve: CubicCurve<Vec3>,
    /// Stage of each spline segment.
    stages: Vec<StageKey>,
    /// Stage of the final control point, reported at the very end of the path.
    end_stage: StageKey,
    length: f32,
}

impl FlowPath {
    /// Build the path through `points`. Needs at least two points.
    pub fn new(points: &[FlowPoint]) -> Option<Self> {
        if points.len() < 2 {
            return None;
        }
        let curve = CubicCardinalSpline::new_catmull_rom(points.iter().map(|p| p.position))
            .to_curve()
            .ok()?;

        let segments = curve.segments().len().max(1);
        let last_point = points.len() - 1;
        let stages = (0..segments)
            .map(|i| {
                let index = ((i as f32 + 0.5) / segments as f32 * last_point as f32) as usize;
                points[index.min(last_point)].stage
            })
            .collect();

        let mut path = Self {
            curve,
            stages,
            end_stage: points[last_point].stage,
            length: 0.0,
        };
        path.length = (1..=LENGTH_SAMPLES)
            .map(|i| {
                let a = path.position((i - 1) as f32 / LENGTH_SAMPLES as f32);
                let b = path.position(i as f32 / LENGTH_SAMPLES as f32);
                a.distance(b)
            })
            .sum();
        Some(path)
    }

    /// Path from the lake to the residential area.
    pub fn supply_chain() -> Option<Self> {
        Self::new(&flow_control_points())
    }

    fn segment_parameter(&self, u: f32) -> f32 {
        let u = if u.is_finite() { u.clamp(0.0, 1.0) } else { 0.0 };
        u * self.stages.len() as f32
    }

    /// Point on the path, `u` clamped to `[0, 1]`.
    pub fn position(&self, u: f32) -> Vec3 {
        self.curve.position(self.segment_parameter(u))
    }

    /// Stage the path is passing through at `u`. Segments take the stage of
    /// their first control point; `u = 1` is the last point's stage.
    pub fn stage_at(&self, u: f32) -> StageKey {
        let t = self.segment_parameter(u);
        if t >= self.stages.len() as f32 {
            return self.end_stage;
        }
        self.stages[t as usize]
    }

    /// Approximate arc length in world units.
    pub fn length(&self) -> f32 {
        self.length
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn straight(stages: [StageKey; 3]) -> FlowPath {
        let points: Vec<FlowPoint> = stages
            .iter()
            .enumerate()
            .map(|(i, &stage)| FlowPoint {
                position: Vec3::new(i as f32 * 10.0, 0.0, 0.0),
                stage,
            })
            .collect();
        FlowPath::new(&points).unwrap()
    }

    #[test]
    fn needs_two_points() {
        assert!(FlowPath::new(&[]).is_none());
        let one = [FlowPoint {
            position: Vec3::ZERO,
            stage: StageKey::Lake,
        }];
        assert!(FlowPath::new(&one).is_none());
    }

    #[test]
    fn passes_through_endpoints_and_clamps() {
        let path = straight([StageKey::Lake, StageKey::Dam, StageKey::Canal]);
        assert!(path.position(0.0).distance(Vec3::ZERO) < 1e-4);
        assert!(path.position(1.0).distance(Vec3::new(20.0, 0.0, 0.0)) < 1e-4);
        assert_eq!(path.position(-2.0), path.position(0.0));
        assert_eq!(path.position(7.0), path.position(1.0));
        assert_eq!(path.position(f32::NAN), path.position(0.0));
        assert!((path.length() - 20.0).abs() < 0.05);
    }

    #[test]
    fn stage_follows_segments() {
        let path = straight([StageKey::Lake, StageKey::Dam, StageKey::Canal]);
        assert_eq!(path.stage_at(0.0), StageKey::Lake);
        assert_eq!(path.stage_at(0.49), StageKey::Lake);
        assert_eq!(path.stage_at(0.51), StageKey::Dam);
        assert_eq!(path.stage_at(0.999), StageKey::Dam);
        assert_eq!(path.stage_at(1.0), StageKey::Canal);
    }

    #[test]
    fn supply_chain_runs_lake_to_town() {
        let path = FlowPath::supply_chain().unwrap();
        assert_eq!(path.stage_at(0.0), StageKey::Lake);
        assert_eq!(path.stage_at(0.99), StageKey::Pipeline);
        assert_eq!(path.stage_at(1.0), StageKey::Residential);
        assert!(path.length() > 300.0);
    }
}
