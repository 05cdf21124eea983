/// Procedural terrain elevation shared by the mesh, the props and the profile chart.
use bevy::prelude::*;
use constants::terrain::{TERRAIN_MAX_HEIGHT, TERRAIN_MIN_HEIGHT};

use crate::constants::layout::{
    BASE_ELEVATION, BASE_SLOPE, CANAL_DEPTH, CANAL_POINTS, CANAL_SPREAD, DAM_POSITION, LAKE_CENTRE,
    LAKE_DEPTH, LAKE_SPREAD, RIDGE_HEIGHT, RIDGE_LENGTH, RIDGE_NOTCH_WIDTH, RIDGE_WIDTH,
};

/// Finite difference step used for normals.
const NORMAL_EPSILON: f32 = 0.5;

/// Height field value and the weights that shaped it, as consumed by the colour ramp.
#[derive(Debug, Clone, Copy)]
pub struct TerrainSample {
    pub height: f32,
    pub normal: Vec3,
    pub canal_weight: f32,
    pub lake_weight: f32,
}

#[inline]
pub fn ground(point: [f32; 2]) -> Vec2 {
    Vec2::new(point[0], point[1])
}

#[inline]
fn gaussian(distance_sq: f32, spread: f32) -> f32 {
    (-distance_sq / (2.0 * spread * spread)).exp()
}

/// Plane falling from the lake side (north-west) toward the town (south-east).
pub fn base_slope(x: f32, z: f32) -> f32 {
    BASE_ELEVATION - BASE_SLOPE * (x + z)
}

/// 1.0 at the lake centre, fading to 0.0 away from the bowl.
pub fn lake_weight(x: f32, z: f32) -> f32 {
    gaussian(Vec2::new(x, z).distance_squared(ground(LAKE_CENTRE)), LAKE_SPREAD)
}

/// Ridge across the lake outflow, lowered where the dam wall spans it.
pub fn ridge_bump(x: f32, z: f32) -> f32 {
    let dam = ground(DAM_POSITION);
    let across = (dam - ground(LAKE_CENTRE)).normalize();
    let along = across.perp();

    let offset = Vec2::new(x, z) - dam;
    let d_across = offset.dot(across);
    let d_along = offset.dot(along);

    let cross_section = gaussian(d_across * d_across, RIDGE_WIDTH);
    let extent = gaussian(d_along * d_along, RIDGE_LENGTH * 0.5);
    let notch = 1.0 - 0.7 * gaussian(d_along * d_along, RIDGE_NOTCH_WIDTH);

    RIDGE_HEIGHT * cross_section * extent * notch
}

/// Shortest distance from `point` to a polyline.
pub fn distance_to_polyline(point: Vec2, polyline: &[Vec2]) -> f32 {
    match polyline {
        [] => f32::INFINITY,
        [single] => point.distance(*single),
        _ => polyline
            .windows(2)
            .map(|segment| distance_to_segment(point, segment[0], segment[1]))
            .fold(f32::INFINITY, f32::min),
    }
}

fn distance_to_segment(point: Vec2, a: Vec2, b: Vec2) -> f32 {
    let ab = b - a;
    let length_sq = ab.length_squared();
    if length_sq <= f32::EPSILON {
        return point.distance(a);
    }
    let t = ((point - a).dot(ab) / length_sq).clamp(0.0, 1.0);
    point.distance(a + ab * t)
}

/// 1.0 on the canal centreline, fading to 0.0 outside the trench.
pub fn canal_weight(x: f32, z: f32) -> f32 {
    let polyline = CANAL_POINTS.map(ground);
    let distance = distance_to_polyline(Vec2::new(x, z), &polyline);
    gaussian(distance * distance, CANAL_SPREAD)
}

/// Three octaves of sine products.
pub fn sine_noise(x: f32, z: f32) -> f32 {
    1.6 * (x * 0.045).sin() * (z * 0.038).cos()
        + 0.7 * (x * 0.11 + 1.7).sin() * (z * 0.13 + 0.4).sin()
        + 0.3 * ((x + z) * 0.29).sin()
}

/// Terrain elevation at a ground position, clamped to the valid range.
pub fn terrain_height(x: f32, z: f32) -> f32 {
    let canal = canal_weight(x, z);

    let height = base_slope(x, z) - LAKE_DEPTH * lake_weight(x, z) + ridge_bump(x, z)
        - CANAL_DEPTH * canal
        + sine_noise(x, z) * (1.0 - 0.85 * canal);

    if height.is_finite() {
        height.clamp(TERRAIN_MIN_HEIGHT, TERRAIN_MAX_HEIGHT)
    } else {
        TERRAIN_MIN_HEIGHT
    }
}

/// Unit surface normal from central differences of the height field.
pub fn terrain_normal(x: f32, z: f32) -> Vec3 {
    let dx = terrain_height(x - NORMAL_EPSILON, z) - terrain_height(x + NORMAL_EPSILON, z);
    let dz = terrain_height(x, z - NORMAL_EPSILON) - terrain_height(x, z + NORMAL_EPSILON);
    Vec3::new(dx, 2.0 * NORMAL_EPSILON, dz).normalize_or(Vec3::Y)
}

pub fn sample_terrain(x: f32, z: f32) -> TerrainSample {
    TerrainSample {
        height: terrain_height(x, z),
        normal: terrain_normal(x, z),
        canal_weight: canal_weight(x, z),
        lake_weight: lake_weight(x, z),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::layout::LAKE_RADIUS;
    use constants::terrain::{TERRAIN_SIZE, WATER_LEVEL};

    #[test]
    fn height_is_deterministic() {
        for &(x, z) in &[(0.0, 0.0), (-120.0, -110.0), (57.3, -12.9)] {
            assert_eq!(terrain_height(x, z), terrain_height(x, z));
        }
    }

    #[test]
    fn height_stays_in_valid_range() {
        let half = TERRAIN_SIZE * 0.5;
        let steps = 80;
        for i in 0..=steps {
            for j in 0..=steps {
                let x = -half + TERRAIN_SIZE * i as f32 / steps as f32;
                let z = -half + TERRAIN_SIZE * j as f32 / steps as f32;
                let h = terrain_height(x, z);
                assert!(h >= TERRAIN_MIN_HEIGHT && h <= TERRAIN_MAX_HEIGHT, "{h} at {x},{z}");
            }
        }
        // Far outside the terrain still clamps.
        let far = terrain_height(10_000.0, 10_000.0);
        assert!(far >= TERRAIN_MIN_HEIGHT && far <= TERRAIN_MAX_HEIGHT);
        assert_eq!(terrain_height(f32::NAN, 0.0), TERRAIN_MIN_HEIGHT);
    }

    #[test]
    fn lake_floor_sits_below_waterline() {
        let [x, z] = LAKE_CENTRE;
        assert!(terrain_height(x, z) < WATER_LEVEL - 4.0);
        assert!((lake_weight(x, z) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn lake_rim_hides_the_water_sheet_edge() {
        let [cx, cz] = LAKE_CENTRE;
        for step in 0..180 {
            let angle = (step as f32 * 2.0).to_radians();
            let x = cx + LAKE_RADIUS * angle.cos();
            let z = cz + LAKE_RADIUS * angle.sin();
            let h = terrain_height(x, z);
            assert!(h > WATER_LEVEL + 0.5, "{h} at {} degrees", step * 2);
        }
    }

    #[test]
    fn base_slope_falls_toward_town() {
        assert!(base_slope(-150.0, -150.0) > base_slope(0.0, 0.0));
        assert!(base_slope(0.0, 0.0) > base_slope(150.0, 150.0));
    }

    #[test]
    fn ridge_is_notched_at_the_dam() {
        let dam = ground(DAM_POSITION);
        let along = (dam - ground(LAKE_CENTRE)).normalize().perp();
        let shoulder = dam + along * 30.0;

        let at_dam = ridge_bump(dam.x, dam.y);
        let at_shoulder = ridge_bump(shoulder.x, shoulder.y);
        assert!(at_shoulder > 5.0);
        assert!(at_dam < at_shoulder);

        let far = dam + (dam - ground(LAKE_CENTRE)).normalize() * 80.0;
        assert!(ridge_bump(far.x, far.y) < 0.1);
    }

    #[test]
    fn canal_weight_peaks_on_centreline() {
        for point in CANAL_POINTS {
            assert!((canal_weight(point[0], point[1]) - 1.0).abs() < 1e-5);
        }
        assert!(canal_weight(150.0, -150.0) < 1e-6);
    }

    #[test]
    fn polyline_distance() {
        let line = [Vec2::ZERO, Vec2::new(10.0, 0.0)];
        assert!((distance_to_polyline(Vec2::new(5.0, 3.0), &line) - 3.0).abs() < 1e-6);
        assert!((distance_to_polyline(Vec2::new(-4.0, 0.0), &line) - 4.0).abs() < 1e-6);
        assert!(distance_to_polyline(Vec2::ZERO, &[]).is_infinite());
    }

    #[test]
    fn normals_are_unit_and_upward() {
        for &(x, z) in &[(0.0, 0.0), (-68.0, -58.0), (120.0, 90.0)] {
            let n = terrain_normal(x, z);
            assert!((n.length() - 1.0).abs() < 1e-4);
            assert!(n.y > 0.0);
        }
    }
}
