use constants::terrain::WATER_LEVEL;

use super::height_field::TerrainSample;

const LAKE_BED: [f32; 3] = [0.32, 0.30, 0.22];
const SHORE_SAND: [f32; 3] = [0.74, 0.68, 0.48];
const MEADOW: [f32; 3] = [0.42, 0.60, 0.26];
const GRASS: [f32; 3] = [0.24, 0.44, 0.18];
const ROCK: [f32; 3] = [0.45, 0.41, 0.36];
const SUMMIT: [f32; 3] = [0.82, 0.81, 0.78];
const CONCRETE: [f32; 3] = [0.60, 0.60, 0.58];

/// Altitude bands for the land ramp.
const MEADOW_TOP: f32 = 10.0;
const GRASS_TOP: f32 = 26.0;
const ROCK_TOP: f32 = 40.0;

/// Normal Y below which slopes read as bare rock.
const STEEP_NORMAL_Y: f32 = 0.82;

/// Height above the waterline still painted as shore.
const SHORE_BAND: f32 = 1.5;

fn mix(a: [f32; 3], b: [f32; 3], t: f32) -> [f32; 3] {
    let t = t.clamp(0.0, 1.0);
    [
        a[0] + (b[0] - a[0]) * t,
        a[1] + (b[1] - a[1]) * t,
        a[2] + (b[2] - a[2]) * t,
    ]
}

fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Land colour by altitude alone.
fn altitude_ramp(height: f32) -> [f32; 3] {
    if height < MEADOW_TOP {
        MEADOW
    } else if height < GRASS_TOP {
        mix(MEADOW, GRASS, smoothstep(MEADOW_TOP, GRASS_TOP, height))
    } else if height < ROCK_TOP {
        mix(GRASS, ROCK, smoothstep(GRASS_TOP, ROCK_TOP, height))
    } else {
        mix(ROCK, SUMMIT, smoothstep(ROCK_TOP, ROCK_TOP + 8.0, height))
    }
}

/// Vertex colour for a terrain sample, linear RGBA with every channel in `[0, 1]`.
pub fn terrain_colour(sample: &TerrainSample) -> [f32; 4] {
    let mut colour = altitude_ramp(sample.height);

    let steepness = smoothstep(STEEP_NORMAL_Y, STEEP_NORMAL_Y - 0.2, sample.normal.y);
    colour = mix(colour, ROCK, steepness);

    // Only the lake basin gets shore and bed colouring; low ground near town stays green.
    if sample.lake_weight > 0.15 {
        let basin = smoothstep(0.15, 0.35, sample.lake_weight);
        if sample.height < WATER_LEVEL {
            colour = mix(colour, LAKE_BED, basin);
        } else if sample.height < WATER_LEVEL + SHORE_BAND {
            colour = mix(colour, SHORE_SAND, basin);
        }
    }

    colour = mix(colour, CONCRETE, smoothstep(0.35, 0.8, sample.canal_weight));

    [
        colour[0].clamp(0.0, 1.0),
        colour[1].clamp(0.0, 1.0),
        colour[2].clamp(0.0, 1.0),
        1.0,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::prelude::Vec3;

    fn flat(height: f32) -> TerrainSample {
        TerrainSample {
            height,
            normal: Vec3::Y,
            canal_weight: 0.0,
            lake_weight: 0.0,
        }
    }

    #[test]
    fn channels_stay_in_unit_range() {
        for h in [-50.0, 0.0, 5.0, 19.9, 20.5, 33.0, 60.0, 500.0] {
            for ny in [0.0, 0.5, 0.9, 1.0] {
                for weight in [0.0, 0.5, 1.0] {
                    let sample = TerrainSample {
                        height: h,
                        normal: Vec3::new(0.0, ny, (1.0f32 - ny * ny).sqrt()),
                        canal_weight: weight,
                        lake_weight: weight,
                    };
                    let c = terrain_colour(&sample);
                    assert!(c.iter().all(|v| (0.0..=1.0).contains(v)), "{c:?}");
                    assert_eq!(c[3], 1.0);
                }
            }
        }
    }

    #[test]
    fn lowland_is_green_and_peaks_are_pale() {
        let low = terrain_colour(&flat(4.0));
        assert!(low[1] > low[0] && low[1] > low[2]);

        let peak = terrain_colour(&flat(55.0));
        assert!(peak[0] > 0.7 && peak[1] > 0.7);
    }

    #[test]
    fn shore_only_inside_lake_basin() {
        let mut near_lake = flat(WATER_LEVEL + 0.5);
        near_lake.lake_weight = 0.9;
        let away = flat(WATER_LEVEL + 0.5);

        let shore = terrain_colour(&near_lake);
        let meadow = terrain_colour(&away);
        assert!((shore[0] - SHORE_SAND[0]).abs() < 1e-5);
        assert!(meadow[1] > meadow[0]);
    }

    #[test]
    fn steep_slopes_turn_to_rock() {
        let mut cliff = flat(4.0);
        cliff.normal = Vec3::new(0.8, 0.6, 0.0);
        let c = terrain_colour(&cliff);
        assert!((c[0] - ROCK[0]).abs() < 1e-5);
    }

    #[test]
    fn canal_is_concrete() {
        let mut channel = flat(8.0);
        channel.canal_weight = 1.0;
        let c = terrain_colour(&channel);
        assert!((c[0] - CONCRETE[0]).abs() < 1e-5);
    }
}
