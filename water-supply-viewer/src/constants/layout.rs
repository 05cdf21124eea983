//! World-space layout of the supply chain. All values are `(x, z)` on the
//! ground plane; elevations come from the terrain height field.

/// Lake centre.
pub const LAKE_CENTRE: [f32; 2] = [-120.0, -110.0];

/// Radius of the visible lake water sheet.
pub const LAKE_RADIUS: f32 = 68.0;

/// Depth and width of the lake bowl.
pub const LAKE_DEPTH: f32 = 16.0;
pub const LAKE_SPREAD: f32 = 30.0;

/// Dam anchor, sitting in a notch of the ridge that closes the lake outflow.
pub const DAM_POSITION: [f32; 2] = [-68.0, -58.0];

/// Ridge height, cross-section width and length falloff.
pub const RIDGE_HEIGHT: f32 = 12.0;
pub const RIDGE_WIDTH: f32 = 12.0;
pub const RIDGE_LENGTH: f32 = 90.0;

/// Width of the notch the dam wall spans.
pub const RIDGE_NOTCH_WIDTH: f32 = 14.0;

/// Canal polyline from the dam outlet to the treatment plant intake.
pub const CANAL_POINTS: [[f32; 2]; 5] = [
    [-62.0, -52.0],
    [-40.0, -38.0],
    [-18.0, -14.0],
    [0.0, 2.0],
    [16.0, 12.0],
];

/// Depth and width of the canal trench.
pub const CANAL_DEPTH: f32 = 3.5;
pub const CANAL_SPREAD: f32 = 5.0;

/// Height of the canal water surface above the trench floor.
pub const CANAL_WATER_OFFSET: f32 = 0.6;

/// Half width of the visible canal water strip.
pub const CANAL_HALF_WIDTH: f32 = 3.0;

pub const TREATMENT_POSITION: [f32; 2] = [26.0, 18.0];

pub const PUMP_POSITION: [f32; 2] = [62.0, 42.0];

/// Pipeline bends from the pump station to the town main.
pub const PIPELINE_POINTS: [[f32; 2]; 5] = [
    [66.0, 46.0],
    [84.0, 62.0],
    [100.0, 82.0],
    [116.0, 100.0],
    [128.0, 114.0],
];

/// Pipeline centre height above local ground.
pub const PIPELINE_CLEARANCE: f32 = 1.6;

pub const RESIDENTIAL_CENTRE: [f32; 2] = [142.0, 128.0];

/// Houses per side of the residential block and their spacing.
pub const HOUSES_PER_SIDE: usize = 4;
pub const HOUSE_SPACING: f32 = 11.0;

/// Base terrain slope: elevation at the origin and fall per unit of `x + z`.
pub const BASE_ELEVATION: f32 = 14.0;
pub const BASE_SLOPE: f32 = 0.05;
