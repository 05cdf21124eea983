/// Orbit rig distance limits.
pub const MIN_CAMERA_DISTANCE: f32 = 8.0;
pub const MAX_CAMERA_DISTANCE: f32 = 520.0;

/// Pitch limits, radians below the horizon.
pub const MIN_CAMERA_PITCH: f32 = -1.45;
pub const MAX_CAMERA_PITCH: f32 = -0.05;

/// Initial overview viewpoint.
pub const OVERVIEW_EYE: [f32; 3] = [-40.0, 210.0, 330.0];
pub const OVERVIEW_TARGET: [f32; 3] = [10.0, 10.0, 10.0];

/// Number of cosmetic water particles travelling along the flow path.
pub const FLOW_PARTICLE_COUNT: usize = 260;

/// Flow path traversal rate in path fractions per second.
pub const FLOW_BASE_SPEED: f32 = 0.018;

pub const FLOW_PARTICLE_RADIUS: f32 = 0.55;

/// Maximum sideways scatter of a particle around the path centreline.
pub const FLOW_LATERAL_SCATTER: f32 = 1.4;

pub const FLOW_SEED: u64 = 0x5EED_F10E;

/// Seconds for a full day-to-night blend.
pub const LIGHTING_TRANSITION_SECONDS: f32 = 2.5;

/// Screen distance within which a click selects a stage anchor.
pub const PICK_RADIUS_PX: f32 = 70.0;

/// Cursor travel beyond which a press counts as a drag instead of a click.
pub const CLICK_DRAG_TOLERANCE_PX: f32 = 6.0;

/// Elevation chart texture size.
pub const PROFILE_CHART_WIDTH: u32 = 360;
pub const PROFILE_CHART_HEIGHT: u32 = 120;

/// Samples taken along the flow path for the elevation profile.
pub const PROFILE_SAMPLES: usize = 240;

/// Seconds to wait for the model manifest before using placeholders.
pub const MANIFEST_TIMEOUT_SECONDS: f32 = 4.0;

/// Seconds a downloaded stage model may stay loading before its placeholder is used.
pub const MODEL_TIMEOUT_SECONDS: f32 = 20.0;
