/// Duration of a camera flight between two viewpoints.
pub const FLIGHT_SECONDS: f32 = 3.0;

/// Time spent at each tour stop before moving on.
pub const DWELL_SECONDS: f32 = 7.0;
