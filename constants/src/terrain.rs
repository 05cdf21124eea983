/// Side length of the square terrain in world units, centred on the origin.
pub const TERRAIN_SIZE: f32 = 400.0;

/// Vertices along each side of the terrain grid.
pub const TERRAIN_RESOLUTION: usize = 161;

/// Lake surface elevation.
pub const WATER_LEVEL: f32 = 20.0;

/// Lowest elevation the height field may produce.
pub const TERRAIN_MIN_HEIGHT: f32 = 0.0;

/// Highest elevation the height field may produce.
pub const TERRAIN_MAX_HEIGHT: f32 = 60.0;
