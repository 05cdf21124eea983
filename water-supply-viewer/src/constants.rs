/// Horizontal placement of the supply chain on the terrain.
pub mod layout;

/// Camera, particle, lighting and UI tuning values.
pub mod render_settings;
