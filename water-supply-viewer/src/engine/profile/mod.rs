//! Elevation profile of the water's route from the lake to town.

/// Profile sampling along the flow path.
pub mod elevation;

/// RGBA chart rasterisation and the UI panel that shows it.
pub mod chart;
