//! Scene-wide constants shared by the viewer and the model fetcher.

/// Relative asset paths for optional downloaded models.
pub mod path;

/// Infrastructure stage identifiers in water flow order.
pub mod stage;

/// Terrain extents, resolution and the valid elevation range.
pub mod terrain;

/// Guided tour timings.
pub mod tour;
