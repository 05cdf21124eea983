//! Procedural landscape and scene lighting.
//!
//! Provides the terrain height field, its vertex colouring, the terrain mesh
//! and the day/night lighting rig.

/// Deterministic terrain elevation and normals.
///
/// Combines a base slope, the lake bowl, the dam ridge, the canal groove and sine noise.
pub mod height_field;

/// Lighting presets and the day/night blend systems.
pub mod lighting;

/// Vertex colour heuristic for the terrain.
pub mod terrain_colour;

/// Terrain grid mesh construction and spawning.
pub mod terrain_mesh;
