//! Runtime-loaded asset definitions.

/// Model manifest listing downloaded GLB files per infrastructure stage.
pub mod scene_manifest;
