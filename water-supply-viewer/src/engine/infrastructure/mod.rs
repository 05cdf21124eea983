//! Infrastructure stages placed along the supply chain.
//!
//! Each stage is either a downloaded glTF model listed in the model manifest
//! or a placeholder assembled from primitives.

/// Selected stage resource and the marker ring that follows it.
pub mod highlight;

/// Primitive placeholder geometry and its shared materials.
pub mod placeholders;

/// Stage locations, info card text and the flow control points.
pub mod sites;

/// Stage root spawning with model loading and placeholder fallback.
pub mod spawn;
