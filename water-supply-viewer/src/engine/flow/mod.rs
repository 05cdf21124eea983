//! Cosmetic water particles travelling along the supply chain.

/// Spline through the flow control points with per-segment stage lookup.
pub mod flow_path;

/// Particle spawning, animation and visibility control.
pub mod particles;
