//! Camera navigation for the supply chain scene.
//!
//! Provides the orbit rig with manual mouse/keyboard control and smooth
//! interpolation, plus eased flights between viewpoints used by the tour.

/// Eased flights between eye/target pairs.
pub mod flight;

/// Orbit rig resource and manual controller system.
pub mod viewport_camera;
