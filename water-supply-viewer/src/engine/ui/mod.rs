//! Native UI overlays for the supply chain scene.
//!
//! Hosts the stage info card, the control bar and click-to-select picking.
//! Panels use the same dark palette and hover/press colours throughout.

/// Top-left buttons for the tour, lighting, flow, profile and camera reset.
pub mod control_bar;

/// Right-hand card describing the current stage or tour stop.
pub mod info_card;

/// Left-click selection of stages by their screen-projected anchors.
pub mod picking;
