//! Guided tour through the supply chain.
//!
//! `guided_tour` holds the stop list and the pure sequencer; `systems` wires
//! it to keyboard input, camera flights, the info card and host notifications.

/// Tour stops, commands and the `GuidedTour` state machine.
pub mod guided_tour;

/// Bevy systems driving the tour and single-stage focus flights.
pub mod systems;
