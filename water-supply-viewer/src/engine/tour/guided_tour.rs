use bevy::prelude::*;
use constants::stage::StageKey;
use constants::tour::DWELL_SECONDS;

use crate::constants::render_settings::{OVERVIEW_EYE, OVERVIEW_TARGET};
use crate::engine::infrastructure::sites::{STAGE_SITES, world_anchor};

/// A named viewpoint on the tour. Stage stops are placed relative to the stage anchor,
/// overview stops relative to the overview target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TourStop {
    pub stage: Option<StageKey>,
    pub title: &'static str,
    pub description: &'static str,
    pub eye_offset: Vec3,
    pub target_offset: Vec3,
}

impl TourStop {
    /// World-space `(eye, target)` for this stop.
    pub fn viewpoint(&self) -> (Vec3, Vec3) {
        let base = match self.stage {
            Some(stage) => world_anchor(stage),
            None => Vec3::from(OVERVIEW_TARGET),
        };
        let target = base + self.target_offset;
        (target + self.eye_offset, target)
    }
}

const fn stage_stop(index: usize, eye_offset: Vec3, target_offset: Vec3) -> TourStop {
    TourStop {
        stage: Some(STAGE_SITES[index].key),
        title: STAGE_SITES[index].title,
        description: STAGE_SITES[index].description,
        eye_offset,
        target_offset,
    }
}

pub const TOUR_STOPS: [TourStop; 9] = [
    TourStop {
        stage: None,
        title: "From Lake to Tap",
        description: "Follow the water from a mountain lake, through the dam, canal and \
                      treatment plant, and up the pipeline to the houses in the valley.",
        eye_offset: Vec3::new(
            OVERVIEW_EYE[0] - OVERVIEW_TARGET[0],
            OVERVIEW_EYE[1] - OVERVIEW_TARGET[1],
            OVERVIEW_EYE[2] - OVERVIEW_TARGET[2],
        ),
        target_offset: Vec3::ZERO,
    },
    stage_stop(0, Vec3::new(60.0, 55.0, 90.0), Vec3::ZERO),
    stage_stop(1, Vec3::new(45.0, 30.0, 45.0), Vec3::new(0.0, 4.0, 0.0)),
    stage_stop(2, Vec3::new(-30.0, 28.0, 40.0), Vec3::ZERO),
    stage_stop(3, Vec3::new(35.0, 30.0, 35.0), Vec3::new(0.0, 3.0, 0.0)),
    stage_stop(4, Vec3::new(-28.0, 22.0, 30.0), Vec3::new(0.0, 2.0, 0.0)),
    stage_stop(5, Vec3::new(40.0, 35.0, -10.0), Vec3::ZERO),
    stage_stop(6, Vec3::new(50.0, 55.0, 60.0), Vec3::new(0.0, 2.0, 0.0)),
    TourStop {
        stage: None,
        title: "End of the Tour",
        description: "Water has travelled downhill by gravity as far as the pump station, \
                      then been lifted to the town. Explore freely or start the tour again.",
        eye_offset: Vec3::new(260.0, 230.0, 140.0),
        target_offset: Vec3::ZERO,
    },
];

/// The tour stop that shows a stage.
pub fn stop_for_stage(stage: StageKey) -> Option<&'static TourStop> {
    TOUR_STOPS.iter().find(|stop| stop.stage == Some(stage))
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TourPhase {
    Idle,
    Flying { index: usize },
    Dwelling { index: usize, remaining: f32 },
}

/// Result of a tour transition.
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub enum TourEvent {
    None,
    FlyTo(usize),
    Arrived(usize),
    Finished,
    Stopped,
}

#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub enum TourCommand {
    Start,
    Stop,
    Toggle,
    Next,
    Previous,
    /// Single flight to a stage without running the tour.
    FlyToStage(StageKey),
}

impl TourCommand {
    pub fn from_string(s: &str) -> Option<Self> {
        match s {
            "start_tour" => Some(Self::Start),
            "stop_tour" => Some(Self::Stop),
            "toggle_tour" => Some(Self::Toggle),
            "next_stop" => Some(Self::Next),
            "previous_stop" => Some(Self::Previous),
            _ => None,
        }
    }
}

/// Sequencer over a fixed number of stops.
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct GuidedTour {
    phase: TourPhase,
    stop_count: usize,
    dwell: f32,
}

impl Default for GuidedTour {
    fn default() -> Self {
        Self::new(TOUR_STOPS.len(), DWELL_SECONDS)
    }
}

impl GuidedTour {
    pub fn new(stop_count: usize, dwell: f32) -> Self {
        Self {
            phase: TourPhase::Idle,
            stop_count,
            dwell,
        }
    }

    pub fn phase(&self) -> TourPhase {
        self.phase
    }

    pub fn is_running(&self) -> bool {
        self.phase != TourPhase::Idle
    }

    pub fn current_index(&self) -> Option<usize> {
        match self.phase {
            TourPhase::Idle => None,
            TourPhase::Flying { index } | TourPhase::Dwelling { index, .. } => Some(index),
        }
    }

    pub fn stop_count(&self) -> usize {
        self.stop_count
    }

    pub fn start(&mut self) -> TourEvent {
        self.fly_to(0)
    }

    pub fn stop(&mut self) -> TourEvent {
        if !self.is_running() {
            return TourEvent::None;
        }
        self.phase = TourPhase::Idle;
        TourEvent::Stopped
    }

    pub fn next(&mut self) -> TourEvent {
        match self.current_index() {
            None => self.start(),
            Some(index) if index + 1 < self.stop_count => self.fly_to(index + 1),
            Some(_) => {
                self.phase = TourPhase::Idle;
                TourEvent::Finished
            }
        }
    }

    pub fn previous(&mut self) -> TourEvent {
        match self.current_index() {
            None => TourEvent::None,
            Some(index) => self.fly_to(index.saturating_sub(1)),
        }
    }

    pub fn arrived(&mut self) -> TourEvent {
        match self.phase {
            TourPhase::Flying { index } => {
                self.phase = TourPhase::Dwelling {
                    index,
                    remaining: self.dwell,
                };
                TourEvent::Arrived(index)
            }
            _ => TourEvent::None,
        }
    }

    pub fn tick(&mut self, dt: f32) -> TourEvent {
        let TourPhase::Dwelling { index, remaining } = self.phase else {
            return TourEvent::None;
        };
        let remaining = remaining - dt.max(0.0);
        if remaining <= 0.0 {
            return self.next();
        }
        self.phase = TourPhase::Dwelling { index, remaining };
        TourEvent::None
    }

    fn fly_to(&mut self, index: usize) -> TourEvent {
        if self.stop_count == 0 {
            self.phase = TourPhase::Idle;
            return TourEvent::None;
        }
        let index = index.min(self.stop_count - 1);
        self.phase = TourPhase::Flying { index };
        TourEvent::FlyTo(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stops_cover_every_stage_between_two_overviews() {
        assert_eq!(TOUR_STOPS.first().map(|s| s.stage), Some(None));
        assert_eq!(TOUR_STOPS.last().map(|s| s.stage), Some(None));
        let stages: Vec<StageKey> = TOUR_STOPS.iter().filter_map(|s| s.stage).collect();
        assert_eq!(stages, StageKey::ALL.to_vec());
        for stage in StageKey::ALL {
            assert!(stop_for_stage(stage).is_some());
        }
    }

    #[test]
    fn viewpoints_look_down_at_their_stage() {
        for stop in &TOUR_STOPS {
            let (eye, target) = stop.viewpoint();
            assert!(eye.y > target.y);
            assert!(eye.distance(target) > 10.0);
        }
        let (_, target) = TOUR_STOPS[1].viewpoint();
        assert_eq!(target, world_anchor(StageKey::Lake));
    }

    #[test]
    fn full_run_visits_every_stop() {
        let mut tour = GuidedTour::new(3, 2.0);
        assert_eq!(tour.start(), TourEvent::FlyTo(0));
        for index in 0..3 {
            assert_eq!(tour.arrived(), TourEvent::Arrived(index));
            assert_eq!(tour.tick(1.0), TourEvent::None);
            let expected = if index + 1 < 3 {
                TourEvent::FlyTo(index + 1)
            } else {
                TourEvent::Finished
            };
            assert_eq!(tour.tick(1.5), expected);
        }
        assert_eq!(tour.phase(), TourPhase::Idle);
    }

    #[test]
    fn next_and_previous_are_clamped() {
        let mut tour = GuidedTour::new(3, 2.0);
        assert_eq!(tour.previous(), TourEvent::None);
        assert_eq!(tour.next(), TourEvent::FlyTo(0));
        assert_eq!(tour.previous(), TourEvent::FlyTo(0));
        assert_eq!(tour.next(), TourEvent::FlyTo(1));
        assert_eq!(tour.next(), TourEvent::FlyTo(2));
        assert_eq!(tour.next(), TourEvent::Finished);
        assert!(!tour.is_running());
    }

    #[test]
    fn stop_and_restart() {
        let mut tour = GuidedTour::new(4, 2.0);
        assert_eq!(tour.stop(), TourEvent::None);
        tour.start();
        tour.arrived();
        tour.next();
        assert_eq!(tour.current_index(), Some(1));
        assert_eq!(tour.start(), TourEvent::FlyTo(0));
        assert_eq!(tour.stop(), TourEvent::Stopped);
        assert_eq!(tour.arrived(), TourEvent::None);
        assert_eq!(tour.tick(10.0), TourEvent::None);
    }

    #[test]
    fn arrival_only_counts_while_flying() {
        let mut tour = GuidedTour::new(2, 2.0);
        tour.start();
        assert_eq!(tour.arrived(), TourEvent::Arrived(0));
        assert_eq!(tour.arrived(), TourEvent::None);
        assert_eq!(
            tour.phase(),
            TourPhase::Dwelling {
                index: 0,
                remaining: 2.0
            }
        );
    }

    #[test]
    fn empty_tour_never_runs() {
        let mut tour = GuidedTour::new(0, 2.0);
        assert_eq!(tour.start(), TourEvent::None);
        assert_eq!(tour.next(), TourEvent::None);
        assert!(!tour.is_running());
    }

    #[test]
    fn rpc_method_names_map_to_commands() {
        assert_eq!(TourCommand::from_string("next_stop"), Some(TourCommand::Next));
        assert_eq!(TourCommand::from_string("fly_to_stage"), None);
    }
}
