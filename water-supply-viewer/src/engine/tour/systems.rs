use bevy::prelude::*;
use constants::stage::StageKey;

use super::guided_tour::{GuidedTour, TOUR_STOPS, TourCommand, TourEvent, stop_for_stage};
use crate::engine::camera::flight::{CameraFlight, FlightFinished, start_flight};
use crate::engine::camera::viewport_camera::ViewportCamera;
use crate::engine::infrastructure::highlight::SelectedStage;
use crate::engine::ui::info_card::{CardContent, InfoCardState};
use crate::rpc::web_rpc::WebRpcInterface;

/// Fly to a stage and open its card, outside of the tour.
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct FocusStage(pub StageKey);

const STAGE_DIGITS: [KeyCode; 7] = [
    KeyCode::Digit1,
    KeyCode::Digit2,
    KeyCode::Digit3,
    KeyCode::Digit4,
    KeyCode::Digit5,
    KeyCode::Digit6,
    KeyCode::Digit7,
];

/// Where the camera is heading right now: the active flight's position, or the rig.
fn current_viewpoint(
    flight: Option<&CameraFlight>,
    camera: Option<&Transform>,
    rig: &ViewportCamera,
) -> (Vec3, Vec3) {
    match (flight, camera) {
        (Some(flight), _) => flight.sample(),
        (None, Some(transform)) => (transform.translation, rig.focus_point),
        (None, None) => (rig.eye(), rig.focus_point),
    }
}

pub fn tour_keyboard_shortcuts(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut tour_commands: EventWriter<TourCommand>,
) {
    if keyboard.just_pressed(KeyCode::KeyT) {
        tour_commands.write(TourCommand::Toggle);
    }
    if keyboard.any_just_pressed([KeyCode::ArrowRight, KeyCode::KeyN]) {
        tour_commands.write(TourCommand::Next);
    }
    if keyboard.any_just_pressed([KeyCode::ArrowLeft, KeyCode::KeyP]) {
        tour_commands.write(TourCommand::Previous);
    }
    if keyboard.just_pressed(KeyCode::Escape) {
        tour_commands.write(TourCommand::Stop);
    }
    for (key, stage) in STAGE_DIGITS.iter().zip(StageKey::ALL) {
        if keyboard.just_pressed(*key) {
            tour_commands.write(TourCommand::FlyToStage(stage));
        }
    }
}

/// Count down the dwell timer and register arrivals of finished flights.
pub fn advance_guided_tour(
    time: Res<Time>,
    mut tour: ResMut<GuidedTour>,
    mut flights_finished: EventReader<FlightFinished>,
    mut tour_events: EventWriter<TourEvent>,
) {
    for _ in flights_finished.read() {
        let event = tour.arrived();
        if event != TourEvent::None {
            tour_events.write(event);
        }
    }

    let event = tour.tick(time.delta_secs());
    if event != TourEvent::None {
        tour_events.write(event);
    }
}

pub fn handle_tour_commands(
    mut commands_in: EventReader<TourCommand>,
    mut tour: ResMut<GuidedTour>,
    mut tour_events: EventWriter<TourEvent>,
    mut focus_events: EventWriter<FocusStage>,
) {
    for command in commands_in.read() {
        let event = match *command {
            TourCommand::Start => tour.start(),
            TourCommand::Stop => tour.stop(),
            TourCommand::Toggle if tour.is_running() => tour.stop(),
            TourCommand::Toggle => tour.start(),
            TourCommand::Next => tour.next(),
            TourCommand::Previous => tour.previous(),
            TourCommand::FlyToStage(stage) => {
                let stopped = tour.stop();
                focus_events.write(FocusStage(stage));
                stopped
            }
        };
        if event != TourEvent::None {
            tour_events.write(event);
        }
    }
}

/// Turn tour transitions into flights, card updates and host notifications.
pub fn react_to_tour_events(
    mut commands: Commands,
    mut tour_events: EventReader<TourEvent>,
    tour: Res<GuidedTour>,
    flight: Option<Res<CameraFlight>>,
    camera_query: Query<&Transform, With<Camera3d>>,
    viewport_camera: Res<ViewportCamera>,
    mut selected: ResMut<SelectedStage>,
    mut info_card: ResMut<InfoCardState>,
    mut rpc_interface: ResMut<WebRpcInterface>,
) {
    for event in tour_events.read() {
        match *event {
            TourEvent::FlyTo(index) => {
                let Some(stop) = TOUR_STOPS.get(index) else {
                    continue;
                };
                let (from_eye, from_target) = current_viewpoint(
                    flight.as_deref(),
                    camera_query.single().ok(),
                    &viewport_camera,
                );
                let (to_eye, to_target) = stop.viewpoint();
                start_flight(&mut commands, from_eye, from_target, to_eye, to_target);

                selected.0 = stop.stage;
                info_card.hide();
                info!("Tour stop {}/{}: {}", index + 1, tour.stop_count(), stop.title);
                rpc_interface.send_notification(
                    "tour_stop_changed",
                    serde_json::json!({
                        "index": index,
                        "total": tour.stop_count(),
                        "stage": stop.stage,
                        "title": stop.title,
                    }),
                );
            }
            TourEvent::Arrived(index) => {
                if let Some(stop) = TOUR_STOPS.get(index) {
                    info_card.show(CardContent::for_stop(stop, index, tour.stop_count()));
                }
            }
            TourEvent::Finished => {
                info!("✓ Guided tour finished");
                selected.0 = None;
                rpc_interface.send_notification(
                    "tour_finished",
                    serde_json::json!({ "completed": true }),
                );
            }
            TourEvent::Stopped => {
                info!("Guided tour stopped");
                rpc_interface.send_notification(
                    "tour_finished",
                    serde_json::json!({ "completed": false }),
                );
            }
            TourEvent::None => {}
        }
    }
}

/// Single flight to a stage with its card open. A running tour is stopped first.
pub fn focus_stage(
    mut commands: Commands,
    mut focus_events: EventReader<FocusStage>,
    mut tour: ResMut<GuidedTour>,
    mut tour_events: EventWriter<TourEvent>,
    flight: Option<Res<CameraFlight>>,
    camera_query: Query<&Transform, With<Camera3d>>,
    viewport_camera: Res<ViewportCamera>,
    mut selected: ResMut<SelectedStage>,
    mut info_card: ResMut<InfoCardState>,
    mut rpc_interface: ResMut<WebRpcInterface>,
) {
    // Only the latest request matters when several arrive in one frame.
    let Some(FocusStage(stage)) = focus_events.read().last().copied() else {
        return;
    };
    let Some(stop) = stop_for_stage(stage) else {
        return;
    };
    if tour.stop() == TourEvent::Stopped {
        tour_events.write(TourEvent::Stopped);
    }

    let (from_eye, from_target) = current_viewpoint(
        flight.as_deref(),
        camera_query.single().ok(),
        &viewport_camera,
    );
    let (to_eye, to_target) = stop.viewpoint();
    start_flight(&mut commands, from_eye, from_target, to_eye, to_target);

    selected.0 = Some(stage);
    info_card.show(CardContent::for_stage(stage));
    info!("Flying to {}", stage.display_name());
    rpc_interface.send_notification(
        "stage_selected",
        serde_json::json!({
            "stage": stage,
            "title": stop.title,
        }),
    );
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::engine::tour::guided_tour::TourPhase;

    fn tour_app() -> App {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins)
            .add_event::<TourCommand>()
            .add_event::<TourEvent>()
            .add_event::<FocusStage>()
            .add_event::<FlightFinished>()
            .init_resource::<GuidedTour>()
            .init_resource::<ViewportCamera>()
            .init_resource::<SelectedStage>()
            .init_resource::<InfoCardState>()
            .init_resource::<WebRpcInterface>()
            .add_systems(
                Update,
                (
                    advance_guided_tour,
                    handle_tour_commands,
                    react_to_tour_events,
                    focus_stage,
                )
                    .chain(),
            );
        app
    }

    fn written<E: Event + Clone>(app: &App) -> Vec<E> {
        let events = app.world().resource::<Events<E>>();
        let mut cursor = events.get_cursor();
        cursor.read(events).cloned().collect()
    }

    fn phase(app: &App) -> TourPhase {
        app.world().resource::<GuidedTour>().phase()
    }

    fn assert_focused_on(app: &App, stage: StageKey) {
        assert_eq!(app.world().resource::<SelectedStage>().0, Some(stage));
        let card = app.world().resource::<InfoCardState>();
        assert!(card.visible);
        assert_eq!(card.content, Some(CardContent::for_stage(stage)));
        assert!(app.world().get_resource::<CameraFlight>().is_some());
    }

    #[test]
    fn focusing_a_stage_while_dwelling_ends_the_tour() {
        let mut app = tour_app();
        {
            let mut tour = app.world_mut().resource_mut::<GuidedTour>();
            tour.start();
            tour.next();
            tour.arrived();
        }
        assert!(matches!(phase(&app), TourPhase::Dwelling { index: 1, .. }));

        app.world_mut().send_event(FocusStage(StageKey::PumpStation));
        app.update();

        assert_eq!(phase(&app), TourPhase::Idle);
        assert!(written::<TourEvent>(&app).contains(&TourEvent::Stopped));
        assert_focused_on(&app, StageKey::PumpStation);

        // Well past the dwell time the camera still stays on the picked stage.
        app.world_mut()
            .resource_mut::<Time<Virtual>>()
            .set_max_delta(Duration::from_secs(30));
        app.insert_resource(bevy::time::TimeUpdateStrategy::ManualDuration(
            Duration::from_secs(10),
        ));
        app.update();
        app.update();

        assert_eq!(phase(&app), TourPhase::Idle);
        assert!(
            !written::<TourEvent>(&app)
                .iter()
                .any(|event| matches!(event, TourEvent::FlyTo(_)))
        );
        assert_focused_on(&app, StageKey::PumpStation);
    }

    #[test]
    fn fly_to_stage_during_a_flight_is_not_taken_as_an_arrival() {
        let mut app = tour_app();
        app.world_mut().resource_mut::<GuidedTour>().start();
        assert_eq!(phase(&app), TourPhase::Flying { index: 0 });

        app.world_mut()
            .send_event(TourCommand::FlyToStage(StageKey::Dam));
        app.update();
        assert_eq!(phase(&app), TourPhase::Idle);
        assert_focused_on(&app, StageKey::Dam);

        // The stage flight lands; the tour must not claim it.
        app.world_mut().send_event(FlightFinished);
        app.update();

        assert_eq!(phase(&app), TourPhase::Idle);
        assert!(
            !written::<TourEvent>(&app)
                .iter()
                .any(|event| matches!(event, TourEvent::Arrived(_)))
        );
        assert_eq!(
            app.world().resource::<InfoCardState>().content,
            Some(CardContent::for_stage(StageKey::Dam))
        );
    }

    #[test]
    fn tour_stops_reach_the_card_on_arrival() {
        let mut app = tour_app();
        app.world_mut().send_event(TourCommand::Start);
        app.update();

        assert_eq!(phase(&app), TourPhase::Flying { index: 0 });
        assert!(written::<TourEvent>(&app).contains(&TourEvent::FlyTo(0)));
        assert!(!app.world().resource::<InfoCardState>().visible);

        app.world_mut().send_event(FlightFinished);
        app.update();

        assert!(matches!(phase(&app), TourPhase::Dwelling { index: 0, .. }));
        let card = app.world().resource::<InfoCardState>();
        assert!(card.visible);
        assert_eq!(
            card.content,
            Some(CardContent::for_stop(&TOUR_STOPS[0], 0, TOUR_STOPS.len()))
        );
    }

    #[test]
    fn viewpoint_prefers_the_active_flight() {
        let rig = ViewportCamera::overview();
        let flight = CameraFlight::new(Vec3::ZERO, Vec3::ONE, Vec3::Y, Vec3::X, 0.0);
        let camera = Transform::from_xyz(3.0, 4.0, 5.0);

        assert_eq!(
            current_viewpoint(Some(&flight), Some(&camera), &rig),
            (Vec3::Y, Vec3::X)
        );
        assert_eq!(
            current_viewpoint(None, Some(&camera), &rig),
            (Vec3::new(3.0, 4.0, 5.0), rig.focus_point)
        );
        assert_eq!(current_viewpoint(None, None, &rig), (rig.eye(), rig.focus_point));
    }
}
