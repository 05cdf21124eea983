use bevy::prelude::*;
use bevy::window::PrimaryWindow;
use constants::stage::StageKey;

use crate::constants::render_settings::{CLICK_DRAG_TOLERANCE_PX, PICK_RADIUS_PX};
use crate::engine::infrastructure::sites::world_anchor;
use crate::engine::tour::guided_tour::TourCommand;

/// Cursor state of the current left press.
#[derive(Default)]
pub struct ClickTracker {
    press_position: Option<Vec2>,
    travelled: f32,
}

/// Stage whose projected anchor is nearest `cursor`, if any lies within `radius` pixels.
pub fn nearest_stage(cursor: Vec2, anchors: &[(StageKey, Vec2)], radius: f32) -> Option<StageKey> {
    anchors
        .iter()
        .map(|&(stage, position)| (stage, position.distance(cursor)))
        .filter(|&(_, distance)| distance <= radius)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(stage, _)| stage)
}

/// Select a stage with a left click that did not turn into a camera drag.
/// Picking ends a running tour like any other stage request.
pub fn pick_stage_on_click(
    mouse_button: Res<ButtonInput<MouseButton>>,
    windows: Query<&Window, With<PrimaryWindow>>,
    cameras: Query<(&Camera, &GlobalTransform), With<Camera3d>>,
    interactions: Query<&Interaction>,
    mut tracker: Local<ClickTracker>,
    mut tour_commands: EventWriter<TourCommand>,
) {
    let Ok(window) = windows.single() else {
        return;
    };
    let cursor = window.cursor_position();

    if mouse_button.just_pressed(MouseButton::Left) {
        let over_ui = interactions
            .iter()
            .any(|interaction| *interaction != Interaction::None);
        tracker.press_position = if over_ui { None } else { cursor };
        tracker.travelled = 0.0;
        return;
    }

    let Some(start) = tracker.press_position else {
        return;
    };
    if let Some(cursor) = cursor {
        tracker.travelled = tracker.travelled.max(cursor.distance(start));
    }
    if !mouse_button.just_released(MouseButton::Left) {
        return;
    }
    tracker.press_position = None;

    let Some(cursor) = cursor else {
        return;
    };
    if tracker.travelled > CLICK_DRAG_TOLERANCE_PX {
        return;
    }
    let Ok((camera, camera_transform)) = cameras.single() else {
        return;
    };

    let anchors: Vec<(StageKey, Vec2)> = StageKey::ALL
        .iter()
        .filter_map(|&stage| {
            camera
                .world_to_viewport(camera_transform, world_anchor(stage))
                .ok()
                .map(|position| (stage, position))
        })
        .collect();

    if let Some(stage) = nearest_stage(cursor, &anchors, PICK_RADIUS_PX) {
        info!("Picked {}", stage.display_name());
        tour_commands.write(TourCommand::FlyToStage(stage));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nearest_anchor_within_radius_wins() {
        let anchors = [
            (StageKey::Lake, Vec2::new(100.0, 100.0)),
            (StageKey::Dam, Vec2::new(130.0, 100.0)),
            (StageKey::Canal, Vec2::new(400.0, 300.0)),
        ];
        assert_eq!(
            nearest_stage(Vec2::new(120.0, 100.0), &anchors, 50.0),
            Some(StageKey::Dam)
        );
        assert_eq!(
            nearest_stage(Vec2::new(95.0, 104.0), &anchors, 50.0),
            Some(StageKey::Lake)
        );
        assert_eq!(nearest_stage(Vec2::new(250.0, 250.0), &anchors, 50.0), None);
        assert_eq!(nearest_stage(Vec2::ZERO, &[], 50.0), None);
    }
}
