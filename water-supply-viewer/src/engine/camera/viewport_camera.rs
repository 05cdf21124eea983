use bevy::input::mouse::MouseScrollUnit;
use bevy::math::EulerRot;
use bevy::{
    input::mouse::{MouseMotion, MouseWheel},
    prelude::*,
};

use super::flight::{CameraFlight, start_flight};
use crate::constants::render_settings::{
    MAX_CAMERA_DISTANCE, MAX_CAMERA_PITCH, MIN_CAMERA_DISTANCE, MIN_CAMERA_PITCH, OVERVIEW_EYE,
    OVERVIEW_TARGET,
};
use crate::engine::tour::guided_tour::{GuidedTour, TourCommand};

const ORBIT_YAW_SENSITIVITY: f32 = 0.0035;
const ORBIT_PITCH_SENSITIVITY: f32 = 0.0030;
const DRAG_PAN_SENSITIVITY: f32 = 0.0016;

/// Orbit rig around a focus point on or near the ground.
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct ViewportCamera {
    pub focus_point: Vec3,
    pub yaw: f32,
    /// Negative looks down.
    pub pitch: f32,
    pub distance: f32,
}

impl ViewportCamera {
    pub fn new(focus_point: Vec3, yaw: f32, pitch: f32, distance: f32) -> Self {
        let mut rig = Self {
            focus_point,
            yaw,
            pitch,
            distance,
        };
        rig.clamp();
        rig
    }

    /// Rig looking at `target` from `eye`, within the pitch and distance limits.
    pub fn from_eye_target(eye: Vec3, target: Vec3) -> Self {
        let offset = eye - target;
        let distance = offset.length();
        if !distance.is_finite() || distance < 1e-4 {
            return Self::new(target, 0.0, MAX_CAMERA_PITCH, MIN_CAMERA_DISTANCE);
        }
        let direction = offset / distance;
        Self::new(
            target,
            direction.x.atan2(direction.z),
            -direction.y.clamp(-1.0, 1.0).asin(),
            distance,
        )
    }

    pub fn overview() -> Self {
        Self::from_eye_target(Vec3::from(OVERVIEW_EYE), Vec3::from(OVERVIEW_TARGET))
    }

    pub fn clamp(&mut self) {
        self.pitch = self.pitch.clamp(MIN_CAMERA_PITCH, MAX_CAMERA_PITCH);
        self.distance = if self.distance.is_finite() {
            self.distance.clamp(MIN_CAMERA_DISTANCE, MAX_CAMERA_DISTANCE)
        } else {
            MAX_CAMERA_DISTANCE
        };
    }

    pub fn rotation(&self) -> Quat {
        Quat::from_euler(EulerRot::YXZ, self.yaw, self.pitch, 0.0)
    }

    pub fn eye(&self) -> Vec3 {
        self.focus_point + self.rotation() * Vec3::Z * self.distance
    }

    pub fn transform(&self) -> Transform {
        Transform::from_translation(self.eye()).with_rotation(self.rotation())
    }

    /// Ground-plane forward and right directions for the current yaw.
    pub fn ground_axes(&self) -> (Vec3, Vec3) {
        let (sin, cos) = self.yaw.sin_cos();
        (Vec3::new(-sin, 0.0, -cos), Vec3::new(cos, 0.0, -sin))
    }

    pub fn orbit(&mut self, delta: Vec2) {
        self.yaw -= delta.x * ORBIT_YAW_SENSITIVITY;
        self.pitch -= delta.y * ORBIT_PITCH_SENSITIVITY;
        self.clamp();
    }

    /// Move the focus across the ground; `amount.x` is rightwards, `amount.y` forwards.
    pub fn pan(&mut self, amount: Vec2) {
        let (forward, right) = self.ground_axes();
        self.focus_point += right * amount.x + forward * amount.y;
    }

    pub fn zoom(&mut self, scroll: f32) {
        self.distance *= zoom_factor(scroll);
        self.clamp();
    }
}

impl Default for ViewportCamera {
    fn default() -> Self {
        Self::overview()
    }
}

/// Distance multiplier for a scroll amount in lines; positive zooms in.
pub fn zoom_factor(scroll: f32) -> f32 {
    if !scroll.is_finite() {
        return 1.0;
    }
    0.88_f32.powf(scroll)
}

/// Requests a flight back to the overview viewpoint.
#[derive(Event, Debug, Clone, Copy)]
pub struct ResetView;

pub fn camera_controller(
    mut commands: Commands,
    mut camera_query: Query<&mut Transform, With<Camera3d>>,
    mut viewport_camera: ResMut<ViewportCamera>,
    flight: Option<Res<CameraFlight>>,
    tour: Res<GuidedTour>,
    mut tour_commands: EventWriter<TourCommand>,
    mouse_button: Res<ButtonInput<MouseButton>>,
    mut mouse_motion: EventReader<MouseMotion>,
    mut scroll_events: EventReader<MouseWheel>,
    keyboard: Res<ButtonInput<KeyCode>>,
    time: Res<Time>,
) {
    let Ok(mut camera_transform) = camera_query.single_mut() else {
        return;
    };

    let mouse_delta: Vec2 = mouse_motion.read().map(|m| m.delta).sum();
    let orbiting = mouse_button.any_pressed([MouseButton::Right, MouseButton::Left])
        && mouse_delta != Vec2::ZERO;
    let dragging = mouse_button.pressed(MouseButton::Middle) && mouse_delta != Vec2::ZERO;

    let mut scroll_accum = 0.0;
    for ev in scroll_events.read() {
        scroll_accum += match ev.unit {
            MouseScrollUnit::Line => ev.y,
            MouseScrollUnit::Pixel => ev.y * 0.02,
        };
    }

    let mut move_input = Vec3::ZERO;
    if keyboard.pressed(KeyCode::KeyW) {
        move_input.z += 1.0;
    }
    if keyboard.pressed(KeyCode::KeyS) {
        move_input.z -= 1.0;
    }
    if keyboard.pressed(KeyCode::KeyD) {
        move_input.x += 1.0;
    }
    if keyboard.pressed(KeyCode::KeyA) {
        move_input.x -= 1.0;
    }
    if keyboard.pressed(KeyCode::KeyE) {
        move_input.y += 1.0;
    }
    if keyboard.pressed(KeyCode::KeyQ) {
        move_input.y -= 1.0;
    }

    let manual = orbiting || dragging || scroll_accum.abs() > f32::EPSILON || move_input != Vec3::ZERO;
    if manual {
        if tour.is_running() {
            tour_commands.write(TourCommand::Stop);
        }
        // The user takes over from wherever the flight had got to.
        if let Some(flight) = flight.as_ref() {
            let (eye, target) = flight.sample();
            *viewport_camera = ViewportCamera::from_eye_target(eye, target);
            commands.remove_resource::<CameraFlight>();
        }
    } else if flight.is_some() {
        return;
    }

    if orbiting {
        viewport_camera.orbit(mouse_delta);
    }

    if dragging {
        let scale = viewport_camera.distance * DRAG_PAN_SENSITIVITY;
        viewport_camera.pan(Vec2::new(-mouse_delta.x, mouse_delta.y) * scale);
    }

    if scroll_accum.abs() > f32::EPSILON {
        viewport_camera.zoom(scroll_accum);
    }

    if move_input != Vec3::ZERO {
        // Shift = faster
        let mut speed = (viewport_camera.distance * 0.8).clamp(10.0, 250.0);
        if keyboard.any_pressed([KeyCode::ShiftLeft, KeyCode::ShiftRight]) {
            speed *= 3.0;
        }
        let step = move_input.normalize() * speed * time.delta_secs();
        viewport_camera.pan(Vec2::new(step.x, step.z));
        viewport_camera.focus_point.y += step.y;
    }

    let target = viewport_camera.transform();
    let lerp_speed = (12.0 * time.delta_secs()).min(1.0);
    camera_transform.translation = camera_transform
        .translation
        .lerp(target.translation, lerp_speed);
    camera_transform.rotation = camera_transform.rotation.slerp(target.rotation, lerp_speed);
}

/// Stop any tour and fly back to the overview.
pub fn handle_reset_view(
    mut commands: Commands,
    mut events: EventReader<ResetView>,
    mut tour_commands: EventWriter<TourCommand>,
    tour: Res<GuidedTour>,
    viewport_camera: Res<ViewportCamera>,
    camera_query: Query<&Transform, With<Camera3d>>,
) {
    if events.read().count() == 0 {
        return;
    }
    if tour.is_running() {
        tour_commands.write(TourCommand::Stop);
    }
    let Ok(transform) = camera_query.single() else {
        return;
    };
    start_flight(
        &mut commands,
        transform.translation,
        viewport_camera.focus_point,
        Vec3::from(OVERVIEW_EYE),
        Vec3::from(OVERVIEW_TARGET),
    );
    info!("Camera reset to overview");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller_app(tour: GuidedTour) -> App {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins)
            .add_event::<MouseMotion>()
            .add_event::<MouseWheel>()
            .add_event::<TourCommand>()
            .init_resource::<ButtonInput<KeyCode>>()
            .init_resource::<ButtonInput<MouseButton>>()
            .init_resource::<ViewportCamera>()
            .insert_resource(tour)
            .add_systems(Update, camera_controller);
        app.world_mut()
            .spawn((Camera3d::default(), ViewportCamera::overview().transform()));
        app
    }

    fn running_tour() -> GuidedTour {
        let mut tour = GuidedTour::default();
        tour.start();
        tour.arrived();
        tour
    }

    fn tour_commands(app: &App) -> Vec<TourCommand> {
        let events = app.world().resource::<Events<TourCommand>>();
        let mut cursor = events.get_cursor();
        cursor.read(events).copied().collect()
    }

    #[test]
    fn manual_pan_during_tour_requests_stop() {
        let mut app = controller_app(running_tour());
        app.world_mut()
            .resource_mut::<ButtonInput<KeyCode>>()
            .press(KeyCode::KeyW);
        app.update();

        assert_eq!(tour_commands(&app), vec![TourCommand::Stop]);
    }

    #[test]
    fn scrolling_during_tour_requests_stop() {
        let mut app = controller_app(running_tour());
        app.world_mut().send_event(MouseWheel {
            unit: MouseScrollUnit::Line,
            x: 0.0,
            y: 1.0,
            window: Entity::PLACEHOLDER,
        });
        app.update();

        assert_eq!(tour_commands(&app), vec![TourCommand::Stop]);
    }

    #[test]
    fn idle_controller_leaves_the_tour_alone() {
        let mut app = controller_app(running_tour());
        app.update();
        assert!(tour_commands(&app).is_empty());

        // Input without a tour has nothing to stop.
        let mut app = controller_app(GuidedTour::default());
        app.world_mut()
            .resource_mut::<ButtonInput<KeyCode>>()
            .press(KeyCode::KeyD);
        app.update();
        assert!(tour_commands(&app).is_empty());
    }

    #[test]
    fn manual_input_cancels_an_active_flight() {
        let mut app = controller_app(GuidedTour::default());
        let flight = CameraFlight::new(
            Vec3::new(0.0, 100.0, 200.0),
            Vec3::ZERO,
            Vec3::new(50.0, 60.0, 50.0),
            Vec3::new(10.0, 0.0, 10.0),
            3.0,
        );
        app.insert_resource(flight);
        app.world_mut()
            .resource_mut::<ButtonInput<KeyCode>>()
            .press(KeyCode::KeyE);
        app.update();

        assert!(app.world().get_resource::<CameraFlight>().is_none());
        let (eye, target) = flight.sample();
        let rig = app.world().resource::<ViewportCamera>();
        // Rebuilt from the flight's start, then raised by the key press.
        assert!((rig.eye().xz() - eye.xz()).length() < 1e-2);
        assert!(rig.focus_point.y >= target.y);
    }

    fn close(a: Vec3, b: Vec3) -> bool {
        a.distance(b) < 1e-3
    }

    #[test]
    fn eye_target_round_trip() {
        let eye = Vec3::new(-40.0, 120.0, 90.0);
        let target = Vec3::new(10.0, 5.0, -20.0);
        let rig = ViewportCamera::from_eye_target(eye, target);
        assert!(close(rig.eye(), eye));
        assert!(close(rig.focus_point, target));
    }

    #[test]
    fn overview_matches_the_configured_viewpoint() {
        let rig = ViewportCamera::overview();
        assert!(close(rig.eye(), Vec3::from(OVERVIEW_EYE)));
    }

    #[test]
    fn transform_looks_at_the_focus() {
        let rig = ViewportCamera::new(Vec3::new(5.0, 0.0, 5.0), 0.7, -0.6, 80.0);
        let transform = rig.transform();
        let towards = (rig.focus_point - transform.translation).normalize();
        assert!(transform.forward().dot(towards) > 0.999);
    }

    #[test]
    fn limits_are_enforced() {
        let mut rig = ViewportCamera::new(Vec3::ZERO, 0.0, -0.5, 50.0);
        rig.orbit(Vec2::new(0.0, -10_000.0));
        assert_eq!(rig.pitch, MAX_CAMERA_PITCH);
        rig.orbit(Vec2::new(0.0, 10_000.0));
        assert_eq!(rig.pitch, MIN_CAMERA_PITCH);
        rig.zoom(500.0);
        assert_eq!(rig.distance, MIN_CAMERA_DISTANCE);
        rig.zoom(-500.0);
        assert_eq!(rig.distance, MAX_CAMERA_DISTANCE);

        let degenerate = ViewportCamera::from_eye_target(Vec3::ONE, Vec3::ONE);
        assert_eq!(degenerate.distance, MIN_CAMERA_DISTANCE);
    }

    #[test]
    fn pan_moves_along_the_ground() {
        let mut rig = ViewportCamera::new(Vec3::ZERO, 0.0, -0.5, 50.0);
        rig.pan(Vec2::new(0.0, 10.0));
        // Yaw zero looks towards -Z.
        assert!(close(rig.focus_point, Vec3::new(0.0, 0.0, -10.0)));
        rig.pan(Vec2::new(4.0, 0.0));
        assert!(close(rig.focus_point, Vec3::new(4.0, 0.0, -10.0)));
    }

    #[test]
    fn scrolling_up_zooms_in() {
        assert!(zoom_factor(1.0) < 1.0);
        assert!(zoom_factor(-1.0) > 1.0);
        assert_eq!(zoom_factor(0.0), 1.0);
        assert_eq!(zoom_factor(f32::NAN), 1.0);
    }
}
