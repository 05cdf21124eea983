use bevy::prelude::*;
use constants::tour::FLIGHT_SECONDS;

use super::viewport_camera::ViewportCamera;

/// Eased camera transition between two eye/target pairs.
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct CameraFlight {
    pub from_eye: Vec3,
    pub from_target: Vec3,
    pub to_eye: Vec3,
    pub to_target: Vec3,
    pub elapsed: f32,
    pub duration: f32,
}

/// Sent once when a flight reaches its destination.
#[derive(Event, Debug, Clone, Copy)]
pub struct FlightFinished;

/// Cubic ease-in-out over `[0, 1]`; input is clamped.
pub fn ease_in_out_cubic(t: f32) -> f32 {
    if t.is_nan() {
        return 0.0;
    }
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
    }
}

impl CameraFlight {
    pub fn new(from_eye: Vec3, from_target: Vec3, to_eye: Vec3, to_target: Vec3, duration: f32) -> Self {
        Self {
            from_eye,
            from_target,
            to_eye,
            to_target,
            elapsed: 0.0,
            duration,
        }
    }

    pub fn progress(&self) -> f32 {
        if self.duration <= 0.0 || !self.duration.is_finite() {
            return 1.0;
        }
        (self.elapsed / self.duration).clamp(0.0, 1.0)
    }

    pub fn is_finished(&self) -> bool {
        self.progress() >= 1.0
    }

    pub fn sample(&self) -> (Vec3, Vec3) {
        let t = ease_in_out_cubic(self.progress());
        (
            self.from_eye.lerp(self.to_eye, t),
            self.from_target.lerp(self.to_target, t),
        )
    }

    /// Advance by `dt` seconds and report whether the flight is over.
    pub fn tick(&mut self, dt: f32) -> bool {
        if dt.is_finite() && dt > 0.0 {
            self.elapsed += dt;
        }
        self.is_finished()
    }
}

fn look_from(eye: Vec3, target: Vec3) -> Transform {
    Transform::from_translation(eye).looking_at(target, Vec3::Y)
}

/// Begin a flight of the standard duration, replacing any flight in progress.
pub fn start_flight(commands: &mut Commands, from_eye: Vec3, from_target: Vec3, to_eye: Vec3, to_target: Vec3) {
    commands.insert_resource(CameraFlight::new(
        from_eye,
        from_target,
        to_eye,
        to_target,
        FLIGHT_SECONDS,
    ));
}

/// Drive the camera along the active flight and hand control back to the rig at the end.
pub fn run_camera_flight(
    mut commands: Commands,
    time: Res<Time>,
    flight: Option<ResMut<CameraFlight>>,
    mut viewport_camera: ResMut<ViewportCamera>,
    mut camera_query: Query<&mut Transform, With<Camera3d>>,
    mut finished: EventWriter<FlightFinished>,
) {
    let Some(mut flight) = flight else {
        return;
    };

    let done = flight.tick(time.delta_secs());
    let (eye, target) = flight.sample();
    for mut transform in &mut camera_query {
        *transform = look_from(eye, target);
    }

    if done {
        *viewport_camera = ViewportCamera::from_eye_target(eye, target);
        commands.remove_resource::<CameraFlight>();
        finished.write(FlightFinished);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn easing_endpoints_and_midpoint() {
        assert_eq!(ease_in_out_cubic(0.0), 0.0);
        assert_eq!(ease_in_out_cubic(1.0), 1.0);
        assert!((ease_in_out_cubic(0.5) - 0.5).abs() < 1e-6);
        assert_eq!(ease_in_out_cubic(-3.0), 0.0);
        assert_eq!(ease_in_out_cubic(7.0), 1.0);
        assert_eq!(ease_in_out_cubic(f32::NAN), 0.0);
    }

    #[test]
    fn easing_is_monotone() {
        let mut previous = 0.0;
        for i in 1..=200 {
            let value = ease_in_out_cubic(i as f32 / 200.0);
            assert!(value >= previous);
            previous = value;
        }
    }

    #[test]
    fn flight_reaches_destination() {
        let mut flight = CameraFlight::new(Vec3::ZERO, Vec3::ZERO, Vec3::splat(10.0), Vec3::X, 2.0);
        assert_eq!(flight.sample(), (Vec3::ZERO, Vec3::ZERO));
        assert!(!flight.tick(1.0));
        let (eye, _) = flight.sample();
        assert!((eye - Vec3::splat(5.0)).length() < 1e-4);
        assert!(flight.tick(1.5));
        assert_eq!(flight.sample(), (Vec3::splat(10.0), Vec3::X));
    }

    #[test]
    fn zero_duration_finishes_immediately() {
        let mut flight = CameraFlight::new(Vec3::ZERO, Vec3::ZERO, Vec3::Y, Vec3::X, 0.0);
        assert!(flight.is_finished());
        assert!(flight.tick(0.0));
        assert_eq!(flight.sample(), (Vec3::Y, Vec3::X));
    }

    #[test]
    fn negative_time_steps_are_ignored() {
        let mut flight = CameraFlight::new(Vec3::ZERO, Vec3::ZERO, Vec3::Y, Vec3::X, 1.0);
        assert!(!flight.tick(-5.0));
        assert_eq!(flight.elapsed, 0.0);
    }
}
