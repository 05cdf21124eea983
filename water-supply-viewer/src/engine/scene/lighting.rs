/// Day/night lighting with a timed blend between two presets.
use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::constants::render_settings::LIGHTING_TRANSITION_SECONDS;
use crate::rpc::web_rpc::WebRpcInterface;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LightingMode {
    #[default]
    Day,
    Night,
}

impl LightingMode {
    pub fn toggled(self) -> Self {
        match self {
            Self::Day => Self::Night,
            Self::Night => Self::Day,
        }
    }

    pub fn from_string(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "day" => Some(Self::Day),
            "night" => Some(Self::Night),
            _ => None,
        }
    }

    pub fn to_string(&self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::Night => "night",
        }
    }

    /// Blend value this mode settles at.
    fn target_blend(self) -> f32 {
        match self {
            Self::Day => 0.0,
            Self::Night => 1.0,
        }
    }
}

/// Requested mode plus the current position of the day (0) to night (1) blend.
#[derive(Resource, Debug, Default)]
pub struct LightingState {
    pub mode: LightingMode,
    pub blend: f32,
}

impl LightingState {
    /// Move the blend toward the requested mode. Returns true while still moving.
    pub fn step(&mut self, dt: f32) -> bool {
        let target = self.mode.target_blend();
        if (self.blend - target).abs() <= f32::EPSILON {
            self.blend = target;
            return false;
        }
        let rate = dt.max(0.0) / LIGHTING_TRANSITION_SECONDS;
        self.blend = if target > self.blend {
            (self.blend + rate).min(target)
        } else {
            (self.blend - rate).max(target)
        };
        true
    }
}

/// Every lighting parameter the scene derives from the blend value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightingSample {
    pub sun_illuminance: f32,
    pub sun_colour: [f32; 3],
    pub ambient_brightness: f32,
    pub sky_colour: [f32; 3],
    pub fog_colour: [f32; 3],
    pub window_emissive: f32,
    pub lamp_intensity: f32,
}

const DAY: LightingSample = LightingSample {
    sun_illuminance: 11_000.0,
    sun_colour: [1.0, 0.96, 0.88],
    ambient_brightness: 450.0,
    sky_colour: [0.53, 0.74, 0.92],
    fog_colour: [0.70, 0.80, 0.90],
    window_emissive: 0.0,
    lamp_intensity: 0.0,
};

const NIGHT: LightingSample = LightingSample {
    sun_illuminance: 180.0,
    sun_colour: [0.55, 0.62, 0.95],
    ambient_brightness: 60.0,
    sky_colour: [0.02, 0.03, 0.08],
    fog_colour: [0.03, 0.04, 0.09],
    window_emissive: 6.0,
    lamp_intensity: 90_000.0,
};

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

fn lerp3(a: [f32; 3], b: [f32; 3], t: f32) -> [f32; 3] {
    [lerp(a[0], b[0], t), lerp(a[1], b[1], t), lerp(a[2], b[2], t)]
}

/// Interpolate the day and night presets; `blend` is clamped to `[0, 1]`.
pub fn lighting_at(blend: f32) -> LightingSample {
    let t = blend.clamp(0.0, 1.0);
    LightingSample {
        sun_illuminance: lerp(DAY.sun_illuminance, NIGHT.sun_illuminance, t),
        sun_colour: lerp3(DAY.sun_colour, NIGHT.sun_colour, t),
        ambient_brightness: lerp(DAY.ambient_brightness, NIGHT.ambient_brightness, t),
        sky_colour: lerp3(DAY.sky_colour, NIGHT.sky_colour, t),
        fog_colour: lerp3(DAY.fog_colour, NIGHT.fog_colour, t),
        window_emissive: lerp(DAY.window_emissive, NIGHT.window_emissive, t),
        lamp_intensity: lerp(DAY.lamp_intensity, NIGHT.lamp_intensity, t),
    }
}

fn srgb(c: [f32; 3]) -> Color {
    Color::srgb(c[0], c[1], c[2])
}

/// Distance fog for the scene camera, starting in the day preset.
pub fn scene_fog() -> DistanceFog {
    DistanceFog {
        color: srgb(DAY.fog_colour),
        falloff: FogFalloff::Linear {
            start: 260.0,
            end: 900.0,
        },
        ..default()
    }
}

#[derive(Component)]
pub struct Sun;

/// Window material that glows at night.
#[derive(Component)]
pub struct WindowGlow(pub Handle<StandardMaterial>);

#[derive(Component)]
pub struct StreetLamp;

/// Request to change the lighting mode from input, UI or RPC.
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub enum LightingCommand {
    Toggle,
    Set(LightingMode),
}

pub fn spawn_lighting(commands: &mut Commands) {
    let sample = lighting_at(0.0);
    commands.spawn((
        DirectionalLight {
            illuminance: sample.sun_illuminance,
            color: srgb(sample.sun_colour),
            shadows_enabled: true,
            ..default()
        },
        Transform::from_rotation(Quat::from_euler(
            EulerRot::ZYX,
            0.0,
            1.0,
            -std::f32::consts::FRAC_PI_4,
        )),
        Sun,
        Name::new("Sun"),
    ));
    commands.insert_resource(AmbientLight {
        color: Color::WHITE,
        brightness: sample.ambient_brightness,
        ..default()
    });
    commands.insert_resource(ClearColor(srgb(sample.sky_colour)));
}

pub fn handle_lighting_commands(
    mut events: EventReader<LightingCommand>,
    mut state: ResMut<LightingState>,
    mut rpc_interface: ResMut<WebRpcInterface>,
) {
    for command in events.read() {
        let mode = match *command {
            LightingCommand::Toggle => state.mode.toggled(),
            LightingCommand::Set(mode) => mode,
        };
        if mode == state.mode {
            continue;
        }
        state.mode = mode;
        info!("Lighting mode: {}", mode.to_string());
        rpc_interface.send_notification(
            "lighting_changed",
            serde_json::json!({ "mode": mode.to_string() }),
        );
    }
}

pub fn lighting_keyboard_shortcut(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut commands: EventWriter<LightingCommand>,
) {
    if keyboard.just_pressed(KeyCode::KeyL) {
        commands.write(LightingCommand::Toggle);
    }
}

/// Advance the blend and push the interpolated values into lights, sky, fog and emissives.
pub fn apply_lighting(
    time: Res<Time>,
    mut state: ResMut<LightingState>,
    mut ambient: ResMut<AmbientLight>,
    mut clear_colour: ResMut<ClearColor>,
    mut sun: Query<&mut DirectionalLight, With<Sun>>,
    mut fog: Query<&mut DistanceFog>,
    mut lamps: Query<&mut PointLight, With<StreetLamp>>,
    windows: Query<&WindowGlow>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut settled: Local<bool>,
) {
    let moving = state.step(time.delta_secs());
    if !moving && *settled {
        return;
    }
    // Apply one more frame after the blend stops so the final preset lands exactly.
    *settled = !moving;

    let sample = lighting_at(state.blend);

    for mut light in &mut sun {
        light.illuminance = sample.sun_illuminance;
        light.color = srgb(sample.sun_colour);
    }
    ambient.brightness = sample.ambient_brightness;
    clear_colour.0 = srgb(sample.sky_colour);

    for mut distance_fog in &mut fog {
        distance_fog.color = srgb(sample.fog_colour);
    }
    for mut lamp in &mut lamps {
        lamp.intensity = sample.lamp_intensity;
    }
    // Houses share window materials; touch each one once.
    let mut updated: Vec<AssetId<StandardMaterial>> = Vec::new();
    for glow in &windows {
        let id = glow.0.id();
        if updated.contains(&id) {
            continue;
        }
        updated.push(id);
        if let Some(material) = materials.get_mut(id) {
            material.emissive = LinearRgba::new(1.0, 0.78, 0.4, 1.0) * sample.window_emissive;
        }
    }
}
