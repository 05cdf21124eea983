use bevy::prelude::*;
use constants::stage::StageKey;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use super::flow_path::FlowPath;
use crate::constants::render_settings::{
    FLOW_BASE_SPEED, FLOW_LATERAL_SCATTER, FLOW_PARTICLE_COUNT, FLOW_PARTICLE_RADIUS, FLOW_SEED,
};
use crate::rpc::web_rpc::WebRpcInterface;

/// Lift applied to particles travelling along the pipeline so they ride on top of it.
const PIPELINE_RIDE_HEIGHT: f32 = 1.3;

#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct FlowParticle {
    /// Position along the flow path in `[0, 1)`.
    pub phase: f32,
    /// Path fractions per second.
    pub speed: f32,
    /// Offset from the path centreline.
    pub lateral: Vec3,
}

#[derive(Resource, Debug)]
pub struct FlowSettings {
    pub visible: bool,
    pub speed_multiplier: f32,
}

impl Default for FlowSettings {
    fn default() -> Self {
        Self {
            visible: true,
            speed_multiplier: 1.0,
        }
    }
}

#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub enum FlowCommand {
    Toggle,
    SetVisible(bool),
}

/// Raw and treated water materials.
#[derive(Resource)]
pub struct FlowMaterials {
    raw: Handle<StandardMaterial>,
    treated: Handle<StandardMaterial>,
}

impl FlowMaterials {
    pub fn for_stage(&self, stage: StageKey) -> &Handle<StandardMaterial> {
        if stage.is_treated() {
            &self.treated
        } else {
            &self.raw
        }
    }
}

/// Move a phase along the path, wrapping into `[0, 1)`.
pub fn advance_phase(phase: f32, speed: f32, dt: f32) -> f32 {
    let next = (phase + speed * dt).rem_euclid(1.0);
    if next.is_finite() && next < 1.0 {
        next
    } else {
        0.0
    }
}

/// Offset of a particle from the path, shaped by the stage it is passing through.
pub fn stage_offset(stage: StageKey, lateral: Vec3) -> Vec3 {
    match stage {
        StageKey::Lake => lateral * 3.0,
        StageKey::Pipeline => lateral * 0.3 + Vec3::Y * PIPELINE_RIDE_HEIGHT,
        _ => lateral,
    }
}

/// Evenly spread particles with seeded jitter in phase, speed and lateral offset.
pub fn generate_particles(count: usize, seed: u64) -> Vec<FlowParticle> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..count)
        .map(|i| {
            let jitter: f32 = rng.gen_range(0.0..1.0);
            FlowParticle {
                phase: advance_phase((i as f32 + jitter) / count as f32, 0.0, 0.0),
                speed: FLOW_BASE_SPEED * rng.gen_range(0.8..1.2),
                lateral: Vec3::new(
                    rng.gen_range(-FLOW_LATERAL_SCATTER..FLOW_LATERAL_SCATTER),
                    rng.gen_range(-0.2..0.2),
                    rng.gen_range(-FLOW_LATERAL_SCATTER..FLOW_LATERAL_SCATTER),
                ),
            }
        })
        .collect()
}

pub fn spawn_flow_particles(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
    path: &FlowPath,
) {
    let flow_materials = FlowMaterials {
        raw: materials.add(StandardMaterial {
            base_color: Color::srgb(0.30, 0.52, 0.45),
            emissive: LinearRgba::new(0.05, 0.12, 0.10, 1.0),
            ..default()
        }),
        treated: materials.add(StandardMaterial {
            base_color: Color::srgb(0.35, 0.75, 1.0),
            emissive: LinearRgba::new(0.1, 0.35, 0.8, 1.0),
            ..default()
        }),
    };
    let mesh = meshes.add(Sphere::new(FLOW_PARTICLE_RADIUS).mesh().uv(10, 8));

    let particles = generate_particles(FLOW_PARTICLE_COUNT, FLOW_SEED);
    for particle in &particles {
        let stage = path.stage_at(particle.phase);
        commands.spawn((
            Mesh3d(mesh.clone()),
            MeshMaterial3d(flow_materials.for_stage(stage).clone()),
            Transform::from_translation(
                path.position(particle.phase) + stage_offset(stage, particle.lateral),
            ),
            Visibility::Visible,
            *particle,
        ));
    }

    info!(
        "Spawned {} flow particles over {:.0} units of path",
        particles.len(),
        path.length()
    );
    commands.insert_resource(flow_materials);
}

pub fn animate_flow_particles(
    time: Res<Time>,
    settings: Res<FlowSettings>,
    path: Option<Res<FlowPath>>,
    flow_materials: Option<Res<FlowMaterials>>,
    mut particles: Query<(
        &mut FlowParticle,
        &mut Transform,
        &mut MeshMaterial3d<StandardMaterial>,
    )>,
) {
    let (Some(path), Some(flow_materials)) = (path, flow_materials) else {
        return;
    };
    if !settings.visible {
        return;
    }

    let dt = time.delta_secs() * settings.speed_multiplier;
    for (mut particle, mut transform, mut material) in &mut particles {
        particle.phase = advance_phase(particle.phase, particle.speed, dt);
        let stage = path.stage_at(particle.phase);
        transform.translation =
            path.position(particle.phase) + stage_offset(stage, particle.lateral);

        let tint = flow_materials.for_stage(stage);
        if material.0.id() != tint.id() {
            material.0 = tint.clone();
        }
    }
}

pub fn handle_flow_commands(
    mut events: EventReader<FlowCommand>,
    mut settings: ResMut<FlowSettings>,
    mut particles: Query<&mut Visibility, With<FlowParticle>>,
    mut rpc_interface: ResMut<WebRpcInterface>,
) {
    for command in events.read() {
        let visible = match *command {
            FlowCommand::Toggle => !settings.visible,
            FlowCommand::SetVisible(visible) => visible,
        };
        if visible == settings.visible {
            continue;
        }
        settings.visible = visible;

        for mut visibility in &mut particles {
            *visibility = if visible {
                Visibility::Visible
            } else {
                Visibility::Hidden
            };
        }

        info!("Flow particles {}", if visible { "shown" } else { "hidden" });
        rpc_interface.send_notification("flow_toggled", serde_json::json!({ "visible": visible }));
    }
}

pub fn flow_keyboard_shortcut(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut commands: EventWriter<FlowCommand>,
) {
    if keyboard.just_pressed(KeyCode::KeyF) {
        commands.write(FlowCommand::Toggle);
    }
}
