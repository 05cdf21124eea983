/// Primitive geometry standing in for each stage when no downloaded model is available.
use bevy::asset::RenderAssetUsages;
use bevy::prelude::*;
use bevy::render::mesh::{Indices, PrimitiveTopology};
use constants::stage::StageKey;

use super::sites::{StageSite, canal_water_point, dam_crest, pipeline_point, site, world_anchor};
use crate::constants::layout::{
    CANAL_HALF_WIDTH, CANAL_POINTS, DAM_POSITION, HOUSE_SPACING, HOUSES_PER_SIDE, LAKE_CENTRE,
    LAKE_RADIUS, PIPELINE_POINTS, PUMP_POSITION, RIDGE_NOTCH_WIDTH,
};
use crate::engine::scene::height_field::{ground, terrain_height};
use crate::engine::scene::lighting::{StreetLamp, WindowGlow};

/// Spacing of samples along the canal strip.
const CANAL_STRIP_STEP: f32 = 2.0;

const PIPE_RADIUS: f32 = 0.8;

/// Material slot shared by every placeholder part.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Surface {
    Concrete,
    LakeWater,
    CanalWater,
    ClarifierWater,
    Steel,
    Wall,
    Roof,
    Window,
    LampHead,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartKind {
    Solid,
    /// Emissive window pane driven by the lighting mode.
    Window,
    /// Lamp head carrying a point light.
    Lamp,
}

/// One mesh of a placeholder, positioned relative to the stage root.
pub struct PlaceholderPart {
    pub mesh: Mesh,
    pub surface: Surface,
    pub transform: Transform,
    pub kind: PartKind,
}

impl PlaceholderPart {
    fn solid(mesh: impl Into<Mesh>, surface: Surface, transform: Transform) -> Self {
        Self {
            mesh: mesh.into(),
            surface,
            transform,
            kind: PartKind::Solid,
        }
    }
}

/// Material handles for every placeholder surface, created once.
#[derive(Resource, Clone)]
pub struct PlaceholderPalette {
    concrete: Handle<StandardMaterial>,
    lake_water: Handle<StandardMaterial>,
    canal_water: Handle<StandardMaterial>,
    clarifier_water: Handle<StandardMaterial>,
    steel: Handle<StandardMaterial>,
    wall: Handle<StandardMaterial>,
    roof: Handle<StandardMaterial>,
    window: Handle<StandardMaterial>,
    lamp_head: Handle<StandardMaterial>,
}

impl PlaceholderPalette {
    pub fn new(materials: &mut Assets<StandardMaterial>) -> Self {
        let mut matte = |r: f32, g: f32, b: f32, roughness: f32| {
            materials.add(StandardMaterial {
                base_color: Color::srgb(r, g, b),
                perceptual_roughness: roughness,
                ..default()
            })
        };
        let concrete = matte(0.66, 0.65, 0.62, 0.9);
        let steel = matte(0.42, 0.46, 0.50, 0.4);
        let wall = matte(0.88, 0.84, 0.76, 0.85);
        let roof = matte(0.55, 0.22, 0.16, 0.8);

        let mut water = |r: f32, g: f32, b: f32, alpha: f32| {
            materials.add(StandardMaterial {
                base_color: Color::srgba(r, g, b, alpha),
                alpha_mode: AlphaMode::Blend,
                perceptual_roughness: 0.08,
                reflectance: 0.6,
                double_sided: true,
                cull_mode: None,
                ..default()
            })
        };
        let lake_water = water(0.16, 0.38, 0.52, 0.82);
        let canal_water = water(0.20, 0.42, 0.48, 0.85);
        let clarifier_water = water(0.25, 0.55, 0.70, 0.9);

        let window = materials.add(StandardMaterial {
            base_color: Color::srgb(0.18, 0.20, 0.24),
            emissive: LinearRgba::BLACK,
            ..default()
        });
        let lamp_head = materials.add(StandardMaterial {
            base_color: Color::srgb(1.0, 0.92, 0.7),
            emissive: LinearRgba::new(4.0, 3.2, 1.8, 1.0),
            ..default()
        });

        Self {
            concrete,
            lake_water,
            canal_water,
            clarifier_water,
            steel,
            wall,
            roof,
            window,
            lamp_head,
        }
    }

    pub fn material(&self, surface: Surface) -> Handle<StandardMaterial> {
        match surface {
            Surface::Concrete => self.concrete.clone(),
            Surface::LakeWater => self.lake_water.clone(),
            Surface::CanalWater => self.canal_water.clone(),
            Surface::ClarifierWater => self.clarifier_water.clone(),
            Surface::Steel => self.steel.clone(),
            Surface::Wall => self.wall.clone(),
            Surface::Roof => self.roof.clone(),
            Surface::Window => self.window.clone(),
            Surface::LampHead => self.lamp_head.clone(),
        }
    }
}

/// Rotation about +Y that turns local +X toward a ground direction.
fn yaw_towards(direction: Vec2) -> Quat {
    Quat::from_rotation_y(f32::atan2(-direction.y, direction.x))
}

/// Ground-relative offset rotated by the site heading, lifted onto the terrain.
fn local_on_ground(site: &StageSite, origin: Vec3, offset: Vec2, lift: f32) -> Vec3 {
    let rotated = Vec2::from_angle(-site.heading).rotate(offset);
    let world = ground(site.anchor) + rotated;
    Vec3::new(
        rotated.x,
        terrain_height(world.x, world.y) + lift - origin.y,
        rotated.y,
    )
}

fn lake_parts() -> Vec<PlaceholderPart> {
    vec![PlaceholderPart::solid(
        Circle::new(LAKE_RADIUS).mesh().resolution(96),
        Surface::LakeWater,
        Transform::from_rotation(Quat::from_rotation_x(-std::f32::consts::FRAC_PI_2)),
    )]
}

fn dam_parts(origin: Vec3) -> Vec<PlaceholderPart> {
    let crest = dam_crest();
    let [x, z] = DAM_POSITION;
    let footing = terrain_height(x, z) - 4.0;
    let wall_height = crest.y - footing;
    let wall_length = RIDGE_NOTCH_WIDTH * 2.4;
    let across = (ground(DAM_POSITION) - ground(LAKE_CENTRE)).normalize();
    let rotation = yaw_towards(across.perp());
    let centre_y = footing + wall_height * 0.5 - origin.y;

    let mut parts = vec![PlaceholderPart::solid(
        Cuboid::new(wall_length, wall_height, 5.0),
        Surface::Concrete,
        Transform::from_translation(Vec3::Y * centre_y).with_rotation(rotation),
    )];

    // Spillway chute on the downstream face, a notch lower than the crest.
    let downstream = Vec3::new(across.x, 0.0, across.y);
    let chute_height = wall_height * 0.8;
    parts.push(PlaceholderPart::solid(
        Cuboid::new(6.0, chute_height, 3.0),
        Surface::Steel,
        Transform::from_translation(
            downstream * 3.5 + Vec3::Y * (footing + chute_height * 0.5 - origin.y),
        )
        .with_rotation(rotation),
    ));
    parts
}

/// Flat ribbon of water following a ground polyline at canal-water height.
pub fn build_canal_strip(points: &[Vec2], half_width: f32, step: f32) -> Mesh {
    let mut centres: Vec<Vec2> = Vec::new();
    for segment in points.windows(2) {
        let (a, b) = (segment[0], segment[1]);
        let samples = ((a.distance(b) / step.max(0.1)).ceil() as usize).max(1);
        for i in 0..samples {
            centres.push(a.lerp(b, i as f32 / samples as f32));
        }
    }
    if let Some(last) = points.last() {
        centres.push(*last);
    }

    let mut positions = Vec::with_capacity(centres.len() * 2);
    let mut normals = Vec::with_capacity(centres.len() * 2);
    let mut uvs = Vec::with_capacity(centres.len() * 2);
    for (i, centre) in centres.iter().enumerate() {
        let prev = centres[i.saturating_sub(1)];
        let next = centres[(i + 1).min(centres.len() - 1)];
        let side = (next - prev).normalize_or_zero().perp() * half_width;
        let y = canal_water_point([centre.x, centre.y]).y;
        let v = i as f32 / (centres.len().max(2) - 1) as f32;

        for (edge, u) in [(*centre + side, 0.0), (*centre - side, 1.0)] {
            positions.push([edge.x, y, edge.y]);
            normals.push([0.0, 1.0, 0.0]);
            uvs.push([u, v]);
        }
    }

    let mut indices = Vec::new();
    for i in 0..centres.len().saturating_sub(1) as u32 {
        let (l0, r0, l1, r1) = (i * 2, i * 2 + 1, i * 2 + 2, i * 2 + 3);
        // Counter-clockwise from above.
        indices.extend_from_slice(&[l0, l1, r0, l1, r1, r0]);
    }

    let mut mesh = Mesh::new(
        PrimitiveTopology::TriangleList,
        RenderAssetUsages::RENDER_WORLD,
    );
    mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, positions);
    mesh.insert_attribute(Mesh::ATTRIBUTE_NORMAL, normals);
    mesh.insert_attribute(Mesh::ATTRIBUTE_UV_0, uvs);
    mesh.insert_indices(Indices::U32(indices));
    mesh
}

fn canal_parts(origin: Vec3) -> Vec<PlaceholderPart> {
    let polyline = CANAL_POINTS.map(ground);
    vec![PlaceholderPart::solid(
        build_canal_strip(&polyline, CANAL_HALF_WIDTH, CANAL_STRIP_STEP),
        Surface::CanalWater,
        Transform::from_translation(-origin),
    )]
}

fn treatment_parts(origin: Vec3) -> Vec<PlaceholderPart> {
    let site = site(StageKey::TreatmentPlant);
    let rotation = Quat::from_rotation_y(site.heading);
    let mut parts = vec![
        PlaceholderPart::solid(
            Cuboid::new(46.0, 3.0, 30.0),
            Surface::Concrete,
            Transform::from_rotation(rotation),
        ),
        PlaceholderPart::solid(
            Cuboid::new(20.0, 8.0, 12.0),
            Surface::Wall,
            Transform::from_translation(local_on_ground(site, origin, Vec2::new(-10.0, -6.0), 4.0))
                .with_rotation(rotation),
        ),
    ];

    for i in 0..3 {
        let offset = Vec2::new(4.0 + i as f32 * 11.0, 7.0);
        let base = local_on_ground(site, origin, offset - Vec2::X * 10.0, 0.0);
        parts.push(PlaceholderPart::solid(
            Cylinder::new(5.0, 3.2),
            Surface::Concrete,
            Transform::from_translation(base + Vec3::Y * 1.6),
        ));
        parts.push(PlaceholderPart::solid(
            Circle::new(4.6),
            Surface::ClarifierWater,
            Transform::from_translation(base + Vec3::Y * 3.0)
                .with_rotation(Quat::from_rotation_x(-std::f32::consts::FRAC_PI_2)),
        ));
    }
    parts
}

fn pump_parts(origin: Vec3) -> Vec<PlaceholderPart> {
    let site = site(StageKey::PumpStation);
    let rotation = Quat::from_rotation_y(site.heading);
    let house = local_on_ground(site, origin, Vec2::ZERO, 3.0);
    let tower = local_on_ground(site, origin, Vec2::new(9.0, 2.0), 7.0);
    vec![
        PlaceholderPart::solid(
            Cuboid::new(12.0, 6.0, 9.0),
            Surface::Wall,
            Transform::from_translation(house).with_rotation(rotation),
        ),
        PlaceholderPart::solid(
            Cuboid::new(13.0, 0.6, 10.0),
            Surface::Roof,
            Transform::from_translation(house + Vec3::Y * 3.3).with_rotation(rotation),
        ),
        PlaceholderPart::solid(
            Cylinder::new(2.0, 14.0),
            Surface::Steel,
            Transform::from_translation(tower),
        ),
    ]
}

/// Straight cylinder between two world points.
fn pipe_between(a: Vec3, b: Vec3, origin: Vec3) -> PlaceholderPart {
    let span = b - a;
    let rotation = Quat::from_rotation_arc(Vec3::Y, span.normalize_or(Vec3::Y));
    PlaceholderPart::solid(
        Cylinder::new(PIPE_RADIUS, span.length()),
        Surface::Steel,
        Transform::from_translation((a + b) * 0.5 - origin).with_rotation(rotation),
    )
}

fn pipeline_parts(origin: Vec3) -> Vec<PlaceholderPart> {
    let mut bends: Vec<Vec3> = Vec::with_capacity(PIPELINE_POINTS.len() + 1);
    bends.push(pipeline_point(PUMP_POSITION));
    bends.extend(PIPELINE_POINTS.iter().map(|&point| pipeline_point(point)));

    let mut parts: Vec<PlaceholderPart> = bends
        .windows(2)
        .map(|pair| pipe_between(pair[0], pair[1], origin))
        .collect();

    for bend in bends.iter().skip(1) {
        let footing = terrain_height(bend.x, bend.z) - 1.0;
        let pier_height = bend.y - footing;
        parts.push(PlaceholderPart::solid(
            Cuboid::new(1.4, pier_height, 1.4),
            Surface::Concrete,
            Transform::from_translation(
                Vec3::new(bend.x, footing + pier_height * 0.5, bend.z) - origin,
            ),
        ));
    }
    parts
}

fn residential_parts(origin: Vec3) -> Vec<PlaceholderPart> {
    let site = site(StageKey::Residential);
    let mut parts = Vec::new();
    let half = (HOUSES_PER_SIDE as f32 - 1.0) * 0.5;

    for row in 0..HOUSES_PER_SIDE {
        for col in 0..HOUSES_PER_SIDE {
            let offset = Vec2::new(col as f32 - half, row as f32 - half) * HOUSE_SPACING;
            let base = local_on_ground(site, origin, offset, 0.0);
            let yaw = Quat::from_rotation_y(((row + col) % 2) as f32 * std::f32::consts::PI);

            parts.push(PlaceholderPart::solid(
                Cuboid::new(6.0, 4.0, 6.0),
                Surface::Wall,
                Transform::from_translation(base + Vec3::Y * 1.6).with_rotation(yaw),
            ));
            parts.push(PlaceholderPart::solid(
                Cone::new(4.6, 2.8).mesh().resolution(4),
                Surface::Roof,
                Transform::from_translation(base + Vec3::Y * 5.0)
                    .with_rotation(yaw * Quat::from_rotation_y(std::f32::consts::FRAC_PI_4)),
            ));
            parts.push(PlaceholderPart {
                mesh: Cuboid::new(2.4, 1.4, 0.1).into(),
                surface: Surface::Window,
                transform: Transform::from_translation(
                    base + Vec3::Y * 2.0 + yaw * Vec3::new(0.0, 0.0, 3.02),
                )
                .with_rotation(yaw),
                kind: PartKind::Window,
            });
        }
    }

    // Lamps line the two streets between the house rows.
    for street in [-1.0, 1.0] {
        for col in 0..HOUSES_PER_SIDE {
            let offset = Vec2::new(col as f32 - half, street) * HOUSE_SPACING;
            let base = local_on_ground(site, origin, offset, 0.0);
            parts.push(PlaceholderPart::solid(
                Cylinder::new(0.15, 5.0),
                Surface::Steel,
                Transform::from_translation(base + Vec3::Y * 2.5),
            ));
            parts.push(PlaceholderPart {
                mesh: Sphere::new(0.45).into(),
                surface: Surface::LampHead,
                transform: Transform::from_translation(base + Vec3::Y * 5.2),
                kind: PartKind::Lamp,
            });
        }
    }
    parts
}

/// Placeholder geometry for a stage, relative to its world anchor.
pub fn placeholder_parts(stage: StageKey) -> Vec<PlaceholderPart> {
    let origin = world_anchor(stage);
    match stage {
        StageKey::Lake => lake_parts(),
        StageKey::Dam => dam_parts(origin),
        StageKey::Canal => canal_parts(origin),
        StageKey::TreatmentPlant => treatment_parts(origin),
        StageKey::PumpStation => pump_parts(origin),
        StageKey::Pipeline => pipeline_parts(origin),
        StageKey::Residential => residential_parts(origin),
    }
}

/// Attach placeholder geometry to a stage root entity.
pub fn spawn_placeholder(
    commands: &mut Commands,
    root: Entity,
    stage: StageKey,
    palette: &PlaceholderPalette,
    meshes: &mut Assets<Mesh>,
) {
    let parts = placeholder_parts(stage);
    let part_count = parts.len();

    commands.entity(root).with_children(|parent| {
        for part in parts {
            let material = palette.material(part.surface);
            let mut child = parent.spawn((
                Mesh3d(meshes.add(part.mesh)),
                MeshMaterial3d(material.clone()),
                part.transform,
            ));
            match part.kind {
                PartKind::Solid => {}
                PartKind::Window => {
                    child.insert(WindowGlow(material));
                }
                PartKind::Lamp => {
                    child.insert((
                        PointLight {
                            color: Color::srgb(1.0, 0.86, 0.6),
                            intensity: 0.0,
                            range: 18.0,
                            shadows_enabled: false,
                            ..default()
                        },
                        StreetLamp,
                    ));
                }
            }
        }
    });

    info!("Placeholder for {} spawned ({} parts)", stage, part_count);
}
