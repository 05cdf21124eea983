use bevy::prelude::*;
use constants::stage::StageKey;

use super::sites::world_anchor;

/// Stage currently focused by the tour, a click or the host page.
#[derive(Resource, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SelectedStage(pub Option<StageKey>);

/// Ring hovering over the selected stage.
#[derive(Component)]
pub struct SelectionRing;

const RING_HOVER: f32 = 14.0;
const RING_SPIN: f32 = 0.8;

pub fn spawn_selection_ring(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
) {
    commands.spawn((
        Mesh3d(meshes.add(Torus::new(3.2, 4.0))),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color: Color::srgb(1.0, 0.82, 0.35),
            emissive: LinearRgba::new(2.0, 1.5, 0.4, 1.0),
            unlit: true,
            ..default()
        })),
        Transform::default(),
        Visibility::Hidden,
        SelectionRing,
        Name::new("Selection Ring"),
    ));
}

/// Keep the ring above the selected stage, hidden when nothing is selected.
pub fn update_selection_ring(
    selected: Res<SelectedStage>,
    time: Res<Time>,
    mut rings: Query<(&mut Transform, &mut Visibility), With<SelectionRing>>,
) {
    for (mut transform, mut visibility) in &mut rings {
        let Some(stage) = selected.0 else {
            *visibility = Visibility::Hidden;
            continue;
        };
        *visibility = Visibility::Visible;

        let bob = (time.elapsed_secs() * 2.0).sin() * 0.6;
        transform.translation = world_anchor(stage) + Vec3::Y * (RING_HOVER + bob);
        transform.rotation = Quat::from_rotation_y(time.elapsed_secs() * RING_SPIN);
    }
}
