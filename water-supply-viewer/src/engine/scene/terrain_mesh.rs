/// Vertex-coloured terrain grid built from the procedural height field.
use bevy::asset::RenderAssetUsages;
use bevy::prelude::*;
use bevy::render::mesh::{Indices, PrimitiveTopology};
use constants::terrain::{TERRAIN_RESOLUTION, TERRAIN_SIZE};

use super::height_field::sample_terrain;
use super::terrain_colour::terrain_colour;

#[derive(Component)]
pub struct Terrain;

/// Build a square grid mesh of `resolution` vertices per side spanning `size` world units.
pub fn build_terrain_mesh(resolution: usize, size: f32) -> Mesh {
    let resolution = resolution.max(2);
    let half = size * 0.5;
    let step = size / (resolution - 1) as f32;

    let vertex_count = resolution * resolution;
    let mut positions = Vec::with_capacity(vertex_count);
    let mut normals = Vec::with_capacity(vertex_count);
    let mut colours = Vec::with_capacity(vertex_count);
    let mut uvs = Vec::with_capacity(vertex_count);

    for row in 0..resolution {
        for col in 0..resolution {
            let x = -half + col as f32 * step;
            let z = -half + row as f32 * step;
            let sample = sample_terrain(x, z);

            positions.push([x, sample.height, z]);
            normals.push(sample.normal.to_array());
            colours.push(terrain_colour(&sample));
            uvs.push([
                col as f32 / (resolution - 1) as f32,
                row as f32 / (resolution - 1) as f32,
            ]);
        }
    }

    let cells = resolution - 1;
    let mut indices = Vec::with_capacity(cells * cells * 6);
    for row in 0..cells {
        for col in 0..cells {
            let top_left = (row * resolution + col) as u32;
            let top_right = top_left + 1;
            let bottom_left = top_left + resolution as u32;
            let bottom_right = bottom_left + 1;

            // Counter-clockwise when viewed from above (+Y).
            indices.extend_from_slice(&[top_left, bottom_left, top_right]);
            indices.extend_from_slice(&[top_right, bottom_left, bottom_right]);
        }
    }

    let mut mesh = Mesh::new(
        PrimitiveTopology::TriangleList,
        RenderAssetUsages::RENDER_WORLD,
    );
    mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, positions);
    mesh.insert_attribute(Mesh::ATTRIBUTE_NORMAL, normals);
    mesh.insert_attribute(Mesh::ATTRIBUTE_COLOR, colours);
    mesh.insert_attribute(Mesh::ATTRIBUTE_UV_0, uvs);
    mesh.insert_indices(Indices::U32(indices));
    mesh
}

/// Spawn the terrain entity with a vertex-colour driven material.
pub fn spawn_terrain(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
) {
    let mesh = build_terrain_mesh(TERRAIN_RESOLUTION, TERRAIN_SIZE);
    info!(
        "Terrain mesh built: {}x{} vertices over {} units",
        TERRAIN_RESOLUTION, TERRAIN_RESOLUTION, TERRAIN_SIZE
    );

    commands.spawn((
        Mesh3d(meshes.add(mesh)),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color: Color::WHITE,
            perceptual_roughness: 0.95,
            metallic: 0.0,
            ..default()
        })),
        Transform::IDENTITY,
        Terrain,
        Name::new("Terrain"),
    ));
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::render::mesh::VertexAttributeValues;

    #[test]
    fn grid_has_expected_counts() {
        let mesh = build_terrain_mesh(11, 100.0);
        assert_eq!(mesh.count_vertices(), 121);
        let Some(Indices::U32(indices)) = mesh.indices() else {
            panic!("expected u32 indices");
        };
        assert_eq!(indices.len(), 10 * 10 * 6);
        assert!(indices.iter().all(|&i| (i as usize) < 121));
    }

    #[test]
    fn degenerate_resolution_is_raised() {
        let mesh = build_terrain_mesh(0, 50.0);
        assert_eq!(mesh.count_vertices(), 4);
    }

    #[test]
    fn grid_spans_requested_size() {
        let mesh = build_terrain_mesh(5, 80.0);
        let Some(VertexAttributeValues::Float32x3(positions)) =
            mesh.attribute(Mesh::ATTRIBUTE_POSITION)
        else {
            panic!("missing positions");
        };
        assert_eq!(positions[0][0], -40.0);
        assert_eq!(positions[0][2], -40.0);
        assert_eq!(positions[24][0], 40.0);
        assert_eq!(positions[24][2], 40.0);
    }

    #[test]
    fn triangles_face_up() {
        let mesh = build_terrain_mesh(3, 10.0);
        let Some(VertexAttributeValues::Float32x3(positions)) =
            mesh.attribute(Mesh::ATTRIBUTE_POSITION)
        else {
            panic!("missing positions");
        };
        let Some(Indices::U32(indices)) = mesh.indices() else {
            panic!("expected u32 indices");
        };
        let a = Vec3::from(positions[indices[0] as usize]);
        let b = Vec3::from(positions[indices[1] as usize]);
        let c = Vec3::from(positions[indices[2] as usize]);
        assert!((b - a).cross(c - a).y > 0.0);
    }
}
