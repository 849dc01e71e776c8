use bevy::pbr::NotShadowCaster;
use bevy::prelude::*;
use bevy::render::mesh::{Indices, PrimitiveTopology};
use bevy::render::render_asset::RenderAssetUsages;
use genesphere_core::HighlightProfile;
use std::f32::consts::TAU;

use crate::app::resources::GeneView;
use crate::render::instances::to_color;

const RINGS: usize = 48;
const SIDES: usize = 16;

/// Glow tube over the hovered edge. Hidden unless the engine hands it a profile.
#[derive(Component)]
pub struct HighlightTube;

impl HighlightTube {
    pub fn spawn_bundle(
        meshes: &mut Assets<Mesh>,
        mats: &mut Assets<StandardMaterial>,
    ) -> (PbrBundle, HighlightTube, NotShadowCaster) {
        (
            PbrBundle {
                mesh: meshes.add(Mesh::new(
                    PrimitiveTopology::TriangleList,
                    RenderAssetUsages::default(),
                )),
                material: mats.add(StandardMaterial {
                    base_color: Color::WHITE,
                    unlit: true,
                    alpha_mode: AlphaMode::Blend,
                    cull_mode: None,
                    double_sided: true,
                    // keeps the glow on top of the edge it wraps
                    depth_bias: 1000.0,
                    ..default()
                }),
                visibility: Visibility::Hidden,
                ..default()
            },
            HighlightTube,
            NotShadowCaster,
        )
    }
}

/// Tube along `+Z` from 0 to `profile.length`, radius and per-vertex alpha
/// taken from the profile.
pub fn tube_mesh(profile: &HighlightProfile, rings: usize, sides: usize) -> Mesh {
    let sides = sides.max(3);
    let samples = profile.sample(rings);
    let rgb = to_color(profile.color).to_linear();

    let mut positions = Vec::with_capacity(samples.len() * (sides + 1));
    let mut normals = Vec::with_capacity(positions.capacity());
    let mut colors = Vec::with_capacity(positions.capacity());
    for s in &samples {
        for k in 0..=sides {
            let a = k as f32 / sides as f32 * TAU;
            let (sin, cos) = a.sin_cos();
            positions.push([cos * s.radius, sin * s.radius, s.distance]);
            normals.push([cos, sin, 0.0]);
            colors.push([rgb.red, rgb.green, rgb.blue, s.alpha]);
        }
    }

    let stride = (sides + 1) as u32;
    let mut indices = Vec::with_capacity((samples.len().saturating_sub(1)) * sides * 6);
    for r in 0..samples.len().saturating_sub(1) as u32 {
        for k in 0..sides as u32 {
            let a = r * stride + k;
            let b = a + stride;
            indices.extend_from_slice(&[a, b, a + 1, a + 1, b, b + 1]);
        }
    }

    Mesh::new(PrimitiveTopology::TriangleList, RenderAssetUsages::default())
        .with_inserted_attribute(Mesh::ATTRIBUTE_POSITION, positions)
        .with_inserted_attribute(Mesh::ATTRIBUTE_NORMAL, normals)
        .with_inserted_attribute(Mesh::ATTRIBUTE_COLOR, colors)
        .with_inserted_indices(Indices::U32(indices))
}

pub fn sync_highlight(
    mut view: ResMut<GeneView>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut tube_q: Query<(&Handle<Mesh>, &mut Transform, &mut Visibility), With<HighlightTube>>,
) {
    let buffers = view.session.adapter_mut();
    if !buffers.highlight_dirty {
        return;
    }
    buffers.highlight_dirty = false;
    let Ok((handle, mut transform, mut visibility)) = tube_q.get_single_mut() else {
        return;
    };
    match buffers.highlight {
        Some(profile) => {
            if let Some(mesh) = meshes.get_mut(handle) {
                *mesh = tube_mesh(&profile, RINGS, SIDES);
            }
            *transform = Transform::from_translation(profile.origin).with_rotation(profile.rotation);
            *visibility = Visibility::Inherited;
        }
        None => *visibility = Visibility::Hidden,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use genesphere_core::Srgb;

    #[test]
    fn tube_vertices_follow_profile() {
        let profile = HighlightProfile {
            origin: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            length: 30.0,
            radius_start: 2.0,
            radius_end: 2.0,
            base_radius: 0.2,
            max_alpha: 0.85,
            color: Srgb::WHITE,
        };
        let mesh = tube_mesh(&profile, 10, 8);
        assert_eq!(mesh.count_vertices(), 11 * 9);
        assert_eq!(mesh.indices().map(Indices::len), Some(10 * 8 * 6));

        let Some(bevy::render::mesh::VertexAttributeValues::Float32x4(colors)) =
            mesh.attribute(Mesh::ATTRIBUTE_COLOR)
        else {
            panic!("colors");
        };
        // masked at both endpoints, opaque-ish in the middle
        assert_eq!(colors[0][3], 0.0);
        assert_eq!(colors[colors.len() - 1][3], 0.0);
        assert!((colors[5 * 9][3] - 0.85).abs() < 1e-4);
    }
}
