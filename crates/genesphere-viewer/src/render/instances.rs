use bevy::pbr::NotShadowCaster;
use bevy::prelude::*;
use bevy::render::render_resource::Face;
use genesphere_core::{
    HighlightProfile, InstanceCategory, InstanceCounts, InstanceTransform, PointerAffordance,
    RenderAdapter, Srgb,
};
use std::collections::HashMap;

use crate::app::resources::GeneView;
use crate::render::camera::NetworkRoot;

/// CPU-side mirror of every instance the engine drives. Bevy systems drain
/// the dirty flags into entities once per frame.
#[derive(Debug, Default)]
pub struct InstanceBuffers {
    pub counts: InstanceCounts,
    /// Bumped on every `allocate`; entities are respawned when it changes.
    pub generation: u64,
    pub spawned_generation: Option<u64>,
    pub transforms: [Vec<InstanceTransform>; 6],
    pub colors: [Vec<Srgb>; 6],
    pub transforms_dirty: bool,
    pub colors_dirty: bool,
    pub highlight: Option<HighlightProfile>,
    pub highlight_dirty: bool,
    pub group_rotation: Quat,
    pub view_distance: f32,
    pub affordance: PointerAffordance,
    pub released: bool,
}

impl RenderAdapter for InstanceBuffers {
    fn allocate(&mut self, counts: InstanceCounts) {
        self.counts = counts;
        self.generation += 1;
        for category in InstanceCategory::ALL {
            let n = counts.of(category);
            self.transforms[category.slot()] = vec![InstanceTransform::HIDDEN; n];
            self.colors[category.slot()] = vec![Srgb::WHITE; n];
        }
        self.transforms_dirty = true;
        self.colors_dirty = true;
    }

    fn set_instance_transform(
        &mut self,
        category: InstanceCategory,
        index: usize,
        transform: InstanceTransform,
    ) {
        if let Some(slot) = self.transforms[category.slot()].get_mut(index) {
            *slot = transform;
            self.transforms_dirty = true;
        }
    }

    fn set_instance_color(&mut self, category: InstanceCategory, index: usize, color: Srgb) {
        if let Some(slot) = self.colors[category.slot()].get_mut(index) {
            if *slot != color {
                *slot = color;
                self.colors_dirty = true;
            }
        }
    }

    fn set_highlight_profile(&mut self, profile: Option<&HighlightProfile>) {
        let next = profile.copied();
        if self.highlight != next {
            self.highlight = next;
            self.highlight_dirty = true;
        }
    }

    fn set_group_rotation(&mut self, rotation: Quat) {
        self.group_rotation = rotation;
    }

    fn set_view_distance(&mut self, distance: f32) {
        self.view_distance = distance;
    }

    fn set_pointer_affordance(&mut self, affordance: PointerAffordance) {
        self.affordance = affordance;
    }

    fn is_ready(&self) -> bool {
        !self.released && self.spawned_generation == Some(self.generation)
    }

    fn release(&mut self) {
        for category in InstanceCategory::ALL {
            self.transforms[category.slot()] = Vec::new();
            self.colors[category.slot()] = Vec::new();
        }
        self.counts = InstanceCounts::default();
        self.highlight = None;
        self.spawned_generation = None;
        self.released = true;
    }
}

#[derive(Component, Debug, Clone, Copy)]
pub struct InstanceMarker {
    pub category: InstanceCategory,
    pub index: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Shading {
    Lit,
    Outline,
    Flat,
}

impl Shading {
    fn of(category: InstanceCategory) -> Self {
        match category {
            InstanceCategory::Node => Self::Lit,
            InstanceCategory::NodeOutline => Self::Outline,
            _ => Self::Flat,
        }
    }
}

/// Shared meshes plus one material per (shading, color) pair.
#[derive(Resource)]
pub struct SceneAssets {
    pub sphere: Handle<Mesh>,
    pub segment: Handle<Mesh>,
    materials: HashMap<(Shading, Srgb), Handle<StandardMaterial>>,
}

impl SceneAssets {
    pub fn new(meshes: &mut Assets<Mesh>) -> Self {
        Self {
            sphere: meshes.add(Sphere::new(1.0).mesh().uv(32, 18)),
            segment: meshes.add(segment_mesh()),
            materials: HashMap::new(),
        }
    }

    fn material(
        &mut self,
        category: InstanceCategory,
        color: Srgb,
        mats: &mut Assets<StandardMaterial>,
    ) -> Handle<StandardMaterial> {
        let shading = Shading::of(category);
        self.materials
            .entry((shading, color))
            .or_insert_with(|| mats.add(material_for(shading, color)))
            .clone()
    }

    pub fn mesh(&self, category: InstanceCategory) -> Handle<Mesh> {
        match category {
            InstanceCategory::Node | InstanceCategory::NodeOutline => self.sphere.clone(),
            _ => self.segment.clone(),
        }
    }

    /// Drops every handle so the asset server can free the GPU copies.
    pub fn clear(
        &mut self,
        meshes: &mut Assets<Mesh>,
        mats: &mut Assets<StandardMaterial>,
    ) {
        for (_, handle) in self.materials.drain() {
            mats.remove(&handle);
        }
        meshes.remove(&self.sphere);
        meshes.remove(&self.segment);
    }
}

pub fn to_color(c: Srgb) -> Color {
    Color::srgb_u8(c.r, c.g, c.b)
}

fn material_for(shading: Shading, color: Srgb) -> StandardMaterial {
    match shading {
        Shading::Lit => StandardMaterial {
            base_color: to_color(color),
            perceptual_roughness: 0.6,
            reflectance: 0.2,
            ..default()
        },
        // inverted hull: only the back faces of the enlarged sphere show
        Shading::Outline => StandardMaterial {
            base_color: to_color(color),
            unlit: true,
            cull_mode: Some(Face::Front),
            ..default()
        },
        Shading::Flat => StandardMaterial {
            base_color: to_color(color),
            unlit: true,
            ..default()
        },
    }
}

/// Unit cylinder from the origin to `+Z` at length 1.
pub fn segment_mesh() -> Mesh {
    Cylinder::new(1.0, 1.0)
        .mesh()
        .resolution(8)
        .build()
        .rotated_by(Quat::from_rotation_x(std::f32::consts::FRAC_PI_2))
        .translated_by(Vec3::new(0.0, 0.0, 0.5))
}

fn apply(t: &InstanceTransform, transform: &mut Transform, visibility: &mut Visibility) {
    if t.is_hidden() {
        *visibility = Visibility::Hidden;
        return;
    }
    *visibility = Visibility::Inherited;
    *transform = Transform {
        translation: t.translation,
        rotation: t.rotation,
        scale: t.scale,
    };
}

/// Respawns instance entities after an `allocate`, otherwise copies dirty
/// transforms and colors onto the existing ones.
#[allow(clippy::too_many_arguments)]
pub fn sync_instances(
    mut commands: Commands,
    mut view: ResMut<GeneView>,
    mut assets: ResMut<SceneAssets>,
    mut mats: ResMut<Assets<StandardMaterial>>,
    root_q: Query<Entity, With<NetworkRoot>>,
    mut inst_q: Query<(
        Entity,
        &InstanceMarker,
        &mut Transform,
        &mut Visibility,
        &mut Handle<StandardMaterial>,
    )>,
) {
    let buffers = view.session.adapter_mut();
    if buffers.released {
        return;
    }

    if buffers.spawned_generation != Some(buffers.generation) {
        let Ok(root) = root_q.get_single() else {
            return;
        };
        for (entity, ..) in inst_q.iter() {
            commands.entity(entity).despawn_recursive();
        }
        commands.entity(root).with_children(|parent| {
            for category in InstanceCategory::ALL {
                let slot = category.slot();
                for (index, t) in buffers.transforms[slot].iter().enumerate() {
                    let mut transform = Transform::IDENTITY;
                    let mut visibility = Visibility::Inherited;
                    apply(t, &mut transform, &mut visibility);
                    let color = buffers.colors[slot][index];
                    let mut entity = parent.spawn((
                        PbrBundle {
                            mesh: assets.mesh(category),
                            material: assets.material(category, color, &mut mats),
                            transform,
                            visibility,
                            ..default()
                        },
                        InstanceMarker { category, index },
                    ));
                    if category != InstanceCategory::Node {
                        entity.insert(NotShadowCaster);
                    }
                }
            }
        });
        buffers.spawned_generation = Some(buffers.generation);
        buffers.transforms_dirty = false;
        buffers.colors_dirty = false;
        return;
    }

    if !buffers.transforms_dirty && !buffers.colors_dirty {
        return;
    }
    for (_, marker, mut transform, mut visibility, mut material) in inst_q.iter_mut() {
        let slot = marker.category.slot();
        if buffers.transforms_dirty {
            if let Some(t) = buffers.transforms[slot].get(marker.index) {
                apply(t, &mut transform, &mut visibility);
            }
        }
        if buffers.colors_dirty {
            if let Some(&color) = buffers.colors[slot].get(marker.index) {
                let handle = assets.material(marker.category, color, &mut mats);
                if *material != handle {
                    *material = handle;
                }
            }
        }
    }
    buffers.transforms_dirty = false;
    buffers.colors_dirty = false;
}
