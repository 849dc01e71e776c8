use bevy::prelude::*;
use bevy::render::camera::PerspectiveProjection;

use crate::app::resources::GeneView;
use crate::render::highlight::HighlightTube;
use crate::render::instances::SceneAssets;

/// Parent of every network instance; carries the group rotation.
#[derive(Component)]
pub struct NetworkRoot;

#[derive(Component)]
pub struct ViewCamera;

pub const BACKGROUND: Color = Color::srgb(0.941, 0.957, 0.973);

pub fn setup_scene(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut mats: ResMut<Assets<StandardMaterial>>,
    view: Res<GeneView>,
) {
    commands.insert_resource(ClearColor(BACKGROUND));
    commands.insert_resource(AmbientLight {
        color: Color::WHITE,
        brightness: 400.0,
    });
    commands.insert_resource(SceneAssets::new(&mut meshes));

    commands.spawn(DirectionalLightBundle {
        directional_light: DirectionalLight {
            illuminance: 6000.0,
            ..default()
        },
        transform: Transform::from_xyz(100.0, 100.0, 100.0).looking_at(Vec3::ZERO, Vec3::Y),
        ..default()
    });
    commands.spawn(DirectionalLightBundle {
        directional_light: DirectionalLight {
            illuminance: 3000.0,
            ..default()
        },
        transform: Transform::from_xyz(-100.0, -50.0, -100.0).looking_at(Vec3::ZERO, Vec3::Y),
        ..default()
    });

    let rig = view.session.camera();
    commands.spawn((
        Camera3dBundle {
            projection: Projection::Perspective(PerspectiveProjection {
                fov: rig.fov_y,
                near: rig.near,
                far: rig.far,
                ..default()
            }),
            transform: Transform::from_translation(rig.position()).looking_at(Vec3::ZERO, Vec3::Y),
            ..default()
        },
        ViewCamera,
    ));

    commands
        .spawn((SpatialBundle::default(), NetworkRoot))
        .with_children(|parent| {
            let tube = HighlightTube::spawn_bundle(&mut meshes, &mut mats);
            parent.spawn(tube);
        });
}

/// Follows wheel zoom; the camera stays on `+Z` looking at the origin.
pub fn sync_camera(view: Res<GeneView>, mut cam_q: Query<&mut Transform, With<ViewCamera>>) {
    let Ok(mut cam_tf) = cam_q.get_single_mut() else {
        return;
    };
    let distance = view.session.adapter().view_distance;
    if (cam_tf.translation.z - distance).abs() > f32::EPSILON {
        *cam_tf = Transform::from_xyz(0.0, 0.0, distance).looking_at(Vec3::ZERO, Vec3::Y);
    }
}

pub fn sync_group_rotation(
    view: Res<GeneView>,
    mut root_q: Query<&mut Transform, With<NetworkRoot>>,
) {
    let Ok(mut root_tf) = root_q.get_single_mut() else {
        return;
    };
    root_tf.rotation = view.session.adapter().group_rotation;
}
