use bevy::app::AppExit;
use bevy::prelude::*;

use crate::app::resources::GeneView;
use crate::render::camera::NetworkRoot;
use crate::render::instances::SceneAssets;
use crate::util::config;

pub mod input;
pub mod loading;
pub mod resources;

pub struct GeneSphereViewerPlugin;

impl Plugin for GeneSphereViewerPlugin {
    fn build(&self, app: &mut App) {
        let cfg = config::load_or_default();
        app.insert_resource(GeneView::new(cfg))
            .add_systems(
                Startup,
                (crate::render::setup_scene, loading::load_initial_dataset).chain(),
            )
            .add_systems(
                Update,
                (
                    crate::ui::ui_panel,
                    loading::handle_file_drop,
                    input::pointer_input,
                    input::advance_session,
                    crate::render::sync_instances,
                    crate::render::sync_group_rotation,
                    crate::render::sync_camera,
                    crate::render::sync_highlight,
                    crate::render::sync_cursor,
                    crate::ui::tooltip_overlay,
                    crate::ui::hub_label_overlay,
                )
                    .chain(),
            )
            .add_systems(Last, teardown_on_exit);
    }
}

/// Cancels the session and frees everything the scene holds. Removing the
/// resource drops the session, which releases its instance buffers.
fn teardown_on_exit(
    mut exit: EventReader<AppExit>,
    mut commands: Commands,
    view: Option<ResMut<GeneView>>,
    assets: Option<ResMut<SceneAssets>>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut mats: ResMut<Assets<StandardMaterial>>,
    root_q: Query<Entity, With<NetworkRoot>>,
) {
    if exit.read().next().is_none() {
        return;
    }
    let Some(mut view) = view else {
        return;
    };
    view.session.cancel();
    for root in root_q.iter() {
        commands.entity(root).despawn_recursive();
    }
    if let Some(mut assets) = assets {
        assets.clear(&mut meshes, &mut mats);
        commands.remove_resource::<SceneAssets>();
    }
    commands.remove_resource::<GeneView>();
    info!("view session closed");
}
