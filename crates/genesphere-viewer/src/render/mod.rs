pub mod camera;
pub mod highlight;
pub mod instances;

use bevy::prelude::*;
use bevy::window::{CursorIcon, PrimaryWindow};
use genesphere_core::PointerAffordance;

use crate::app::resources::GeneView;

pub use camera::{setup_scene, sync_camera, sync_group_rotation};
pub use highlight::sync_highlight;
pub use instances::{sync_instances, InstanceBuffers};

pub fn sync_cursor(view: Res<GeneView>, mut windows: Query<&mut Window, With<PrimaryWindow>>) {
    let Ok(mut window) = windows.get_single_mut() else {
        return;
    };
    let icon = match view.session.adapter().affordance {
        PointerAffordance::Pointer => CursorIcon::Pointer,
        PointerAffordance::Default => CursorIcon::Default,
    };
    if window.cursor.icon != icon {
        window.cursor.icon = icon;
    }
}
