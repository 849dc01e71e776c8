mod app;
mod render;
mod ui;
mod util;

use bevy::prelude::*;
use bevy_egui::EguiPlugin;

use app::GeneSphereViewerPlugin;

fn main() {
    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "GeneSphere".into(),
                ..default()
            }),
            ..default()
        }))
        .add_plugins(EguiPlugin)
        .add_plugins(GeneSphereViewerPlugin)
        .run();
}
