use bevy::input::mouse::{MouseScrollUnit, MouseWheel};
use bevy::prelude::*;
use bevy::window::{CursorLeft, CursorMoved, PrimaryWindow};
use bevy_egui::EguiContexts;
use genesphere_core::Viewport;

use crate::app::resources::GeneView;

/// Pixels per wheel "line", matching what browsers report for one notch.
const PIXELS_PER_LINE: f32 = 100.0;

/// Bevy reports scroll-up as positive `y`; the engine zooms out on positive delta.
pub fn wheel_delta_pixels(event: &MouseWheel) -> f32 {
    match event.unit {
        MouseScrollUnit::Line => -event.y * PIXELS_PER_LINE,
        MouseScrollUnit::Pixel => -event.y,
    }
}

#[allow(clippy::too_many_arguments)]
pub fn pointer_input(
    mut moved: EventReader<CursorMoved>,
    mut left: EventReader<CursorLeft>,
    mut wheel: EventReader<MouseWheel>,
    buttons: Res<ButtonInput<MouseButton>>,
    windows: Query<&Window, With<PrimaryWindow>>,
    mut contexts: EguiContexts,
    mut view: ResMut<GeneView>,
) {
    let Ok(window) = windows.get_single() else {
        return;
    };
    let viewport = Viewport::new(window.width(), window.height());
    let ctx = contexts.ctx_mut();
    let over_ui = ctx.wants_pointer_input() || ctx.is_pointer_over_area();

    if buttons.just_pressed(MouseButton::Left) && !over_ui {
        view.session.pointer_pressed();
    }
    if buttons.just_released(MouseButton::Left) {
        view.session.pointer_released();
    }

    for event in moved.read() {
        view.session.pointer_moved(event.position, viewport, !over_ui);
    }
    if left.read().next().is_some() {
        view.session.pointer_left();
    }

    if over_ui {
        wheel.clear();
        return;
    }
    for event in wheel.read() {
        view.session.wheel(wheel_delta_pixels(event));
    }
}

pub fn advance_session(mut view: ResMut<GeneView>) {
    view.session.tick();
}
