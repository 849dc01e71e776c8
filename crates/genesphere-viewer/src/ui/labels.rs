use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts};

use crate::app::resources::GeneView;
use crate::render::camera::ViewCamera;

const MIN_FONT_PX: f32 = 6.0;

/// Draws hub names at the anchors the engine computes each frame, sized by
/// projecting the label's world height.
pub fn hub_label_overlay(
    mut contexts: EguiContexts,
    view: Res<GeneView>,
    cam_q: Query<(&Camera, &GlobalTransform), With<ViewCamera>>,
) {
    let Ok((camera, cam_tf)) = cam_q.get_single() else {
        return;
    };
    let labels = view.session.hub_labels();
    if labels.is_empty() {
        return;
    }
    let ctx = contexts.ctx_mut();
    let painter = ctx.layer_painter(egui::LayerId::new(
        egui::Order::Background,
        egui::Id::new("hub_labels"),
    ));

    for label in labels {
        let half = label.size().y * 0.5;
        let (Some(center), Some(top)) = (
            camera.world_to_viewport(cam_tf, label.anchor),
            camera.world_to_viewport(cam_tf, label.anchor + Vec3::Y * half),
        ) else {
            continue;
        };
        let font_px = (center.y - top.y).abs() * 1.4;
        if font_px < MIN_FONT_PX {
            continue;
        }
        let pos = egui::pos2(center.x, center.y);
        let font = egui::FontId::proportional(font_px);
        // white halo behind black text
        for offset in [
            egui::vec2(-1.0, 0.0),
            egui::vec2(1.0, 0.0),
            egui::vec2(0.0, -1.0),
            egui::vec2(0.0, 1.0),
        ] {
            painter.text(
                pos + offset,
                egui::Align2::CENTER_CENTER,
                &label.text,
                font.clone(),
                egui::Color32::WHITE,
            );
        }
        painter.text(
            pos,
            egui::Align2::CENTER_CENTER,
            &label.text,
            font,
            egui::Color32::BLACK,
        );
    }
}
