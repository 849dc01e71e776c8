use bevy::prelude::Res;
use bevy_egui::{egui, EguiContexts};
use genesphere_core::HoverPayload;

use crate::app::resources::GeneView;

pub fn render_tooltip(
    ctx: &egui::Context,
    id: &str,
    pos: egui::Pos2,
    lines: impl IntoIterator<Item = String>,
) {
    egui::Area::new(egui::Id::new(id))
        .order(egui::Order::Tooltip)
        .interactable(false)
        .fixed_pos(pos)
        .show(ctx, |ui| {
            ui.group(|ui| {
                for line in lines {
                    ui.label(line);
                }
            });
        });
}

pub fn payload_lines(payload: &HoverPayload) -> Vec<String> {
    match payload {
        HoverPayload::Node(t) => vec![
            t.name.clone(),
            format!("id: {}", t.id),
            format!("score: {:.3}", t.score),
            if t.is_hub { "hub gene" } else { "gene" }.to_string(),
        ],
        HoverPayload::Edge(t) => {
            let mut lines = Vec::with_capacity(t.connections.len() + 1);
            lines.push(format!("{} ↔ {}", t.source_name, t.target_name));
            for c in &t.connections {
                lines.push(format!("{} → {}: {:.3}", c.source_name, c.target_name, c.weight));
            }
            lines
        }
    }
}

pub fn tooltip_overlay(mut contexts: EguiContexts, view: Res<GeneView>) {
    let Some(payload) = view.session.payload() else {
        return;
    };
    let at = payload.screen();
    render_tooltip(
        contexts.ctx_mut(),
        "gene_tooltip",
        egui::pos2(at.x, at.y),
        payload_lines(payload),
    );
}
