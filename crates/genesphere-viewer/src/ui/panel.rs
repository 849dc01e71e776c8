use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts};
use genesphere_core::{LayoutMode, Palette, Srgb};
use std::path::PathBuf;

use crate::app::resources::GeneView;
use crate::util::config;

fn color_row(ui: &mut egui::Ui, label: &str, color: &mut Srgb) -> bool {
    let mut rgb = color.to_array();
    let changed = ui
        .horizontal(|ui| {
            let changed = ui.color_edit_button_srgb(&mut rgb).changed();
            ui.label(label);
            changed
        })
        .inner;
    if changed {
        *color = Srgb::from_array(rgb);
    }
    changed
}

pub fn ui_panel(mut contexts: EguiContexts, mut view: ResMut<GeneView>) {
    let view = &mut *view;
    egui::SidePanel::left("left").show(contexts.ctx_mut(), |ui| {
        ui.heading("GeneSphere");
        ui.label(format!("dataset: {}", view.dataset_label));
        let model = view.session.model();
        ui.label(format!("genes: {}", model.nodes.len()));
        ui.label(format!("links: {}", model.edges.len()));
        ui.label(format!(
            "hubs: {} (score ≥ {:.2})",
            model.hub_count(),
            model.hub_threshold
        ));
        ui.separator();

        ui.heading("Layout");
        let mut mode = view.session.layout_mode();
        ui.horizontal(|ui| {
            ui.selectable_value(&mut mode, LayoutMode::Uniform, LayoutMode::Uniform.label());
            ui.selectable_value(&mut mode, LayoutMode::Core, LayoutMode::Core.label());
        });
        if mode != view.session.layout_mode() {
            view.session.set_layout_mode(mode);
            view.cfg.layout_mode = mode;
        }

        ui.add_space(8.0);
        ui.separator();
        ui.heading("Colors");
        let mut palette: Palette = *view.session.palette();
        let mut changed = false;
        changed |= color_row(ui, "hub genes", &mut palette.top_node_color);
        changed |= color_row(ui, "other genes", &mut palette.normal_node_color);
        changed |= color_row(ui, "links", &mut palette.line_color);
        changed |= color_row(ui, "hover", &mut palette.hover_color);
        if ui.button("Reset colors").clicked() {
            palette = Palette::default();
            changed = true;
        }
        if changed {
            view.session.set_palette(palette);
            view.cfg.palette = palette;
        }

        ui.add_space(8.0);
        ui.separator();
        ui.heading("Data");
        ui.label("Path (.json or tab-separated):");
        ui.text_edit_singleline(&mut view.path_input);
        ui.horizontal(|ui| {
            if ui.button("Load").clicked() {
                let path = PathBuf::from(view.path_input.trim());
                view.load_file_or_report(&path);
            }
            if ui.button("Demo").clicked() {
                view.load_demo();
            }
        });
        ui.add(egui::Slider::new(&mut view.cfg.demo_nodes, config::DEMO_NODES_RANGE).text("demo genes"));
        ui.label("Tip: drop a file on the window to load it.");

        ui.add_space(8.0);
        ui.separator();
        if ui.button("Save settings").clicked() {
            view.status = Some(match config::save(&view.cfg) {
                Ok(path) => format!("saved {}", path.display()),
                Err(err) => {
                    warn!("{err:#}");
                    format!("{err:#}")
                }
            });
        }
        if let Some(status) = &view.status {
            ui.add_space(4.0);
            ui.label(status);
        }

        ui.add_space(8.0);
        ui.separator();
        ui.label("Drag to rotate, wheel to zoom.");
        ui.label("Hover a gene or link for details.");
    });
}
