use anyhow::Context;
use bevy::prelude::*;
use bevy::window::FileDragAndDrop;
use genesphere_core::dataset;
use std::path::{Path, PathBuf};

use crate::app::resources::GeneView;

impl GeneView {
    /// Replaces the network with the file at `path`. The current network is
    /// kept when the file cannot be read or parsed.
    pub fn load_file(&mut self, path: &Path) -> anyhow::Result<()> {
        let data = dataset::load_path(path)
            .with_context(|| format!("failed to load dataset {}", path.display()))?;
        self.session.replace_dataset(&data);
        self.dataset_label = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        self.path_input = path.display().to_string();
        self.cfg.dataset_path = Some(path.to_path_buf());
        self.status = Some(format!(
            "loaded {} genes, {} links",
            self.session.model().nodes.len(),
            self.session.model().edges.len()
        ));
        Ok(())
    }

    pub fn load_demo(&mut self) {
        let data = dataset::demo(self.cfg.demo_node_count(), self.cfg.demo_seed);
        self.session.replace_dataset(&data);
        self.dataset_label = "Demo".to_string();
        self.status = None;
    }

    /// Loads `path`, logging and surfacing failures instead of propagating them.
    pub fn load_file_or_report(&mut self, path: &Path) {
        if let Err(err) = self.load_file(path) {
            warn!("{err:#}");
            self.status = Some(format!("{err:#}"));
        }
    }
}

/// First CLI argument, then the configured path, then the demo network.
pub fn initial_dataset_path(args: impl IntoIterator<Item = String>, configured: Option<&Path>) -> Option<PathBuf> {
    args.into_iter()
        .nth(1)
        .map(PathBuf::from)
        .or_else(|| configured.map(Path::to_path_buf))
}

pub fn load_initial_dataset(mut view: ResMut<GeneView>) {
    let path = initial_dataset_path(std::env::args(), view.cfg.dataset_path.as_deref());
    match path {
        Some(path) => {
            view.load_file_or_report(&path);
            if view.session.model().is_empty() {
                view.load_demo();
            }
        }
        None => view.load_demo(),
    }
}

pub fn handle_file_drop(mut events: EventReader<FileDragAndDrop>, mut view: ResMut<GeneView>) {
    for event in events.read() {
        if let FileDragAndDrop::DroppedFile { path_buf, .. } = event {
            view.load_file_or_report(path_buf);
        }
    }
}
