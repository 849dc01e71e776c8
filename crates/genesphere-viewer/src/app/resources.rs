use bevy::prelude::Resource;
use genesphere_core::ViewSession;

use crate::render::InstanceBuffers;
use crate::util::config::ViewerConfig;

/// The single authoritative view state. Systems mutate it in short bursts;
/// dropping it releases the instance buffers.
#[derive(Resource)]
pub struct GeneView {
    pub session: ViewSession<InstanceBuffers>,
    pub cfg: ViewerConfig,
    /// Shown in the panel: file name or "Demo".
    pub dataset_label: String,
    pub path_input: String,
    pub status: Option<String>,
}

impl GeneView {
    pub fn new(cfg: ViewerConfig) -> Self {
        let session = ViewSession::new(
            InstanceBuffers::default(),
            cfg.engine.clone(),
            cfg.palette,
            cfg.layout_mode,
        );
        let path_input = cfg
            .dataset_path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_default();
        Self {
            session,
            cfg,
            dataset_label: String::new(),
            path_input,
            status: None,
        }
    }
}
