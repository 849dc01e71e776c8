use glam::{Quat, Vec3};

use crate::adapter::{PointerAffordance, RenderAdapter};
use crate::animation::{AnimationScheduler, TickReport};
use crate::dataset::{self, Dataset, DatasetFormat};
use crate::error::LoadError;
use crate::highlight::{edge_profile, HighlightProfile};
use crate::instances;
use crate::interaction::{HoverPayload, InteractionController, SelectionState};
use crate::labels::{self, HubLabel};
use crate::layout::LayoutMode;
use crate::model::GeneModel;
use crate::params::EngineParams;
use crate::picking::CameraRig;
use crate::style::Palette;

/// Outcome of one [`ViewSession::tick`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameReport {
    pub animation: TickReport,
    /// Instance transforms were pushed this frame.
    pub rebuilt: bool,
    /// The session is cancelled or holds no dataset; nothing was advanced.
    pub skipped: bool,
}

/// Owns the model, the view state and the renderer for one network view.
///
/// Dropping the session releases every backend resource through
/// [`RenderAdapter::release`].
pub struct ViewSession<A: RenderAdapter> {
    pub(crate) adapter: A,
    pub(crate) model: GeneModel,
    pub(crate) params: EngineParams,
    pub(crate) palette: Palette,
    pub(crate) mode: LayoutMode,
    pub(crate) animation: AnimationScheduler,
    pub(crate) interaction: InteractionController,
    pub(crate) camera: CameraRig,
    labels: Vec<HubLabel>,
    running: bool,
    released: bool,
}

impl<A: RenderAdapter> ViewSession<A> {
    pub fn new(mut adapter: A, params: EngineParams, palette: Palette, mode: LayoutMode) -> Self {
        let camera = CameraRig::from_params(&params);
        adapter.set_view_distance(camera.distance);
        adapter.set_group_rotation(Quat::IDENTITY);
        adapter.set_highlight_profile(None);
        Self {
            adapter,
            model: GeneModel::default(),
            params,
            palette,
            mode,
            animation: AnimationScheduler::new(),
            interaction: InteractionController::default(),
            camera,
            labels: Vec::new(),
            running: true,
            released: false,
        }
    }

    /// Builds a model for `data` and swaps it in. Starts from the uniform
    /// sphere and animates into the active layout.
    pub fn replace_dataset(&mut self, data: &Dataset) {
        let model = GeneModel::build(data, self.mode, &self.params, &self.palette);
        self.install(model);
    }

    /// Parses and installs a dataset. On failure the current one stays.
    pub fn load_text(&mut self, text: &str, format: DatasetFormat) -> Result<(), LoadError> {
        let data = dataset::load_str(text, format)?;
        self.replace_dataset(&data);
        Ok(())
    }

    pub fn load_path(&mut self, path: &std::path::Path) -> Result<(), LoadError> {
        let data = dataset::load_path(path)?;
        self.replace_dataset(&data);
        Ok(())
    }

    fn install(&mut self, model: GeneModel) {
        self.interaction.selection = SelectionState::None;
        self.interaction.payload = None;
        self.adapter.set_highlight_profile(None);
        self.adapter.set_pointer_affordance(PointerAffordance::Default);

        self.model = model;
        self.adapter.allocate(instances::counts(&self.model));
        instances::push_transforms(&self.model, &self.params, &mut self.adapter);
        instances::push_colors(
            &self.model,
            SelectionState::None,
            &self.palette,
            &mut self.adapter,
        );
        self.labels = labels::hub_labels(&self.model);
        self.place_labels();
        self.animation.begin_transition();

        tracing::info!(
            nodes = self.model.nodes.len(),
            edges = self.model.edges.len(),
            hubs = self.model.hub_count(),
            threshold = self.model.hub_threshold,
            mode = self.mode.label(),
            "dataset loaded"
        );
    }

    /// Retargets every node for `mode` and animates there.
    pub fn set_layout_mode(&mut self, mode: LayoutMode) {
        if mode == self.mode {
            return;
        }
        self.mode = mode;
        self.model.retarget(mode, &self.params);
        self.animation.begin_transition();
        // hit-volumes differ between modes
        if let Some(edge) = self.interaction.selection.edge() {
            if mode == LayoutMode::Core && !self.model.is_core_edge(&self.model.edges[edge]) {
                self.clear_selection();
            }
        }
    }

    /// Re-tints in place; positions are untouched.
    pub fn set_palette(&mut self, palette: Palette) {
        self.palette = palette;
        self.model.recolor(&self.palette);
        instances::push_colors(
            &self.model,
            self.interaction.selection,
            &self.palette,
            &mut self.adapter,
        );
        self.refresh_highlight();
    }

    /// Advances one frame.
    pub fn tick(&mut self) -> FrameReport {
        if !self.running || self.model.is_empty() {
            return FrameReport {
                skipped: true,
                ..Default::default()
            };
        }

        let emphasized = self.interaction.emphasized(&self.model.edges);
        let idle = self.interaction.is_idle();
        let animation = self
            .animation
            .tick(&mut self.model, &emphasized, idle, &self.params);

        let rebuilt = animation.needs_rebuild();
        if rebuilt {
            instances::push_transforms(&self.model, &self.params, &mut self.adapter);
        }
        // endpoints may have moved or grown since the last frame
        self.refresh_highlight();
        self.adapter.set_group_rotation(self.animation.group_rotation());
        self.place_labels();

        FrameReport {
            animation,
            rebuilt,
            skipped: false,
        }
    }

    /// Pushes the highlight for the selected edge, or hides it.
    pub(crate) fn refresh_highlight(&mut self) {
        let profile = self.highlight_profile();
        self.adapter.set_highlight_profile(profile.as_ref());
    }

    pub fn highlight_profile(&self) -> Option<HighlightProfile> {
        let edge = self.interaction.selection.edge()?;
        edge_profile(&self.model, edge, &self.params, self.palette.top_node_color)
    }

    fn place_labels(&mut self) {
        labels::place(
            &mut self.labels,
            &self.model,
            self.animation.group_rotation(),
            self.camera.position(),
            &self.params,
        );
    }

    /// Stops ticking. Resources stay until the session is dropped.
    pub fn cancel(&mut self) {
        if self.running {
            tracing::debug!("view session cancelled");
        }
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Geometry is in place and can be picked.
    pub fn is_ready(&self) -> bool {
        !self.model.is_empty() && self.adapter.is_ready()
    }

    pub fn model(&self) -> &GeneModel {
        &self.model
    }

    pub fn params(&self) -> &EngineParams {
        &self.params
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn layout_mode(&self) -> LayoutMode {
        self.mode
    }

    pub fn selection(&self) -> SelectionState {
        self.interaction.selection
    }

    pub fn is_dragging(&self) -> bool {
        self.interaction.dragging
    }

    pub fn payload(&self) -> Option<&HoverPayload> {
        self.interaction.payload.as_ref()
    }

    pub fn hub_labels(&self) -> &[HubLabel] {
        &self.labels
    }

    pub fn is_transitioning(&self) -> bool {
        self.animation.is_transitioning()
    }

    pub fn group_rotation(&self) -> Quat {
        self.animation.group_rotation()
    }

    pub fn view_distance(&self) -> f32 {
        self.camera.distance
    }

    pub fn camera(&self) -> &CameraRig {
        &self.camera
    }

    pub fn camera_position(&self) -> Vec3 {
        self.camera.position()
    }

    pub fn adapter(&self) -> &A {
        &self.adapter
    }

    pub fn adapter_mut(&mut self) -> &mut A {
        &mut self.adapter
    }
}

impl<A: RenderAdapter> Drop for ViewSession<A> {
    fn drop(&mut self) {
        if !self.released {
            self.released = true;
            self.adapter.release();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::recording::RecordingAdapter;
    use crate::adapter::{InstanceCategory, InstanceCounts, InstanceTransform};
    use crate::style::Srgb;
    use std::cell::Cell;
    use std::rc::Rc;

    fn session() -> ViewSession<RecordingAdapter> {
        ViewSession::new(
            RecordingAdapter::new(),
            EngineParams::default(),
            Palette::default(),
            LayoutMode::Uniform,
        )
    }

    const TABLE: &str = "source\ttarget\tscore\nA\tB\t0.9\nB\tC\nC\tD\t0.2\n";

    #[test]
    fn load_allocates_and_pushes_everything() {
        let mut s = session();
        s.load_text(TABLE, DatasetFormat::Tabular).expect("load");
        let a = s.adapter();
        assert_eq!(a.counts, InstanceCounts { nodes: 4, edges: 3 });
        assert_eq!(a.allocations, 1);
        assert!(a.transforms[InstanceCategory::Node.slot()]
            .iter()
            .all(|t| !t.is_hidden()));
        assert_eq!(s.hub_labels().len(), s.model().hub_count());
    }

    #[test]
    fn failed_load_keeps_previous_dataset() {
        let mut s = session();
        s.load_text(TABLE, DatasetFormat::Tabular).expect("load");
        let err = s.load_text("{not json", DatasetFormat::Structured);
        assert!(matches!(err, Err(LoadError::Malformed(_))));
        assert!(s.load_text("source\ttarget\n", DatasetFormat::Tabular).is_err());
        assert_eq!(s.model().nodes.len(), 4);
        assert_eq!(s.adapter().allocations, 1);
    }

    #[test]
    fn replacing_dataset_resets_selection() {
        let mut s = session();
        s.load_text(TABLE, DatasetFormat::Tabular).expect("load");
        s.interaction.selection = SelectionState::Edge(0);
        s.refresh_highlight();
        assert!(s.adapter().highlight.is_some());

        s.replace_dataset(&dataset::demo(30, 9));
        assert_eq!(s.selection(), SelectionState::None);
        assert!(s.adapter().highlight.is_none());
        assert_eq!(s.adapter().affordance, PointerAffordance::Default);
        assert_eq!(s.model().nodes.len(), 30);
    }

    #[test]
    fn mode_switch_animates_to_core_layout() {
        let mut s = session();
        s.replace_dataset(&dataset::demo(50, 2));
        while s.tick().animation.moved {}
        let params = EngineParams::default();

        s.set_layout_mode(LayoutMode::Core);
        assert!(s.is_transitioning());
        let first = s.tick();
        assert!(first.rebuilt);

        let mut settled = 0;
        for _ in 0..1000 {
            if s.tick().animation.transition_finished {
                settled += 1;
            }
        }
        assert_eq!(settled, 1);
        for n in &s.model().nodes {
            let r = if n.is_hub { params.radius_core } else { params.radius_outer };
            assert!((n.position.length() - r).abs() < 1e-2);
        }
        let node = s.adapter().transform(InstanceCategory::Node, 0);
        assert_eq!(node.translation, s.model().nodes[0].position);
    }

    #[test]
    fn loading_in_core_mode_starts_uniform() {
        let mut s = session();
        s.set_layout_mode(LayoutMode::Core);
        s.replace_dataset(&dataset::demo(50, 2));
        let params = EngineParams::default();
        let n = &s.model().nodes[0];
        assert!((n.position.length() - params.radius_uniform).abs() < 1e-2);
        assert!(s.is_transitioning());
    }

    #[test]
    fn palette_change_recolors_without_relayout() {
        let mut s = session();
        s.load_text(TABLE, DatasetFormat::Tabular).expect("load");
        let before: Vec<InstanceTransform> =
            s.adapter().transforms[InstanceCategory::Node.slot()].clone();
        let writes = s.adapter().transform_writes;

        let palette = Palette {
            line_color: Srgb::new(1, 2, 3),
            top_node_color: Srgb::new(9, 9, 9),
            ..Palette::default()
        };
        s.set_palette(palette);
        assert_eq!(s.adapter().transform_writes, writes);
        assert_eq!(s.adapter().transforms[InstanceCategory::Node.slot()], before);
        assert_eq!(s.adapter().color(InstanceCategory::Edge, 0), palette.line_color);
        let hub = s.model().nodes.iter().position(|n| n.is_hub).expect("hub");
        assert_eq!(s.adapter().color(InstanceCategory::Node, hub), palette.top_node_color);
    }

    #[test]
    fn highlight_follows_selected_edge_each_frame() {
        let mut s = session();
        s.load_text(TABLE, DatasetFormat::Tabular).expect("load");
        s.interaction.selection = SelectionState::Edge(0);
        s.tick();
        let profile = s.adapter().highlight.expect("profile");
        let e = s.model().edges[0];
        let length = s.model().nodes[e.source]
            .position
            .distance(s.model().nodes[e.target].position);
        assert!((profile.length - length).abs() < 1e-4);
        assert_eq!(profile.color, s.palette().top_node_color);

        s.clear_selection();
        assert!(s.adapter().highlight.is_none());
    }

    #[test]
    fn cancelled_session_stops_ticking() {
        let mut s = session();
        s.replace_dataset(&dataset::demo(10, 4));
        s.cancel();
        assert!(!s.is_running());
        let writes = s.adapter().transform_writes;
        assert!(s.tick().skipped);
        assert_eq!(s.adapter().transform_writes, writes);
    }

    #[test]
    fn empty_session_is_not_ready() {
        let mut s = session();
        assert!(!s.is_ready());
        assert!(s.tick().skipped);
    }

    struct ReleaseProbe(Rc<Cell<usize>>);

    impl RenderAdapter for ReleaseProbe {
        fn allocate(&mut self, _: InstanceCounts) {}
        fn set_instance_transform(&mut self, _: InstanceCategory, _: usize, _: InstanceTransform) {}
        fn set_instance_color(&mut self, _: InstanceCategory, _: usize, _: Srgb) {}
        fn set_highlight_profile(&mut self, _: Option<&HighlightProfile>) {}
        fn set_group_rotation(&mut self, _: Quat) {}
        fn set_view_distance(&mut self, _: f32) {}
        fn set_pointer_affordance(&mut self, _: PointerAffordance) {}
        fn release(&mut self) {
            self.0.set(self.0.get() + 1);
        }
    }

    #[test]
    fn drop_releases_exactly_once() {
        let count = Rc::new(Cell::new(0));
        {
            let mut s = ViewSession::new(
                ReleaseProbe(count.clone()),
                EngineParams::default(),
                Palette::default(),
                LayoutMode::Uniform,
            );
            s.replace_dataset(&dataset::demo(10, 4));
            s.cancel();
            s.cancel();
            assert_eq!(count.get(), 0);
        }
        assert_eq!(count.get(), 1);
    }
}
