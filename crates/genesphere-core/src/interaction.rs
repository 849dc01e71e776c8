//! Pointer handling: hover picking, drag rotation and wheel zoom.

use glam::Vec2;
use serde::Serialize;
use smallvec::{smallvec, SmallVec};

use crate::adapter::{PointerAffordance, RenderAdapter};
use crate::instances;
use crate::model::GeneEdge;
use crate::picking::{pick_edge, pick_node, to_ndc};
use crate::session::ViewSession;

/// At most one thing is hovered at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionState {
    #[default]
    None,
    Node(usize),
    Edge(usize),
}

impl SelectionState {
    pub fn is_none(self) -> bool {
        matches!(self, Self::None)
    }

    pub fn node(self) -> Option<usize> {
        match self {
            Self::Node(i) => Some(i),
            _ => None,
        }
    }

    pub fn edge(self) -> Option<usize> {
        match self {
            Self::Edge(i) => Some(i),
            _ => None,
        }
    }
}

/// Canvas size in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn aspect(&self) -> f32 {
        if self.height > 0.0 {
            self.width / self.height
        } else {
            1.0
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeTooltip {
    #[serde(skip)]
    pub screen: Vec2,
    pub name: String,
    pub id: String,
    pub score: f32,
    pub is_hub: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Connection {
    pub source_name: String,
    pub target_name: String,
    pub weight: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EdgeTooltip {
    #[serde(skip)]
    pub screen: Vec2,
    pub source_name: String,
    pub target_name: String,
    pub weight: f32,
    /// Every link between the same two genes, either direction.
    pub connections: Vec<Connection>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HoverPayload {
    Node(NodeTooltip),
    Edge(EdgeTooltip),
}

impl HoverPayload {
    /// Where the tooltip's top-left corner goes.
    pub fn screen(&self) -> Vec2 {
        match self {
            Self::Node(t) => t.screen,
            Self::Edge(t) => t.screen,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct InteractionController {
    pub(crate) selection: SelectionState,
    pub(crate) dragging: bool,
    pub(crate) last_pointer: Option<Vec2>,
    pub(crate) payload: Option<HoverPayload>,
}

impl InteractionController {
    pub fn selection(&self) -> SelectionState {
        self.selection
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    pub fn payload(&self) -> Option<&HoverPayload> {
        self.payload.as_ref()
    }

    /// Nodes drawn at hover scale: the hovered node, or both ends of the hovered edge.
    pub(crate) fn emphasized(&self, edges: &[GeneEdge]) -> SmallVec<[usize; 2]> {
        match self.selection {
            SelectionState::None => SmallVec::new(),
            SelectionState::Node(i) => smallvec![i],
            SelectionState::Edge(i) => edges
                .get(i)
                .map(|e| smallvec![e.source, e.target])
                .unwrap_or_default(),
        }
    }

    /// Auto-rotation runs only while nothing is grabbed or hovered.
    pub(crate) fn is_idle(&self) -> bool {
        !self.dragging && self.selection.is_none()
    }
}

impl<A: RenderAdapter> ViewSession<A> {
    /// Pointer moved to `pos` (logical pixels). `over_view` is false when the
    /// pointer sits on an overlay or outside the canvas.
    pub fn pointer_moved(&mut self, pos: Vec2, viewport: Viewport, over_view: bool) {
        let previous = self.interaction.last_pointer.replace(pos);
        if self.interaction.dragging {
            if let Some(prev) = previous {
                self.animation.drag(pos - prev, &self.params);
            }
            return;
        }
        if over_view {
            self.hover(pos, viewport);
        } else {
            self.clear_selection();
        }
    }

    pub fn pointer_pressed(&mut self) {
        self.interaction.dragging = true;
    }

    pub fn pointer_released(&mut self) {
        self.interaction.dragging = false;
    }

    /// Pointer left the canvas. An active drag keeps going until release.
    pub fn pointer_left(&mut self) {
        if !self.interaction.dragging {
            self.clear_selection();
        }
    }

    /// Wheel in pixel units; positive moves the camera away.
    pub fn wheel(&mut self, delta_y: f32) {
        self.camera.distance = self
            .params
            .clamp_distance(self.camera.distance + delta_y * self.params.zoom_step);
        self.adapter.set_view_distance(self.camera.distance);
    }

    fn hover(&mut self, pos: Vec2, viewport: Viewport) {
        if !self.is_ready() {
            return;
        }
        let ndc = to_ndc(pos, viewport.width, viewport.height);
        let ray = self
            .camera
            .ray(ndc, viewport.aspect())
            .into_local(self.animation.group_rotation());
        let max_t = self.camera.far;
        let screen = pos + Vec2::splat(self.params.tooltip_offset);

        if let Some(i) = pick_node(&self.model, &ray, max_t) {
            self.select_node(i, screen);
        } else if let Some(i) = pick_edge(&self.model, &ray, self.mode, &self.params, max_t) {
            self.select_edge(i, screen);
        } else {
            self.clear_selection();
        }
    }

    fn select_node(&mut self, index: usize, screen: Vec2) {
        let current = self.interaction.selection;
        if current.edge().is_some() {
            self.interaction.selection = SelectionState::None;
            self.adapter.set_highlight_profile(None);
        }
        if current != SelectionState::Node(index) {
            self.interaction.selection = SelectionState::Node(index);
            instances::push_node_colors(
                &self.model,
                self.interaction.selection,
                &self.palette,
                &mut self.adapter,
            );
            self.adapter.set_pointer_affordance(PointerAffordance::Pointer);
        }

        let node = &self.model.nodes[index];
        self.interaction.payload = Some(HoverPayload::Node(NodeTooltip {
            screen,
            name: node.name.clone(),
            id: node.id.clone(),
            score: node.score,
            is_hub: node.is_hub,
        }));
    }

    fn select_edge(&mut self, index: usize, screen: Vec2) {
        let current = self.interaction.selection;
        if current.node().is_some() {
            self.interaction.selection = SelectionState::None;
            instances::push_node_colors(
                &self.model,
                SelectionState::None,
                &self.palette,
                &mut self.adapter,
            );
        }
        if current != SelectionState::Edge(index) {
            self.interaction.selection = SelectionState::Edge(index);
            self.adapter.set_pointer_affordance(PointerAffordance::Pointer);
            self.refresh_highlight();
        }

        let edge = self.model.edges[index];
        let name = |i: usize| self.model.nodes[i].name.clone();
        let connections = self
            .model
            .bundle_of(index)
            .iter()
            .map(|&j| {
                let e = self.model.edges[j];
                Connection {
                    source_name: name(e.source),
                    target_name: name(e.target),
                    weight: e.weight,
                }
            })
            .collect();
        self.interaction.payload = Some(HoverPayload::Edge(EdgeTooltip {
            screen,
            source_name: name(edge.source),
            target_name: name(edge.target),
            weight: edge.weight,
            connections,
        }));
    }

    /// Drops any hover state. Adapter writes happen only when something was active.
    pub fn clear_selection(&mut self) {
        let previous = std::mem::take(&mut self.interaction.selection);
        match previous {
            SelectionState::None => return,
            SelectionState::Node(_) => instances::push_node_colors(
                &self.model,
                SelectionState::None,
                &self.palette,
                &mut self.adapter,
            ),
            SelectionState::Edge(_) => self.adapter.set_highlight_profile(None),
        }
        self.interaction.payload = None;
        self.adapter.set_pointer_affordance(PointerAffordance::Default);
    }
}
