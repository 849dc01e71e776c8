use glam::Vec3;
use smallvec::SmallVec;
use std::collections::HashMap;

use crate::dataset::Dataset;
use crate::layout::{self, LayoutMode};
use crate::params::EngineParams;
use crate::style::{Palette, Srgb};

/// Weight used for links whose score is absent, non-numeric or zero.
pub const DEFAULT_WEIGHT: f32 = 0.1;

pub type ScoreIndex = HashMap<String, f32>;

#[derive(Debug, Clone, PartialEq)]
pub struct GeneNode {
    pub id: String,
    pub name: String,
    pub raw_value: Option<f64>,
    pub score: f32,
    pub is_hub: bool,
    pub position: Vec3,
    pub target: Vec3,
    pub radius: f32,
    pub base_color: Srgb,
}

/// A link whose endpoints both resolved; `source`/`target` index `GeneModel::nodes`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeneEdge {
    pub source: usize,
    pub target: usize,
    pub weight: f32,
}

impl GeneEdge {
    pub fn touches(&self, node: usize) -> bool {
        self.source == node || self.target == node
    }
}

/// Unordered endpoint pair: `(a, b)` and `(b, a)` share a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PairKey {
    lo: usize,
    hi: usize,
}

impl PairKey {
    pub fn new(a: usize, b: usize) -> Self {
        Self {
            lo: a.min(b),
            hi: a.max(b),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct GeneModel {
    pub nodes: Vec<GeneNode>,
    pub edges: Vec<GeneEdge>,
    pub hub_threshold: f32,
    index: HashMap<String, usize>,
    bundles: HashMap<PairKey, SmallVec<[usize; 2]>>,
}

pub fn effective_weight(score: Option<f64>) -> f32 {
    match score {
        Some(w) if w.is_finite() && w != 0.0 => w as f32,
        _ => DEFAULT_WEIGHT,
    }
}

/// Sums link weights onto every known endpoint. A link with one unknown
/// endpoint still credits the endpoint that exists.
pub fn aggregate_scores(data: &Dataset) -> ScoreIndex {
    let mut scores: ScoreIndex = data.nodes.iter().map(|n| (n.id.clone(), 0.0)).collect();
    for link in &data.links {
        let w = effective_weight(link.score);
        if let Some(s) = scores.get_mut(&link.source) {
            *s += w;
        }
        if let Some(s) = scores.get_mut(&link.target) {
            *s += w;
        }
    }
    scores
}

/// Score at rank `floor(n * fraction)` in descending order (index clamped).
pub fn hub_threshold(scores: impl IntoIterator<Item = f32>, fraction: f32) -> f32 {
    let mut sorted: Vec<f32> = scores.into_iter().collect();
    if sorted.is_empty() {
        return 0.0;
    }
    sorted.sort_by(|a, b| b.total_cmp(a));
    let idx = ((sorted.len() as f32 * fraction).floor() as usize).min(sorted.len() - 1);
    sorted[idx]
}

pub fn is_hub(score: f32, threshold: f32) -> bool {
    score >= threshold && score > 0.0
}

impl GeneModel {
    /// Builds a model with live positions on the uniform sphere and targets
    /// for `mode`.
    pub fn build(data: &Dataset, mode: LayoutMode, params: &EngineParams, palette: &Palette) -> Self {
        let scores = aggregate_scores(data);

        let mut index: HashMap<String, usize> = HashMap::with_capacity(data.nodes.len());
        let mut nodes = Vec::with_capacity(data.nodes.len());
        for raw in &data.nodes {
            if index.contains_key(&raw.id) {
                tracing::warn!(id = %raw.id, "duplicate node id ignored");
                continue;
            }
            index.insert(raw.id.clone(), nodes.len());
            nodes.push(GeneNode {
                id: raw.id.clone(),
                name: raw.name.clone(),
                raw_value: raw.val,
                score: scores.get(&raw.id).copied().unwrap_or(0.0),
                is_hub: false,
                position: Vec3::ZERO,
                target: Vec3::ZERO,
                radius: params.node_radius,
                base_color: palette.normal_node_color,
            });
        }

        let threshold = if data.links.is_empty() {
            0.0
        } else {
            hub_threshold(nodes.iter().map(|n| n.score), params.hub_fraction)
        };

        let mut edges = Vec::with_capacity(data.links.len());
        let mut bundles: HashMap<PairKey, SmallVec<[usize; 2]>> = HashMap::new();
        let mut dropped = 0usize;
        for link in &data.links {
            let (Some(&source), Some(&target)) = (index.get(&link.source), index.get(&link.target))
            else {
                dropped += 1;
                continue;
            };
            bundles
                .entry(PairKey::new(source, target))
                .or_default()
                .push(edges.len());
            edges.push(GeneEdge {
                source,
                target,
                weight: effective_weight(link.score),
            });
        }
        if dropped > 0 {
            tracing::debug!(dropped, "links with unresolved endpoints excluded");
        }

        let sphere = layout::sphere_points(nodes.len(), params.radius_uniform);
        for (node, start) in nodes.iter_mut().zip(sphere) {
            node.is_hub = is_hub(node.score, threshold);
            node.radius = params.base_radius(node.is_hub);
            node.base_color = palette.node_color(node.is_hub);
            node.position = start;
            node.target = start;
        }

        let mut model = Self {
            nodes,
            edges,
            hub_threshold: threshold,
            index,
            bundles,
        };
        model.retarget(mode, params);
        model
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub fn hub_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_hub).count()
    }

    pub fn score_index(&self) -> ScoreIndex {
        self.nodes.iter().map(|n| (n.id.clone(), n.score)).collect()
    }

    /// Every edge sharing `edge`'s unordered endpoint pair, in load order.
    pub fn bundle_of(&self, edge: usize) -> &[usize] {
        self.edges
            .get(edge)
            .and_then(|e| self.bundles.get(&PairKey::new(e.source, e.target)))
            .map(|b| b.as_slice())
            .unwrap_or(&[])
    }

    /// Edges touching at least one hub get the emphasized core rendering.
    pub fn is_core_edge(&self, edge: &GeneEdge) -> bool {
        self.nodes[edge.source].is_hub || self.nodes[edge.target].is_hub
    }

    pub fn recolor(&mut self, palette: &Palette) {
        for node in self.nodes.iter_mut() {
            node.base_color = palette.node_color(node.is_hub);
        }
    }
}
