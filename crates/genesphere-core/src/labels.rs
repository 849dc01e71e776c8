use glam::{Quat, Vec2, Vec3};

use crate::model::GeneModel;
use crate::params::EngineParams;

/// Billboard footprint of a hub label at scale 1, in world units.
pub const LABEL_SIZE: Vec2 = Vec2::new(16.0, 4.0);

const LABEL_GAP: f32 = 1.5;
const TOWARD_CAMERA: f32 = 2.0;

/// Name tag floating above a hub node.
#[derive(Debug, Clone, PartialEq)]
pub struct HubLabel {
    pub node: usize,
    pub text: String,
    /// World-space centre of the label.
    pub anchor: Vec3,
    /// Follows the node's hover growth; 1 at rest.
    pub scale: f32,
}

impl HubLabel {
    pub fn size(&self) -> Vec2 {
        LABEL_SIZE * self.scale
    }
}

pub fn hub_labels(model: &GeneModel) -> Vec<HubLabel> {
    model
        .nodes
        .iter()
        .enumerate()
        .filter(|(_, n)| n.is_hub)
        .map(|(i, n)| HubLabel {
            node: i,
            text: n.name.clone(),
            anchor: n.position,
            scale: 1.0,
        })
        .collect()
}

/// Re-anchors every label above its node in world space, nudged toward the camera.
pub fn place(
    labels: &mut [HubLabel],
    model: &GeneModel,
    group_rotation: Quat,
    camera: Vec3,
    params: &EngineParams,
) {
    for label in labels.iter_mut() {
        let Some(node) = model.nodes.get(label.node) else {
            continue;
        };
        let world = group_rotation * node.position;
        let toward = (camera - world).normalize_or_zero();
        let ratio = node.radius / params.hub_radius;
        let half_height = LABEL_SIZE.y * ratio * 0.5;
        label.scale = ratio;
        label.anchor = world
            + Vec3::Y * (node.radius + half_height + LABEL_GAP)
            + toward * TOWARD_CAMERA;
    }
}
