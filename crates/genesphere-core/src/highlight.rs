use glam::{Quat, Vec3};

use crate::adapter::segment_rotation;
use crate::model::GeneModel;
use crate::params::EngineParams;
use crate::style::Srgb;

/// Glow tube along a hovered edge.
///
/// The tube lives in the same frame as the edge segment: it starts at
/// `origin` and runs `length` units along `rotation * +Z`. Radius and alpha
/// are functions of the distance `d` from the source end.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HighlightProfile {
    pub origin: Vec3,
    pub rotation: Quat,
    pub length: f32,
    pub radius_start: f32,
    pub radius_end: f32,
    pub base_radius: f32,
    pub max_alpha: f32,
    pub color: Srgb,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProfileSample {
    pub distance: f32,
    pub radius: f32,
    pub alpha: f32,
}

pub fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    if edge1 <= edge0 {
        return if x < edge0 { 0.0 } else { 1.0 };
    }
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

fn flare(d: f32, endpoint_radius: f32) -> f32 {
    (-d.max(0.0) / endpoint_radius.max(f32::EPSILON)).exp()
}

impl HighlightProfile {
    pub fn radius_at(&self, d: f32) -> f32 {
        let from_end = self.length - d;
        self.base_radius
            + (self.radius_start - self.base_radius) * flare(d, self.radius_start)
            + (self.radius_end - self.base_radius) * flare(from_end, self.radius_end)
    }

    /// Fades to zero inside each endpoint sphere so the tube does not poke
    /// through the node.
    pub fn alpha_at(&self, d: f32) -> f32 {
        let from_end = self.length - d;
        let start = smoothstep(0.1 * self.radius_start, 2.3 * self.radius_start, d);
        let end = smoothstep(0.1 * self.radius_end, 2.3 * self.radius_end, from_end);
        start.min(end) * self.max_alpha
    }

    /// `rings + 1` evenly spaced samples from source (t = 0) to target (t = 1).
    pub fn sample(&self, rings: usize) -> Vec<ProfileSample> {
        let rings = rings.max(1);
        (0..=rings)
            .map(|i| {
                let distance = self.length * i as f32 / rings as f32;
                ProfileSample {
                    distance,
                    radius: self.radius_at(distance),
                    alpha: self.alpha_at(distance),
                }
            })
            .collect()
    }
}

/// Profile for `edge` from live endpoint positions and radii.
pub fn edge_profile(
    model: &GeneModel,
    edge: usize,
    params: &EngineParams,
    color: Srgb,
) -> Option<HighlightProfile> {
    let e = model.edges.get(edge)?;
    let source = &model.nodes[e.source];
    let target = &model.nodes[e.target];
    let delta = target.position - source.position;
    Some(HighlightProfile {
        origin: source.position,
        rotation: segment_rotation(delta),
        length: delta.length(),
        radius_start: source.radius * params.highlight_endpoint_scale,
        radius_end: target.radius * params.highlight_endpoint_scale,
        base_radius: params.thickness(e.weight) * 2.0,
        max_alpha: params.highlight_alpha,
        color,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> HighlightProfile {
        HighlightProfile {
            origin: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            length: 40.0,
            radius_start: 2.0,
            radius_end: 4.0,
            base_radius: 0.3,
            max_alpha: 0.85,
            color: Srgb::WHITE,
        }
    }

    #[test]
    fn radius_flares_at_endpoints_and_settles_midway() {
        let p = profile();
        assert!((p.radius_at(0.0) - 2.0).abs() < 1e-3);
        assert!((p.radius_at(40.0) - 4.0).abs() < 1e-3);
        assert!((p.radius_at(20.0) - 0.3).abs() < 0.05);
        assert!(p.radius_at(1.0) > p.radius_at(3.0));
    }

    #[test]
    fn alpha_masks_endpoints() {
        let p = profile();
        assert_eq!(p.alpha_at(0.0), 0.0);
        assert_eq!(p.alpha_at(0.1), 0.0);
        assert_eq!(p.alpha_at(40.0), 0.0);
        assert!((p.alpha_at(20.0) - 0.85).abs() < 1e-6);
        assert!(p.alpha_at(2.0) > 0.0 && p.alpha_at(2.0) < 0.85);
    }

    #[test]
    fn samples_cover_full_length() {
        let samples = profile().sample(8);
        assert_eq!(samples.len(), 9);
        assert_eq!(samples[0].distance, 0.0);
        assert!((samples[8].distance - 40.0).abs() < 1e-5);
    }

    #[test]
    fn zero_radius_endpoint_stays_finite() {
        let mut p = profile();
        p.radius_start = 0.0;
        assert!(p.radius_at(0.0).is_finite());
        assert!(p.alpha_at(5.0).is_finite());
    }

    #[test]
    fn smoothstep_edges() {
        assert_eq!(smoothstep(1.0, 2.0, 0.5), 0.0);
        assert_eq!(smoothstep(1.0, 2.0, 3.0), 1.0);
        assert!((smoothstep(1.0, 2.0, 1.5) - 0.5).abs() < 1e-6);
    }
}
