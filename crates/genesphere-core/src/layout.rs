use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::f32::consts::PI;

use crate::model::GeneModel;
use crate::params::EngineParams;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutMode {
    /// One sphere holding every node.
    #[default]
    Uniform,
    /// Hubs on an inner sphere, everything else on an outer one.
    Core,
}

impl LayoutMode {
    pub fn label(self) -> &'static str {
        match self {
            Self::Uniform => "Uniform",
            Self::Core => "Core",
        }
    }
}

fn golden_angle() -> f32 {
    PI * (3.0 - 5f32.sqrt())
}

/// Point `i` of an `n`-point golden-angle spiral on a sphere of `radius`.
pub fn spiral_point(i: usize, n: usize, radius: f32) -> Vec3 {
    let y = if n > 1 {
        1.0 - 2.0 * (i as f32) / ((n - 1) as f32)
    } else {
        0.0
    };
    let r = (1.0 - y * y).max(0.0).sqrt();
    let theta = i as f32 * golden_angle();
    Vec3::new(theta.cos() * r, y, theta.sin() * r) * radius
}

pub fn sphere_points(n: usize, radius: f32) -> Vec<Vec3> {
    (0..n).map(|i| spiral_point(i, n, radius)).collect()
}

/// Target position per node, in node order. In core mode hubs and non-hubs
/// are indexed independently within their own partition.
pub fn targets(is_hub: &[bool], mode: LayoutMode, params: &EngineParams) -> Vec<Vec3> {
    match mode {
        LayoutMode::Uniform => sphere_points(is_hub.len(), params.radius_uniform),
        LayoutMode::Core => {
            let hubs = is_hub.iter().filter(|h| **h).count();
            let others = is_hub.len() - hubs;
            let (mut hub_i, mut other_i) = (0usize, 0usize);
            is_hub
                .iter()
                .map(|&hub| {
                    if hub {
                        hub_i += 1;
                        spiral_point(hub_i - 1, hubs, params.radius_core)
                    } else {
                        other_i += 1;
                        spiral_point(other_i - 1, others, params.radius_outer)
                    }
                })
                .collect()
        }
    }
}

impl GeneModel {
    /// Recomputes target positions only; live positions are left for the
    /// animation tick to move.
    pub fn retarget(&mut self, mode: LayoutMode, params: &EngineParams) {
        let hubs: Vec<bool> = self.nodes.iter().map(|n| n.is_hub).collect();
        for (node, target) in self.nodes.iter_mut().zip(targets(&hubs, mode, params)) {
            node.target = target;
        }
        tracing::debug!(mode = mode.label(), nodes = self.nodes.len(), "layout retargeted");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_point_is_finite() {
        let p = spiral_point(0, 1, 45.0);
        assert!(p.is_finite());
        assert!((p.length() - 45.0).abs() < 1e-3);
    }

    #[test]
    fn uniform_points_are_distinct_and_on_sphere() {
        for n in [1usize, 2, 3, 7, 50, 500] {
            let pts = sphere_points(n, 45.0);
            assert_eq!(pts.len(), n);
            for (i, p) in pts.iter().enumerate() {
                assert!(p.is_finite(), "n={n} i={i}");
                assert!((p.length() - 45.0).abs() < 1e-2, "n={n} i={i} len={}", p.length());
                for q in &pts[..i] {
                    assert!(p.distance(*q) > 1e-3, "duplicate point n={n} i={i}");
                }
            }
        }
    }

    #[test]
    fn core_places_hubs_inside() {
        let params = EngineParams::default();
        let flags = [true, false, false, true, false];
        let pts = targets(&flags, LayoutMode::Core, &params);
        let inner = pts
            .iter()
            .zip(flags)
            .filter(|(_, h)| *h)
            .map(|(p, _)| p.length())
            .fold(0.0f32, f32::max);
        let outer = pts
            .iter()
            .zip(flags)
            .filter(|(_, h)| !*h)
            .map(|(p, _)| p.length())
            .fold(f32::INFINITY, f32::min);
        assert!(inner < outer);
        assert!((inner - params.radius_core).abs() < 1e-3);
        // partitions restart their spiral index
        assert_eq!(pts[0], spiral_point(0, 2, params.radius_core));
        assert_eq!(pts[3], spiral_point(1, 2, params.radius_core));
        assert_eq!(pts[1], spiral_point(0, 3, params.radius_outer));
    }

    #[test]
    fn core_with_single_hub_is_defined() {
        let params = EngineParams::default();
        let pts = targets(&[false, true], LayoutMode::Core, &params);
        assert!(pts.iter().all(|p| p.is_finite()));
    }
}
