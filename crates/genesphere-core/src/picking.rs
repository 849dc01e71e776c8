use glam::{Quat, Vec2, Vec3};

use crate::layout::LayoutMode;
use crate::model::GeneModel;
use crate::params::EngineParams;

const PARALLEL_EPS: f32 = 1e-8;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    /// Unit length.
    pub dir: Vec3,
}

impl Ray {
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.dir * t
    }

    /// Re-expresses a world-space ray in the frame of a group rotated by `rotation`.
    pub fn into_local(&self, rotation: Quat) -> Ray {
        let inv = rotation.inverse();
        Ray {
            origin: inv * self.origin,
            dir: (inv * self.dir).normalize_or_zero(),
        }
    }

    /// Nearest non-negative hit distance against a sphere.
    pub fn sphere(&self, center: Vec3, radius: f32) -> Option<f32> {
        if radius <= 0.0 {
            return None;
        }
        let oc = self.origin - center;
        let b = oc.dot(self.dir);
        let c = oc.length_squared() - radius * radius;
        let disc = b * b - c;
        if disc < 0.0 {
            return None;
        }
        let s = disc.sqrt();
        [-b - s, -b + s].into_iter().find(|t| *t >= 0.0)
    }

    /// Nearest non-negative hit against a capped cylinder from `base` along
    /// unit `axis` for `length`.
    pub fn cylinder(&self, base: Vec3, axis: Vec3, length: f32, radius: f32) -> Option<f32> {
        if radius <= 0.0 || length <= 0.0 {
            return None;
        }
        let oc = self.origin - base;
        let d = self.dir - axis * self.dir.dot(axis);
        let o = oc - axis * oc.dot(axis);
        let a = d.length_squared();
        let mut best: Option<f32> = None;
        let mut consider = |t: f32| {
            if t >= 0.0 && best.map_or(true, |b| t < b) {
                best = Some(t);
            }
        };

        if a > PARALLEL_EPS {
            let b = 2.0 * o.dot(d);
            let c = o.length_squared() - radius * radius;
            let disc = b * b - 4.0 * a * c;
            if disc >= 0.0 {
                let s = disc.sqrt();
                for t in [(-b - s) / (2.0 * a), (-b + s) / (2.0 * a)] {
                    let h = (self.at(t) - base).dot(axis);
                    if (0.0..=length).contains(&h) {
                        consider(t);
                    }
                }
            }
        }

        let denom = self.dir.dot(axis);
        if denom.abs() > PARALLEL_EPS {
            for cap in [base, base + axis * length] {
                let t = (cap - self.origin).dot(axis) / denom;
                if self.at(t).distance_squared(cap) <= radius * radius {
                    consider(t);
                }
            }
        }
        best
    }
}

/// Perspective camera on `+Z` looking at the origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraRig {
    pub distance: f32,
    pub fov_y: f32,
    pub near: f32,
    pub far: f32,
}

impl CameraRig {
    pub fn from_params(params: &EngineParams) -> Self {
        Self {
            distance: params.initial_distance,
            fov_y: params.fov_y_degrees.to_radians(),
            near: params.near,
            far: params.far,
        }
    }

    pub fn position(&self) -> Vec3 {
        Vec3::new(0.0, 0.0, self.distance)
    }

    /// World-space ray through a point in normalized device coordinates.
    pub fn ray(&self, ndc: Vec2, aspect: f32) -> Ray {
        let half = (self.fov_y * 0.5).tan();
        let dir = Vec3::new(ndc.x * half * aspect, ndc.y * half, -1.0).normalize();
        Ray {
            origin: self.position(),
            dir,
        }
    }
}

/// Pointer position in logical pixels (origin top-left) to NDC.
pub fn to_ndc(pointer: Vec2, width: f32, height: f32) -> Vec2 {
    Vec2::new(
        pointer.x / width.max(1.0) * 2.0 - 1.0,
        -(pointer.y / height.max(1.0)) * 2.0 + 1.0,
    )
}

/// Closest node whose sphere the local-space ray crosses.
pub fn pick_node(model: &GeneModel, ray: &Ray, max_t: f32) -> Option<usize> {
    model
        .nodes
        .iter()
        .enumerate()
        .filter_map(|(i, n)| ray.sphere(n.position, n.radius).map(|t| (t, i)))
        .filter(|(t, _)| *t <= max_t)
        .min_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, i)| i)
}

/// Closest edge hit-volume. Hit-volumes are wider than the drawn line and
/// span the full centre-to-centre distance; in core mode only edges touching
/// a hub can be picked.
pub fn pick_edge(
    model: &GeneModel,
    ray: &Ray,
    mode: LayoutMode,
    params: &EngineParams,
    max_t: f32,
) -> Option<usize> {
    model
        .edges
        .iter()
        .enumerate()
        .filter(|(_, e)| mode != LayoutMode::Core || model.is_core_edge(e))
        .filter_map(|(i, e)| {
            let start = model.nodes[e.source].position;
            let delta = model.nodes[e.target].position - start;
            let length = delta.length();
            ray.cylinder(start, delta.normalize_or_zero(), length, params.hit_edge_radius)
                .map(|t| (t, i))
        })
        .filter(|(t, _)| *t <= max_t)
        .min_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, i)| i)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn down_z(x: f32, y: f32) -> Ray {
        Ray {
            origin: Vec3::new(x, y, 100.0),
            dir: Vec3::NEG_Z,
        }
    }

    #[test]
    fn sphere_hit_and_miss() {
        let t = down_z(0.0, 0.0).sphere(Vec3::ZERO, 2.0).expect("hit");
        assert!((t - 98.0).abs() < 1e-4);
        assert!(down_z(3.0, 0.0).sphere(Vec3::ZERO, 2.0).is_none());
        let behind = Ray {
            origin: Vec3::new(0.0, 0.0, 10.0),
            dir: Vec3::Z,
        };
        assert!(behind.sphere(Vec3::ZERO, 2.0).is_none());
    }

    #[test]
    fn cylinder_side_and_range() {
        // cylinder along +X from -10 to +10
        let base = Vec3::new(-10.0, 0.0, 0.0);
        let hit = down_z(0.0, 1.0).cylinder(base, Vec3::X, 20.0, 1.5).expect("side hit");
        assert!(hit > 98.0 && hit < 100.0);
        assert!(down_z(0.0, 2.0).cylinder(base, Vec3::X, 20.0, 1.5).is_none());
        assert!(down_z(11.0, 0.0).cylinder(base, Vec3::X, 20.0, 1.5).is_none());
    }

    #[test]
    fn cylinder_end_on_hits_cap() {
        let t = down_z(0.5, 0.0)
            .cylinder(Vec3::ZERO, Vec3::Z, 5.0, 1.0)
            .expect("cap hit");
        assert!((t - 95.0).abs() < 1e-4);
    }

    #[test]
    fn centre_pixel_ray_points_at_origin() {
        let cam = CameraRig::from_params(&EngineParams::default());
        let ndc = to_ndc(Vec2::new(400.0, 300.0), 800.0, 600.0);
        assert!(ndc.length() < 1e-6);
        let ray = cam.ray(ndc, 800.0 / 600.0);
        assert!(ray.dir.distance(Vec3::NEG_Z) < 1e-6);
    }

    #[test]
    fn local_ray_undoes_group_rotation() {
        let rot = Quat::from_rotation_y(std::f32::consts::FRAC_PI_2);
        let world = down_z(0.0, 0.0);
        let local = world.into_local(rot);
        // a point that the group rotated onto the ray must lie on the local ray
        let local_point = Vec3::new(0.0, 0.0, 5.0);
        let world_point = rot * local_point;
        assert!(world_point.x.abs() > 4.0);
        let t = (world_point - world.origin).dot(world.dir);
        assert!(local.at(t).distance(rot.inverse() * world.at(t)) < 1e-4);
    }
}
