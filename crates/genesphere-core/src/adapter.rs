use glam::{Mat4, Quat, Vec3};

use crate::highlight::HighlightProfile;
use crate::style::Srgb;

/// Instanced primitive groups a renderer has to provide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InstanceCategory {
    Node,
    NodeOutline,
    Edge,
    Arrow,
    CoreEdge,
    CoreArrow,
}

/// Arrow strokes drawn per edge: two at each tip.
pub const ARROW_STROKES: usize = 4;

impl InstanceCategory {
    pub const ALL: [InstanceCategory; 6] = [
        Self::Node,
        Self::NodeOutline,
        Self::Edge,
        Self::Arrow,
        Self::CoreEdge,
        Self::CoreArrow,
    ];

    /// Dense index, handy for per-category buffers.
    pub fn slot(self) -> usize {
        match self {
            Self::Node => 0,
            Self::NodeOutline => 1,
            Self::Edge => 2,
            Self::Arrow => 3,
            Self::CoreEdge => 4,
            Self::CoreArrow => 5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InstanceCounts {
    pub nodes: usize,
    pub edges: usize,
}

impl InstanceCounts {
    pub fn of(self, category: InstanceCategory) -> usize {
        match category {
            InstanceCategory::Node | InstanceCategory::NodeOutline => self.nodes,
            InstanceCategory::Edge | InstanceCategory::CoreEdge => self.edges,
            InstanceCategory::Arrow | InstanceCategory::CoreArrow => self.edges * ARROW_STROKES,
        }
    }
}

/// Placement of one instance in the network's local frame.
///
/// Node meshes are unit spheres centred on the origin. Segment meshes (edges,
/// arrow strokes) are unit-radius cylinders running from the origin to `+Z`
/// at length 1, so `scale.z` is the segment length.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InstanceTransform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl InstanceTransform {
    pub const HIDDEN: InstanceTransform = InstanceTransform {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ZERO,
    };

    pub fn sphere(center: Vec3, radius: f32) -> Self {
        Self {
            translation: center,
            rotation: Quat::IDENTITY,
            scale: Vec3::splat(radius),
        }
    }

    pub fn segment(start: Vec3, dir: Vec3, thickness: f32, length: f32) -> Self {
        Self {
            translation: start,
            rotation: segment_rotation(dir),
            scale: Vec3::new(thickness, thickness, length.max(0.0)),
        }
    }

    pub fn is_hidden(&self) -> bool {
        self.scale == Vec3::ZERO
    }

    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }
}

/// Rotation carrying `+Z` onto `dir`; degenerate directions keep `+Z`.
pub fn segment_rotation(dir: Vec3) -> Quat {
    let dir = dir.normalize_or_zero();
    if dir == Vec3::ZERO {
        Quat::IDENTITY
    } else {
        Quat::from_rotation_arc(Vec3::Z, dir)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PointerAffordance {
    #[default]
    Default,
    Pointer,
}

/// The narrow surface the engine drives a renderer through.
///
/// Instance indices are stable between `allocate` calls: node `i` is
/// `GeneModel::nodes[i]`, edge `i` is `GeneModel::edges[i]`, and arrow stroke
/// `k` of edge `i` is `i * ARROW_STROKES + k`.
pub trait RenderAdapter {
    /// Discards any previous instances and reserves `counts`.
    fn allocate(&mut self, counts: InstanceCounts);

    fn set_instance_transform(
        &mut self,
        category: InstanceCategory,
        index: usize,
        transform: InstanceTransform,
    );

    fn set_instance_color(&mut self, category: InstanceCategory, index: usize, color: Srgb);

    /// `None` hides the highlight entirely.
    fn set_highlight_profile(&mut self, profile: Option<&HighlightProfile>);

    /// Rotation of the whole network group around the origin.
    fn set_group_rotation(&mut self, rotation: Quat);

    fn set_view_distance(&mut self, distance: f32);

    fn set_pointer_affordance(&mut self, affordance: PointerAffordance);

    /// Whether geometry from the last `allocate` is in place for picking.
    fn is_ready(&self) -> bool {
        true
    }

    /// Frees every backend resource. Called once when the owning session ends.
    fn release(&mut self);
}

#[cfg(test)]
pub(crate) mod recording {
    use super::*;

    /// In-memory adapter that keeps the last value pushed for every slot.
    #[derive(Debug, Default)]
    pub struct RecordingAdapter {
        pub counts: InstanceCounts,
        pub allocations: usize,
        pub transforms: [Vec<InstanceTransform>; 6],
        pub colors: [Vec<Srgb>; 6],
        pub transform_writes: usize,
        pub color_writes: usize,
        pub highlight: Option<HighlightProfile>,
        pub highlight_writes: usize,
        pub rotation: Quat,
        pub distance: f32,
        pub affordance: PointerAffordance,
        pub ready: bool,
        pub released: usize,
    }

    impl RecordingAdapter {
        pub fn new() -> Self {
            Self {
                ready: true,
                ..Default::default()
            }
        }

        pub fn transform(&self, category: InstanceCategory, index: usize) -> InstanceTransform {
            self.transforms[category.slot()][index]
        }

        pub fn color(&self, category: InstanceCategory, index: usize) -> Srgb {
            self.colors[category.slot()][index]
        }
    }

    impl RenderAdapter for RecordingAdapter {
        fn allocate(&mut self, counts: InstanceCounts) {
            self.counts = counts;
            self.allocations += 1;
            for category in InstanceCategory::ALL {
                let n = counts.of(category);
                self.transforms[category.slot()] = vec![InstanceTransform::HIDDEN; n];
                self.colors[category.slot()] = vec![Srgb::BLACK; n];
            }
        }

        fn set_instance_transform(
            &mut self,
            category: InstanceCategory,
            index: usize,
            transform: InstanceTransform,
        ) {
            self.transform_writes += 1;
            self.transforms[category.slot()][index] = transform;
        }

        fn set_instance_color(&mut self, category: InstanceCategory, index: usize, color: Srgb) {
            self.color_writes += 1;
            self.colors[category.slot()][index] = color;
        }

        fn set_highlight_profile(&mut self, profile: Option<&HighlightProfile>) {
            self.highlight_writes += 1;
            self.highlight = profile.copied();
        }

        fn set_group_rotation(&mut self, rotation: Quat) {
            self.rotation = rotation;
        }

        fn set_view_distance(&mut self, distance: f32) {
            self.distance = distance;
        }

        fn set_pointer_affordance(&mut self, affordance: PointerAffordance) {
            self.affordance = affordance;
        }

        fn is_ready(&self) -> bool {
            self.ready
        }

        fn release(&mut self) {
            self.released += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segment_points_along_direction() {
        let t = InstanceTransform::segment(Vec3::ONE, Vec3::new(0.0, 3.0, 0.0), 0.2, 4.0);
        let tip = t.to_matrix().transform_point3(Vec3::Z);
        assert!(tip.distance(Vec3::new(1.0, 5.0, 1.0)) < 1e-5);
    }

    #[test]
    fn degenerate_segment_is_finite() {
        let t = InstanceTransform::segment(Vec3::ZERO, Vec3::ZERO, 0.2, -1.0);
        assert_eq!(t.rotation, Quat::IDENTITY);
        assert_eq!(t.scale.z, 0.0);
    }

    #[test]
    fn arrow_counts_scale_with_edges() {
        let counts = InstanceCounts { nodes: 3, edges: 2 };
        assert_eq!(counts.of(InstanceCategory::NodeOutline), 3);
        assert_eq!(counts.of(InstanceCategory::CoreArrow), 8);
    }
}
