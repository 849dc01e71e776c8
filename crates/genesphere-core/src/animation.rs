use glam::{EulerRot, Quat, Vec2};

use crate::model::GeneModel;
use crate::params::EngineParams;

/// What changed during one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TickReport {
    /// At least one node was interpolated toward its target.
    pub moved: bool,
    /// At least one live position changed, including snaps onto the target.
    pub repositioned: bool,
    pub rescaled: bool,
    /// Set on the single tick in which a layout transition converged.
    pub transition_finished: bool,
}

impl TickReport {
    pub fn needs_rebuild(&self) -> bool {
        self.repositioned || self.rescaled
    }
}

/// Frame-coupled interpolation of node positions, node radii and group rotation.
#[derive(Debug, Clone, Default)]
pub struct AnimationScheduler {
    transitioning: bool,
    /// `x` is pitch, `y` is yaw.
    rotation_target: Vec2,
    rotation: Vec2,
}

impl AnimationScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin_transition(&mut self) {
        self.transitioning = true;
    }

    pub fn is_transitioning(&self) -> bool {
        self.transitioning
    }

    /// Pointer drag in pixels: horizontal motion turns yaw, vertical turns pitch.
    pub fn drag(&mut self, delta: Vec2, params: &EngineParams) {
        self.rotation_target.y += delta.x * params.drag_sensitivity;
        self.rotation_target.x += delta.y * params.drag_sensitivity;
    }

    pub fn rotation_target(&self) -> Vec2 {
        self.rotation_target
    }

    pub fn group_rotation(&self) -> Quat {
        Quat::from_euler(EulerRot::XYZ, self.rotation.x, self.rotation.y, 0.0)
    }

    /// Advances one frame. `idle` enables auto-rotation; `emphasized` marks
    /// nodes that should grow to the hover scale.
    pub fn tick(
        &mut self,
        model: &mut GeneModel,
        emphasized: &[usize],
        idle: bool,
        params: &EngineParams,
    ) -> TickReport {
        let mut report = TickReport::default();

        if self.transitioning {
            for node in model.nodes.iter_mut() {
                if node.position.distance(node.target) > params.position_epsilon {
                    node.position = node.position.lerp(node.target, params.position_lerp);
                    report.moved = true;
                    report.repositioned = true;
                } else if node.position != node.target {
                    node.position = node.target;
                    report.repositioned = true;
                }
            }
            if !report.moved {
                self.transitioning = false;
                report.transition_finished = true;
                tracing::debug!("layout transition settled");
            }
        }

        for (i, node) in model.nodes.iter_mut().enumerate() {
            let base = params.base_radius(node.is_hub);
            let target = if emphasized.contains(&i) {
                base * params.hover_scale
            } else {
                base
            };
            if (target - node.radius).abs() > params.scale_epsilon {
                node.radius += (target - node.radius) * params.scale_lerp;
                report.rescaled = true;
            }
        }

        if idle {
            self.rotation_target.y += params.auto_rotate_step;
        }
        self.rotation += (self.rotation_target - self.rotation) * params.rotation_damping;

        report
    }
}
