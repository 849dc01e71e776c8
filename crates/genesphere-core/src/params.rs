use serde::{Deserialize, Serialize};

/// Tunables for layout, animation, picking and highlight geometry.
///
/// Interpolation factors are applied once per tick; they are not scaled by
/// elapsed time, so animation speed follows the frame rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineParams {
    // layout
    pub radius_uniform: f32,
    pub radius_core: f32,
    pub radius_outer: f32,
    pub hub_fraction: f32,

    // instance geometry
    pub node_radius: f32,
    pub hub_radius: f32,
    pub outline_scale: f32,
    pub min_thickness: f32,
    pub max_thickness: f32,
    pub core_edge_thickness: f32,
    pub core_arrow_thickness: f32,
    pub arrow_length: f32,
    pub arrow_angle: f32,

    // animation
    pub position_lerp: f32,
    pub position_epsilon: f32,
    pub scale_lerp: f32,
    pub scale_epsilon: f32,
    pub hover_scale: f32,
    pub rotation_damping: f32,
    pub auto_rotate_step: f32,
    pub drag_sensitivity: f32,

    // camera + picking
    pub fov_y_degrees: f32,
    pub near: f32,
    pub far: f32,
    pub initial_distance: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    pub zoom_step: f32,
    pub hit_edge_radius: f32,
    pub tooltip_offset: f32,

    // highlight
    pub highlight_endpoint_scale: f32,
    pub highlight_alpha: f32,
}

impl Default for EngineParams {
    fn default() -> Self {
        Self {
            radius_uniform: 45.0,
            radius_core: 15.0,
            radius_outer: 65.0,
            hub_fraction: 0.10,

            node_radius: 1.5,
            hub_radius: 3.5,
            outline_scale: 1.05,
            min_thickness: 0.05,
            max_thickness: 0.4,
            core_edge_thickness: 0.05,
            core_arrow_thickness: 0.08,
            arrow_length: 0.75,
            arrow_angle: std::f32::consts::FRAC_PI_6,

            position_lerp: 0.05,
            position_epsilon: 0.1,
            scale_lerp: 0.2,
            scale_epsilon: 0.001,
            hover_scale: 1.3,
            rotation_damping: 0.1,
            auto_rotate_step: 0.001,
            drag_sensitivity: 0.005,

            fov_y_degrees: 50.0,
            near: 1.0,
            far: 1000.0,
            initial_distance: 140.0,
            min_distance: 20.0,
            max_distance: 400.0,
            zoom_step: 0.05,
            hit_edge_radius: 1.5,
            tooltip_offset: 15.0,

            highlight_endpoint_scale: 1.25,
            highlight_alpha: 0.85,
        }
    }
}

impl EngineParams {
    pub fn base_radius(&self, is_hub: bool) -> f32 {
        if is_hub {
            self.hub_radius
        } else {
            self.node_radius
        }
    }

    /// Visible edge thickness, linear in weight between the configured bounds.
    pub fn thickness(&self, weight: f32) -> f32 {
        let w = weight.clamp(0.0, 1.0);
        self.min_thickness + w * (self.max_thickness - self.min_thickness)
    }

    pub fn clamp_distance(&self, distance: f32) -> f32 {
        distance.clamp(self.min_distance, self.max_distance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thickness_spans_bounds() {
        let p = EngineParams::default();
        assert_eq!(p.thickness(0.0), p.min_thickness);
        assert!((p.thickness(1.0) - p.max_thickness).abs() < 1e-6);
        assert!((p.thickness(5.0) - p.max_thickness).abs() < 1e-6);
    }

    #[test]
    fn partial_params_fall_back_to_defaults() {
        let p: EngineParams = serde_json::from_str(r#"{"radius_core": 10.0}"#).expect("params");
        assert_eq!(p.radius_core, 10.0);
        assert_eq!(p.radius_outer, EngineParams::default().radius_outer);
    }
}
