//! Derives per-instance transforms and colors from the model.

use glam::{Quat, Vec3};

use crate::adapter::{InstanceCategory, InstanceCounts, InstanceTransform, RenderAdapter, ARROW_STROKES};
use crate::interaction::SelectionState;
use crate::model::GeneModel;
use crate::params::EngineParams;
use crate::style::{Palette, Srgb};

pub fn counts(model: &GeneModel) -> InstanceCounts {
    InstanceCounts {
        nodes: model.nodes.len(),
        edges: model.edges.len(),
    }
}

/// Axis the arrow strokes fan around: perpendicular to both the edge and world up.
fn stroke_axis(forward: Vec3) -> Vec3 {
    let right = forward.cross(Vec3::Y).normalize_or_zero();
    if right == Vec3::ZERO {
        Vec3::X
    } else {
        right
    }
}

/// The four strokes of an edge's arrow heads: two at the source tip pointing
/// along the edge, two at the target tip pointing back.
pub fn arrow_strokes(
    start_tip: Vec3,
    end_tip: Vec3,
    dir: Vec3,
    thickness: f32,
    params: &EngineParams,
) -> [InstanceTransform; ARROW_STROKES] {
    let stroke = |tip: Vec3, forward: Vec3, angle: f32| {
        let stroke_dir = Quat::from_axis_angle(stroke_axis(forward), angle) * forward;
        InstanceTransform::segment(tip, stroke_dir, thickness, params.arrow_length)
    };
    let back = -dir;
    [
        stroke(start_tip, dir, params.arrow_angle),
        stroke(start_tip, dir, -params.arrow_angle),
        stroke(end_tip, back, params.arrow_angle),
        stroke(end_tip, back, -params.arrow_angle),
    ]
}

/// Pushes every node, outline, edge and arrow transform.
pub fn push_transforms<A: RenderAdapter + ?Sized>(
    model: &GeneModel,
    params: &EngineParams,
    adapter: &mut A,
) {
    for (i, node) in model.nodes.iter().enumerate() {
        adapter.set_instance_transform(
            InstanceCategory::Node,
            i,
            InstanceTransform::sphere(node.position, node.radius),
        );
        adapter.set_instance_transform(
            InstanceCategory::NodeOutline,
            i,
            InstanceTransform::sphere(node.position, node.radius * params.outline_scale),
        );
    }

    for (i, edge) in model.edges.iter().enumerate() {
        let source = &model.nodes[edge.source];
        let target = &model.nodes[edge.target];
        let start = source.position;
        let delta = target.position - start;
        let dir = delta.normalize_or_zero();
        let visible = delta.length() - (source.radius + target.radius) * 0.5;
        let thickness = params.thickness(edge.weight);

        adapter.set_instance_transform(
            InstanceCategory::Edge,
            i,
            InstanceTransform::segment(start, dir, thickness, visible),
        );

        let start_tip = start + dir * source.radius;
        let end_tip = target.position - dir * target.radius;
        let base = i * ARROW_STROKES;
        for (k, stroke) in arrow_strokes(start_tip, end_tip, dir, thickness, params)
            .into_iter()
            .enumerate()
        {
            adapter.set_instance_transform(InstanceCategory::Arrow, base + k, stroke);
        }

        if model.is_core_edge(edge) {
            adapter.set_instance_transform(
                InstanceCategory::CoreEdge,
                i,
                InstanceTransform::segment(start, dir, params.core_edge_thickness, visible),
            );
            let strokes =
                arrow_strokes(start_tip, end_tip, dir, params.core_arrow_thickness, params);
            for (k, stroke) in strokes.into_iter().enumerate() {
                adapter.set_instance_transform(InstanceCategory::CoreArrow, base + k, stroke);
            }
        } else {
            adapter.set_instance_transform(InstanceCategory::CoreEdge, i, InstanceTransform::HIDDEN);
            for k in 0..ARROW_STROKES {
                adapter.set_instance_transform(
                    InstanceCategory::CoreArrow,
                    base + k,
                    InstanceTransform::HIDDEN,
                );
            }
        }
    }
}

/// Node fill for the current selection: the hovered node takes the hover color.
pub fn node_color(model: &GeneModel, index: usize, selection: SelectionState, palette: &Palette) -> Srgb {
    match selection {
        SelectionState::Node(i) if i == index => palette.hover_color,
        _ => model.nodes[index].base_color,
    }
}

pub fn push_node_colors<A: RenderAdapter + ?Sized>(
    model: &GeneModel,
    selection: SelectionState,
    palette: &Palette,
    adapter: &mut A,
) {
    for i in 0..model.nodes.len() {
        adapter.set_instance_color(
            InstanceCategory::Node,
            i,
            node_color(model, i, selection, palette),
        );
    }
}

/// Pushes every instance color.
pub fn push_colors<A: RenderAdapter + ?Sized>(
    model: &GeneModel,
    selection: SelectionState,
    palette: &Palette,
    adapter: &mut A,
) {
    push_node_colors(model, selection, palette, adapter);
    for i in 0..model.nodes.len() {
        adapter.set_instance_color(InstanceCategory::NodeOutline, i, Srgb::BLACK);
    }
    for i in 0..model.edges.len() {
        adapter.set_instance_color(InstanceCategory::Edge, i, palette.line_color);
        adapter.set_instance_color(InstanceCategory::CoreEdge, i, palette.top_node_color);
        for k in 0..ARROW_STROKES {
            let slot = i * ARROW_STROKES + k;
            adapter.set_instance_color(InstanceCategory::Arrow, slot, palette.line_color);
            adapter.set_instance_color(InstanceCategory::CoreArrow, slot, palette.top_node_color);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::recording::RecordingAdapter;
    use crate::dataset::{Dataset, RawLink, RawNode};
    use crate::layout::LayoutMode;

    fn pair_model() -> GeneModel {
        let node = |id: &str| RawNode {
            id: id.into(),
            name: id.into(),
            val: None,
        };
        let data = Dataset {
            nodes: vec![node("a"), node("b"), node("c")],
            links: vec![
                RawLink {
                    source: "a".into(),
                    target: "b".into(),
                    score: Some(0.9),
                },
                RawLink {
                    source: "b".into(),
                    target: "c".into(),
                    score: Some(0.1),
                },
            ],
        };
        GeneModel::build(
            &data,
            LayoutMode::Uniform,
            &EngineParams::default(),
            &Palette::default(),
        )
    }

    fn pushed(model: &GeneModel) -> RecordingAdapter {
        let mut adapter = RecordingAdapter::new();
        adapter.allocate(counts(model));
        push_transforms(model, &EngineParams::default(), &mut adapter);
        push_colors(model, SelectionState::None, &Palette::default(), &mut adapter);
        adapter
    }

    #[test]
    fn edge_length_stops_short_of_node_centres() {
        let model = pair_model();
        let adapter = pushed(&model);
        let e = model.edges[0];
        let (s, t) = (&model.nodes[e.source], &model.nodes[e.target]);
        let expected = s.position.distance(t.position) - (s.radius + t.radius) * 0.5;
        let got = adapter.transform(InstanceCategory::Edge, 0);
        assert!((got.scale.z - expected).abs() < 1e-4);
        assert_eq!(got.translation, s.position);
    }

    #[test]
    fn outline_is_slightly_larger() {
        let model = pair_model();
        let adapter = pushed(&model);
        let node = adapter.transform(InstanceCategory::Node, 1);
        let outline = adapter.transform(InstanceCategory::NodeOutline, 1);
        assert!((outline.scale.x - node.scale.x * 1.05).abs() < 1e-5);
    }

    #[test]
    fn core_instances_follow_hub_membership() {
        let model = pair_model();
        let adapter = pushed(&model);
        for (i, e) in model.edges.iter().enumerate() {
            let hidden = adapter.transform(InstanceCategory::CoreEdge, i).is_hidden();
            assert_eq!(hidden, !model.is_core_edge(e), "edge {i}");
            for k in 0..ARROW_STROKES {
                let stroke = adapter.transform(InstanceCategory::CoreArrow, i * ARROW_STROKES + k);
                assert_eq!(stroke.is_hidden(), hidden);
            }
        }
        assert!(model.hub_count() > 0);
    }

    #[test]
    fn arrow_strokes_fan_back_from_each_tip() {
        let params = EngineParams::default();
        let strokes = arrow_strokes(Vec3::ZERO, Vec3::new(10.0, 0.0, 0.0), Vec3::X, 0.1, &params);
        for (k, s) in strokes.iter().enumerate() {
            let dir = s.rotation * Vec3::Z;
            let along = if k < 2 { Vec3::X } else { Vec3::NEG_X };
            let angle = dir.angle_between(along);
            assert!((angle - params.arrow_angle).abs() < 1e-4, "stroke {k}");
            assert_eq!(s.scale.z, params.arrow_length);
        }
    }

    #[test]
    fn vertical_edge_uses_fallback_axis() {
        let params = EngineParams::default();
        let strokes = arrow_strokes(Vec3::ZERO, Vec3::Y, Vec3::Y, 0.1, &params);
        assert!(strokes.iter().all(|s| s.rotation.is_finite()));
    }

    #[test]
    fn colors_follow_palette_and_selection() {
        let model = pair_model();
        let palette = Palette::default();
        let mut adapter = pushed(&model);
        assert_eq!(adapter.color(InstanceCategory::Edge, 1), palette.line_color);
        assert_eq!(adapter.color(InstanceCategory::CoreArrow, 7), palette.top_node_color);
        assert_eq!(adapter.color(InstanceCategory::NodeOutline, 0), Srgb::BLACK);

        push_node_colors(&model, SelectionState::Node(2), &palette, &mut adapter);
        assert_eq!(adapter.color(InstanceCategory::Node, 2), palette.hover_color);
        assert_eq!(adapter.color(InstanceCategory::Node, 0), model.nodes[0].base_color);
    }
}
