use std::collections::HashSet;

use eframe::egui::{Color32, Pos2, Rect, Stroke, vec2};

use crate::model::{EdgeKind, GraphModel, NodeKind};
use crate::util::ellipsize;

use super::render_utils::{
    arrow_color, blend_color, dim_color, edge_color, kind_color, with_opacity,
};
use super::territory::{EdgeClass, NodeClass, TerritoryState};
use super::viewport::Viewport;
use super::{GraphItem, RenderArena};

const LABEL_MAX_CHARS: usize = 34;
const HOVER_COLOR: Color32 = Color32::from_rgb(255, 164, 101);
const SELECTED_COLOR: Color32 = Color32::from_rgb(245, 206, 93);
const SEARCH_COLOR: Color32 = Color32::from_rgb(103, 196, 255);
const FADED_EDGE_OPACITY: f32 = 0.1;
const MUTED_TENSION_OPACITY: f32 = 0.2;

pub(super) struct SceneStyle<'a> {
    pub highlight_controversies: bool,
    pub time: f64,
    pub hovered: Option<GraphItem>,
    pub selected: Option<GraphItem>,
    pub search_matches: Option<&'a HashSet<usize>>,
}

impl SceneStyle<'_> {
    /// Neutral style for snapshots: no pointer state, no pulse phase.
    pub fn snapshot(highlight_controversies: bool) -> Self {
        SceneStyle {
            highlight_controversies,
            time: 0.0,
            hovered: None,
            selected: None,
            search_matches: None,
        }
    }
}

pub(super) struct EdgePrimitive {
    pub edge_index: usize,
    pub start: Pos2,
    pub end: Pos2,
    pub stroke: Stroke,
    pub dashed: bool,
    pub arrow: Option<[Pos2; 3]>,
    pub arrow_fill: Color32,
}

pub(super) struct NodePrimitive {
    pub slot: usize,
    pub center: Pos2,
    pub radius: f32,
    pub fill: Color32,
    pub outline: Stroke,
    pub halo: bool,
    pub label: String,
    pub label_color: Color32,
}

pub(super) struct Scene {
    pub edges: Vec<EdgePrimitive>,
    pub nodes: Vec<NodePrimitive>,
    pub animating: bool,
}

fn arrowhead(start: Pos2, end: Pos2, target_radius: f32, zoom: f32) -> Option<[Pos2; 3]> {
    let delta = end - start;
    let length = delta.length();
    let size = (7.0 * zoom.sqrt()).clamp(4.0, 12.0);
    if length <= target_radius + size + 2.0 {
        return None;
    }

    let direction = delta / length;
    let tip = end - direction * (target_radius + 3.0);
    let base = tip - direction * size;
    let normal = vec2(-direction.y, direction.x) * (size * 0.45);
    Some([tip, base + normal, base - normal])
}

/// Pure projection of (live positions × classification × viewport) into
/// primitives. Builds fresh lists every call; nothing is queued.
pub(super) fn build_scene(
    model: &GraphModel,
    arena: &RenderArena,
    territory: &TerritoryState,
    viewport: &Viewport,
    rect: Rect,
    style: &SceneStyle<'_>,
) -> Scene {
    let zoom_sqrt = viewport.zoom.sqrt();
    let mut animating = false;

    let mut edges = Vec::with_capacity(model.edges.len());
    for (edge_index, edge) in model.edges.iter().enumerate() {
        let (Some(source), Some(target)) = (
            arena.bodies.get(edge.source),
            arena.bodies.get(edge.target),
        ) else {
            continue;
        };

        let start = viewport.to_screen(rect, source.world_pos);
        let end = viewport.to_screen(rect, target.world_pos);

        let is_selected = style.selected == Some(GraphItem::Edge(edge_index));
        let is_hovered = style.hovered == Some(GraphItem::Edge(edge_index));

        let mut opacity = match territory.edge_class(edge) {
            EdgeClass::Held => 1.0,
            EdgeClass::Faded => FADED_EDGE_OPACITY,
            EdgeClass::Normal => {
                if edge.kind == EdgeKind::Tension && !style.highlight_controversies {
                    MUTED_TENSION_OPACITY
                } else {
                    1.0
                }
            }
        };

        if edge.kind == EdgeKind::Tension
            && style.highlight_controversies
            && opacity > FADED_EDGE_OPACITY
        {
            let phase = style.time * 4.0 + edge_index as f64 * 0.9;
            opacity *= 0.55 + 0.45 * (0.5 + 0.5 * phase.sin()) as f32;
            animating = true;
        }

        if is_selected || is_hovered {
            opacity = 1.0;
        }

        let mut width = (edge.weight.unwrap_or(0.5) * 3.0 * zoom_sqrt).clamp(0.5, 8.0);
        if is_selected || is_hovered {
            width += 1.2;
        }

        let color = with_opacity(edge_color(edge.kind), opacity);
        let target_radius = (target.base_radius * viewport.zoom).clamp(2.0, 64.0);

        edges.push(EdgePrimitive {
            edge_index,
            start,
            end,
            stroke: Stroke::new(width, color),
            dashed: matches!(edge.kind, EdgeKind::Tension | EdgeKind::Translation),
            arrow: arrowhead(start, end, target_radius, viewport.zoom),
            arrow_fill: with_opacity(arrow_color(edge.kind), opacity),
        });
    }

    let search_active = !territory.is_active()
        && style
            .search_matches
            .is_some_and(|matches| !matches.is_empty());

    let mut nodes = Vec::with_capacity(model.nodes.len());
    for (slot, (node, body)) in model.nodes.iter().zip(&arena.bodies).enumerate() {
        let center = viewport.to_screen(rect, body.world_pos);
        let radius = (body.base_radius * viewport.zoom).clamp(2.0, 64.0);

        let is_selected = style.selected == Some(GraphItem::Node(slot));
        let is_hovered = style.hovered == Some(GraphItem::Node(slot));
        let is_match = style
            .search_matches
            .is_some_and(|matches| matches.contains(&slot));

        let base = kind_color(node.kind);
        let class = territory.class_of(slot);

        let mut fill = match class {
            NodeClass::Center => base,
            NodeClass::Territory => blend_color(base, Color32::WHITE, 0.35),
            NodeClass::Independent => with_opacity(dim_color(base, 0.35), 0.45),
            NodeClass::Default => {
                if search_active && is_match {
                    blend_color(base, SEARCH_COLOR, 0.68)
                } else if search_active {
                    dim_color(base, 0.38)
                } else {
                    base
                }
            }
        };
        if node.kind == NodeKind::Analyst && class != NodeClass::Independent {
            fill = Color32::from_rgb(30, 41, 59);
        }
        if is_hovered {
            fill = blend_color(fill, HOVER_COLOR, 0.5);
        }

        let outline = if is_selected {
            Stroke::new(2.5, SELECTED_COLOR)
        } else if node.kind == NodeKind::Analyst {
            Stroke::new(3.0, Color32::from_rgb(168, 85, 247))
        } else {
            Stroke::new(2.0, with_opacity(Color32::WHITE, 0.85))
        };

        let label_color = match class {
            NodeClass::Center | NodeClass::Territory => Color32::from_gray(240),
            NodeClass::Independent => with_opacity(Color32::from_rgb(148, 163, 184), 0.7),
            NodeClass::Default => Color32::from_gray(220),
        };

        let label = format!(
            "{}{}",
            ellipsize(&node.label, LABEL_MAX_CHARS),
            class.label_suffix()
        );

        nodes.push(NodePrimitive {
            slot,
            center,
            radius,
            fill,
            outline,
            halo: is_selected || class == NodeClass::Center,
            label,
            label_color,
        });
    }

    Scene {
        edges,
        nodes,
        animating,
    }
}
