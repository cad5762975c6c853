use eframe::egui::{self, Pos2, Rect, Ui, Vec2};

use super::super::render_utils::distance_to_segment;
use super::super::{GraphItem, ViewModel};

// Logical hit radii in graph space; the clickable area never scales with
// zoom even though the drawn size does.
const NODE_HIT_RADIUS: f32 = 12.0;
const EDGE_HIT_TOLERANCE: f32 = 6.0;
const WHEEL_ZOOM_RATE: f32 = 0.0018;

impl ViewModel {
    pub(in crate::app) fn handle_graph_zoom(
        &mut self,
        ui: &Ui,
        rect: Rect,
        response: &egui::Response,
    ) {
        if !response.hovered() {
            return;
        }

        let scroll = ui.input(|input| input.raw_scroll_delta.y);
        if scroll.abs() <= f32::EPSILON {
            return;
        }

        let pointer = ui
            .input(|input| input.pointer.hover_pos())
            .unwrap_or_else(|| rect.center());
        let factor = (1.0 + (scroll * WHEEL_ZOOM_RATE)).clamp(0.85, 1.15);
        self.viewport.zoom_at(rect, pointer, factor);
    }

    pub(in crate::app) fn handle_graph_pan(&mut self, response: &egui::Response) {
        if response.dragged_by(egui::PointerButton::Secondary)
            || response.dragged_by(egui::PointerButton::Middle)
        {
            self.viewport.pan_by(response.drag_delta());
        }
    }

    /// Nearest node under the pointer, else nearest edge, mapped through the
    /// viewport inverse so the test runs in graph space.
    pub(in crate::app) fn hit_test(&self, rect: Rect, pointer: Pos2) -> Option<GraphItem> {
        let world = self.viewport.to_world(rect, pointer);

        let node_hit = self
            .arena
            .bodies
            .iter()
            .enumerate()
            .filter_map(|(slot, body)| {
                let distance = (body.world_pos - world).length();
                let radius = body.base_radius.max(NODE_HIT_RADIUS);
                (distance <= radius).then_some((slot, distance))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1));
        if let Some((slot, _)) = node_hit {
            return Some(GraphItem::Node(slot));
        }

        self.model
            .edges
            .iter()
            .enumerate()
            .filter_map(|(index, edge)| {
                let a = self.arena.bodies.get(edge.source)?.world_pos;
                let b = self.arena.bodies.get(edge.target)?.world_pos;
                let distance = distance_to_segment(world, a, b);
                (distance <= EDGE_HIT_TOLERANCE).then_some((index, distance))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(index, _)| GraphItem::Edge(index))
    }

    pub(in crate::app) fn handle_node_drag(&mut self, rect: Rect, response: &egui::Response) {
        if response.drag_started_by(egui::PointerButton::Primary)
            && let Some(pointer) = response.interact_pointer_pos()
            && let Some(GraphItem::Node(slot)) = self.hit_test(rect, pointer)
        {
            self.dragged = Some(slot);
            self.sim.set_dragging(true);
            self.pin_dragged_node(rect, pointer);
        }

        if response.dragged_by(egui::PointerButton::Primary)
            && self.dragged.is_some()
            && let Some(pointer) = response.interact_pointer_pos()
        {
            self.pin_dragged_node(rect, pointer);
        }

        if response.drag_stopped()
            && let Some(slot) = self.dragged.take()
        {
            if let Some(body) = self.arena.bodies.get_mut(slot) {
                body.pin = None;
            }
            self.sim.set_dragging(false);
        }
    }

    /// The pin and the rendered position both follow the pointer on every
    /// drag event.
    fn pin_dragged_node(&mut self, rect: Rect, pointer: Pos2) {
        let Some(slot) = self.dragged else {
            return;
        };

        let world = self.viewport.to_world(rect, pointer);
        if let Some(body) = self.arena.bodies.get_mut(slot) {
            body.pin = Some(world);
            body.world_pos = world;
            body.velocity = Vec2::ZERO;
        }
    }
}
