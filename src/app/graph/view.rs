use std::collections::HashSet;
use std::sync::Arc;

use eframe::egui::{
    self, Align2, Color32, FontId, Painter, Rect, Sense, Shape, Stroke, Ui, vec2,
};
use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

use crate::model::NodeKind;
use crate::util::ellipsize;

use super::super::physics::step_physics;
use super::super::render_utils::{draw_background, kind_color, with_opacity};
use super::super::scene::{Scene, SceneStyle, build_scene};
use super::super::{GraphItem, PhysicsConfig, SearchMatchCache, ViewModel};

fn fuzzy_match_score(matcher: &SkimMatcherV2, text: &str, query: &str) -> Option<i64> {
    matcher
        .fuzzy_match(text, query)
        .or_else(|| matcher.fuzzy_match(&text.to_ascii_lowercase(), &query.to_ascii_lowercase()))
}

fn paint_scene(painter: &Painter, scene: &Scene) {
    for edge in &scene.edges {
        if edge.dashed {
            painter.extend(Shape::dashed_line(
                &[edge.start, edge.end],
                edge.stroke,
                4.0,
                4.0,
            ));
        } else {
            painter.line_segment([edge.start, edge.end], edge.stroke);
        }

        if let Some(points) = edge.arrow {
            painter.add(Shape::convex_polygon(
                points.to_vec(),
                edge.arrow_fill,
                Stroke::NONE,
            ));
        }
    }

    for node in &scene.nodes {
        if node.halo {
            painter.circle_stroke(
                node.center,
                node.radius + 5.0,
                Stroke::new(2.0, with_opacity(Color32::from_rgb(59, 130, 246), 0.55)),
            );
        }

        painter.circle_filled(node.center, node.radius, node.fill);
        painter.circle_stroke(node.center, node.radius, node.outline);
        painter.text(
            node.center + vec2(node.radius + 5.0, 0.0),
            Align2::LEFT_CENTER,
            &node.label,
            FontId::proportional(12.0),
            node.label_color,
        );
    }
}

impl ViewModel {
    fn cached_search_matches(&mut self) -> Option<Arc<HashSet<usize>>> {
        if self.selected.is_some() {
            return None;
        }

        let query = self.search.trim();
        if query.is_empty() {
            return None;
        }

        if let Some(cached) = &self.search_match_cache
            && cached.revision == self.model_revision
            && cached.query == query
        {
            return Some(Arc::clone(&cached.matches));
        }

        let matcher = SkimMatcherV2::default();
        let matches = self
            .model
            .nodes
            .iter()
            .enumerate()
            .filter_map(|(slot, node)| {
                fuzzy_match_score(&matcher, &node.label, query).map(|_| slot)
            })
            .collect::<HashSet<_>>();
        let matches = Arc::new(matches);

        self.search_match_cache = Some(SearchMatchCache {
            query: query.to_owned(),
            revision: self.model_revision,
            matches: Arc::clone(&matches),
        });

        Some(matches)
    }

    pub(in crate::app) fn draw_graph(&mut self, ui: &mut Ui) {
        if self.graph_dirty {
            self.rebuild_model();
        }

        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        let painter = ui.painter_at(rect);
        self.canvas_rect = rect;

        draw_background(&painter, rect, self.viewport.pan, self.viewport.zoom);

        if self.model.is_empty() {
            painter.text(
                rect.center(),
                Align2::CENTER_CENTER,
                "No network data available. Run a comparison to generate one.",
                FontId::proportional(15.0),
                Color32::from_gray(150),
            );
            return;
        }

        self.handle_graph_zoom(ui, rect, &response);
        self.handle_graph_pan(&response);
        self.handle_node_drag(rect, &response);

        let frame_delta_seconds = ui
            .ctx()
            .input(|input| input.stable_dt)
            .clamp(1.0 / 240.0, 1.0 / 20.0);
        let physics = PhysicsConfig {
            repulsion_strength: self.repulsion_strength,
            tension_distance: self.tension_distance,
            delta_seconds: frame_delta_seconds,
        };
        let physics_moving = step_physics(
            &self.model,
            &mut self.arena,
            &self.territory,
            &mut self.sim,
            physics,
        );

        self.hovered = response
            .hover_pos()
            .and_then(|pointer| self.hit_test(rect, pointer));
        if self.hovered.is_some() {
            ui.output_mut(|output| {
                output.cursor_icon = egui::CursorIcon::PointingHand;
            });
        }

        if response.clicked_by(egui::PointerButton::Primary) {
            self.selected = self.hovered;
        }

        let search_matches = self.cached_search_matches();
        let style = SceneStyle {
            highlight_controversies: self.highlight_controversies,
            time: ui.ctx().input(|input| input.time),
            hovered: self.hovered,
            selected: self.selected,
            search_matches: search_matches.as_deref(),
        };
        let scene = build_scene(
            &self.model,
            &self.arena,
            &self.territory,
            &self.viewport,
            rect,
            &style,
        );

        paint_scene(&painter, &scene);
        Self::draw_legend(&painter, rect);
        self.draw_hover_panel(&painter, rect);

        if physics_moving || response.dragged() || scene.animating {
            ui.ctx().request_repaint();
        }
    }

    fn draw_legend(painter: &Painter, rect: Rect) {
        const ENTRIES: [NodeKind; 5] = [
            NodeKind::Policy,
            NodeKind::Concept,
            NodeKind::Mechanism,
            NodeKind::Right,
            NodeKind::Risk,
        ];

        let origin = rect.left_bottom() + vec2(12.0, -(ENTRIES.len() as f32 * 16.0) - 12.0);
        for (index, kind) in ENTRIES.iter().enumerate() {
            let y = origin.y + (index as f32 * 16.0);
            painter.circle_filled(egui::pos2(origin.x, y), 4.0, kind_color(*kind));
            painter.text(
                egui::pos2(origin.x + 10.0, y),
                Align2::LEFT_CENTER,
                kind.label(),
                FontId::proportional(11.0),
                Color32::from_gray(200),
            );
        }
    }

    /// Tooltip strip for the hovered item; suppressed while a detail
    /// selection is open.
    fn draw_hover_panel(&self, painter: &Painter, rect: Rect) {
        if self.selected.is_some() {
            return;
        }

        let text = match self.hovered {
            Some(GraphItem::Node(slot)) => self.model.nodes.get(slot).map(|node| {
                format!(
                    "{}  |  {}  |  {} links",
                    ellipsize(&node.label, 40),
                    node.kind.label(),
                    self.model.degree(slot)
                )
            }),
            Some(GraphItem::Edge(index)) => self.model.edges.get(index).map(|edge| {
                format!(
                    "{} connection  |  {}",
                    edge.kind.label(),
                    ellipsize(edge.description.as_deref().unwrap_or("no description"), 60)
                )
            }),
            None => None,
        };

        if let Some(text) = text {
            painter.text(
                rect.left_top() + vec2(10.0, 10.0),
                Align2::LEFT_TOP,
                text,
                FontId::proportional(13.0),
                Color32::from_gray(240),
            );
        }
    }
}
