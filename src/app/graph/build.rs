use std::collections::HashMap;

use eframe::egui::Vec2;

use crate::model::{GraphModel, inject_mediator};

use super::super::render_utils::node_radius;
use super::super::territory::TerritoryState;
use super::super::{Body, GraphItem, RenderArena, ViewModel};

impl ViewModel {
    /// Rebuilds the model and arena wholesale from the retained dataset
    /// (mediator toggle, policy change). Bodies that survive keep their
    /// position, velocity and pin; territorialization and node selection are
    /// re-applied by id.
    pub(in crate::app) fn rebuild_model(&mut self) {
        self.model_revision = self.model_revision.wrapping_add(1);
        self.search_match_cache = None;

        let center_id = self
            .territory
            .center()
            .and_then(|slot| self.model.nodes.get(slot))
            .map(|node| node.id.clone());
        let selected_node_id = match self.selected {
            Some(GraphItem::Node(slot)) => self.model.nodes.get(slot).map(|node| node.id.clone()),
            _ => None,
        };

        let mut next_model = GraphModel::from_dataset(&self.dataset);
        if self.show_mediator && !next_model.is_empty() {
            inject_mediator(&mut next_model, self.mediator_policy);
        }

        let mut prior_bodies = HashMap::new();
        for (slot, body) in std::mem::take(&mut self.arena.bodies).into_iter().enumerate() {
            if let Some(node) = self.model.nodes.get(slot) {
                prior_bodies.insert(node.id.clone(), body);
            }
        }

        let bodies = next_model
            .nodes
            .iter()
            .enumerate()
            .map(|(slot, node)| match prior_bodies.remove(&node.id) {
                Some(mut body) => {
                    body.base_radius = node_radius(node.kind);
                    body
                }
                None => {
                    let mut body = Body::seeded(&node.id, slot, node.kind);
                    if next_model.mediator == Some(slot) {
                        body.world_pos = Vec2::ZERO;
                        body.velocity = Vec2::ZERO;
                        body.pin = Some(Vec2::ZERO);
                    }
                    body
                }
            })
            .collect();

        self.model = next_model;
        self.arena = RenderArena { bodies };

        self.territory = TerritoryState::new(self.model.node_count());
        if let Some(center_id) = center_id
            && let Some(&slot) = self.model.index_by_id.get(&center_id)
        {
            self.territory.set_center(Some(slot), &self.model);
        }

        self.selected = selected_node_id
            .and_then(|id| self.model.index_by_id.get(&id).copied())
            .map(GraphItem::Node);
        self.hovered = None;
        self.dragged = None;

        self.sim.reheat();
        self.graph_dirty = false;
    }
}
