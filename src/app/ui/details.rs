use eframe::egui::{RichText, Ui};

use crate::model::NodeKind;
use crate::util::ellipsize;

use super::super::territory::NodeClass;
use super::super::{GraphItem, ViewModel};

impl ViewModel {
    pub(in crate::app) fn draw_details(&mut self, ui: &mut Ui) {
        ui.heading("Selection Details");
        ui.add_space(6.0);

        match self.selected {
            Some(GraphItem::Node(slot)) => self.draw_node_details(ui, slot),
            Some(GraphItem::Edge(index)) => self.draw_edge_details(ui, index),
            None => {
                ui.label("Click a node or edge in the graph.");
            }
        }
    }

    fn draw_node_details(&mut self, ui: &mut Ui, slot: usize) {
        let Some(node) = self.model.nodes.get(slot) else {
            ui.label("Selected node no longer exists in the graph.");
            return;
        };

        let label = node.label.clone();
        let id = node.id.clone();
        let kind = node.kind;
        let inferred_centrality = node.inferred_centrality.clone();
        let degree = self.model.degree(slot);
        let pinned = self
            .arena
            .bodies
            .get(slot)
            .is_some_and(|body| body.pin.is_some());

        ui.label(RichText::new(label).strong());
        ui.small(id);
        ui.add_space(6.0);

        ui.label(format!("Type: {}", kind.label()));
        ui.label(format!("Connections: {degree}"));
        if let Some(inferred_centrality) = inferred_centrality {
            ui.label(format!("Inferred centrality: \"{inferred_centrality}\""));
        }
        if pinned {
            ui.label("Held in place");
        }
        if self.territory.is_active() {
            let class = match self.territory.class_of(slot) {
                NodeClass::Center => "center",
                NodeClass::Territory => "territory",
                NodeClass::Independent => "independent",
                NodeClass::Default => "default",
            };
            ui.label(format!("Territorial state: {class}"));
        }

        if kind != NodeKind::Analyst {
            ui.separator();
            ui.label(RichText::new("Power check (territorialization)").strong());
            ui.small(
                "Turn this node into a magnet to test its influence. Nodes that move toward \
                 it are part of its territory; nodes that hold still are independent.",
            );
            ui.add_space(4.0);

            let is_active_center = self.territory.center() == Some(slot);
            let button_text = if is_active_center {
                "Stop territorializing"
            } else {
                "Simulate territorialization"
            };
            if ui.button(button_text).clicked() {
                self.toggle_territorialization(slot);
                self.selected = None;
            }
        }
    }

    fn draw_edge_details(&mut self, ui: &mut Ui, index: usize) {
        let Some(edge) = self.model.edges.get(index) else {
            ui.label("Selected edge no longer exists in the graph.");
            return;
        };

        ui.label(RichText::new(format!("{} connection", edge.kind.label())).strong());
        if let (Some(source), Some(target)) = (
            self.model.nodes.get(edge.source),
            self.model.nodes.get(edge.target),
        ) {
            ui.small(format!(
                "{} -> {}",
                ellipsize(&source.label, 26),
                ellipsize(&target.label, 26)
            ));
        }
        ui.add_space(6.0);

        ui.label(format!(
            "\"{}\"",
            edge.description
                .as_deref()
                .unwrap_or("No description available.")
        ));

        ui.separator();
        match edge.weight {
            Some(weight) => ui.label(format!("Force weight: {weight:.2}")),
            None => ui.label("Force weight: standard"),
        };
    }
}
