use eframe::egui::{self, Ui};

use super::super::ViewModel;

impl ViewModel {
    pub(in crate::app) fn draw_controls(&mut self, ui: &mut Ui) {
        ui.heading("Graph Controls");
        ui.separator();
        ui.add_space(4.0);

        ui.label("Search nodes")
            .on_hover_text("Fuzzy-highlight matching nodes without changing the graph.");
        ui.text_edit_singleline(&mut self.search);

        ui.separator();

        ui.label("Visual layers");
        let mut prefs_changed = false;
        if ui
            .checkbox(&mut self.show_mediator, "Show analyst node")
            .on_hover_text(
                "The mediator draws translation lines to the core concepts of each policy, \
                 bridging systems that would otherwise stay disconnected.",
            )
            .changed()
        {
            self.graph_dirty = true;
            prefs_changed = true;
        }
        if ui
            .checkbox(&mut self.highlight_controversies, "Highlight controversies")
            .on_hover_text("Pulse tension edges; unticked fades them instead.")
            .changed()
        {
            prefs_changed = true;
        }

        ui.separator();

        ui.label("Simulation physics");
        let gravity_slider = ui
            .add(
                egui::Slider::new(&mut self.repulsion_strength, 50.0..=600.0)
                    .step_by(50.0)
                    .text("Gravity strength"),
            )
            .on_hover_text("Controls the repulsive force between nodes.");
        if gravity_slider.changed() {
            self.sim.reheat();
            prefs_changed = true;
        }

        let tension_slider = ui
            .add(
                egui::Slider::new(&mut self.tension_distance, 50.0..=300.0)
                    .step_by(10.0)
                    .text("Tension distance"),
            )
            .on_hover_text("Controls the rest length of tension edges.");
        if tension_slider.changed() {
            self.sim.reheat();
            prefs_changed = true;
        }

        ui.add_space(8.0);
        let reset_button = ui.add_enabled(
            self.territory.is_active(),
            egui::Button::new("Reset simulation"),
        );
        if reset_button.clicked() {
            self.territory.set_center(None, &self.model);
            self.sim.reheat();
        }

        ui.separator();
        ui.collapsing("How to read this", |ui| {
            ui.small(
                "Click a node to open its details, then run the territorialization test: \
                 a magnetic pull shows which actors are held in its orbit and which escape.",
            );
            ui.small(
                "Drag nodes to pin them under the pointer; release to hand them back to the \
                 simulation. Scroll to zoom, drag with the right mouse button to pan.",
            );
        });

        if prefs_changed {
            self.persist_physics();
        }
    }
}
