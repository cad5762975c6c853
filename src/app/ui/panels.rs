use std::path::PathBuf;
use std::sync::Arc;
use std::sync::mpsc::TryRecvError;

use eframe::egui::{self, Align, Context, Layout, Pos2, Rect, pos2, vec2};

use crate::model::{GraphModel, RawDataset, inject_mediator};
use crate::util::ellipsize;

use super::super::export::spawn_export;
use super::super::interpret::{
    InterpretClient, InterpretRequest, interpretation_cache_key, spawn_interpret,
};
use super::super::prefs::{PreferenceStore, StoredPhysics, load_physics, save_physics};
use super::super::scene::{SceneStyle, build_scene};
use super::super::territory::TerritoryState;
use super::super::viewport::Viewport;
use super::super::{AppOptions, RenderArena, SimState, ViewModel};

impl ViewModel {
    pub(in crate::app) fn new(
        dataset: RawDataset,
        options: &AppOptions,
        store: Box<dyn PreferenceStore>,
        interpret_client: Arc<dyn InterpretClient>,
    ) -> Self {
        let stored = load_physics(store.as_ref(), &options.comparison_id);
        let cached_interpretation = store
            .get(&interpretation_cache_key(&options.comparison_id))
            .and_then(|raw| serde_json::from_str(&raw).ok());

        let mut model = GraphModel::from_dataset(&dataset);
        // an empty dataset stays empty so the canvas can say so
        if stored.show_mediator && !model.is_empty() {
            inject_mediator(&mut model, options.mediator_policy);
        }
        let arena = RenderArena::from_model(&model);
        let territory = TerritoryState::new(model.node_count());

        let export_dir = dirs::download_dir()
            .or_else(|| std::env::current_dir().ok())
            .unwrap_or_else(|| PathBuf::from("."));

        Self {
            comparison_id: options.comparison_id.clone(),
            mediator_policy: options.mediator_policy,
            dataset,
            model,
            arena,
            sim: SimState::new(),
            territory,
            viewport: Viewport::default(),
            show_mediator: stored.show_mediator,
            highlight_controversies: stored.highlight_controversies,
            repulsion_strength: stored.repulsion_strength,
            tension_distance: stored.tension_distance,
            search: String::new(),
            search_match_cache: None,
            model_revision: 0,
            graph_dirty: false,
            hovered: None,
            selected: None,
            dragged: None,
            canvas_rect: Rect::from_min_size(Pos2::ZERO, vec2(800.0, 500.0)),
            store,
            interpret_client,
            interpret_rx: None,
            interpretation: cached_interpretation,
            show_interpretation: false,
            export_rx: None,
            export_status: None,
            export_dir,
        }
    }

    pub(in crate::app) fn show(
        &mut self,
        ctx: &Context,
        reload_requested: &mut bool,
        is_loading: bool,
    ) {
        self.poll_workers();
        if self.graph_dirty {
            self.rebuild_model();
        }

        egui::TopBottomPanel::top("top_bar")
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("assemblage-scope");
                    ui.separator();
                    ui.label(format!("comparison: {}", self.comparison_id));
                    ui.label(format!("nodes: {}", self.model.node_count()));
                    ui.label(format!("edges: {}", self.model.edge_count()));
                    if self.model.dropped_edges > 0 {
                        ui.label(format!("dropped edges: {}", self.model.dropped_edges))
                            .on_hover_text(
                                "Edges referencing unknown node ids are dropped at load.",
                            );
                    }
                    if let Some(center) = self.territory.center()
                        && let Some(node) = self.model.nodes.get(center)
                    {
                        ui.label(format!(
                            "territorializing: {}",
                            ellipsize(&node.label, 24)
                        ));
                    }

                    if ui.button("-").on_hover_text("Zoom out").clicked() {
                        self.viewport.zoom_by(0.8);
                    }
                    if ui.button("Reset view").clicked() {
                        self.viewport.reset();
                    }
                    if ui.button("+").on_hover_text("Zoom in").clicked() {
                        self.viewport.zoom_by(1.2);
                    }

                    let can_export = self.export_rx.is_none() && !self.model.is_empty();
                    if ui
                        .add_enabled(can_export, egui::Button::new("Export PNG"))
                        .on_hover_text("Save the current frame as a watermarked snapshot.")
                        .clicked()
                    {
                        self.start_export();
                    }

                    let can_interpret = self.interpret_rx.is_none() && !self.model.is_empty();
                    if ui
                        .add_enabled(can_interpret, egui::Button::new("AI Explain"))
                        .on_hover_text("Ask the analysis collaborator for a reading of the graph.")
                        .clicked()
                    {
                        self.start_interpret();
                    }
                    if self.interpretation.is_some()
                        && !self.show_interpretation
                        && ui.button("Last analysis").clicked()
                    {
                        self.show_interpretation = true;
                    }

                    let reload_button =
                        ui.add_enabled(!is_loading, egui::Button::new("Reload dataset"));
                    if reload_button.clicked() {
                        *reload_requested = true;
                    }

                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        if let Some(status) = &self.export_status {
                            ui.label(status.as_str());
                        }
                    });
                });
            });

        egui::SidePanel::left("controls")
            .resizable(true)
            .default_width(330.0)
            .show(ctx, |ui| self.draw_controls(ui));

        egui::SidePanel::right("details")
            .resizable(true)
            .default_width(340.0)
            .show(ctx, |ui| self.draw_details(ui));

        egui::CentralPanel::default().show(ctx, |ui| {
            if is_loading {
                ui.vertical_centered(|ui| {
                    ui.add_space(120.0);
                    ui.heading("Reloading assemblage network...");
                    ui.add_space(8.0);
                    ui.spinner();
                });
            } else {
                self.draw_graph(ui);
            }
        });

        self.show_interpretation_window(ctx);
    }

    fn show_interpretation_window(&mut self, ctx: &Context) {
        if !self.show_interpretation {
            return;
        }
        let Some(interpretation) = self.interpretation.clone() else {
            self.show_interpretation = false;
            return;
        };

        let mut open = true;
        egui::Window::new(interpretation.title.as_str())
            .open(&mut open)
            .default_pos(pos2(120.0, 120.0))
            .default_width(380.0)
            .show(ctx, |ui| {
                ui.label(interpretation.analysis.as_str());
                ui.add_space(8.0);
                ui.small(
                    "Based on the node types and connection density observed in the current graph.",
                );
            });
        self.show_interpretation = open;
    }

    fn poll_workers(&mut self) {
        if let Some(rx) = self.interpret_rx.take() {
            match rx.try_recv() {
                Ok(Ok(interpretation)) => {
                    match serde_json::to_string(&interpretation) {
                        Ok(raw) => {
                            let key = interpretation_cache_key(&self.comparison_id);
                            if let Err(error) = self.store.set(&key, &raw) {
                                tracing::warn!(%error, "failed to cache interpretation");
                            }
                        }
                        Err(error) => {
                            tracing::warn!(%error, "failed to serialize interpretation")
                        }
                    }
                    self.interpretation = Some(interpretation);
                    self.show_interpretation = true;
                }
                Ok(Err(error)) => {
                    tracing::warn!(%error, "interpretation request failed");
                }
                Err(TryRecvError::Empty) => {
                    self.interpret_rx = Some(rx);
                }
                Err(TryRecvError::Disconnected) => {
                    tracing::warn!("interpretation worker disconnected");
                }
            }
        }

        if let Some(rx) = self.export_rx.take() {
            match rx.try_recv() {
                Ok(Ok(path)) => {
                    self.export_status = Some(format!("Saved {}", path.display()));
                }
                Ok(Err(error)) => {
                    tracing::warn!(%error, "snapshot export failed");
                }
                Err(TryRecvError::Empty) => {
                    self.export_rx = Some(rx);
                }
                Err(TryRecvError::Disconnected) => {
                    tracing::warn!("snapshot export worker disconnected");
                }
            }
        }
    }

    /// Snapshots the current frame and hands it to a worker; the simulation
    /// and any in-progress drag continue untouched.
    fn start_export(&mut self) {
        let size = self.canvas_rect.size();
        let rect = Rect::from_min_size(Pos2::ZERO, size);
        let scene = build_scene(
            &self.model,
            &self.arena,
            &self.territory,
            &self.viewport,
            rect,
            &SceneStyle::snapshot(self.highlight_controversies),
        );
        self.export_status = None;
        self.export_rx = Some(spawn_export(scene, size, self.export_dir.clone()));
    }

    /// Replacing the receiver makes the newest response the one that wins.
    fn start_interpret(&mut self) {
        let request = InterpretRequest::from_model(&self.model);
        self.interpret_rx = Some(spawn_interpret(Arc::clone(&self.interpret_client), request));
    }

    pub(in crate::app) fn toggle_territorialization(&mut self, slot: usize) {
        self.territory.toggle(slot, &self.model);
        self.sim.reheat();
    }

    pub(in crate::app) fn persist_physics(&mut self) {
        let stored = StoredPhysics {
            repulsion_strength: self.repulsion_strength,
            tension_distance: self.tension_distance,
            show_mediator: self.show_mediator,
            highlight_controversies: self.highlight_controversies,
        };
        save_physics(self.store.as_mut(), &self.comparison_id, stored);
    }
}
