use std::collections::HashSet;
use std::f32::consts::TAU;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use eframe::egui::{self, Context, Rect, Vec2, vec2};

use crate::model::{GraphModel, MediatorPolicy, NodeKind, RawDataset, load_dataset};
use crate::util::stable_pair;

mod export;
mod graph;
mod interpret;
mod physics;
mod prefs;
mod render_utils;
mod scene;
mod territory;
mod ui;
mod viewport;

use interpret::{InterpretClient, Interpretation, LocalDigestClient};
use prefs::{JsonFileStore, MemoryStore, PreferenceStore};
use render_utils::node_radius;
use territory::TerritoryState;
use viewport::Viewport;

pub struct AppOptions {
    pub dataset_path: PathBuf,
    pub comparison_id: String,
    pub mediator_policy: MediatorPolicy,
    pub prefs_dir: Option<PathBuf>,
}

pub struct AssemblageApp {
    options: AppOptions,
    state: AppState,
    reload_rx: Option<Receiver<Result<RawDataset, String>>>,
}

enum AppState {
    Loading {
        rx: Receiver<Result<RawDataset, String>>,
    },
    Ready(Box<ViewModel>),
    Error(String),
}

struct ViewModel {
    comparison_id: String,
    mediator_policy: MediatorPolicy,
    dataset: RawDataset,
    model: GraphModel,
    arena: RenderArena,
    sim: SimState,
    territory: TerritoryState,
    viewport: Viewport,

    show_mediator: bool,
    highlight_controversies: bool,
    repulsion_strength: f32,
    tension_distance: f32,

    search: String,
    search_match_cache: Option<SearchMatchCache>,
    model_revision: u64,
    graph_dirty: bool,

    hovered: Option<GraphItem>,
    selected: Option<GraphItem>,
    dragged: Option<usize>,
    canvas_rect: Rect,

    store: Box<dyn PreferenceStore>,
    interpret_client: Arc<dyn InterpretClient>,
    interpret_rx: Option<Receiver<Result<Interpretation, String>>>,
    interpretation: Option<Interpretation>,
    show_interpretation: bool,
    export_rx: Option<Receiver<Result<PathBuf, String>>>,
    export_status: Option<String>,
    export_dir: PathBuf,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum GraphItem {
    Node(usize),
    Edge(usize),
}

struct SearchMatchCache {
    query: String,
    revision: u64,
    matches: Arc<HashSet<usize>>,
}

/// Simulation-owned bodies, slot-parallel with `GraphModel::nodes`.
struct RenderArena {
    bodies: Vec<Body>,
}

struct Body {
    world_pos: Vec2,
    velocity: Vec2,
    /// Interaction-owned override; the integrator treats the body as fixed
    /// while set.
    pin: Option<Vec2>,
    base_radius: f32,
}

struct SimState {
    alpha: f32,
    alpha_target: f32,
}

#[derive(Clone, Copy)]
struct PhysicsConfig {
    repulsion_strength: f32,
    tension_distance: f32,
    delta_seconds: f32,
}

const SPAWN_RADIUS: f32 = 180.0;

impl Body {
    fn seeded(id: &str, slot: usize, kind: NodeKind) -> Self {
        let (jx, jy) = stable_pair(id);
        let mut direction = vec2(jx, jy);
        if direction.length_sq() <= 0.0001 {
            let angle = ((slot as f32) * 0.618_034 + 0.11) * TAU;
            direction = vec2(angle.cos(), angle.sin());
        }

        let base_radius = node_radius(kind);
        Self {
            world_pos: direction * SPAWN_RADIUS,
            velocity: direction.normalized() * (1.15 + base_radius * 0.022),
            pin: None,
            base_radius,
        }
    }
}

impl RenderArena {
    fn from_model(model: &GraphModel) -> Self {
        let mut bodies = model
            .nodes
            .iter()
            .enumerate()
            .map(|(slot, node)| Body::seeded(&node.id, slot, node.kind))
            .collect::<Vec<_>>();

        // the mediator starts anchored to the viewport center
        if let Some(mediator) = model.mediator
            && let Some(body) = bodies.get_mut(mediator)
        {
            body.world_pos = Vec2::ZERO;
            body.velocity = Vec2::ZERO;
            body.pin = Some(Vec2::ZERO);
        }

        Self { bodies }
    }
}

impl AssemblageApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, options: AppOptions) -> Self {
        let state = Self::start_load(&options.dataset_path);
        Self {
            options,
            state,
            reload_rx: None,
        }
    }

    fn spawn_load(dataset_path: PathBuf) -> Receiver<Result<RawDataset, String>> {
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let result = load_dataset(&dataset_path).map_err(|error| format!("{error:#}"));
            let _ = tx.send(result);
        });

        rx
    }

    fn start_load(dataset_path: &PathBuf) -> AppState {
        AppState::Loading {
            rx: Self::spawn_load(dataset_path.clone()),
        }
    }

    fn open_store(options: &AppOptions) -> Box<dyn PreferenceStore> {
        let directory = options.prefs_dir.clone().or_else(prefs::default_store_dir);

        if let Some(directory) = directory {
            match JsonFileStore::open(&directory) {
                Ok(store) => return Box::new(store),
                Err(error) => {
                    tracing::warn!(%error, "falling back to in-memory preferences");
                }
            }
        }

        Box::new(MemoryStore::default())
    }

    fn ready_state(options: &AppOptions, dataset: RawDataset) -> AppState {
        AppState::Ready(Box::new(ViewModel::new(
            dataset,
            options,
            Self::open_store(options),
            Arc::new(LocalDigestClient),
        )))
    }
}

impl eframe::App for AssemblageApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        let mut transition = None;

        match &mut self.state {
            AppState::Loading { rx } => {
                if let Ok(result) = rx.try_recv() {
                    transition = Some(match result {
                        Ok(dataset) => Self::ready_state(&self.options, dataset),
                        Err(error) => AppState::Error(error),
                    });
                }

                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(120.0);
                        ui.heading("Loading assemblage network...");
                        ui.add_space(8.0);
                        ui.spinner();
                    });
                });
            }
            AppState::Error(error) => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.heading("Failed to load assemblage dataset");
                    ui.add_space(6.0);
                    ui.label(error.as_str());
                    ui.add_space(10.0);
                    if ui.button("Retry").clicked() {
                        transition = Some(Self::start_load(&self.options.dataset_path));
                    }
                });
            }
            AppState::Ready(model) => {
                let mut reload_requested = false;
                let is_reloading = self.reload_rx.is_some();
                model.show(ctx, &mut reload_requested, is_reloading);

                if reload_requested && self.reload_rx.is_none() {
                    self.reload_rx = Some(Self::spawn_load(self.options.dataset_path.clone()));
                }

                if let Some(rx) = self.reload_rx.take() {
                    match rx.try_recv() {
                        Ok(result) => {
                            transition = Some(match result {
                                Ok(dataset) => Self::ready_state(&self.options, dataset),
                                Err(error) => AppState::Error(error),
                            });
                        }
                        Err(TryRecvError::Empty) => {
                            self.reload_rx = Some(rx);
                        }
                        Err(TryRecvError::Disconnected) => {
                            transition = Some(AppState::Error(
                                "Background load worker disconnected".to_owned(),
                            ));
                        }
                    }
                }
            }
        }

        if let Some(next_state) = transition {
            self.reload_rx = None;
            self.state = next_state;
        }
    }
}
