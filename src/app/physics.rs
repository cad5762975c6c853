use std::f32::consts::TAU;

use eframe::egui::{Vec2, vec2};

use crate::model::{EdgeKind, GraphModel};

use super::territory::{NodeClass, TerritoryState};
use super::{PhysicsConfig, RenderArena, SimState};

const MIN_DISTANCE: f32 = 0.01;
const REPULSION_SCALE: f32 = 400.0;
const REPULSION_SOFTENING: f32 = 600.0;
const LINK_DISTANCE: f32 = 60.0;
const LINK_STIFFNESS: f32 = 0.06;
const CENTER_PULL: f32 = 0.012;
const RADIAL_RADIUS: f32 = 200.0;
const RADIAL_STRENGTH: f32 = 0.05;
const COLLISION_DISTANCE: f32 = 70.0;
const COLLISION_STRENGTH: f32 = 0.9;
const ANCHOR_CENTER_STRENGTH: f32 = 1.0;
const ANCHOR_RING_RADIUS: f32 = 80.0;
const ANCHOR_RING_STRENGTH: f32 = 0.6;
const DAMPING: f32 = 0.6;
const MAX_FORCE: f32 = 240.0;
const MAX_SPEED: f32 = 26.0;
const SLEEP_SPEED_SQ: f32 = 0.02 * 0.02;
const SLEEP_FORCE_SQ: f32 = 0.08 * 0.08;

const ALPHA_MIN: f32 = 0.005;
const ALPHA_DECAY: f32 = 0.028;
const REHEAT_ALPHA: f32 = 0.3;
const DRAG_ALPHA_TARGET: f32 = 0.3;

impl SimState {
    pub(super) fn new() -> Self {
        Self {
            alpha: 1.0,
            alpha_target: 0.0,
        }
    }

    /// Warms the decay parameter so positions keep evolving smoothly after a
    /// reconfiguration. Never touches positions.
    pub(super) fn reheat(&mut self) {
        self.alpha = self.alpha.max(REHEAT_ALPHA);
    }

    pub(super) fn set_dragging(&mut self, dragging: bool) {
        self.alpha_target = if dragging { DRAG_ALPHA_TARGET } else { 0.0 };
        if dragging {
            self.alpha = self.alpha.max(DRAG_ALPHA_TARGET);
        }
    }

    fn advance(&mut self) -> bool {
        if self.alpha < ALPHA_MIN && self.alpha_target < ALPHA_MIN {
            return false;
        }
        self.alpha += (self.alpha_target - self.alpha) * ALPHA_DECAY;
        true
    }
}

/// Direction and squared distance between two bodies, with a deterministic
/// fallback direction when they coincide.
fn separation(a: Vec2, b: Vec2, i: usize, j: usize) -> (Vec2, f32) {
    let delta = a - b;
    let distance_sq = delta.length_sq();
    if distance_sq > MIN_DISTANCE * MIN_DISTANCE {
        (delta / distance_sq.sqrt(), distance_sq)
    } else {
        let angle = ((i as f32) * 0.618_034 + (j as f32) * 0.414_214) * TAU;
        (vec2(angle.cos(), angle.sin()), MIN_DISTANCE * MIN_DISTANCE)
    }
}

fn fallback_position(slot: usize) -> Vec2 {
    let angle = ((slot as f32) * 0.618_034 + 0.11) * TAU;
    vec2(angle.cos(), angle.sin()) * RADIAL_RADIUS
}

/// One integration step. Pinned bodies are boundary conditions: they exert
/// forces but are excluded from integration. Returns whether anything is
/// still in motion (callers schedule repaints off this).
pub(super) fn step_physics(
    model: &GraphModel,
    arena: &mut RenderArena,
    territory: &TerritoryState,
    sim: &mut SimState,
    config: PhysicsConfig,
) -> bool {
    let node_count = arena.bodies.len();
    if node_count == 0 || !sim.advance() {
        return false;
    }

    let alpha = sim.alpha;
    let time_step_scale = (config.delta_seconds * 60.0).clamp(0.25, 3.0);

    for body in &mut arena.bodies {
        if let Some(pin) = body.pin {
            body.world_pos = pin;
            body.velocity = Vec2::ZERO;
        }
    }

    let mut forces = vec![Vec2::ZERO; node_count];

    // charge repulsion and collision separation share one pair sweep
    for i in 0..node_count {
        for j in (i + 1)..node_count {
            let (direction, distance_sq) =
                separation(arena.bodies[i].world_pos, arena.bodies[j].world_pos, i, j);

            let repulsion = config.repulsion_strength * REPULSION_SCALE
                / (distance_sq + REPULSION_SOFTENING);
            let mut push = direction * repulsion;

            let distance = distance_sq.sqrt();
            if distance < COLLISION_DISTANCE {
                push += direction * ((COLLISION_DISTANCE - distance) * COLLISION_STRENGTH);
            }

            forces[i] += push;
            forces[j] -= push;
        }
    }

    // link springs; tension edges rest longer than the default
    for edge in &model.edges {
        if edge.source >= node_count || edge.target >= node_count || edge.source == edge.target {
            continue;
        }

        let (direction, distance_sq) = separation(
            arena.bodies[edge.source].world_pos,
            arena.bodies[edge.target].world_pos,
            edge.source,
            edge.target,
        );
        let rest = if edge.kind == EdgeKind::Tension {
            config.tension_distance
        } else {
            LINK_DISTANCE
        };
        let correction = direction * ((distance_sq.sqrt() - rest) * LINK_STIFFNESS);
        forces[edge.source] -= correction;
        forces[edge.target] += correction;
    }

    // weak pull to the origin keeps the layout from drifting
    for (slot, force) in forces.iter_mut().enumerate() {
        *force -= arena.bodies[slot].world_pos * CENTER_PULL;
    }

    // nodes with no edges get pulled to a containment ring
    for slot in model.disconnected_slots() {
        let Some(body) = arena.bodies.get(slot) else {
            continue;
        };
        let radius = body.world_pos.length();
        if radius > MIN_DISTANCE {
            let direction = body.world_pos / radius;
            forces[slot] -= direction * ((radius - RADIAL_RADIUS) * RADIAL_STRENGTH);
        }
    }

    if territory.is_active() {
        for (slot, force) in forces.iter_mut().enumerate() {
            let position = arena.bodies[slot].world_pos;
            match territory.class_of(slot) {
                NodeClass::Center => {
                    *force -= position * ANCHOR_CENTER_STRENGTH;
                }
                NodeClass::Territory => {
                    let radius = position.length();
                    let direction = if radius > MIN_DISTANCE {
                        position / radius
                    } else {
                        let angle = ((slot as f32) * 0.618_034 + 0.37) * TAU;
                        vec2(angle.cos(), angle.sin())
                    };
                    *force -= direction * ((radius - ANCHOR_RING_RADIUS) * ANCHOR_RING_STRENGTH);
                }
                NodeClass::Independent | NodeClass::Default => {}
            }
        }
    }

    let mut any_motion = false;
    for (slot, body) in arena.bodies.iter_mut().enumerate() {
        if body.pin.is_some() {
            continue;
        }

        let mut force = forces[slot];
        let force_sq = force.length_sq();
        if force_sq > MAX_FORCE * MAX_FORCE {
            force *= MAX_FORCE / force_sq.sqrt();
        }

        let mut velocity =
            (body.velocity + force * (alpha * time_step_scale)) * DAMPING.powf(time_step_scale);
        let mut speed_sq = velocity.length_sq();
        if speed_sq > MAX_SPEED * MAX_SPEED {
            velocity *= MAX_SPEED / speed_sq.sqrt();
            speed_sq = MAX_SPEED * MAX_SPEED;
        }
        if speed_sq < SLEEP_SPEED_SQ && force_sq < SLEEP_FORCE_SQ {
            velocity = Vec2::ZERO;
            speed_sq = 0.0;
        }

        body.velocity = velocity;
        body.world_pos += velocity * time_step_scale;

        if !body.world_pos.x.is_finite() || !body.world_pos.y.is_finite() {
            body.world_pos = fallback_position(slot);
            body.velocity = Vec2::ZERO;
        }

        if speed_sq > 0.000_001 {
            any_motion = true;
        }
    }

    any_motion || sim.alpha >= ALPHA_MIN
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::parse_dataset;

    fn config() -> PhysicsConfig {
        PhysicsConfig {
            repulsion_strength: 150.0,
            tension_distance: 100.0,
            delta_seconds: 1.0 / 60.0,
        }
    }

    fn pair_model() -> GraphModel {
        GraphModel::from_dataset(
            &parse_dataset(
                r#"{
                    "nodes": [
                        {"id": "a", "type": "policy"},
                        {"id": "b", "type": "concept"}
                    ],
                    "edges": [{"from": "a", "to": "b", "type": "reinforcing"}]
                }"#,
            )
            .unwrap(),
        )
    }

    #[test]
    fn pinned_bodies_stay_exactly_at_their_pin() {
        let model = pair_model();
        let mut arena = RenderArena::from_model(&model);
        let mut sim = SimState::new();
        let territory = TerritoryState::new(model.node_count());

        let pin = vec2(40.0, -25.0);
        arena.bodies[0].pin = Some(pin);

        let before_free = arena.bodies[1].world_pos;
        for _ in 0..10 {
            step_physics(&model, &mut arena, &territory, &mut sim, config());
        }

        assert_eq!(arena.bodies[0].world_pos, pin);
        assert!((arena.bodies[1].world_pos - before_free).length() > 0.1);
    }

    #[test]
    fn unpinning_restores_free_motion_on_the_next_tick() {
        let model = pair_model();
        let mut arena = RenderArena::from_model(&model);
        let mut sim = SimState::new();
        let territory = TerritoryState::new(model.node_count());

        // hold both bodies close so forces are strong once released
        arena.bodies[0].pin = Some(vec2(0.0, 0.0));
        arena.bodies[1].pin = Some(vec2(5.0, 0.0));
        step_physics(&model, &mut arena, &territory, &mut sim, config());

        arena.bodies[0].pin = None;
        sim.reheat();
        step_physics(&model, &mut arena, &territory, &mut sim, config());

        assert!((arena.bodies[0].world_pos - vec2(0.0, 0.0)).length() > 0.01);
        assert_eq!(arena.bodies[1].world_pos, vec2(5.0, 0.0));
    }

    #[test]
    fn coincident_bodies_separate_without_producing_non_finite_positions() {
        let model = pair_model();
        let mut arena = RenderArena::from_model(&model);
        let mut sim = SimState::new();
        let territory = TerritoryState::new(model.node_count());

        for body in &mut arena.bodies {
            body.world_pos = Vec2::ZERO;
            body.velocity = Vec2::ZERO;
        }

        for _ in 0..50 {
            step_physics(&model, &mut arena, &territory, &mut sim, config());
            for body in &arena.bodies {
                assert!(body.world_pos.x.is_finite() && body.world_pos.y.is_finite());
            }
        }

        let gap = (arena.bodies[0].world_pos - arena.bodies[1].world_pos).length();
        assert!(gap > 1.0, "coincident bodies should push apart, gap {gap}");
    }

    #[test]
    fn reconfiguration_never_moves_bodies_within_the_same_tick() {
        let model = pair_model();
        let mut arena = RenderArena::from_model(&model);
        let mut sim = SimState::new();
        let territory = TerritoryState::new(model.node_count());

        step_physics(&model, &mut arena, &territory, &mut sim, config());
        let snapshot = arena
            .bodies
            .iter()
            .map(|body| body.world_pos)
            .collect::<Vec<_>>();

        // a slider change re-heats the sim but positions only move on ticks
        sim.reheat();
        for (body, position) in arena.bodies.iter().zip(&snapshot) {
            assert_eq!(body.world_pos, *position);
        }

        // the next tick under the new strength stays within the speed clamp
        let stronger = PhysicsConfig {
            repulsion_strength: 600.0,
            ..config()
        };
        step_physics(&model, &mut arena, &territory, &mut sim, stronger);
        let max_step = MAX_SPEED * 3.0;
        for (body, position) in arena.bodies.iter().zip(&snapshot) {
            let moved = (body.world_pos - *position).length();
            assert!(moved <= max_step, "discontinuous jump of {moved}");
        }
    }

    #[test]
    fn simulation_decays_to_sleep_and_reheat_wakes_it() {
        let model = pair_model();
        let mut arena = RenderArena::from_model(&model);
        let mut sim = SimState::new();
        let territory = TerritoryState::new(model.node_count());

        let mut slept = false;
        for _ in 0..600 {
            if !step_physics(&model, &mut arena, &territory, &mut sim, config()) {
                slept = true;
                break;
            }
        }
        assert!(slept, "simulation should converge below the energy threshold");

        sim.reheat();
        assert!(step_physics(&model, &mut arena, &territory, &mut sim, config()));
    }

    #[test]
    fn territory_anchor_pulls_the_center_toward_the_origin() {
        let model = pair_model();
        let mut arena = RenderArena::from_model(&model);
        let mut sim = SimState::new();
        let mut territory = TerritoryState::new(model.node_count());
        territory.set_center(Some(0), &model);

        arena.bodies[0].world_pos = vec2(1000.0, 0.0);
        arena.bodies[0].velocity = Vec2::ZERO;

        for _ in 0..20 {
            step_physics(&model, &mut arena, &territory, &mut sim, config());
        }

        assert!(arena.bodies[0].world_pos.length() < 900.0);
    }

    #[test]
    fn drag_target_keeps_the_simulation_warm_until_released() {
        let mut sim = SimState::new();
        sim.alpha = 0.001;
        sim.set_dragging(true);
        assert!(sim.alpha >= DRAG_ALPHA_TARGET);

        // while dragging, alpha holds near the target instead of decaying out
        for _ in 0..200 {
            sim.advance();
        }
        assert!(sim.alpha >= DRAG_ALPHA_TARGET * 0.9);

        sim.set_dragging(false);
        for _ in 0..600 {
            sim.advance();
        }
        assert!(sim.alpha < ALPHA_MIN);
    }
}
