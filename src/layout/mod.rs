//! Force-directed layout over a [`GraphStore`].
//!
//! The integration follows the classic verlet force layout: links, gravity
//! and charge adjust positions (charge through the previous position), then
//! each body keeps `friction` of its velocity. After integration the current
//! root node drifts toward a fixed anchor point.

mod charge;
mod forces;
mod frame;
mod quadtree;

use eframe::egui::{Vec2, vec2};

use crate::graph::{GraphStore, NodeId};
use crate::util::stable_pair;

pub use charge::ChargeController;
pub use frame::{EdgeFrame, Frame, NodeFrame};
pub use quadtree::QuadtreeCell;

use forces::charge_impulse;
use quadtree::ChargeTree;

/// Tunables for [`LayoutEngine`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayoutConfig {
    pub width: f32,
    pub height: f32,
    pub charge: f32,
    pub charge_step: f32,
    pub anchor_smoothing: f32,
    /// Anchor position as a fraction of the viewport.
    pub anchor_fraction: Vec2,
    pub gravity: f32,
    pub friction: f32,
    pub theta: f32,
    pub link_strength: f32,
    pub initial_alpha: f32,
    pub alpha_decay: f32,
    pub alpha_min: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            width: 1400.0,
            height: 1000.0,
            charge: -100.0,
            charge_step: 10.0,
            anchor_smoothing: 0.65,
            anchor_fraction: vec2(1.0 / 5.0, 1.0 / 10.0),
            gravity: 0.1,
            friction: 0.9,
            theta: 0.8,
            link_strength: 1.0,
            initial_alpha: 0.1,
            alpha_decay: 0.99,
            alpha_min: 0.005,
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct Body {
    position: Vec2,
    previous: Vec2,
    pinned: bool,
}

pub struct LayoutEngine {
    config: LayoutConfig,
    charge: f32,
    alpha: f32,
    bodies: Vec<Body>,
    scratch: Vec<Vec2>,
    ticks: u64,
}

impl LayoutEngine {
    pub fn new(config: LayoutConfig) -> Self {
        Self {
            charge: config.charge,
            config,
            alpha: 0.0,
            bodies: Vec::new(),
            scratch: Vec::new(),
            ticks: 0,
        }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    pub fn charge(&self) -> f32 {
        self.charge
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    pub fn is_running(&self) -> bool {
        self.alpha > 0.0
    }

    /// Lowers the repulsion charge. Values above the current charge are
    /// ignored so the charge never increases during a session.
    pub(crate) fn lower_charge(&mut self, charge: f32) {
        if charge > self.charge {
            tracing::warn!(current = self.charge, requested = charge, "refusing to raise charge");
            return;
        }
        self.charge = charge;
    }

    pub fn anchor_target(&self) -> Vec2 {
        vec2(
            self.config.width * self.config.anchor_fraction.x,
            self.config.height * self.config.anchor_fraction.y,
        )
    }

    pub fn position(&self, id: NodeId) -> Option<Vec2> {
        self.bodies.get(id.index()).map(|body| body.position)
    }

    pub fn materialized_count(&self) -> usize {
        self.bodies.len()
    }

    /// Gives every node added since the last start a body and reheats the
    /// simulation.
    pub fn start(&mut self, graph: &GraphStore) {
        let existing = self.bodies.len();
        let node_count = graph.node_count();
        if node_count > existing {
            let mut neighbours = vec![Vec::new(); node_count];
            for edge in graph.edges() {
                neighbours[edge.source.index()].push(edge.target.index());
                neighbours[edge.target.index()].push(edge.source.index());
            }

            for index in existing..node_count {
                let name = &graph.nodes()[index].name;
                let position = self.initial_position(name, &neighbours[index]);
                self.bodies.push(Body {
                    position,
                    previous: position,
                    pinned: false,
                });
            }
            tracing::debug!(added = node_count - existing, total = node_count, "materialized bodies");
        }
        self.resume();
    }

    pub fn resume(&mut self) {
        self.alpha = self.config.initial_alpha;
    }

    fn initial_position(&self, name: &str, neighbours: &[usize]) -> Vec2 {
        let (jx, jy) = stable_pair(name);
        if let Some(body) = neighbours.iter().find_map(|&other| self.bodies.get(other)) {
            return body.position + vec2(jx, jy) * 5.0;
        }
        vec2(
            (jx + 1.0) * 0.5 * self.config.width,
            (jy + 1.0) * 0.5 * self.config.height,
        )
    }

    /// Holds a node at `position` until released and keeps the simulation
    /// warm while it is moved.
    pub fn pin(&mut self, id: NodeId, position: Vec2) {
        if let Some(body) = self.bodies.get_mut(id.index()) {
            body.pinned = true;
            body.position = position;
            body.previous = position;
            self.alpha = self.alpha.max(self.config.initial_alpha);
        }
    }

    pub fn release(&mut self, id: NodeId) {
        if let Some(body) = self.bodies.get_mut(id.index()) {
            body.pinned = false;
        }
    }

    /// Advances the simulation one tick. Returns whether it is still running.
    pub fn step(&mut self, graph: &GraphStore) -> bool {
        if self.alpha <= 0.0 {
            return false;
        }

        self.alpha *= self.config.alpha_decay;
        if self.alpha < self.config.alpha_min {
            self.alpha = 0.0;
            tracing::debug!(ticks = self.ticks, "layout settled");
            return false;
        }

        let body_count = self.bodies.len().min(graph.node_count());
        if body_count == 0 {
            return true;
        }

        self.apply_links(graph, body_count);
        self.apply_gravity(body_count);
        self.apply_charge(body_count);
        self.integrate(body_count);
        self.drift_root_to_anchor(graph);

        self.ticks += 1;
        true
    }

    fn apply_links(&mut self, graph: &GraphStore, body_count: usize) {
        let degrees = graph.degrees();
        let strength = self.alpha * self.config.link_strength;

        for &edge in graph.edges() {
            let (source, target) = (edge.source.index(), edge.target.index());
            if source >= body_count || target >= body_count {
                continue;
            }

            let delta = self.bodies[target].position - self.bodies[source].position;
            let distance_sq = delta.length_sq();
            if distance_sq <= 0.0 {
                continue;
            }
            let distance = distance_sq.sqrt();
            let correction = delta * (strength * (distance - graph.link_distance(edge)) / distance);

            let total_weight = degrees[source] + degrees[target];
            let share = if total_weight > 0 {
                degrees[source] as f32 / total_weight as f32
            } else {
                0.5
            };

            self.bodies[target].position -= correction * share;
            self.bodies[source].position += correction * (1.0 - share);
        }
    }

    fn apply_gravity(&mut self, body_count: usize) {
        let k = self.alpha * self.config.gravity;
        if k == 0.0 {
            return;
        }
        let center = vec2(self.config.width * 0.5, self.config.height * 0.5);
        for body in &mut self.bodies[..body_count] {
            body.position += (center - body.position) * k;
        }
    }

    fn apply_charge(&mut self, body_count: usize) {
        let strength = self.alpha * self.charge;
        if strength == 0.0 || body_count < 2 {
            return;
        }

        self.scratch.clear();
        self.scratch
            .extend(self.bodies[..body_count].iter().map(|body| body.position));
        let Some(tree) = ChargeTree::build(&self.scratch) else {
            return;
        };

        for index in 0..body_count {
            if self.bodies[index].pinned {
                continue;
            }
            self.bodies[index].previous +=
                charge_impulse(&tree, index, &self.scratch, strength, self.config.theta);
        }
    }

    fn integrate(&mut self, body_count: usize) {
        let friction = self.config.friction;
        for body in &mut self.bodies[..body_count] {
            if body.pinned {
                body.position = body.previous;
                continue;
            }
            let previous = body.previous;
            body.previous = body.position;
            body.position -= (previous - body.position) * friction;
        }
    }

    fn drift_root_to_anchor(&mut self, graph: &GraphStore) {
        let target = self.anchor_target();
        let k = self.config.anchor_smoothing;
        let Some(body) = graph
            .root()
            .and_then(|root| self.bodies.get_mut(root.index()))
        else {
            return;
        };
        if body.pinned {
            return;
        }
        body.position += (target - body.position) * k;
    }

    /// Ticks until the layout settles or `max_ticks` is reached; returns the
    /// number of ticks that ran.
    pub fn run_until_settled(&mut self, graph: &GraphStore, max_ticks: usize) -> usize {
        let mut ran = 0;
        while ran < max_ticks && self.step(graph) {
            ran += 1;
        }
        ran
    }

    pub fn frame(&self, graph: &GraphStore) -> Frame {
        Frame::capture(self, graph)
    }

    pub fn quadtree_cells(&self, cells: &mut Vec<QuadtreeCell>) {
        cells.clear();
        let positions = self.bodies.iter().map(|body| body.position).collect::<Vec<_>>();
        if let Some(tree) = ChargeTree::build(&positions) {
            tree.collect_cells(cells);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain(names: &[&str]) -> GraphStore {
        let mut store = GraphStore::new();
        for name in names {
            store.add_node(*name);
        }
        for pair in names.windows(2) {
            store.add_edge(pair[0], pair[1]).unwrap();
        }
        store
    }

    fn spread(engine: &LayoutEngine, store: &GraphStore) -> f32 {
        let positions = store
            .node_ids()
            .filter_map(|id| engine.position(id))
            .collect::<Vec<_>>();
        let mut total = 0.0;
        for (index, a) in positions.iter().enumerate() {
            for b in &positions[index + 1..] {
                total += (*a - *b).length();
            }
        }
        total
    }

    #[test]
    fn positions_are_undefined_until_started() {
        let store = chain(&["a", "b"]);
        let mut engine = LayoutEngine::new(LayoutConfig::default());

        assert!(engine.position(store.peek("a").unwrap()).is_none());
        assert!(!engine.step(&store));

        engine.start(&store);
        assert!(store.node_ids().all(|id| engine.position(id).is_some()));
        assert!(engine.is_running());
    }

    #[test]
    fn simulation_cools_and_stops() {
        let store = chain(&["a", "b", "c"]);
        let mut engine = LayoutEngine::new(LayoutConfig::default());
        engine.start(&store);

        let ticks = engine.run_until_settled(&store, 10_000);

        // 0.1 * 0.99^n first drops below 0.005 around n = 299.
        assert!((290..=305).contains(&ticks), "ran {ticks} ticks");
        assert!(!engine.is_running());
        assert_eq!(engine.alpha(), 0.0);
    }

    #[test]
    fn root_is_pulled_to_anchor() {
        let store = chain(&["a", "b", "c", "d"]);
        let mut engine = LayoutEngine::new(LayoutConfig::default());
        engine.start(&store);
        engine.run_until_settled(&store, 10_000);

        let root = store.root().unwrap();
        let distance = (engine.position(root).unwrap() - engine.anchor_target()).length();
        assert!(distance < 60.0, "root settled {distance} away from anchor");
    }

    #[test]
    fn root_covers_fixed_share_of_distance_to_anchor() {
        let store = chain(&["a", "b"]);
        let mut engine = LayoutEngine::new(LayoutConfig::default());
        engine.start(&store);

        let root = store.root().unwrap().index();
        let old = vec2(900.0, 700.0);
        engine.bodies[root].position = old;
        engine.drift_root_to_anchor(&store);

        let expected = old + (vec2(280.0, 100.0) - old) * 0.65;
        let moved = engine.bodies[root].position;
        assert!((moved - expected).length() < 1e-3, "root moved to {moved:?}");
    }

    #[test]
    fn pinned_root_ignores_anchor() {
        let store = chain(&["a", "b"]);
        let mut engine = LayoutEngine::new(LayoutConfig::default());
        engine.start(&store);

        let root = store.root().unwrap();
        engine.pin(root, vec2(900.0, 700.0));
        engine.drift_root_to_anchor(&store);

        assert_eq!(engine.position(root), Some(vec2(900.0, 700.0)));
    }

    #[test]
    fn anchor_target_is_a_fifth_across_and_a_tenth_down() {
        let engine = LayoutEngine::new(LayoutConfig::default());
        assert_eq!(engine.anchor_target(), vec2(280.0, 100.0));
    }

    #[test]
    fn more_negative_charge_spreads_nodes_further() {
        let store = chain(&["a", "b", "c", "d", "e", "f"]);

        let mut weak = LayoutEngine::new(LayoutConfig::default());
        weak.start(&store);
        weak.run_until_settled(&store, 10_000);

        let mut strong = LayoutEngine::new(LayoutConfig {
            charge: -400.0,
            ..LayoutConfig::default()
        });
        strong.start(&store);
        strong.run_until_settled(&store, 10_000);

        assert!(spread(&strong, &store) > spread(&weak, &store));
    }

    #[test]
    fn charge_never_rises() {
        let mut engine = LayoutEngine::new(LayoutConfig::default());
        engine.lower_charge(-120.0);
        engine.lower_charge(-50.0);
        assert_eq!(engine.charge(), -120.0);
    }

    #[test]
    fn pinned_node_holds_position() {
        let store = chain(&["a", "b", "c"]);
        let mut engine = LayoutEngine::new(LayoutConfig::default());
        engine.start(&store);

        let pinned = store.peek("a").unwrap();
        engine.pin(pinned, vec2(600.0, 400.0));
        for _ in 0..50 {
            engine.step(&store);
        }
        assert_eq!(engine.position(pinned), Some(vec2(600.0, 400.0)));

        engine.release(pinned);
        engine.step(&store);
        assert_ne!(engine.position(pinned), Some(vec2(600.0, 400.0)));
    }

    #[test]
    fn late_nodes_start_next_to_a_placed_neighbour() {
        let mut store = chain(&["a", "b"]);
        let mut engine = LayoutEngine::new(LayoutConfig::default());
        engine.start(&store);
        engine.run_until_settled(&store, 10_000);

        store.add_node("c");
        store.add_edge("b", "c").unwrap();
        let before = engine.position(store.peek("b").unwrap()).unwrap();
        engine.start(&store);

        let placed = engine.position(store.peek("c").unwrap()).unwrap();
        assert!((placed - before).length() <= 5.0 * 2.0_f32.sqrt() + 1e-3);
        assert_eq!(engine.materialized_count(), 3);
    }
}
