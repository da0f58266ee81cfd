//! Iterative force simulation for node layout.
//!
//! Velocity-Verlet style solver combining four forces per tick, applied in a
//! fixed order: pairwise repulsion (charge), centering, link attraction
//! toward a target distance, and an overlap-resolving collision constraint
//! relaxed over several passes. Cooling follows the usual alpha schedule:
//! alpha decays toward a target each tick and forces are scaled by it, so the
//! layout settles unless something (a drag) re-heats it.
//!
//! The engine only produces positions; rendering reads them each frame.

use crate::models::{GraphConfig, GraphLink, GraphNode, Vec2};

/// Initial placement: deterministic phyllotaxis spiral.
const INITIAL_RADIUS: f64 = 10.0;

/// Minimum alpha before a simulation is considered settled.
const ALPHA_MIN: f64 = 0.001;

/// Per-tick decay toward the alpha target (1 - ALPHA_MIN^(1/300)).
const ALPHA_DECAY: f64 = 0.022_760_624_484_7;

/// Velocity retained between ticks.
const VELOCITY_DECAY: f64 = 0.6;

/// Relaxation passes for the collision constraint each tick.
const COLLIDE_PASSES: usize = 3;

/// Charge strength is the configured repel force scaled by this coefficient.
const REPEL_COEFFICIENT: f64 = -100.0;

/// Fixed buffer added around every node's collision footprint.
const COLLISION_BUFFER: f64 = 20.0;

/// Visual radius of a node given its undirected degree.
pub fn node_radius(degree: usize) -> f64 {
    3.0 + (degree as f64).sqrt() * 2.0
}

/// Collision radius: an invisible buffer zone around the visual glyph.
pub fn collision_radius(degree: usize) -> f64 {
    node_radius(degree) * 3.0 + COLLISION_BUFFER
}

// ============================================================================
// Simulation
// ============================================================================

pub struct Simulation {
    nodes: Vec<GraphNode>,
    links: Vec<GraphLink>,
    /// Undirected degree per node, fixed at construction.
    degrees: Vec<usize>,
    alpha: f64,
    alpha_target: f64,
    charge_strength: f64,
    center_strength: f64,
    link_distance: f64,
}

impl Simulation {
    /// Seed a simulation from the selected neighborhood. Nodes are placed on
    /// a phyllotaxis spiral so identical inputs start from identical layouts.
    pub fn new(mut nodes: Vec<GraphNode>, links: Vec<GraphLink>, cfg: &GraphConfig) -> Self {
        let mut degrees = vec![0usize; nodes.len()];
        for link in &links {
            degrees[link.source] += 1;
            degrees[link.target] += 1;
        }

        let golden_angle = std::f64::consts::PI * (3.0 - 5.0_f64.sqrt());
        for (i, node) in nodes.iter_mut().enumerate() {
            let radius = INITIAL_RADIUS * (0.5 + i as f64).sqrt();
            let angle = i as f64 * golden_angle;
            node.position = Vec2::new(radius * angle.cos(), radius * angle.sin());
            node.velocity = Vec2::ZERO;
        }

        Simulation {
            nodes,
            links,
            degrees,
            alpha: 1.0,
            alpha_target: 0.0,
            charge_strength: REPEL_COEFFICIENT * cfg.repel_force,
            center_strength: cfg.center_force,
            link_distance: cfg.link_distance,
        }
    }

    pub fn nodes(&self) -> &[GraphNode] {
        &self.nodes
    }

    pub fn links(&self) -> &[GraphLink] {
        &self.links
    }

    pub fn degree(&self, index: usize) -> usize {
        self.degrees.get(index).copied().unwrap_or(0)
    }

    pub fn radius(&self, index: usize) -> f64 {
        node_radius(self.degree(index))
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.nodes.iter().position(|n| n.id == id)
    }

    /// Pin a node to a fixed position: forces stop moving it but it still
    /// repels and collides with everything else.
    pub fn pin(&mut self, index: usize, position: Vec2) {
        if let Some(node) = self.nodes.get_mut(index) {
            node.pinned = Some(position);
            node.position = position;
            node.velocity = Vec2::ZERO;
        }
    }

    pub fn unpin(&mut self, index: usize) {
        if let Some(node) = self.nodes.get_mut(index) {
            node.pinned = None;
        }
    }

    /// Re-heat the simulation (drag start) or let it cool again (drag end).
    pub fn set_alpha_target(&mut self, target: f64) {
        self.alpha_target = target;
    }

    pub fn restart(&mut self) {
        if self.alpha < ALPHA_MIN {
            self.alpha = ALPHA_MIN;
        }
    }

    pub fn settled(&self) -> bool {
        self.alpha < ALPHA_MIN && self.alpha_target < ALPHA_MIN
    }

    /// Advance the simulation one step. Force order is fixed: charge,
    /// center, link, then the collision passes, then integration.
    pub fn tick(&mut self) {
        if self.settled() {
            return;
        }
        self.alpha += (self.alpha_target - self.alpha) * ALPHA_DECAY;

        self.apply_charge();
        self.apply_center();
        self.apply_links();
        for _ in 0..COLLIDE_PASSES {
            self.apply_collisions();
        }

        for node in &mut self.nodes {
            if let Some(pinned) = node.pinned {
                node.position = pinned;
                node.velocity = Vec2::ZERO;
            } else {
                node.velocity = node.velocity * VELOCITY_DECAY;
                node.position += node.velocity;
            }
        }
    }

    /// Pairwise repulsion. Pinned nodes still push others away; their own
    /// velocity is discarded at integration time.
    fn apply_charge(&mut self) {
        let n = self.nodes.len();
        for i in 0..n {
            for j in (i + 1)..n {
                let delta = self.nodes[j].position - self.nodes[i].position;
                let dist_sq = (delta.x * delta.x + delta.y * delta.y).max(1.0);
                let w = self.charge_strength * self.alpha / dist_sq;
                self.nodes[i].velocity += delta * w;
                self.nodes[j].velocity += delta * (-w);
            }
        }
    }

    /// Pull the layout's mean position toward the origin (viewport center is
    /// applied at render time).
    fn apply_center(&mut self) {
        let free: Vec<usize> = (0..self.nodes.len())
            .filter(|&i| self.nodes[i].pinned.is_none())
            .collect();
        if free.is_empty() {
            return;
        }
        let mut mean = Vec2::ZERO;
        for &i in &free {
            mean += self.nodes[i].position;
        }
        let count = free.len() as f64;
        let shift = Vec2::new(mean.x / count, mean.y / count) * self.center_strength;
        for &i in &free {
            let p = self.nodes[i].position;
            self.nodes[i].position = p - shift;
        }
    }

    /// Spring each linked pair toward the configured distance. The pull is
    /// biased toward the lower-degree endpoint so hubs stay put.
    fn apply_links(&mut self) {
        for li in 0..self.links.len() {
            let GraphLink { source: s, target: t } = self.links[li];
            let sp = self.nodes[s].position + self.nodes[s].velocity;
            let tp = self.nodes[t].position + self.nodes[t].velocity;
            let mut delta = tp - sp;
            if delta.length() == 0.0 {
                delta = Vec2::new(1e-6, 1e-6);
            }
            let dist = delta.length();
            let ds = self.degrees[s].max(1) as f64;
            let dt = self.degrees[t].max(1) as f64;
            let strength = 1.0 / ds.min(dt);
            let f = (dist - self.link_distance) / dist * self.alpha * strength;
            let bias = ds / (ds + dt);
            self.nodes[t].velocity += delta * (-f * bias);
            self.nodes[s].velocity += delta * (f * (1.0 - bias));
        }
    }

    /// Resolve pairwise overlap of collision footprints by shifting the
    /// colliding nodes apart. A pinned node takes none of the shift; its
    /// counterpart absorbs all of it.
    fn apply_collisions(&mut self) {
        let n = self.nodes.len();
        for i in 0..n {
            for j in (i + 1)..n {
                let ri = collision_radius(self.degrees[i]);
                let rj = collision_radius(self.degrees[j]);
                let min_dist = ri + rj;
                let mut delta = self.nodes[j].position - self.nodes[i].position;
                if delta.length() == 0.0 {
                    // coincident nodes: separate along a fixed axis
                    delta = Vec2::new(1e-3 * (j as f64 + 1.0), 0.0);
                }
                let dist = delta.length();
                if dist >= min_dist {
                    continue;
                }
                let overlap = (min_dist - dist) / dist;
                let i_pinned = self.nodes[i].pinned.is_some();
                let j_pinned = self.nodes[j].pinned.is_some();
                let (wi, wj) = match (i_pinned, j_pinned) {
                    (true, true) => (0.0, 0.0),
                    (true, false) => (0.0, 1.0),
                    (false, true) => (1.0, 0.0),
                    (false, false) => {
                        let share = (rj * rj) / (ri * ri + rj * rj);
                        (share, 1.0 - share)
                    }
                };
                let pi = self.nodes[i].position;
                let pj = self.nodes[j].position;
                self.nodes[i].position = pi - delta * (overlap * wi);
                self.nodes[j].position = pj + delta * (overlap * wj);
            }
        }
    }
}

#[cfg(test)]
#[path = "layout_test.rs"]
mod layout_test;
