//! Pointer, wheel, and drag interaction state machine.
//!
//! States are Idle, Hovering(node), and Dragging(node). Every hover/active
//! mutation funnels through `update_hover_info` so the renderer and the
//! animation scheduler always observe one consistent snapshot. Dragging pins
//! the node to the pointer (scaled by the current zoom transform) and keeps
//! the simulation hot; a quick press-release is a click and produces a
//! navigation request instead.

use crate::layout::Simulation;
use crate::models::{GraphLink, Vec2};
use crate::render::{LinkRenderEntry, NodeRenderEntry, ViewTransform};
use std::collections::HashSet;

/// A press-release pair faster than this is a click, not a drag.
pub const CLICK_THRESHOLD_MS: f64 = 500.0;

/// Pointer travel (in surface pixels) before a press becomes a drag.
pub const DRAG_START_DISTANCE: f64 = 3.0;

/// Zoom scale bounds.
pub const SCALE_EXTENT: (f64, f64) = (0.125, 6.0);

// ============================================================================
// State
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InteractionState {
    Idle,
    Hovering(usize),
    Dragging(usize),
}

/// Bookkeeping between pointer-down and the drag threshold being crossed.
#[derive(Debug, Clone, Copy)]
struct PressTracking {
    node: usize,
    start_ms: f64,
    pointer_origin: Vec2,
    node_origin: Vec2,
}

pub struct InteractionController {
    state: InteractionState,
    press: Option<PressTracking>,
    hovered_neighbours: HashSet<usize>,
    transform: ViewTransform,
    drag_enabled: bool,
    zoom_enabled: bool,
}

impl InteractionController {
    pub fn new(drag_enabled: bool, zoom_enabled: bool) -> Self {
        InteractionController {
            state: InteractionState::Idle,
            press: None,
            hovered_neighbours: HashSet::new(),
            transform: ViewTransform::default(),
            drag_enabled,
            zoom_enabled,
        }
    }

    pub fn state(&self) -> InteractionState {
        self.state
    }

    pub fn hovered(&self) -> Option<usize> {
        match self.state {
            InteractionState::Hovering(n) | InteractionState::Dragging(n) => Some(n),
            InteractionState::Idle => None,
        }
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, InteractionState::Dragging(_))
    }

    pub fn transform(&self) -> ViewTransform {
        self.transform
    }

    pub fn hovered_neighbours(&self) -> &HashSet<usize> {
        &self.hovered_neighbours
    }

    // ------------------------------------------------------------------
    // Hover
    // ------------------------------------------------------------------

    /// The single update path for hover/active state. Recomputes the active
    /// set — the hovered node, its one-hop neighbors, and the links touching
    /// it — and marks the render entries accordingly.
    pub fn update_hover_info(
        &mut self,
        new_hovered: Option<usize>,
        links: &[GraphLink],
        node_entries: &mut [NodeRenderEntry],
        link_entries: &mut [LinkRenderEntry],
    ) {
        self.hovered_neighbours.clear();

        match new_hovered {
            None => {
                if !self.is_dragging() {
                    self.state = InteractionState::Idle;
                }
                for entry in node_entries.iter_mut() {
                    entry.active = false;
                }
                for entry in link_entries.iter_mut() {
                    entry.active = false;
                }
            }
            Some(hovered) => {
                if !self.is_dragging() {
                    self.state = InteractionState::Hovering(hovered);
                }
                self.hovered_neighbours.insert(hovered);
                for (link, entry) in links.iter().zip(link_entries.iter_mut()) {
                    if link.touches(hovered) {
                        self.hovered_neighbours.insert(link.source);
                        self.hovered_neighbours.insert(link.target);
                        entry.active = true;
                    } else {
                        entry.active = false;
                    }
                }
                for (index, entry) in node_entries.iter_mut().enumerate() {
                    entry.active = self.hovered_neighbours.contains(&index);
                }
            }
        }
    }

    // ------------------------------------------------------------------
    // Drag & click
    // ------------------------------------------------------------------

    /// Pointer pressed while hovering a node. Drag does not engage until the
    /// pointer travels past the threshold; a quick release is a click.
    pub fn pointer_down(&mut self, position: Vec2, now_ms: f64, sim: &Simulation) {
        if let InteractionState::Hovering(node) = self.state {
            self.press = Some(PressTracking {
                node,
                start_ms: now_ms,
                pointer_origin: position,
                node_origin: sim.nodes()[node].position,
            });
        }
    }

    /// Pointer moved. Engages the drag past the threshold and, while
    /// dragging, pins the node to the pointer corrected for zoom scale.
    pub fn pointer_move(&mut self, position: Vec2, sim: &mut Simulation) {
        let Some(press) = self.press else {
            return;
        };

        if !self.is_dragging() {
            if !self.drag_enabled {
                return;
            }
            let travel = (position - press.pointer_origin).length();
            if travel < DRAG_START_DISTANCE {
                return;
            }
            self.state = InteractionState::Dragging(press.node);
            sim.set_alpha_target(1.0);
            sim.restart();
        }

        let delta = (position - press.pointer_origin) * (1.0 / self.transform.k);
        sim.pin(press.node, press.node_origin + delta);
    }

    /// Pointer released. Below the click threshold this is a navigation
    /// request for the pressed node; otherwise the node is released back to
    /// the simulation and the layout left as dragged.
    pub fn pointer_up(&mut self, now_ms: f64, sim: &mut Simulation) -> Option<usize> {
        let press = self.press.take()?;

        if self.is_dragging() {
            sim.unpin(press.node);
            sim.set_alpha_target(0.0);
            self.state = InteractionState::Hovering(press.node);
        }

        if now_ms - press.start_ms < CLICK_THRESHOLD_MS {
            Some(press.node)
        } else {
            None
        }
    }

    // ------------------------------------------------------------------
    // Zoom
    // ------------------------------------------------------------------

    /// Apply a multiplicative zoom step about `center`, clamped to the scale
    /// extent. Returns the new transform when zoom is enabled.
    pub fn zoom_by(&mut self, factor: f64, center: Vec2) -> Option<ViewTransform> {
        if !self.zoom_enabled {
            return None;
        }
        let old_k = self.transform.k;
        let new_k = (old_k * factor).clamp(SCALE_EXTENT.0, SCALE_EXTENT.1);
        let ratio = new_k / old_k;
        self.transform = ViewTransform {
            k: new_k,
            x: center.x - (center.x - self.transform.x) * ratio,
            y: center.y - (center.y - self.transform.y) * ratio,
        };
        Some(self.transform)
    }

    /// Apply a pan step (wheel with no zoom key, touch pan).
    pub fn pan_by(&mut self, delta: Vec2) -> Option<ViewTransform> {
        if !self.zoom_enabled {
            return None;
        }
        self.transform.x += delta.x;
        self.transform.y += delta.y;
        Some(self.transform)
    }
}
