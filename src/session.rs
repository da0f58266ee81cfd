//! Graph view sessions and their lifecycle.
//!
//! A `Session` owns exactly one neighborhood, one simulation, one set of
//! render entries, and one animation registry. It is rebuilt from scratch on
//! every navigation or theme change — there is no incremental diffing — and
//! torn down before a replacement for the same surface is created.
//!
//! `GraphManager` owns the page session plus the optional global-overlay
//! session and routes the runtime events (navigation, theme change, overlay
//! shortcut) that create and destroy them.

use crate::interact::InteractionController;
use crate::layout::Simulation;
use crate::loader::GraphDataLoader;
use crate::models::{GraphConfig, GraphLink, GraphNode, NodeKind, Vec2};
use crate::neighborhood::select_neighborhood;
use crate::render::{
    build_glyph, DrawSurface, Glyph, LabelSpec, LineStroke, LinkRenderEntry, NodeRenderEntry,
    StyleMap, ThemeSource, LINK_IDLE_ALPHA, LINK_STROKE_WIDTH,
};
use crate::tween::{
    AnimationScheduler, Tween, TweenGroup, TweenProp, LABEL_TWEEN_MS, OPACITY_TWEEN_MS,
};
use crate::visited::VisitedStore;
use std::collections::{HashMap, HashSet};
use url::Url;

/// Node alpha for non-active nodes while hovering with focus-on-hover.
const DIMMED_NODE_ALPHA: f64 = 0.2;

/// Divisor turning excess zoom scale into idle label opacity.
const LABEL_OPACITY_SLOPE: f64 = 3.75;

/// Scale boost for the hovered node's label.
const ACTIVE_LABEL_BOOST: f64 = 1.1;

// ============================================================================
// Navigation
// ============================================================================

/// Produced when a click resolves to a node: the embedder performs the
/// actual page transition.
#[derive(Debug, Clone, PartialEq)]
pub struct NavigationRequest {
    pub id: String,
    /// Resolved against the site base URL when one is configured.
    pub url: Option<Url>,
}

// ============================================================================
// Session
// ============================================================================

pub struct Session<S: DrawSurface> {
    cfg: GraphConfig,
    focus: String,
    sim: Simulation,
    node_entries: Vec<NodeRenderEntry>,
    link_entries: Vec<LinkRenderEntry>,
    controller: InteractionController,
    tweens: AnimationScheduler,
    surface: S,
    style_map: StyleMap,
    width: f64,
    height: f64,
    alive: bool,
}

impl<S: DrawSurface> Session<S> {
    /// Build a session for `focus`. Returns `None` when there is no surface
    /// or the surface fails to initialize: a broken graph view must never
    /// break page navigation, so every failure here is a silent abort.
    pub fn build(
        focus: &str,
        cfg: GraphConfig,
        loader: &GraphDataLoader,
        visited: &HashSet<String>,
        surface: Option<S>,
        theme: &dyn ThemeSource,
        width: f64,
        height: f64,
    ) -> Option<Session<S>> {
        let mut surface = surface?;
        let height = height.max(250.0);
        if surface.init(width, height).is_err() {
            return None;
        }

        let style_map = StyleMap::resolve(theme);

        // Neighborhood selection over the full link set
        let data = loader.graph_data(&cfg);
        let hood = select_neighborhood(focus, cfg.depth, &data);

        let index_of: HashMap<&str, usize> = hood
            .ids
            .iter()
            .enumerate()
            .map(|(i, id)| (id.as_str(), i))
            .collect();
        let nodes: Vec<GraphNode> = hood
            .ids
            .iter()
            .map(|id| {
                let entry = loader.entry(id);
                GraphNode::new(
                    id,
                    &loader.display_text(id),
                    entry.tags.clone(),
                    data.kind_of(id, loader.index()),
                )
            })
            .collect();
        let links: Vec<GraphLink> = hood
            .links
            .iter()
            .map(|l| GraphLink {
                source: index_of[l.source.as_str()],
                target: index_of[l.target.as_str()],
            })
            .collect();

        let sim = Simulation::new(nodes, links, &cfg);

        // One drawable per node (glyph + label) and per link, for the whole
        // session lifetime
        let mut node_entries = Vec::with_capacity(sim.nodes().len());
        for (i, node) in sim.nodes().iter().enumerate() {
            let tint = node_tint(node, focus, visited, &style_map);
            let mut glyph = build_glyph(node.kind, sim.radius(i), &cfg.node_styles, theme);
            if node.kind == NodeKind::Regular {
                // regular discs take the visited-aware tint over the styled fill
                if let Glyph::Circle { fill, .. } = &mut glyph {
                    *fill = tint.clone();
                }
            }
            let gfx = surface.add_node(&glyph);

            let label = surface.add_label(&LabelSpec {
                text: node.text.clone(),
                font_size: cfg.font_size * 12.0,
                fill: style_map.dark.clone(),
                stroke: style_map.light.clone(),
                font_family: style_map.body_font.clone(),
                wrap_width: 60.0,
                line_height: cfg.font_size * 14.0,
            });
            let label_scale = 1.0 / cfg.scale;
            surface.set_scale(label, label_scale);
            surface.set_alpha(label, 0.0);

            node_entries.push(NodeRenderEntry {
                color: tint,
                alpha: 1.0,
                active: false,
                gfx,
                label,
                label_alpha: 0.0,
                label_scale,
            });
        }

        let link_entries: Vec<LinkRenderEntry> = sim
            .links()
            .iter()
            .map(|_| LinkRenderEntry {
                color: style_map.lightgray.clone(),
                alpha: LINK_IDLE_ALPHA,
                active: false,
                gfx: surface.add_line(),
            })
            .collect();

        let controller = InteractionController::new(cfg.drag, cfg.zoom);

        Some(Session {
            cfg,
            focus: focus.to_string(),
            sim,
            node_entries,
            link_entries,
            controller,
            tweens: AnimationScheduler::new(),
            surface,
            style_map,
            width,
            height,
            alive: true,
        })
    }

    pub fn focus(&self) -> &str {
        &self.focus
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    pub fn sim(&self) -> &Simulation {
        &self.sim
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn node_entries(&self) -> &[NodeRenderEntry] {
        &self.node_entries
    }

    pub fn link_entries(&self) -> &[LinkRenderEntry] {
        &self.link_entries
    }

    pub fn controller(&self) -> &InteractionController {
        &self.controller
    }

    pub fn node_index(&self, id: &str) -> Option<usize> {
        self.sim.index_of(id)
    }

    // ------------------------------------------------------------------
    // Frame loop
    // ------------------------------------------------------------------

    /// One frame: advance the simulation, apply positions to drawables,
    /// advance animations, and issue the single composited draw — strictly
    /// in that order. No reader ever observes a partially updated frame.
    pub fn advance(&mut self, now_ms: f64) {
        if !self.alive {
            return;
        }

        self.sim.tick();

        let center = Vec2::new(self.width / 2.0, self.height / 2.0);
        for (i, entry) in self.node_entries.iter().enumerate() {
            let position = self.sim.nodes()[i].position + center;
            self.surface.set_position(entry.gfx, position);
            self.surface.set_position(entry.label, position);
        }
        for (i, entry) in self.link_entries.iter().enumerate() {
            let link = self.sim.links()[i];
            let from = self.sim.nodes()[link.source].position + center;
            let to = self.sim.nodes()[link.target].position + center;
            self.surface.set_line_geometry(
                entry.gfx,
                from,
                to,
                &LineStroke {
                    color: entry.color.clone(),
                    width: LINK_STROKE_WIDTH,
                },
            );
        }

        for (prop, value) in self.tweens.advance(now_ms) {
            match prop {
                TweenProp::NodeAlpha(i) => {
                    self.node_entries[i].alpha = value;
                    self.surface.set_alpha(self.node_entries[i].gfx, value);
                }
                TweenProp::LinkAlpha(i) => {
                    self.link_entries[i].alpha = value;
                    self.surface.set_alpha(self.link_entries[i].gfx, value);
                }
                TweenProp::LabelAlpha(i) => {
                    self.node_entries[i].label_alpha = value;
                    self.surface.set_alpha(self.node_entries[i].label, value);
                }
                TweenProp::LabelScale(i) => {
                    self.node_entries[i].label_scale = value;
                    self.surface.set_scale(self.node_entries[i].label, value);
                }
            }
        }

        self.surface.present();
    }

    /// Stop animations and stop accepting frames. The embedder detaches its
    /// listeners and drops the session afterwards; no callback may fire
    /// against a torn-down session.
    pub fn teardown(&mut self) {
        self.tweens.stop_all();
        self.alive = false;
    }

    // ------------------------------------------------------------------
    // Interaction entry points
    // ------------------------------------------------------------------

    pub fn pointer_enter(&mut self, node: usize, now_ms: f64) {
        if !self.alive || node >= self.node_entries.len() {
            return;
        }
        self.controller.update_hover_info(
            Some(node),
            self.sim.links(),
            &mut self.node_entries,
            &mut self.link_entries,
        );
        if !self.controller.is_dragging() {
            self.retarget_tweens(now_ms);
        }
    }

    pub fn pointer_leave(&mut self, now_ms: f64) {
        if !self.alive {
            return;
        }
        self.controller.update_hover_info(
            None,
            self.sim.links(),
            &mut self.node_entries,
            &mut self.link_entries,
        );
        if !self.controller.is_dragging() {
            self.retarget_tweens(now_ms);
        }
    }

    pub fn pointer_down(&mut self, position: Vec2, now_ms: f64) {
        if self.alive {
            self.controller.pointer_down(position, now_ms, &self.sim);
        }
    }

    pub fn pointer_move(&mut self, position: Vec2) {
        if self.alive {
            self.controller.pointer_move(position, &mut self.sim);
        }
    }

    /// Returns the clicked node's identifier when the press-release pair was
    /// fast enough to count as a click.
    pub fn pointer_up(&mut self, now_ms: f64) -> Option<String> {
        if !self.alive {
            return None;
        }
        let index = self.controller.pointer_up(now_ms, &mut self.sim)?;
        Some(self.sim.nodes()[index].id.clone())
    }

    /// Wheel/pinch zoom step. Updates the stage transform and label
    /// visibility; active labels stay fully visible, the rest fade in as the
    /// zoom exceeds the opacity threshold.
    pub fn wheel_zoom(&mut self, factor: f64, pointer: Vec2) {
        if !self.alive {
            return;
        }
        let Some(transform) = self.controller.zoom_by(factor, pointer) else {
            return;
        };
        self.surface.set_view_transform(transform);

        let scaled = transform.k * self.cfg.opacity_scale;
        let idle_alpha = ((scaled - 1.0) / LABEL_OPACITY_SLOPE).clamp(0.0, 1.0);
        for entry in &mut self.node_entries {
            let alpha = if entry.active { 1.0 } else { idle_alpha };
            entry.label_alpha = alpha;
            self.surface.set_alpha(entry.label, alpha);
        }
    }

    /// Wheel/touch pan step: shift the stage transform by `delta`.
    pub fn wheel_pan(&mut self, delta: Vec2) {
        if !self.alive {
            return;
        }
        let Some(transform) = self.controller.pan_by(delta) else {
            return;
        };
        self.surface.set_view_transform(transform);
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height.max(250.0);
    }

    // ------------------------------------------------------------------
    // Animation targets
    // ------------------------------------------------------------------

    /// Retarget all opacity/scale tweens from the current hover snapshot:
    /// node dimming, link highlighting, label visibility and scale. Each
    /// group restart cancels its in-flight predecessor.
    fn retarget_tweens(&mut self, now_ms: f64) {
        let hovered = self.controller.hovered();

        let node_tweens: Vec<Tween> = self
            .node_entries
            .iter()
            .enumerate()
            .map(|(i, entry)| {
                let target = if hovered.is_some() && self.cfg.focus_on_hover {
                    if entry.active {
                        1.0
                    } else {
                        DIMMED_NODE_ALPHA
                    }
                } else {
                    1.0
                };
                Tween::new(TweenProp::NodeAlpha(i), entry.alpha, target, OPACITY_TWEEN_MS)
            })
            .collect();
        self.tweens.start(TweenGroup::Hover, node_tweens, now_ms);

        let link_tweens: Vec<Tween> = self
            .link_entries
            .iter_mut()
            .enumerate()
            .map(|(i, entry)| {
                let target = if hovered.is_some() {
                    if entry.active {
                        1.0
                    } else {
                        0.0
                    }
                } else {
                    LINK_IDLE_ALPHA
                };
                entry.color = self.style_map.dark.clone();
                Tween::new(TweenProp::LinkAlpha(i), entry.alpha, target, OPACITY_TWEEN_MS)
            })
            .collect();
        self.tweens.start(TweenGroup::Link, link_tweens, now_ms);

        let default_scale = 1.0 / self.cfg.scale;
        let active_scale = default_scale * ACTIVE_LABEL_BOOST;
        let neighbours = self.controller.hovered_neighbours().clone();
        let label_tweens: Vec<Tween> = self
            .node_entries
            .iter()
            .enumerate()
            .flat_map(|(i, entry)| {
                let visible = neighbours.contains(&i);
                let target_alpha = if visible { 1.0 } else { 0.0 };
                let target_scale = if hovered == Some(i) {
                    active_scale
                } else {
                    default_scale
                };
                [
                    Tween::new(
                        TweenProp::LabelAlpha(i),
                        entry.label_alpha,
                        target_alpha,
                        LABEL_TWEEN_MS,
                    ),
                    Tween::new(
                        TweenProp::LabelScale(i),
                        entry.label_scale,
                        target_scale,
                        LABEL_TWEEN_MS,
                    ),
                ]
            })
            .collect();
        self.tweens.start(TweenGroup::Label, label_tweens, now_ms);
    }
}

/// Tint for a node disc: the focus document uses the highlight color,
/// previously visited documents and tag nodes the alternate tint, and
/// everything else the neutral gray.
fn node_tint(
    node: &GraphNode,
    focus: &str,
    visited: &HashSet<String>,
    style_map: &StyleMap,
) -> String {
    if node.id == focus {
        style_map.secondary.clone()
    } else if visited.contains(&node.id) || node.is_tag() {
        style_map.tertiary.clone()
    } else {
        style_map.gray.clone()
    }
}

// ============================================================================
// Surface Provider
// ============================================================================

/// Which rendering surface a session draws into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceTarget {
    /// The inline graph container on the page
    Page,
    /// The full-screen global graph overlay
    Overlay,
}

/// Acquires a fresh surface for a session. Returning `None` (no container on
/// this page) silently skips the graph view.
pub trait SurfaceProvider {
    type Surface: DrawSurface;
    fn acquire(&mut self, target: SurfaceTarget) -> Option<Self::Surface>;
    fn viewport(&self, target: SurfaceTarget) -> (f64, f64);
}

// ============================================================================
// Manager
// ============================================================================

/// Owns the per-page session and the optional overlay session, and handles
/// the runtime events that rebuild or destroy them. At most one session per
/// surface exists at a time.
pub struct GraphManager<P: SurfaceProvider, T: ThemeSource> {
    loader: GraphDataLoader,
    cfg: GraphConfig,
    base_url: Option<Url>,
    visited: VisitedStore,
    provider: P,
    theme: T,
    focus: String,
    page: Option<Session<P::Surface>>,
    overlay: Option<Session<P::Surface>>,
}

impl<P: SurfaceProvider, T: ThemeSource> GraphManager<P, T> {
    pub fn new(
        loader: GraphDataLoader,
        cfg: GraphConfig,
        base_url: Option<Url>,
        visited: VisitedStore,
        provider: P,
        theme: T,
    ) -> Self {
        GraphManager {
            loader,
            cfg,
            base_url,
            visited,
            provider,
            theme,
            focus: String::new(),
            page: None,
            overlay: None,
        }
    }

    pub fn page(&self) -> Option<&Session<P::Surface>> {
        self.page.as_ref()
    }

    pub fn page_mut(&mut self) -> Option<&mut Session<P::Surface>> {
        self.page.as_mut()
    }

    pub fn overlay(&self) -> Option<&Session<P::Surface>> {
        self.overlay.as_ref()
    }

    pub fn overlay_mut(&mut self) -> Option<&mut Session<P::Surface>> {
        self.overlay.as_mut()
    }

    pub fn overlay_open(&self) -> bool {
        self.overlay.is_some()
    }

    pub fn visited(&self) -> &VisitedStore {
        &self.visited
    }

    /// A navigation event landed on `slug`: record the visit, close the
    /// overlay if it was open, and rebuild the page session around the new
    /// focus. The previous session is torn down before its replacement
    /// exists.
    pub fn on_navigation(&mut self, slug: &str) {
        self.visited.add(slug);
        self.focus = slug.to_string();
        self.close_overlay();
        self.rebuild_page();
    }

    /// Theme changed: colors must be re-resolved, so rebuild whatever is on
    /// screen with the same focus.
    pub fn on_theme_change(&mut self) {
        self.rebuild_page();
        if self.overlay.is_some() {
            self.rebuild_overlay();
        }
    }

    /// Keyboard shortcut: toggle the global overlay open or closed.
    pub fn toggle_overlay(&mut self) {
        if self.overlay.is_some() {
            self.close_overlay();
        } else {
            self.rebuild_overlay();
        }
    }

    /// Escape or a click outside the overlay closes it.
    pub fn close_overlay(&mut self) {
        if let Some(session) = &mut self.overlay {
            session.teardown();
        }
        self.overlay = None;
    }

    /// A session reported a clicked node: resolve it to a navigation request
    /// and record the visit.
    pub fn resolve_navigation(&mut self, id: &str) -> NavigationRequest {
        self.visited.add(id);
        NavigationRequest {
            id: id.to_string(),
            url: self.base_url.as_ref().and_then(|base| base.join(id).ok()),
        }
    }

    /// Advance every live session one frame.
    pub fn advance(&mut self, now_ms: f64) {
        if let Some(session) = &mut self.page {
            session.advance(now_ms);
        }
        if let Some(session) = &mut self.overlay {
            session.advance(now_ms);
        }
    }

    /// Tear down everything (page unload).
    pub fn teardown(&mut self) {
        if let Some(session) = &mut self.page {
            session.teardown();
        }
        self.page = None;
        self.close_overlay();
    }

    fn rebuild_page(&mut self) {
        if let Some(session) = &mut self.page {
            session.teardown();
        }
        let (width, height) = self.provider.viewport(SurfaceTarget::Page);
        self.page = Session::build(
            &self.focus,
            self.cfg.clone(),
            &self.loader,
            &self.visited.visited(),
            self.provider.acquire(SurfaceTarget::Page),
            &self.theme,
            width,
            height,
        );
    }

    fn rebuild_overlay(&mut self) {
        if let Some(session) = &mut self.overlay {
            session.teardown();
        }
        let (width, height) = self.provider.viewport(SurfaceTarget::Overlay);
        self.overlay = Session::build(
            &self.focus,
            self.cfg.global(),
            &self.loader,
            &self.visited.visited(),
            self.provider.acquire(SurfaceTarget::Overlay),
            &self.theme,
            width,
            height,
        );
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;
