//! Data models for the graph view engine.
//!
//! This module contains the core data structures shared across the engine:
//! content-index entries, simulation nodes and links, per-instance
//! configuration, and node styling.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ============================================================================
// Geometry
// ============================================================================

/// 2D vector used for positions, velocities, and pointer coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Vec2 { x, y }
    }

    pub fn length(&self) -> f64 {
        (self.x * self.x + self.y * self.y).sqrt()
    }
}

impl std::ops::Add for Vec2 {
    type Output = Vec2;
    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl std::ops::Sub for Vec2 {
    type Output = Vec2;
    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl std::ops::Mul<f64> for Vec2 {
    type Output = Vec2;
    fn mul(self, rhs: f64) -> Vec2 {
        Vec2::new(self.x * rhs, self.y * rhs)
    }
}

impl std::ops::AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Vec2) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

// ============================================================================
// Content Index
// ============================================================================

/// Document kind as recorded in the content index. Tag nodes are synthesized
/// by the loader, never present in the index itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    #[default]
    Regular,
    Tag,
    Zettel,
}

/// One entry of the precomputed content index: identifier → details.
/// Every field is defaulted so a partially malformed entry still loads.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContentNode {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub links: Vec<String>,
    #[serde(default, rename = "type")]
    pub kind: NodeKind,
}

/// The content index: document identifier → details.
pub type ContentIndex = HashMap<String, ContentNode>;

// ============================================================================
// Graph Data
// ============================================================================

/// A node participating in the simulation. Position and velocity are owned
/// here; the drawable state for the node lives in the session's render entry.
#[derive(Debug, Clone)]
pub struct GraphNode {
    pub id: String,
    /// Display text: document title, or `#tag / subtag` for tag nodes,
    /// falling back to the identifier.
    pub text: String,
    pub tags: Vec<String>,
    pub kind: NodeKind,
    pub position: Vec2,
    pub velocity: Vec2,
    /// Set while the node is dragged: forces no longer move it, the pointer does.
    pub pinned: Option<Vec2>,
}

impl GraphNode {
    pub fn new(id: &str, text: &str, tags: Vec<String>, kind: NodeKind) -> Self {
        GraphNode {
            id: id.to_string(),
            text: text.to_string(),
            tags,
            kind,
            position: Vec2::ZERO,
            velocity: Vec2::ZERO,
            pinned: None,
        }
    }

    pub fn is_tag(&self) -> bool {
        self.kind == NodeKind::Tag
    }
}

/// A link between two nodes, stored as indices into the session node list.
/// Directed in data; treated as undirected for traversal and highlighting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GraphLink {
    pub source: usize,
    pub target: usize,
}

impl GraphLink {
    pub fn touches(&self, index: usize) -> bool {
        self.source == index || self.target == index
    }
}

/// Identifier-level link as produced by the loader, before a neighborhood
/// is chosen and indices assigned.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct IdLink {
    pub source: String,
    pub target: String,
}

// ============================================================================
// Configuration
// ============================================================================

/// Per-kind glyph styling. `none` and unresolvable values fall back to
/// neutral black at resolution time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NodeStyle {
    pub fill_color: String,
    pub stroke_color: String,
    pub stroke_width: f64,
    pub background_color: Option<String>,
    pub background_radius: Option<f64>,
    pub text_color: Option<String>,
}

impl Default for NodeStyle {
    fn default() -> Self {
        NodeStyle {
            fill_color: "var(--secondary)".to_string(),
            stroke_color: "var(--dark)".to_string(),
            stroke_width: 0.5,
            background_color: None,
            background_radius: None,
            text_color: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NodeStyles {
    pub regular_node: NodeStyle,
    pub tag_node: NodeStyle,
    pub zettel_node: NodeStyle,
}

impl Default for NodeStyles {
    fn default() -> Self {
        NodeStyles {
            regular_node: NodeStyle::default(),
            tag_node: NodeStyle {
                fill_color: "white".to_string(),
                stroke_color: "white".to_string(),
                stroke_width: 0.0,
                background_color: Some("var(--gray)".to_string()),
                background_radius: Some(1.2),
                text_color: None,
            },
            zettel_node: NodeStyle {
                fill_color: "var(--tertiary)".to_string(),
                stroke_color: "var(--dark)".to_string(),
                stroke_width: 0.5,
                background_color: Some("var(--light)".to_string()),
                background_radius: Some(1.3),
                text_color: Some("var(--dark)".to_string()),
            },
        }
    }
}

impl NodeStyles {
    pub fn for_kind(&self, kind: NodeKind) -> &NodeStyle {
        match kind {
            NodeKind::Regular => &self.regular_node,
            NodeKind::Tag => &self.tag_node,
            NodeKind::Zettel => &self.zettel_node,
        }
    }
}

/// Per-instance configuration, deserialized from the camelCase JSON the site
/// embeds on the container element. Unknown or missing fields take defaults
/// rather than failing the session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GraphConfig {
    pub drag: bool,
    pub zoom: bool,
    /// Non-negative hop bound from the focus node; negative means unbounded.
    pub depth: i32,
    pub scale: f64,
    pub repel_force: f64,
    pub center_force: f64,
    pub link_distance: f64,
    pub font_size: f64,
    pub opacity_scale: f64,
    pub remove_tags: Vec<String>,
    pub show_tags: bool,
    pub focus_on_hover: bool,
    pub node_styles: NodeStyles,
}

impl Default for GraphConfig {
    fn default() -> Self {
        GraphConfig {
            drag: true,
            zoom: true,
            depth: 1,
            scale: 1.1,
            repel_force: 0.5,
            center_force: 0.3,
            link_distance: 30.0,
            font_size: 0.6,
            opacity_scale: 1.0,
            remove_tags: Vec::new(),
            show_tags: true,
            focus_on_hover: false,
            node_styles: NodeStyles::default(),
        }
    }
}

impl GraphConfig {
    /// Parse a config from embedded JSON, degrading to defaults on error.
    pub fn from_json(json: &str) -> GraphConfig {
        serde_json::from_str(json).unwrap_or_default()
    }

    /// Config for the global overlay view: whole graph, no depth bound.
    pub fn global(&self) -> GraphConfig {
        let mut cfg = self.clone();
        cfg.depth = -1;
        cfg
    }
}
