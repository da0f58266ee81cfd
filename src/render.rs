//! Retained-mode render surface for the graph view.
//!
//! The engine never talks to a concrete canvas: it describes drawables
//! (kind-specific node glyphs, labels, link lines) through the `DrawSurface`
//! capability and updates them by handle every frame. A recording
//! implementation backs tests and headless runs.
//!
//! Theme-variable colors are resolved to concrete hex values once, at session
//! start; anything unresolvable falls back to neutral black rather than
//! failing the build.

use crate::models::{NodeKind, NodeStyle, NodeStyles, Vec2};
use serde::{Deserialize, Serialize};

/// Stroke width for link lines.
pub const LINK_STROKE_WIDTH: f64 = 0.3;

/// Baseline link opacity when nothing is hovered.
pub const LINK_IDLE_ALPHA: f64 = 0.1;

/// Fallback for colors that cannot be resolved.
pub const NEUTRAL_COLOR: &str = "#000000";

/// Handle to a retained drawable owned by the surface.
pub type DrawId = usize;

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, Clone)]
pub enum RenderError {
    /// No surface to draw into; the session silently aborts construction
    MissingTarget,
    /// The surface exists but failed to initialize
    Init(String),
}

impl std::fmt::Display for RenderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RenderError::MissingTarget => write!(f, "No render target available"),
            RenderError::Init(msg) => write!(f, "Render surface initialization failed: {}", msg),
        }
    }
}

impl std::error::Error for RenderError {}

// ============================================================================
// Theme Resolution
// ============================================================================

/// Computed-style lookup injected at session construction. The browser-backed
/// implementation reads CSS custom properties; tests supply a fixed palette.
pub trait ThemeSource {
    /// Value of a CSS custom property (name includes the `--` prefix).
    fn css_variable(&self, name: &str) -> Option<String>;
}

/// Fixed palette theme for tests and headless rendering.
pub struct StaticTheme {
    values: Vec<(String, String)>,
}

impl StaticTheme {
    pub fn new(values: &[(&str, &str)]) -> Self {
        StaticTheme {
            values: values
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }
}

impl Default for StaticTheme {
    fn default() -> Self {
        StaticTheme::new(&[
            ("--secondary", "#284b63"),
            ("--tertiary", "#84a59d"),
            ("--gray", "#646464"),
            ("--light", "#faf8f8"),
            ("--lightgray", "#e5e5e5"),
            ("--dark", "#2b2b2b"),
            ("--darkgray", "#4e4e4e"),
            ("--bodyFont", "Schibsted Grotesk"),
        ])
    }
}

impl ThemeSource for StaticTheme {
    fn css_variable(&self, name: &str) -> Option<String> {
        self.values
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.clone())
    }
}

/// Resolve a configured color to a concrete `#rrggbb` value. `var(--x)` is
/// looked up through the theme; hex passes through; everything else (`none`,
/// named colors, unknown variables) falls back to neutral black.
pub fn resolve_color(raw: &str, theme: &dyn ThemeSource) -> String {
    if let Some(var_name) = raw.strip_prefix("var(").and_then(|s| s.strip_suffix(')')) {
        let computed = theme.css_variable(var_name.trim()).unwrap_or_default();
        let computed = computed.trim();
        if computed.starts_with('#') {
            return computed.to_string();
        }
        return NEUTRAL_COLOR.to_string();
    }
    if raw.starts_with('#') {
        return raw.to_string();
    }
    NEUTRAL_COLOR.to_string()
}

/// The theme variables the renderer needs, resolved once at session start.
#[derive(Debug, Clone)]
pub struct StyleMap {
    pub secondary: String,
    pub tertiary: String,
    pub gray: String,
    pub light: String,
    pub lightgray: String,
    pub dark: String,
    pub darkgray: String,
    pub body_font: String,
}

impl StyleMap {
    pub fn resolve(theme: &dyn ThemeSource) -> StyleMap {
        let var = |name: &str| resolve_color(&format!("var({})", name), theme);
        StyleMap {
            secondary: var("--secondary"),
            tertiary: var("--tertiary"),
            gray: var("--gray"),
            light: var("--light"),
            lightgray: var("--lightgray"),
            dark: var("--dark"),
            darkgray: var("--darkgray"),
            body_font: theme
                .css_variable("--bodyFont")
                .unwrap_or_else(|| "sans-serif".to_string()),
        }
    }
}

// ============================================================================
// Glyphs
// ============================================================================

/// Closed set of node glyph variants, dispatched by node kind.
#[derive(Debug, Clone, PartialEq)]
pub enum Glyph {
    /// Regular document: a filled circle, optionally stroked.
    Circle {
        radius: f64,
        fill: String,
        stroke: Option<(String, f64)>,
    },
    /// Tag: background disc plus a procedural hashtag path.
    Hashtag {
        radius: f64,
        background: String,
        background_radius: f64,
        fill: String,
        outline: Vec<Vec2>,
        hole: Vec<Vec2>,
    },
    /// Zettel: background disc plus a rendered symbol.
    Symbol {
        radius: f64,
        background: String,
        background_radius: f64,
        symbol: char,
        text_color: String,
        font_size: f64,
    },
}

impl Glyph {
    /// Radius of the pointer hit area for this glyph.
    pub fn hit_radius(&self) -> f64 {
        match self {
            Glyph::Circle { radius, .. } => *radius,
            Glyph::Hashtag {
                radius,
                background_radius,
                ..
            }
            | Glyph::Symbol {
                radius,
                background_radius,
                ..
            } => radius * background_radius,
        }
    }
}

/// Hashtag outline in a 36x36 box, traced clockwise.
const HASHTAG_OUTLINE: &[(f64, f64)] = &[
    (31.87, 10.0),
    (26.32, 10.0),
    (27.32, 5.17),
    (26.35, 4.0),
    (24.35, 4.0),
    (23.35, 4.78),
    (22.33, 10.0),
    (16.93, 10.0),
    (17.93, 5.17),
    (17.0, 4.0),
    (15.0, 4.0),
    (14.0, 4.78),
    (13.0, 10.0),
    (7.0, 10.0),
    (6.0, 10.8),
    (5.59, 12.8),
    (6.59, 14.0),
    (12.14, 14.0),
    (10.5, 22.0),
    (4.5, 22.0),
    (3.5, 22.8),
    (3.09, 24.8),
    (4.09, 26.0),
    (9.68, 26.0),
    (8.68, 30.83),
    (9.68, 32.0),
    (11.68, 32.0),
    (12.63, 31.22),
    (13.67, 26.0),
    (19.07, 26.0),
    (18.07, 30.83),
    (19.07, 32.0),
    (21.07, 32.0),
    (22.07, 31.22),
    (23.05, 26.0),
    (29.05, 26.0),
    (30.05, 25.2),
    (30.45, 23.2),
    (29.45, 22.0),
    (23.87, 22.0),
    (25.5, 14.0),
    (31.5, 14.0),
    (32.5, 13.2),
    (32.91, 11.2),
    (31.91, 10.0),
];

/// Inner square drawn in the background color to cut the hashtag's hole.
const HASHTAG_HOLE: &[(f64, f64)] = &[
    (19.87, 22.0),
    (14.47, 22.0),
    (16.11, 14.0),
    (21.51, 14.0),
    (19.87, 22.0),
];

/// Scale a 36x36 path to fit a glyph of the given radius, centered on origin.
fn scale_path(points: &[(f64, f64)], radius: f64) -> Vec<Vec2> {
    let scale = radius / 18.0;
    points
        .iter()
        .map(|&(x, y)| Vec2::new((x - 18.0) * scale, (y - 18.0) * scale))
        .collect()
}

/// Build the glyph for a node of the given kind and visual radius.
pub fn build_glyph(
    kind: NodeKind,
    radius: f64,
    styles: &NodeStyles,
    theme: &dyn ThemeSource,
) -> Glyph {
    let style: &NodeStyle = styles.for_kind(kind);
    match kind {
        NodeKind::Regular => {
            let stroke = if style.stroke_color == "none" {
                None
            } else {
                Some((resolve_color(&style.stroke_color, theme), style.stroke_width))
            };
            Glyph::Circle {
                radius,
                fill: resolve_color(&style.fill_color, theme),
                stroke,
            }
        }
        NodeKind::Tag => Glyph::Hashtag {
            radius,
            background: resolve_color(
                style.background_color.as_deref().unwrap_or("var(--gray)"),
                theme,
            ),
            background_radius: style.background_radius.unwrap_or(1.2),
            fill: resolve_color(&style.fill_color, theme),
            outline: scale_path(HASHTAG_OUTLINE, radius),
            hole: scale_path(HASHTAG_HOLE, radius),
        },
        NodeKind::Zettel => Glyph::Symbol {
            radius,
            background: resolve_color(
                style.background_color.as_deref().unwrap_or("var(--light)"),
                theme,
            ),
            background_radius: style.background_radius.unwrap_or(1.3),
            symbol: 'ζ',
            text_color: resolve_color(style.text_color.as_deref().unwrap_or("var(--dark)"), theme),
            font_size: radius * 1.4,
        },
    }
}

// ============================================================================
// Draw Surface Capability
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct LabelSpec {
    pub text: String,
    pub font_size: f64,
    pub fill: String,
    pub stroke: String,
    pub font_family: String,
    pub wrap_width: f64,
    pub line_height: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LineStroke {
    pub color: String,
    pub width: f64,
}

/// Zoom/pan transform applied to the whole stage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewTransform {
    pub k: f64,
    pub x: f64,
    pub y: f64,
}

impl Default for ViewTransform {
    fn default() -> Self {
        ViewTransform {
            k: 1.0,
            x: 0.0,
            y: 0.0,
        }
    }
}

/// Retained drawing capability. One drawable per node glyph, label, and
/// link; per-frame mutation by handle; one composited `present` per frame.
pub trait DrawSurface {
    fn init(&mut self, width: f64, height: f64) -> Result<(), RenderError>;
    fn add_node(&mut self, glyph: &Glyph) -> DrawId;
    fn add_label(&mut self, label: &LabelSpec) -> DrawId;
    fn add_line(&mut self) -> DrawId;
    fn set_position(&mut self, id: DrawId, position: Vec2);
    fn set_alpha(&mut self, id: DrawId, alpha: f64);
    fn set_scale(&mut self, id: DrawId, scale: f64);
    fn set_line_geometry(&mut self, id: DrawId, from: Vec2, to: Vec2, stroke: &LineStroke);
    fn set_view_transform(&mut self, transform: ViewTransform);
    fn present(&mut self);
}

// ============================================================================
// Recording Surface
// ============================================================================

/// What a recorded drawable currently looks like.
#[derive(Debug, Clone)]
pub enum Recorded {
    Node {
        glyph: Glyph,
        position: Vec2,
        alpha: f64,
        scale: f64,
    },
    Label {
        spec: LabelSpec,
        position: Vec2,
        alpha: f64,
        scale: f64,
    },
    Line {
        from: Vec2,
        to: Vec2,
        stroke: Option<LineStroke>,
        alpha: f64,
    },
}

/// In-memory surface that records every mutation. Used by tests and the demo
/// binary in place of a real canvas.
#[derive(Default)]
pub struct RecordingSurface {
    pub objects: Vec<Recorded>,
    pub transform: ViewTransform,
    pub presents: usize,
    pub size: (f64, f64),
    /// Force `init` to fail, to exercise the silent-abort path.
    pub fail_init: bool,
}

impl RecordingSurface {
    pub fn new() -> Self {
        RecordingSurface::default()
    }

    pub fn alpha_of(&self, id: DrawId) -> f64 {
        match &self.objects[id] {
            Recorded::Node { alpha, .. }
            | Recorded::Label { alpha, .. }
            | Recorded::Line { alpha, .. } => *alpha,
        }
    }

    pub fn position_of(&self, id: DrawId) -> Vec2 {
        match &self.objects[id] {
            Recorded::Node { position, .. } | Recorded::Label { position, .. } => *position,
            Recorded::Line { from, .. } => *from,
        }
    }

    pub fn scale_of(&self, id: DrawId) -> f64 {
        match &self.objects[id] {
            Recorded::Node { scale, .. } | Recorded::Label { scale, .. } => *scale,
            Recorded::Line { .. } => 1.0,
        }
    }
}

impl DrawSurface for RecordingSurface {
    fn init(&mut self, width: f64, height: f64) -> Result<(), RenderError> {
        if self.fail_init {
            return Err(RenderError::Init("recording surface told to fail".into()));
        }
        self.size = (width, height);
        Ok(())
    }

    fn add_node(&mut self, glyph: &Glyph) -> DrawId {
        self.objects.push(Recorded::Node {
            glyph: glyph.clone(),
            position: Vec2::ZERO,
            alpha: 1.0,
            scale: 1.0,
        });
        self.objects.len() - 1
    }

    fn add_label(&mut self, label: &LabelSpec) -> DrawId {
        self.objects.push(Recorded::Label {
            spec: label.clone(),
            position: Vec2::ZERO,
            alpha: 0.0,
            scale: 1.0,
        });
        self.objects.len() - 1
    }

    fn add_line(&mut self) -> DrawId {
        self.objects.push(Recorded::Line {
            from: Vec2::ZERO,
            to: Vec2::ZERO,
            stroke: None,
            alpha: LINK_IDLE_ALPHA,
        });
        self.objects.len() - 1
    }

    fn set_position(&mut self, id: DrawId, new_position: Vec2) {
        match &mut self.objects[id] {
            Recorded::Node { position, .. } | Recorded::Label { position, .. } => {
                *position = new_position
            }
            Recorded::Line { .. } => {}
        }
    }

    fn set_alpha(&mut self, id: DrawId, new_alpha: f64) {
        match &mut self.objects[id] {
            Recorded::Node { alpha, .. }
            | Recorded::Label { alpha, .. }
            | Recorded::Line { alpha, .. } => *alpha = new_alpha,
        }
    }

    fn set_scale(&mut self, id: DrawId, new_scale: f64) {
        match &mut self.objects[id] {
            Recorded::Node { scale, .. } | Recorded::Label { scale, .. } => *scale = new_scale,
            Recorded::Line { .. } => {}
        }
    }

    fn set_line_geometry(&mut self, id: DrawId, new_from: Vec2, new_to: Vec2, new_stroke: &LineStroke) {
        if let Recorded::Line {
            from, to, stroke, ..
        } = &mut self.objects[id]
        {
            *from = new_from;
            *to = new_to;
            *stroke = Some(new_stroke.clone());
        }
    }

    fn set_view_transform(&mut self, transform: ViewTransform) {
        self.transform = transform;
    }

    fn present(&mut self) {
        self.presents += 1;
    }
}

// ============================================================================
// Render Entries
// ============================================================================

/// Drawable state for one node, one-to-one for the session's lifetime.
#[derive(Debug, Clone)]
pub struct NodeRenderEntry {
    pub color: String,
    pub alpha: f64,
    pub active: bool,
    pub gfx: DrawId,
    pub label: DrawId,
    pub label_alpha: f64,
    pub label_scale: f64,
}

/// Drawable state for one link.
#[derive(Debug, Clone)]
pub struct LinkRenderEntry {
    pub color: String,
    pub alpha: f64,
    pub active: bool,
    pub gfx: DrawId,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_color_variants() {
        let theme = StaticTheme::default();
        assert_eq!(resolve_color("#abcdef", &theme), "#abcdef");
        assert_eq!(resolve_color("var(--secondary)", &theme), "#284b63");
        assert_eq!(resolve_color("var(--nope)", &theme), NEUTRAL_COLOR);
        assert_eq!(resolve_color("none", &theme), NEUTRAL_COLOR);
        assert_eq!(resolve_color("rebeccapurple", &theme), NEUTRAL_COLOR);
    }

    #[test]
    fn test_style_map_resolves_palette() {
        let map = StyleMap::resolve(&StaticTheme::default());
        assert_eq!(map.dark, "#2b2b2b");
        assert_eq!(map.lightgray, "#e5e5e5");
        assert_eq!(map.body_font, "Schibsted Grotesk");
        // missing variables degrade to neutral
        let empty = StaticTheme::new(&[]);
        let map = StyleMap::resolve(&empty);
        assert_eq!(map.secondary, NEUTRAL_COLOR);
    }

    #[test]
    fn test_glyph_per_kind() {
        let styles = NodeStyles::default();
        let theme = StaticTheme::default();

        let circle = build_glyph(NodeKind::Regular, 5.0, &styles, &theme);
        assert!(matches!(circle, Glyph::Circle { .. }));
        assert_eq!(circle.hit_radius(), 5.0);

        let tag = build_glyph(NodeKind::Tag, 5.0, &styles, &theme);
        match &tag {
            Glyph::Hashtag { outline, hole, .. } => {
                assert_eq!(outline.len(), HASHTAG_OUTLINE.len());
                assert_eq!(hole.len(), HASHTAG_HOLE.len());
            }
            other => panic!("expected hashtag glyph, got {:?}", other),
        }
        assert_eq!(tag.hit_radius(), 6.0); // radius * backgroundRadius 1.2

        let zettel = build_glyph(NodeKind::Zettel, 5.0, &styles, &theme);
        match zettel {
            Glyph::Symbol {
                symbol, font_size, ..
            } => {
                assert_eq!(symbol, 'ζ');
                assert_eq!(font_size, 7.0);
            }
            other => panic!("expected symbol glyph, got {:?}", other),
        }
    }

    #[test]
    fn test_stroke_none_omitted() {
        let mut styles = NodeStyles::default();
        styles.regular_node.stroke_color = "none".to_string();
        let glyph = build_glyph(NodeKind::Regular, 3.0, &styles, &StaticTheme::default());
        assert!(matches!(glyph, Glyph::Circle { stroke: None, .. }));
    }

    #[test]
    fn test_hashtag_path_scales_with_radius() {
        let styles = NodeStyles::default();
        let theme = StaticTheme::default();
        let small = build_glyph(NodeKind::Tag, 3.0, &styles, &theme);
        let large = build_glyph(NodeKind::Tag, 9.0, &styles, &theme);
        let (Glyph::Hashtag { outline: s, .. }, Glyph::Hashtag { outline: l, .. }) =
            (&small, &large)
        else {
            panic!("expected hashtag glyphs");
        };
        assert!((l[0].x - s[0].x * 3.0).abs() < 1e-9);
        assert!((l[0].y - s[0].y * 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_recording_surface_roundtrip() {
        let mut surface = RecordingSurface::new();
        surface.init(300.0, 200.0).unwrap();
        let glyph = build_glyph(
            NodeKind::Regular,
            4.0,
            &NodeStyles::default(),
            &StaticTheme::default(),
        );
        let id = surface.add_node(&glyph);
        surface.set_position(id, Vec2::new(10.0, 20.0));
        surface.set_alpha(id, 0.5);
        assert_eq!(surface.position_of(id), Vec2::new(10.0, 20.0));
        assert_eq!(surface.alpha_of(id), 0.5);
        surface.present();
        assert_eq!(surface.presents, 1);
    }

    #[test]
    fn test_recording_surface_init_failure() {
        let mut surface = RecordingSurface::new();
        surface.fail_init = true;
        assert!(matches!(
            surface.init(1.0, 1.0),
            Err(RenderError::Init(_))
        ));
    }
}
