//! Sitegraph library - re-exports for testing and external use.
//!
//! An interactive knowledge-graph view engine: it loads a precomputed
//! content index, selects a depth-bounded neighborhood around the current
//! document, lays it out with a force simulation, and drives a retained-mode
//! render surface with hover, drag, zoom, and click interaction.
//!
//! The engine is organized into the following modules:
//!
//! - `models`: Content-index entries, simulation nodes/links, configuration
//! - `loader`: Content-index fetching and link-set construction
//! - `neighborhood`: Depth-bounded BFS selection around the focus node
//! - `layout`: Force-directed simulation (charge, centering, links, collision)
//! - `render`: Glyphs, theme resolution, and the draw-surface capability
//! - `interact`: Pointer/drag/zoom state machine
//! - `tween`: Timed interpolation of visual properties
//! - `visited`: Persisted set of previously visited documents
//! - `session`: Per-view sessions and the page-level manager

pub mod interact;
pub mod layout;
pub mod loader;
pub mod models;
pub mod neighborhood;
pub mod render;
pub mod session;
pub mod tween;
pub mod visited;

// ============================================================================
// Configuration
// ============================================================================

/// Default path of the content index emitted by the site build.
pub const INDEX_PATH: &str = "static/contentIndex.json";

/// Sled database path for visited-set persistence.
pub const DB_PATH: &str = ".sitegraph_db";
