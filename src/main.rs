//! Sitegraph - an interactive knowledge-graph view engine.
//!
//! This binary is a headless driver: it loads a content index from a local
//! file or URL, builds the graph view for a focus document against the
//! recording surface, runs the simulation until it settles, and prints a
//! summary of the resulting layout.
//!
//! Usage: `sitegraph <index.json|url> [focus-id]`

use sitegraph::loader::GraphDataLoader;
use sitegraph::models::{GraphConfig, Vec2};
use sitegraph::render::{RecordingSurface, StaticTheme};
use sitegraph::session::{GraphManager, SurfaceProvider, SurfaceTarget};
use sitegraph::visited::{SledStore, VisitedStore};
use sitegraph::{DB_PATH, INDEX_PATH};

/// Provides recording surfaces sized like the production containers.
struct HeadlessProvider;

impl SurfaceProvider for HeadlessProvider {
    type Surface = RecordingSurface;

    fn acquire(&mut self, _target: SurfaceTarget) -> Option<RecordingSurface> {
        Some(RecordingSurface::new())
    }

    fn viewport(&self, target: SurfaceTarget) -> (f64, f64) {
        match target {
            SurfaceTarget::Page => (400.0, 300.0),
            SurfaceTarget::Overlay => (1200.0, 800.0),
        }
    }
}

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() {
    let mut args = std::env::args().skip(1);
    let source = args.next().unwrap_or_else(|| INDEX_PATH.to_string());
    let focus = args.next().unwrap_or_else(|| "index".to_string());

    let loader = if source.starts_with("http://") || source.starts_with("https://") {
        GraphDataLoader::fetch(&source)
            .await
            .expect("Failed to fetch content index")
    } else {
        let json = std::fs::read_to_string(&source).expect("Failed to read content index");
        GraphDataLoader::from_json(&json).expect("Failed to parse content index")
    };

    let visited = match sled::open(DB_PATH) {
        Ok(db) => match SledStore::open(&db) {
            Ok(store) => VisitedStore::new(Box::new(store)),
            Err(_) => VisitedStore::in_memory(),
        },
        Err(_) => VisitedStore::in_memory(),
    };

    let mut manager = GraphManager::new(
        loader,
        GraphConfig::default(),
        None,
        visited,
        HeadlessProvider,
        StaticTheme::default(),
    );

    manager.on_navigation(&focus);
    if manager.page().is_none() {
        println!("No graph container available for '{}'", focus);
        return;
    }

    // 16ms frames until the simulation cools, capped at ten seconds
    let mut now = 0.0;
    while now < 10_000.0 {
        manager.advance(now);
        if manager.page().map(|p| p.sim().settled()).unwrap_or(true) {
            break;
        }
        now += 16.0;
    }

    if let Some(page) = manager.page() {
        println!(
            "Graph for '{}': {} nodes, {} links, settled after {:.0}ms",
            focus,
            page.sim().nodes().len(),
            page.link_entries().len(),
            now
        );
        for (i, node) in page.sim().nodes().iter().enumerate() {
            let Vec2 { x, y } = node.position;
            println!(
                "  {:>3}  {:<24} ({:>8.2}, {:>8.2})  r={:.2}",
                i,
                node.id,
                x,
                y,
                page.sim().radius(i)
            );
        }
        println!("Frames presented: {}", page.surface().presents);
    }
}
