//! Content-index loading and link-set construction.
//!
//! The content index is a precomputed identifier → details mapping emitted by
//! the site build. This module fetches it (once — cached thereafter), builds
//! the directed link set filtered to valid targets, and synthesizes tag nodes
//! when tag inclusion is enabled. A missing or malformed entry degrades to an
//! isolated node labeled with its identifier; the loader never aborts a
//! session build.

use crate::models::{ContentIndex, ContentNode, GraphConfig, IdLink, NodeKind};
use std::collections::BTreeSet;

/// Prefix for synthesized tag node identifiers.
pub const TAG_PREFIX: &str = "tags/";

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, Clone)]
pub enum LoadError {
    /// Network fetch of the content index failed
    Fetch(String),
    /// The content index body could not be parsed as JSON
    Parse(String),
}

impl std::fmt::Display for LoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadError::Fetch(msg) => write!(f, "Content index fetch failed: {}", msg),
            LoadError::Parse(msg) => write!(f, "Content index parse failed: {}", msg),
        }
    }
}

impl std::error::Error for LoadError {}

// ============================================================================
// Loader
// ============================================================================

/// Owns the cached content index for the lifetime of the page. Fetched at
/// most once; navigation events rebuild sessions from the cached copy.
pub struct GraphDataLoader {
    index: ContentIndex,
}

impl GraphDataLoader {
    /// Build a loader from an already-materialized index (tests, demo).
    pub fn from_index(index: ContentIndex) -> Self {
        GraphDataLoader { index }
    }

    /// Parse the index from a JSON document.
    pub fn from_json(json: &str) -> Result<Self, LoadError> {
        let index: ContentIndex =
            serde_json::from_str(json).map_err(|e| LoadError::Parse(e.to_string()))?;
        Ok(GraphDataLoader { index })
    }

    /// Fetch the index over HTTP. This is the engine's only suspension point:
    /// it is awaited once before the first neighborhood is built.
    pub async fn fetch(url: &str) -> Result<Self, LoadError> {
        let resp = reqwest::get(url)
            .await
            .map_err(|e| LoadError::Fetch(e.to_string()))?;
        let index: ContentIndex = resp
            .json()
            .await
            .map_err(|e| LoadError::Parse(e.to_string()))?;
        Ok(GraphDataLoader { index })
    }

    pub fn index(&self) -> &ContentIndex {
        &self.index
    }

    /// Look up an entry, degrading to a default (isolated, untitled) node
    /// for identifiers the index does not know about.
    pub fn entry(&self, id: &str) -> ContentNode {
        self.index.get(id).cloned().unwrap_or_default()
    }

    /// Display text for a node: tag nodes render as `#tag / subtag`, known
    /// documents use their title, everything else falls back to the id.
    pub fn display_text(&self, id: &str) -> String {
        if let Some(tag) = id.strip_prefix(TAG_PREFIX) {
            return format!("#{}", tag.split('/').collect::<Vec<_>>().join(" / "));
        }
        match self.index.get(id) {
            Some(node) if !node.title.is_empty() => node.title.clone(),
            _ => id.to_string(),
        }
    }

    /// Build the full link set and tag node list for this index under the
    /// given configuration. Iteration is over sorted identifiers so the
    /// output is identical across runs.
    pub fn graph_data(&self, cfg: &GraphConfig) -> GraphData {
        let valid_ids: BTreeSet<String> = self.index.keys().cloned().collect();
        let mut links = Vec::new();
        let mut tags: BTreeSet<String> = BTreeSet::new();

        for source in &valid_ids {
            let details = &self.index[source];

            // Outgoing links, filtered to targets present in the index
            for dest in &details.links {
                if valid_ids.contains(dest) {
                    links.push(IdLink {
                        source: source.clone(),
                        target: dest.clone(),
                    });
                }
            }

            if cfg.show_tags {
                for tag in &details.tags {
                    if cfg.remove_tags.contains(tag) {
                        continue;
                    }
                    let tag_id = format!("{}{}", TAG_PREFIX, tag);
                    tags.insert(tag_id.clone());
                    links.push(IdLink {
                        source: source.clone(),
                        target: tag_id,
                    });
                }
            }
        }

        GraphData {
            valid_ids,
            links,
            tags: tags.into_iter().collect(),
        }
    }
}

/// Loader output consumed by the neighborhood selector: the set of document
/// identifiers, the directed link set (documents plus tag links), and the
/// synthesized tag node identifiers.
#[derive(Debug, Clone)]
pub struct GraphData {
    pub valid_ids: BTreeSet<String>,
    pub links: Vec<IdLink>,
    pub tags: Vec<String>,
}

impl GraphData {
    /// Kind of a node id within this data set.
    pub fn kind_of(&self, id: &str, index: &ContentIndex) -> NodeKind {
        if id.starts_with(TAG_PREFIX) {
            NodeKind::Tag
        } else {
            index.get(id).map(|n| n.kind).unwrap_or_default()
        }
    }
}
