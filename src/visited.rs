//! Session-persisted set of previously visited node identifiers.
//!
//! The store is only used to pick an alternate tint for already-seen nodes,
//! so every failure path degrades to an empty set instead of surfacing an
//! error. Storage is abstracted behind a minimal key-value capability: the
//! durable backend is a sled tree, and an in-memory substitute backs tests
//! and headless runs.

use chrono::Utc;
use std::collections::{HashMap, HashSet};

/// Key under which the visited id list is stored.
pub const VISITED_KEY: &str = "graph-visited";

/// Key for the RFC3339 timestamp of the most recent visit.
const LAST_VISIT_KEY: &str = "graph-visited:last";

// ============================================================================
// Key-Value Capability
// ============================================================================

/// Minimal string key-value storage. Implementations must not panic; callers
/// treat any `Err` as "storage unavailable" and continue.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), String>;
}

/// Non-persistent backend for tests and headless sessions.
#[derive(Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), String> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Durable backend on a sled tree.
pub struct SledStore {
    tree: sled::Tree,
}

impl SledStore {
    pub fn open(db: &sled::Db) -> Result<Self, String> {
        let tree = db.open_tree("graph:visited").map_err(|e| e.to_string())?;
        Ok(SledStore { tree })
    }
}

impl KeyValueStore for SledStore {
    fn get(&self, key: &str) -> Option<String> {
        match self.tree.get(key.as_bytes()) {
            Ok(Some(data)) => String::from_utf8(data.to_vec()).ok(),
            _ => None,
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), String> {
        self.tree
            .insert(key.as_bytes(), value.as_bytes())
            .map_err(|e| e.to_string())?;
        Ok(())
    }
}

/// Backend whose writes always fail, for exercising the degrade path.
#[cfg(test)]
pub struct BrokenStore;

#[cfg(test)]
impl KeyValueStore for BrokenStore {
    fn get(&self, _key: &str) -> Option<String> {
        None
    }
    fn set(&mut self, _key: &str, _value: &str) -> Result<(), String> {
        Err("storage unavailable".to_string())
    }
}

// ============================================================================
// Visited Store
// ============================================================================

pub struct VisitedStore {
    store: Box<dyn KeyValueStore>,
}

impl VisitedStore {
    pub fn new(store: Box<dyn KeyValueStore>) -> Self {
        VisitedStore { store }
    }

    pub fn in_memory() -> Self {
        VisitedStore::new(Box::new(MemoryStore::new()))
    }

    /// The set of previously visited identifiers. Unreadable or malformed
    /// storage yields the empty set.
    pub fn visited(&self) -> HashSet<String> {
        let raw = match self.store.get(VISITED_KEY) {
            Some(raw) => raw,
            None => return HashSet::new(),
        };
        serde_json::from_str::<Vec<String>>(&raw)
            .map(|ids| ids.into_iter().collect())
            .unwrap_or_default()
    }

    /// Record a visit. Write failures are swallowed: a broken store must not
    /// break navigation.
    pub fn add(&mut self, id: &str) {
        let mut ids: Vec<String> = {
            let set = self.visited();
            let mut v: Vec<String> = set.into_iter().collect();
            v.sort();
            v
        };
        if !ids.iter().any(|existing| existing == id) {
            ids.push(id.to_string());
            ids.sort();
        }
        if let Ok(json) = serde_json::to_string(&ids) {
            let _ = self.store.set(VISITED_KEY, &json);
        }
        let _ = self.store.set(LAST_VISIT_KEY, &Utc::now().to_rfc3339());
    }

    /// RFC3339 timestamp of the most recent recorded visit, if any.
    pub fn last_visited_at(&self) -> Option<String> {
        self.store.get(LAST_VISIT_KEY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_and_read_back() {
        let mut store = VisitedStore::in_memory();
        assert!(store.visited().is_empty());
        store.add("a");
        store.add("b");
        store.add("a"); // idempotent
        let visited = store.visited();
        assert_eq!(visited.len(), 2);
        assert!(visited.contains("a"));
        assert!(visited.contains("b"));
        assert!(store.last_visited_at().is_some());
    }

    #[test]
    fn test_malformed_value_degrades_to_empty() {
        let mut backing = MemoryStore::new();
        backing.set(VISITED_KEY, "{not a list").unwrap();
        let store = VisitedStore::new(Box::new(backing));
        assert!(store.visited().is_empty());
    }

    #[test]
    fn test_broken_storage_never_errors() {
        let mut store = VisitedStore::new(Box::new(BrokenStore));
        store.add("a"); // must not panic
        assert!(store.visited().is_empty());
        assert!(store.last_visited_at().is_none());
    }
}
