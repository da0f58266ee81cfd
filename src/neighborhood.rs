//! Depth-bounded neighborhood selection around a focus node.
//!
//! Breadth-first expansion over the undirected closure of the link set. The
//! frontier is delimited by a sentinel marker re-inserted at each boundary;
//! the depth counter decrements each time the sentinel is seen and expansion
//! stops once it is exhausted. Nodes are marked visited when first enqueued,
//! so cycles are never re-expanded and identical inputs always produce an
//! identical result.

use crate::loader::GraphData;
use crate::models::IdLink;
use std::collections::{BTreeSet, HashMap, VecDeque};

/// The selected subgraph: node ids plus the link subset whose endpoints both
/// lie in the node set. Both lists are sorted for determinism.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Neighborhood {
    pub ids: Vec<String>,
    pub links: Vec<IdLink>,
}

impl Neighborhood {
    pub fn contains(&self, id: &str) -> bool {
        self.ids.iter().any(|n| n == id)
    }
}

/// Worklist entries: either a node to expand or the frontier sentinel.
enum WorkItem {
    Node(String),
    Sentinel,
}

/// Select the neighborhood of `focus` within `depth` undirected hops.
/// A negative depth selects the entire node set, plus every tag node.
/// The focus node is always included, even when absent from the index.
pub fn select_neighborhood(focus: &str, depth: i32, data: &GraphData) -> Neighborhood {
    let mut selected: BTreeSet<String> = BTreeSet::new();

    if depth >= 0 {
        // Undirected adjacency over the full link set
        let mut adjacency: HashMap<&str, Vec<&str>> = HashMap::new();
        for link in &data.links {
            adjacency
                .entry(link.source.as_str())
                .or_default()
                .push(link.target.as_str());
            adjacency
                .entry(link.target.as_str())
                .or_default()
                .push(link.source.as_str());
        }

        let mut remaining = depth;
        let mut visited: BTreeSet<String> = BTreeSet::new();
        let mut worklist: VecDeque<WorkItem> = VecDeque::new();
        worklist.push_back(WorkItem::Node(focus.to_string()));
        worklist.push_back(WorkItem::Sentinel);
        visited.insert(focus.to_string());

        while remaining >= 0 {
            let Some(item) = worklist.pop_front() else {
                break;
            };
            match item {
                WorkItem::Sentinel => {
                    // frontier exhausted: nothing left to expand, whatever
                    // depth budget remains
                    if worklist.is_empty() {
                        break;
                    }
                    remaining -= 1;
                    worklist.push_back(WorkItem::Sentinel);
                }
                WorkItem::Node(cur) => {
                    if let Some(neighbors) = adjacency.get(cur.as_str()) {
                        for &next in neighbors {
                            if visited.insert(next.to_string()) {
                                worklist.push_back(WorkItem::Node(next.to_string()));
                            }
                        }
                    }
                    selected.insert(cur);
                }
            }
        }
    } else {
        selected.extend(data.valid_ids.iter().cloned());
        selected.extend(data.tags.iter().cloned());
        selected.insert(focus.to_string());
    }

    // Induced link subset: both endpoints selected
    let mut links: Vec<IdLink> = data
        .links
        .iter()
        .filter(|l| selected.contains(&l.source) && selected.contains(&l.target))
        .cloned()
        .collect();
    links.sort();
    links.dedup();

    Neighborhood {
        ids: selected.into_iter().collect(),
        links,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::GraphDataLoader;
    use crate::models::{ContentIndex, ContentNode, GraphConfig};

    /// Build GraphData from (id, links, tags) triples.
    fn data_of(entries: &[(&str, &[&str], &[&str])]) -> GraphData {
        let index: ContentIndex = entries
            .iter()
            .map(|(id, links, tags)| {
                (
                    id.to_string(),
                    ContentNode {
                        title: id.to_uppercase(),
                        tags: tags.iter().map(|s| s.to_string()).collect(),
                        links: links.iter().map(|s| s.to_string()).collect(),
                        ..Default::default()
                    },
                )
            })
            .collect();
        GraphDataLoader::from_index(index).graph_data(&GraphConfig::default())
    }

    #[test]
    fn test_depth_zero_is_focus_only() {
        let data = data_of(&[("a", &["b"], &[]), ("b", &[], &[])]);
        let hood = select_neighborhood("a", 0, &data);
        assert_eq!(hood.ids, vec!["a".to_string()]);
        assert!(hood.links.is_empty());
    }

    #[test]
    fn test_depth_one_single_link() {
        let data = data_of(&[("a", &["b"], &[]), ("b", &[], &[])]);
        let hood = select_neighborhood("a", 1, &data);
        assert_eq!(hood.ids, vec!["a".to_string(), "b".to_string()]);
        assert_eq!(
            hood.links,
            vec![IdLink {
                source: "a".to_string(),
                target: "b".to_string()
            }]
        );
    }

    #[test]
    fn test_expansion_follows_incoming_links_too() {
        // c → a: undirected closure must pull c into a's neighborhood
        let data = data_of(&[("a", &[], &[]), ("c", &["a"], &[])]);
        let hood = select_neighborhood("a", 1, &data);
        assert!(hood.contains("c"));
    }

    #[test]
    fn test_exact_hop_bound() {
        // chain a-b-c-d: depth 2 from a is {a,b,c}, never d
        let data = data_of(&[
            ("a", &["b"], &[]),
            ("b", &["c"], &[]),
            ("c", &["d"], &[]),
            ("d", &[], &[]),
        ]);
        let hood = select_neighborhood("a", 2, &data);
        assert_eq!(
            hood.ids,
            vec!["a".to_string(), "b".to_string(), "c".to_string()]
        );
        for d in 0..5 {
            let hood = select_neighborhood("a", d, &data);
            let expected: usize = std::cmp::min(d as usize + 1, 4);
            assert_eq!(hood.ids.len(), expected, "depth {}", d);
        }
    }

    #[test]
    fn test_negative_depth_selects_everything() {
        let data = data_of(&[
            ("a", &["b"], &["x"]),
            ("b", &[], &[]),
            ("lonely", &[], &[]),
        ]);
        let hood = select_neighborhood("a", -1, &data);
        assert_eq!(
            hood.ids,
            vec![
                "a".to_string(),
                "b".to_string(),
                "lonely".to_string(),
                "tags/x".to_string()
            ]
        );
    }

    #[test]
    fn test_cycles_not_revisited() {
        // triangle a-b-c plus pendant d off c; unbounded-ish depth must
        // terminate and select each node exactly once
        let data = data_of(&[
            ("a", &["b"], &[]),
            ("b", &["c"], &[]),
            ("c", &["a", "d"], &[]),
            ("d", &[], &[]),
        ]);
        let hood = select_neighborhood("a", 10, &data);
        assert_eq!(
            hood.ids,
            vec![
                "a".to_string(),
                "b".to_string(),
                "c".to_string(),
                "d".to_string()
            ]
        );
        // links induced exactly once each
        assert_eq!(hood.links.len(), 4);
    }

    #[test]
    fn test_depth_counts_hops_on_cycle() {
        // 4-cycle a-b-c-d-a: depth 1 from a is {a,b,d}
        let data = data_of(&[
            ("a", &["b"], &[]),
            ("b", &["c"], &[]),
            ("c", &["d"], &[]),
            ("d", &["a"], &[]),
        ]);
        let hood = select_neighborhood("a", 1, &data);
        assert_eq!(
            hood.ids,
            vec!["a".to_string(), "b".to_string(), "d".to_string()]
        );
    }

    #[test]
    fn test_huge_depth_terminates_promptly() {
        // once the frontier empties the traversal must stop, not spin the
        // sentinel through the rest of the depth budget
        let data = data_of(&[("a", &["b"], &[]), ("b", &[], &[])]);
        let hood = select_neighborhood("a", i32::MAX, &data);
        assert_eq!(hood.ids, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_focus_missing_from_index_is_isolated() {
        let data = data_of(&[("a", &[], &[])]);
        let hood = select_neighborhood("ghost", 2, &data);
        assert_eq!(hood.ids, vec!["ghost".to_string()]);
        assert!(hood.links.is_empty());
    }

    #[test]
    fn test_tag_links_traversed() {
        // a and b share tag x; depth 2 from a reaches b through tags/x
        let data = data_of(&[("a", &[], &["x"]), ("b", &[], &["x"])]);
        let hood = select_neighborhood("a", 2, &data);
        assert_eq!(
            hood.ids,
            vec!["a".to_string(), "b".to_string(), "tags/x".to_string()]
        );
    }

    #[test]
    fn test_deterministic_across_builds() {
        let data = data_of(&[
            ("a", &["b", "c"], &["x"]),
            ("b", &["c"], &[]),
            ("c", &["a"], &["x", "y"]),
            ("d", &["a"], &[]),
        ]);
        let first = select_neighborhood("a", 2, &data);
        let second = select_neighborhood("a", 2, &data);
        assert_eq!(first, second);
    }
}
