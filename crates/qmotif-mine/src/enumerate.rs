//! Exhaustive enumeration of connected induced subgraphs.

use std::collections::BTreeSet;

use qmotif_graph::{MultiDiGraph, NodeId};

/// Every connected node set of exactly `k` nodes.
///
/// Grows all sets level by level from the singletons, adding one node from
/// the open neighborhood (either edge direction) at each step. Sets are
/// deduplicated regardless of the order their nodes were added in. Returns
/// nothing for `k == 0` or when no set reaches size `k`.
pub fn connected_subsets<N, E>(graph: &MultiDiGraph<N, E>, k: usize) -> BTreeSet<BTreeSet<NodeId>> {
    if k == 0 || graph.node_count() < k {
        return BTreeSet::new();
    }

    let mut current: BTreeSet<BTreeSet<NodeId>> =
        graph.node_ids().map(|id| BTreeSet::from([id])).collect();

    for _ in 1..k {
        let mut next = BTreeSet::new();
        for set in &current {
            for neighbor in graph.open_neighborhood(set) {
                let mut grown = set.clone();
                grown.insert(neighbor);
                next.insert(grown);
            }
        }
        if next.is_empty() {
            return next;
        }
        current = next;
    }

    current
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph(n: u32, edges: &[(u32, u32)]) -> MultiDiGraph<(), ()> {
        let mut g = MultiDiGraph::new();
        for _ in 0..n {
            g.add_node(());
        }
        for &(u, v) in edges {
            g.add_edge(NodeId(u), NodeId(v), ()).unwrap();
        }
        g
    }

    fn ids(set: &[u32]) -> BTreeSet<NodeId> {
        set.iter().copied().map(NodeId).collect()
    }

    #[test]
    fn test_zero_and_oversized_k() {
        let g = graph(3, &[(0, 1), (1, 2)]);
        assert!(connected_subsets(&g, 0).is_empty());
        assert!(connected_subsets(&g, 4).is_empty());
    }

    #[test]
    fn test_singletons() {
        let g = graph(3, &[]);
        assert_eq!(connected_subsets(&g, 1).len(), 3);
    }

    #[test]
    fn test_path_pairs_and_triples() {
        let g = graph(4, &[(0, 1), (1, 2), (2, 3)]);
        let pairs = connected_subsets(&g, 2);
        assert_eq!(pairs.len(), 3);
        assert!(pairs.contains(&ids(&[1, 2])));
        assert!(!pairs.contains(&ids(&[0, 2])));
        assert_eq!(connected_subsets(&g, 3).len(), 2);
    }

    #[test]
    fn test_direction_ignored_for_connectivity() {
        // 0 -> 1 <- 2: {0, 1, 2} is connected only through predecessors of 1
        let g = graph(3, &[(0, 1), (2, 1)]);
        let triples = connected_subsets(&g, 3);
        assert_eq!(triples.len(), 1);
        assert!(triples.contains(&ids(&[0, 1, 2])));
    }

    #[test]
    fn test_disconnected_components_do_not_join() {
        let g = graph(4, &[(0, 1), (2, 3)]);
        assert_eq!(connected_subsets(&g, 2).len(), 2);
        assert!(connected_subsets(&g, 3).is_empty());
    }

    #[test]
    fn test_star_combinations() {
        // Center 0 with four leaves: every 3-set containing the center
        let g = graph(5, &[(0, 1), (0, 2), (0, 3), (0, 4)]);
        assert_eq!(connected_subsets(&g, 3).len(), 6);
    }

    #[test]
    fn test_idempotent() {
        let g = graph(5, &[(0, 1), (1, 2), (2, 3), (3, 4), (4, 0), (1, 3)]);
        assert_eq!(connected_subsets(&g, 3), connected_subsets(&g, 3));
    }
}
