//! Canonical labels must not depend on node numbering or edge insertion order.

use proptest::prelude::*;
use qmotif_graph::{
    CircuitGraph, DataflowEdge, InteractionEdge, InteractionNode, MultiDiGraph, NodeId,
    OperationNode,
};
use qmotif_ir::WireId;
use qmotif_mine::{CanonicalLabeler, LabelMode, PatternTable, connected_subsets};

/// Node labels, then edges as (from, to, wire) over those nodes.
type Shape = (Vec<&'static str>, Vec<(usize, usize, u32)>);

fn arb_shape() -> impl Strategy<Value = Shape> {
    (2_usize..=7).prop_flat_map(|n| {
        let labels = prop::collection::vec(prop::sample::select(vec!["h", "x", "cx", "ccx"]), n);
        let edges = prop::collection::vec((0..n, 0..n, 0_u32..3), 0..14)
            .prop_map(|edges: Vec<(usize, usize, u32)>| {
                edges.into_iter().filter(|(u, v, _)| u != v).collect::<Vec<_>>()
            });
        (labels, edges)
    })
}

/// The shape plus a node insertion order and an edge insertion order.
fn arb_relabeling() -> impl Strategy<Value = (Shape, Vec<usize>, Vec<usize>)> {
    arb_shape().prop_flat_map(|shape| {
        let nodes = Just((0..shape.0.len()).collect::<Vec<_>>()).prop_shuffle();
        let edges = Just((0..shape.1.len()).collect::<Vec<_>>()).prop_shuffle();
        (Just(shape), nodes, edges)
    })
}

fn dataflow(shape: &Shape, node_order: &[usize], edge_order: &[usize]) -> CircuitGraph {
    let (labels, edges) = shape;
    let mut g = MultiDiGraph::new();
    let mut ids = vec![NodeId(0); labels.len()];
    for &i in node_order {
        ids[i] = g.add_node(OperationNode {
            name: labels[i].to_string(),
            wires: vec![],
            layer: 1,
            mean_wire: 0.0,
        });
    }
    for &e in edge_order {
        let (u, v, wire) = edges[e];
        g.add_edge(ids[u], ids[v], DataflowEdge { wire: WireId(wire) })
            .unwrap();
    }
    CircuitGraph::Dataflow(g)
}

fn interaction(shape: &Shape, node_order: &[usize], edge_order: &[usize]) -> CircuitGraph {
    let (labels, edges) = shape;
    let mut g = MultiDiGraph::new();
    let mut ids = vec![NodeId(0); labels.len()];
    for &i in node_order {
        ids[i] = g.add_node(InteractionNode {
            wire: WireId(0),
            label: "Q0".to_string(),
            operation: labels[i].to_string(),
            layer: 1,
        });
    }
    for &e in edge_order {
        let (u, v, kind) = edges[e];
        let edge = if kind == 0 {
            InteractionEdge::Flow
        } else {
            InteractionEdge::Interaction {
                operation: labels[v].to_string(),
            }
        };
        g.add_edge(ids[u], ids[v], edge).unwrap();
    }
    CircuitGraph::Interaction(g)
}

fn identity(len: usize) -> Vec<usize> {
    (0..len).collect()
}

proptest! {
    #[test]
    fn prop_dataflow_hash_ignores_numbering((shape, nodes, edges) in arb_relabeling()) {
        let original = dataflow(&shape, &identity(shape.0.len()), &identity(shape.1.len()));
        let relabeled = dataflow(&shape, &nodes, &edges);

        let labeler = CanonicalLabeler::new(LabelMode::ByOperationName);
        prop_assert_eq!(labeler.label_graph(&original), labeler.label_graph(&relabeled));
        prop_assert!(labeler.structurally_equal(&original, &relabeled));
    }

    #[test]
    fn prop_interaction_hash_ignores_numbering((shape, nodes, edges) in arb_relabeling()) {
        let original = interaction(&shape, &identity(shape.0.len()), &identity(shape.1.len()));
        let relabeled = interaction(&shape, &nodes, &edges);

        for mode in [LabelMode::ByOperationName, LabelMode::ByEdgeRole] {
            let labeler = CanonicalLabeler::new(mode);
            prop_assert_eq!(labeler.label_graph(&original), labeler.label_graph(&relabeled));
        }
    }

    #[test]
    fn prop_equal_hash_for_equal_structure(shape in arb_shape()) {
        // Verified buckets never split a graph from its own copy
        let graph = dataflow(&shape, &identity(shape.0.len()), &identity(shape.1.len()));
        let labeler = CanonicalLabeler::new(LabelMode::ByOperationName);
        let mut table = PatternTable::verified(labeler);
        table.record(labeler.label_graph(&graph), graph.clone());
        table.record(labeler.label_graph(&graph), graph);
        prop_assert_eq!(table.unique_patterns(), 1);
    }

    #[test]
    fn prop_enumeration_is_idempotent(shape in arb_shape(), k in 1_usize..4) {
        let CircuitGraph::Dataflow(g) =
            dataflow(&shape, &identity(shape.0.len()), &identity(shape.1.len()))
        else {
            unreachable!()
        };
        let first = connected_subsets(&g, k);
        prop_assert_eq!(&first, &connected_subsets(&g, k));
        prop_assert!(first.iter().all(|set| set.len() == k));
    }
}
