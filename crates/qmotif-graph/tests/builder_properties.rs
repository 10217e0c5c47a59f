//! Structural invariants of both graph builders over random circuits.

use proptest::prelude::*;
use qmotif_graph::{
    EdgeRole, InteractionEdge, NodeId, TargetPolicy, build_dataflow, build_interaction,
};
use qmotif_ir::{Circuit, Operation, WireId};

fn arb_operation(num_wires: u32) -> impl Strategy<Value = Operation> {
    let names = prop::sample::select(vec!["h", "x", "cx", "cz", "ccx", "barrier", "measure"]);
    (names, Just(num_wires)).prop_flat_map(|(name, n)| {
        let arity = match name {
            "cx" | "cz" => 2,
            "ccx" => 3,
            "barrier" => n as usize,
            _ => 1,
        }
        .min(n as usize);
        prop::sample::subsequence((0..n).collect::<Vec<_>>(), arity)
            .prop_shuffle()
            .prop_map(move |wires| Operation::new(name, wires.into_iter().map(WireId)))
    })
}

fn arb_circuit() -> impl Strategy<Value = Circuit> {
    (3_u32..=6).prop_flat_map(|n| {
        prop::collection::vec(arb_operation(n), 0..40).prop_map(move |ops| {
            let mut circuit = Circuit::with_wires("random", n);
            for op in ops {
                circuit.push_operation(op).unwrap();
            }
            circuit
        })
    })
}

fn flow_count(edges: &[InteractionEdge]) -> usize {
    edges.iter().filter(|e| **e == InteractionEdge::Flow).count()
}

proptest! {
    #[test]
    fn prop_dataflow_one_node_per_operation(circuit in arb_circuit()) {
        let g = build_dataflow(&circuit).unwrap();
        prop_assert_eq!(g.node_count(), circuit.num_operations());
    }

    #[test]
    fn prop_dataflow_wires_form_paths(circuit in arb_circuit()) {
        let g = build_dataflow(&circuit).unwrap();

        for wire in circuit.wires().iter().map(|w| w.id) {
            let touching: Vec<NodeId> = g
                .nodes()
                .filter(|(_, n)| n.wires.contains(&wire))
                .map(|(id, _)| id)
                .collect();
            let mut on_wire: Vec<(NodeId, NodeId)> = g
                .edges()
                .filter(|(_, _, e)| e.wire == wire)
                .map(|(u, v, _)| (u, v))
                .collect();
            on_wire.sort();

            let expected: Vec<(NodeId, NodeId)> =
                touching.windows(2).map(|p| (p[0], p[1])).collect();
            prop_assert_eq!(on_wire, expected);
        }
    }

    #[test]
    fn prop_interaction_star_per_operation(circuit in arb_circuit()) {
        for policy in [TargetPolicy::LastWire, TargetPolicy::FirstWire] {
            let g = build_interaction(&circuit, policy).unwrap();

            let interacting: Vec<&Operation> =
                circuit.operations().iter().filter(|op| op.is_interaction()).collect();
            let expected_nodes: usize = interacting.iter().map(|op| op.arity()).sum();
            let expected_edges: usize = interacting.iter().map(|op| op.arity() - 1).sum();

            prop_assert_eq!(g.node_count(), expected_nodes);
            let interaction_edges = g.edges().filter(|(_, _, e)| e.is_interaction()).count();
            prop_assert_eq!(interaction_edges, expected_edges);
        }
    }

    #[test]
    fn prop_interaction_flow_degree_at_most_one(circuit in arb_circuit()) {
        let g = build_interaction(&circuit, TargetPolicy::LastWire).unwrap();
        for id in g.node_ids() {
            let flow_in: usize = g
                .predecessors(id)
                .map(|p| flow_count(g.edges_between(p, id)))
                .sum();
            let flow_out: usize = g
                .successors(id)
                .map(|s| flow_count(g.edges_between(id, s)))
                .sum();
            prop_assert!(flow_in <= 1);
            prop_assert!(flow_out <= 1);
        }
    }
}
