//! Interaction-flow graphs: one node per wire at each multi-wire operation.
//!
//! Flow edges follow a wire through time. Interaction edges join the wires of
//! one operation as a star onto its target. Single-wire operations and
//! non-interacting directives (barrier, snapshot, delay) produce no nodes.

use std::fmt;
use std::str::FromStr;

use qmotif_ir::{Circuit, WireId};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::GraphResult;
use crate::multigraph::{EdgeRole, MultiDiGraph, NodeId, NodeLabel};

/// One wire taking part in one multi-wire operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractionNode {
    /// The wire.
    pub wire: WireId,
    /// Display label, `Q{wire}`.
    pub label: String,
    /// Name of the owning operation.
    pub operation: String,
    /// Layer of the owning operation.
    pub layer: u32,
}

impl NodeLabel for InteractionNode {
    fn operation(&self) -> &str {
        &self.operation
    }

    fn display_label(&self) -> String {
        self.label.clone()
    }

    fn layer(&self) -> u32 {
        self.layer
    }

    fn row(&self) -> f64 {
        f64::from(self.wire.0)
    }
}

/// Edge of an interaction graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum InteractionEdge {
    /// Previous instance of a wire to its next instance.
    Flow,
    /// Control to target within one operation.
    Interaction {
        /// Name of the operation.
        operation: String,
    },
}

impl EdgeRole for InteractionEdge {
    fn kind(&self) -> &'static str {
        match self {
            Self::Flow => "flow",
            Self::Interaction { .. } => "interaction",
        }
    }

    fn label(&self) -> &str {
        match self {
            Self::Flow => "",
            Self::Interaction { operation } => operation,
        }
    }

    fn is_interaction(&self) -> bool {
        matches!(self, Self::Interaction { .. })
    }

    fn weight(&self) -> u32 {
        match self {
            Self::Flow => 1,
            Self::Interaction { .. } => 2,
        }
    }
}

/// Which wire of a multi-wire operation is the target.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TargetPolicy {
    /// The last operand is the target, all others are controls.
    #[default]
    LastWire,
    /// The first operand is the target.
    FirstWire,
}

impl TargetPolicy {
    /// Position of the target among `arity` operands.
    fn target_position(self, arity: usize) -> usize {
        match self {
            Self::LastWire => arity - 1,
            Self::FirstWire => 0,
        }
    }
}

impl fmt::Display for TargetPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LastWire => write!(f, "last-wire"),
            Self::FirstWire => write!(f, "first-wire"),
        }
    }
}

impl FromStr for TargetPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "last-wire" | "last" => Ok(Self::LastWire),
            "first-wire" | "first" => Ok(Self::FirstWire),
            other => Err(format!(
                "unknown target policy '{other}', expected last-wire or first-wire"
            )),
        }
    }
}

/// Interaction multigraph.
pub type InteractionGraph = MultiDiGraph<InteractionNode, InteractionEdge>;

/// Build the interaction graph of a flattened circuit.
pub fn build_interaction(circuit: &Circuit, policy: TargetPolicy) -> GraphResult<InteractionGraph> {
    let mut graph = InteractionGraph::new();
    let mut last_node: FxHashMap<WireId, NodeId> = FxHashMap::default();
    let mut depth: FxHashMap<WireId, u32> = FxHashMap::default();

    for op in circuit.operations().iter().filter(|op| op.is_interaction()) {
        let layer = op
            .wires
            .iter()
            .map(|w| depth.get(w).copied().unwrap_or(0))
            .max()
            .unwrap_or(0)
            + 1;

        let mut instance = Vec::with_capacity(op.wires.len());
        for &wire in &op.wires {
            let id = graph.add_node(InteractionNode {
                wire,
                label: format!("Q{}", wire.0),
                operation: op.name.clone(),
                layer,
            });
            if let Some(prev) = last_node.insert(wire, id) {
                graph.add_edge(prev, id, InteractionEdge::Flow)?;
            }
            depth.insert(wire, layer);
            instance.push(id);
        }

        let target_pos = policy.target_position(instance.len());
        let target = instance[target_pos];
        for (pos, &control) in instance.iter().enumerate() {
            if pos != target_pos {
                graph.add_edge(
                    control,
                    target,
                    InteractionEdge::Interaction {
                        operation: op.name.clone(),
                    },
                )?;
            }
        }
    }

    trace!(
        "Built interaction graph for '{}': {} nodes, {} edges",
        circuit.name(),
        graph.node_count(),
        graph.edge_count()
    );
    Ok(graph)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count_interactions(g: &InteractionGraph) -> usize {
        g.edges().filter(|(_, _, e)| e.is_interaction()).count()
    }

    #[test]
    fn test_single_wire_and_barrier_skipped() {
        let mut circuit = Circuit::with_wires("skip", 2);
        circuit
            .h(WireId(0))
            .unwrap()
            .barrier_all()
            .unwrap()
            .measure(WireId(1))
            .unwrap();

        let g = build_interaction(&circuit, TargetPolicy::LastWire).unwrap();
        assert!(g.is_empty());
    }

    #[test]
    fn test_cx_cx_flow_and_interaction() {
        let mut circuit = Circuit::with_wires("pair", 2);
        circuit
            .x(WireId(0))
            .unwrap()
            .cx(WireId(0), WireId(1))
            .unwrap()
            .cx(WireId(0), WireId(1))
            .unwrap();

        let g = build_interaction(&circuit, TargetPolicy::LastWire).unwrap();
        assert_eq!(g.node_count(), 4);
        assert_eq!(count_interactions(&g), 2);
        // Q0 at the first cx flows into Q0 at the second
        assert_eq!(g.edges_between(NodeId(0), NodeId(2)), &[InteractionEdge::Flow]);
        assert_eq!(
            g.edges_between(NodeId(0), NodeId(1)),
            &[InteractionEdge::Interaction {
                operation: "cx".into()
            }]
        );

        let node = g.node(NodeId(3)).unwrap();
        assert_eq!(node.label, "Q1");
        assert_eq!(node.layer, 2);
    }

    #[test]
    fn test_ccx_star_onto_target() {
        let mut circuit = Circuit::with_wires("toffoli", 3);
        circuit.ccx(WireId(0), WireId(1), WireId(2)).unwrap();

        let last = build_interaction(&circuit, TargetPolicy::LastWire).unwrap();
        assert_eq!(count_interactions(&last), 2);
        assert_eq!(last.in_degree(NodeId(2)), 2);

        let first = build_interaction(&circuit, TargetPolicy::FirstWire).unwrap();
        assert_eq!(count_interactions(&first), 2);
        assert_eq!(first.in_degree(NodeId(0)), 2);
        assert_eq!(first.out_degree(NodeId(2)), 1);
    }

    #[test]
    fn test_edge_tags() {
        assert_eq!(InteractionEdge::Flow.tag(), "flow_");
        let cz = InteractionEdge::Interaction {
            operation: "cz".into(),
        };
        assert_eq!(cz.tag(), "interaction_cz");
        assert_eq!(cz.weight(), 2);
    }

    #[test]
    fn test_target_policy_parse() {
        assert_eq!("last-wire".parse::<TargetPolicy>(), Ok(TargetPolicy::LastWire));
        assert_eq!("FIRST".parse::<TargetPolicy>(), Ok(TargetPolicy::FirstWire));
        assert!("middle".parse::<TargetPolicy>().is_err());
        assert_eq!(TargetPolicy::FirstWire.to_string(), "first-wire");
    }
}
