//! Wire-flow ("dataflow") graphs: one node per operation.

use qmotif_ir::{Circuit, WireId};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::GraphResult;
use crate::multigraph::{EdgeRole, MultiDiGraph, NodeId, NodeLabel};

/// One operation occurrence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationNode {
    /// Operation name.
    pub name: String,
    /// Wires the operation touches, in operand order.
    pub wires: Vec<WireId>,
    /// 1 + the highest layer among the previous operations on these wires.
    pub layer: u32,
    /// Mean wire index, 0 for an operation with no wires.
    pub mean_wire: f64,
}

impl NodeLabel for OperationNode {
    fn operation(&self) -> &str {
        &self.name
    }

    fn display_label(&self) -> String {
        self.name.clone()
    }

    fn layer(&self) -> u32 {
        self.layer
    }

    fn row(&self) -> f64 {
        self.mean_wire
    }
}

/// Dependency along one wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataflowEdge {
    /// The wire carrying the dependency.
    pub wire: WireId,
}

impl EdgeRole for DataflowEdge {
    fn kind(&self) -> &'static str {
        "dataflow"
    }

    fn label(&self) -> &str {
        ""
    }
}

/// Dataflow multigraph.
pub type DataflowGraph = MultiDiGraph<OperationNode, DataflowEdge>;

/// Build the dataflow graph of a flattened circuit.
///
/// Node ids follow operation order. For every wire, an edge links each
/// operation to the next operation that touches the same wire.
pub fn build_dataflow(circuit: &Circuit) -> GraphResult<DataflowGraph> {
    let mut graph = DataflowGraph::new();
    let mut last_node: FxHashMap<WireId, NodeId> = FxHashMap::default();
    let mut depth: FxHashMap<WireId, u32> = FxHashMap::default();

    for op in circuit.operations() {
        let layer = op
            .wires
            .iter()
            .map(|w| depth.get(w).copied().unwrap_or(0))
            .max()
            .unwrap_or(0)
            + 1;

        let id = graph.add_node(OperationNode {
            name: op.name.clone(),
            wires: op.wires.clone(),
            layer,
            mean_wire: op.mean_wire(),
        });

        for &wire in &op.wires {
            if let Some(prev) = last_node.insert(wire, id) {
                graph.add_edge(prev, id, DataflowEdge { wire })?;
            }
            depth.insert(wire, layer);
        }
    }

    trace!(
        "Built dataflow graph for '{}': {} nodes, {} edges",
        circuit.name(),
        graph.node_count(),
        graph.edge_count()
    );
    Ok(graph)
}
