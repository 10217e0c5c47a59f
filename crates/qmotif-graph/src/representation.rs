//! Choice between the two graph representations.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use qmotif_ir::Circuit;
use serde::{Deserialize, Serialize, Serializer};

use crate::dataflow::{DataflowGraph, build_dataflow};
use crate::error::GraphResult;
use crate::export::NodeLink;
use crate::interaction::{InteractionGraph, TargetPolicy, build_interaction};
use crate::multigraph::{NodeId, NodeLabel};

/// Graph representation to build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GraphMode {
    /// One node per operation, edges along wires.
    #[default]
    Dataflow,
    /// One node per wire instance at a multi-wire operation.
    Comm,
}

impl GraphMode {
    /// Name used in output paths and reports.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Dataflow => "dataflow",
            Self::Comm => "comm",
        }
    }
}

impl fmt::Display for GraphMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GraphMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "dataflow" => Ok(Self::Dataflow),
            "comm" | "interaction" => Ok(Self::Comm),
            other => Err(format!("unknown graph mode '{other}', expected dataflow or comm")),
        }
    }
}

/// A graph of either representation.
#[derive(Debug, Clone, PartialEq)]
pub enum CircuitGraph {
    /// Dataflow graph.
    Dataflow(DataflowGraph),
    /// Interaction graph.
    Interaction(InteractionGraph),
}

impl CircuitGraph {
    /// Build the representation selected by `mode`.
    pub fn build(circuit: &Circuit, mode: GraphMode, policy: TargetPolicy) -> GraphResult<Self> {
        Ok(match mode {
            GraphMode::Dataflow => Self::Dataflow(build_dataflow(circuit)?),
            GraphMode::Comm => Self::Interaction(build_interaction(circuit, policy)?),
        })
    }

    /// Representation of this graph.
    pub fn mode(&self) -> GraphMode {
        match self {
            Self::Dataflow(_) => GraphMode::Dataflow,
            Self::Interaction(_) => GraphMode::Comm,
        }
    }

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        match self {
            Self::Dataflow(g) => g.node_count(),
            Self::Interaction(g) => g.node_count(),
        }
    }

    /// Number of edge records.
    pub fn edge_count(&self) -> usize {
        match self {
            Self::Dataflow(g) => g.edge_count(),
            Self::Interaction(g) => g.edge_count(),
        }
    }

    /// Subgraph induced by `set`, same representation.
    pub fn induced_subgraph(&self, set: &BTreeSet<NodeId>) -> Self {
        match self {
            Self::Dataflow(g) => Self::Dataflow(g.induced_subgraph(set)),
            Self::Interaction(g) => Self::Interaction(g.induced_subgraph(set)),
        }
    }

    /// Display labels of the nodes in id order.
    pub fn node_labels(&self) -> Vec<String> {
        match self {
            Self::Dataflow(g) => g.nodes().map(|(_, n)| n.display_label()).collect(),
            Self::Interaction(g) => g.nodes().map(|(_, n)| n.display_label()).collect(),
        }
    }
}

impl Serialize for CircuitGraph {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Dataflow(g) => NodeLink::new(g).serialize(serializer),
            Self::Interaction(g) => NodeLink::new(g).serialize(serializer),
        }
    }
}
