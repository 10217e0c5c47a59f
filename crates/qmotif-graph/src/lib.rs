//! Circuit graphs for qmotif
//!
//! Two directed multigraph views of a flattened circuit:
//!
//! - **Dataflow** ([`build_dataflow`]): one [`OperationNode`] per operation;
//!   a [`DataflowEdge`] links each operation to the next one on the same wire,
//!   so each wire traces a simple path in operation order.
//! - **Interaction** ([`build_interaction`]): one [`InteractionNode`] per wire
//!   taking part in a multi-wire operation. [`InteractionEdge::Flow`] follows
//!   a wire through time; [`InteractionEdge::Interaction`] joins controls to
//!   the target chosen by a [`TargetPolicy`].
//!
//! Both are [`MultiDiGraph`]s: parallel edges are kept as ordered records per
//! node pair, and induced subgraphs keep the parent's node ids.
//!
//! # Example
//!
//! ```rust
//! use qmotif_graph::{CircuitGraph, GraphMode, NodeId, TargetPolicy};
//! use qmotif_ir::{Circuit, WireId};
//!
//! let mut circuit = Circuit::with_wires("pair", 2);
//! circuit.x(WireId(0)).unwrap();
//! circuit.x(WireId(1)).unwrap();
//! circuit.cx(WireId(0), WireId(1)).unwrap();
//! circuit.cx(WireId(0), WireId(1)).unwrap();
//!
//! let CircuitGraph::Dataflow(g) =
//!     CircuitGraph::build(&circuit, GraphMode::Dataflow, TargetPolicy::default()).unwrap()
//! else {
//!     unreachable!()
//! };
//! assert_eq!(g.node_count(), 4);
//! assert_eq!(g.in_degree(NodeId(3)), 2);
//! ```

pub mod dataflow;
pub mod error;
pub mod export;
pub mod interaction;
pub mod multigraph;
pub mod representation;

pub use dataflow::{DataflowEdge, DataflowGraph, OperationNode, build_dataflow};
pub use error::{GraphError, GraphResult};
pub use export::{NodeLink, to_dot};
pub use interaction::{
    InteractionEdge, InteractionGraph, InteractionNode, TargetPolicy, build_interaction,
};
pub use multigraph::{EdgeRole, MultiDiGraph, NodeId, NodeLabel};
pub use representation::{CircuitGraph, GraphMode};
