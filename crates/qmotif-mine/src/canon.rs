//! Canonical structural labels for subgraphs.
//!
//! A subgraph is reduced to a simple labeled digraph (parallel edges
//! collapsed into one attributed edge) and hashed with a direction-aware
//! Weisfeiler-Lehman refinement. Equal hashes mean the subgraphs cannot be
//! told apart by the refinement; they are not a proof of isomorphism, which
//! is what [`CanonicalLabeler::structurally_equal`] is for.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use petgraph::algo::is_isomorphic_matching;
use petgraph::graph::{DiGraph, NodeIndex};
use qmotif_graph::{CircuitGraph, EdgeRole, GraphMode, MultiDiGraph, NodeId, NodeLabel};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Number of refinement rounds.
pub const WL_ITERATIONS: usize = 3;

/// Node label used by [`LabelMode::ByEdgeRole`].
pub const GENERIC_NODE_LABEL: &str = "node";

/// How nodes and collapsed edges are labeled before hashing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LabelMode {
    /// Nodes by operation name; edges by multiplicity.
    ByOperationName,
    /// Nodes by a shared token; edges by their sorted `{type}_{label}` tags.
    ByEdgeRole,
}

impl LabelMode {
    /// Default labeling for a graph representation.
    pub fn for_mode(mode: GraphMode) -> Self {
        match mode {
            GraphMode::Dataflow => Self::ByOperationName,
            GraphMode::Comm => Self::ByEdgeRole,
        }
    }
}

impl fmt::Display for LabelMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ByOperationName => write!(f, "by-operation-name"),
            Self::ByEdgeRole => write!(f, "by-edge-role"),
        }
    }
}

impl FromStr for LabelMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "by-operation-name" | "name" => Ok(Self::ByOperationName),
            "by-edge-role" | "role" => Ok(Self::ByEdgeRole),
            other => Err(format!(
                "unknown label mode '{other}', expected by-operation-name or by-edge-role"
            )),
        }
    }
}

/// 128-bit structural hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CanonicalHash([u8; 16]);

impl CanonicalHash {
    /// Raw bytes.
    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }

    /// First eight hex digits, for terminal output.
    pub fn short(&self) -> String {
        self.to_string()[..8].to_string()
    }
}

impl fmt::Display for CanonicalHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl Serialize for CanonicalHash {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// SHA-256 with a domain tag and a length prefix.
pub(crate) fn hash_with_domain(domain: &[u8], data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(b"QMOTIF:");
    hasher.update(domain);
    hasher.update(b":v1");
    hasher.update((data.len() as u64).to_le_bytes());
    hasher.update(data);
    hasher.finalize().into()
}

/// A subgraph with parallel edges collapsed and labels applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollapsedGraph {
    /// Node labels in node id order.
    pub nodes: BTreeMap<NodeId, String>,
    /// One attribute per connected ordered node pair.
    pub edges: BTreeMap<(NodeId, NodeId), String>,
}

impl CollapsedGraph {
    fn to_petgraph(&self) -> DiGraph<String, String> {
        let mut graph = DiGraph::with_capacity(self.nodes.len(), self.edges.len());
        let mut index: FxHashMap<NodeId, NodeIndex> = FxHashMap::default();
        for (&id, label) in &self.nodes {
            index.insert(id, graph.add_node(label.clone()));
        }
        for (&(u, v), attr) in &self.edges {
            graph.add_edge(index[&u], index[&v], attr.clone());
        }
        graph
    }
}

/// Computes canonical hashes under one [`LabelMode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanonicalLabeler {
    mode: LabelMode,
    iterations: usize,
}

impl CanonicalLabeler {
    /// Labeler with the default number of refinement rounds.
    pub fn new(mode: LabelMode) -> Self {
        Self {
            mode,
            iterations: WL_ITERATIONS,
        }
    }

    /// Override the number of refinement rounds.
    #[must_use]
    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    /// The labeling mode.
    pub fn mode(&self) -> LabelMode {
        self.mode
    }

    /// Collapse parallel edges and apply node labels.
    pub fn collapse<N: NodeLabel, E: EdgeRole>(
        &self,
        graph: &MultiDiGraph<N, E>,
    ) -> CollapsedGraph {
        let nodes = graph
            .nodes()
            .map(|(id, node)| {
                let label = match self.mode {
                    LabelMode::ByOperationName => node.operation().to_string(),
                    LabelMode::ByEdgeRole => GENERIC_NODE_LABEL.to_string(),
                };
                (id, label)
            })
            .collect();

        let edges = graph
            .edge_groups()
            .map(|(pair, records)| {
                let attr = match self.mode {
                    LabelMode::ByOperationName => records.len().to_string(),
                    LabelMode::ByEdgeRole => {
                        let mut tags: Vec<String> = records.iter().map(EdgeRole::tag).collect();
                        tags.sort();
                        tags.join("|")
                    }
                };
                (pair, attr)
            })
            .collect();

        CollapsedGraph { nodes, edges }
    }

    /// Canonical hash of a multigraph.
    pub fn label<N: NodeLabel, E: EdgeRole>(&self, graph: &MultiDiGraph<N, E>) -> CanonicalHash {
        self.hash_collapsed(&self.collapse(graph))
    }

    /// Canonical hash of either graph representation.
    pub fn label_graph(&self, graph: &CircuitGraph) -> CanonicalHash {
        match graph {
            CircuitGraph::Dataflow(g) => self.label(g),
            CircuitGraph::Interaction(g) => self.label(g),
        }
    }

    /// Collapse either graph representation.
    pub fn collapse_graph(&self, graph: &CircuitGraph) -> CollapsedGraph {
        match graph {
            CircuitGraph::Dataflow(g) => self.collapse(g),
            CircuitGraph::Interaction(g) => self.collapse(g),
        }
    }

    /// Exact labeled isomorphism of the collapsed forms.
    pub fn structurally_equal(&self, a: &CircuitGraph, b: &CircuitGraph) -> bool {
        if a.node_count() != b.node_count() {
            return false;
        }
        let ga = self.collapse_graph(a).to_petgraph();
        let gb = self.collapse_graph(b).to_petgraph();
        is_isomorphic_matching(&ga, &gb, |x, y| x == y, |x, y| x == y)
    }

    /// Direction-aware WL hash of a collapsed graph.
    ///
    /// Each round rehashes a node from its own label, the sorted multiset of
    /// `(edge attribute, successor label)` and the sorted multiset of
    /// `(edge attribute, predecessor label)`. The graph hash covers the sorted
    /// node labels of every round.
    pub fn hash_collapsed(&self, graph: &CollapsedGraph) -> CanonicalHash {
        let mut labels: BTreeMap<NodeId, [u8; 32]> = graph
            .nodes
            .iter()
            .map(|(&id, label)| (id, hash_with_domain(b"WL_INIT", label.as_bytes())))
            .collect();

        let mut out_edges: BTreeMap<NodeId, Vec<(NodeId, &[u8])>> = BTreeMap::new();
        let mut in_edges: BTreeMap<NodeId, Vec<(NodeId, &[u8])>> = BTreeMap::new();
        for (&(u, v), attr) in &graph.edges {
            out_edges.entry(u).or_default().push((v, attr.as_bytes()));
            in_edges.entry(v).or_default().push((u, attr.as_bytes()));
        }

        let mut history: Vec<[u8; 32]> = labels.values().copied().collect();

        for _ in 0..self.iterations {
            let mut next = BTreeMap::new();
            for (&id, own) in &labels {
                let mut data = Vec::with_capacity(64);
                data.extend_from_slice(own);
                for (marker, adjacency) in [(b'S', &out_edges), (b'P', &in_edges)] {
                    let mut neighborhood: Vec<[u8; 32]> = adjacency
                        .get(&id)
                        .map(|edges| {
                            edges
                                .iter()
                                .map(|&(other, attr)| {
                                    let mut item = Vec::with_capacity(attr.len() + 32);
                                    item.extend_from_slice(attr);
                                    item.extend_from_slice(&labels[&other]);
                                    hash_with_domain(b"WL_NEIGHBOR", &item)
                                })
                                .collect()
                        })
                        .unwrap_or_default();
                    neighborhood.sort_unstable();
                    data.push(marker);
                    data.extend_from_slice(&(neighborhood.len() as u64).to_le_bytes());
                    for h in &neighborhood {
                        data.extend_from_slice(h);
                    }
                }
                next.insert(id, hash_with_domain(b"WL_ITER", &data));
            }
            labels = next;
            history.extend(labels.values().copied());
        }

        history.sort_unstable();
        let mut data = Vec::with_capacity(16 + history.len() * 32);
        data.extend_from_slice(&(graph.nodes.len() as u64).to_le_bytes());
        data.extend_from_slice(&(graph.edges.len() as u64).to_le_bytes());
        for h in &history {
            data.extend_from_slice(h);
        }
        let digest = hash_with_domain(b"WL_GRAPH", &data);

        let mut out = [0u8; 16];
        out.copy_from_slice(&digest[..16]);
        CanonicalHash(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qmotif_graph::{DataflowEdge, InteractionEdge, InteractionNode, OperationNode};
    use qmotif_ir::WireId;

    fn op(name: &str) -> OperationNode {
        OperationNode {
            name: name.into(),
            wires: vec![],
            layer: 1,
            mean_wire: 0.0,
        }
    }

    fn qnode(wire: u32, operation: &str) -> InteractionNode {
        InteractionNode {
            wire: WireId(wire),
            label: format!("Q{wire}"),
            operation: operation.into(),
            layer: 1,
        }
    }

    fn interaction(operation: &str) -> InteractionEdge {
        InteractionEdge::Interaction {
            operation: operation.into(),
        }
    }

    /// `a -> b` with `parallel` edges, nodes inserted in the given order.
    fn chain(
        first: &str,
        second: &str,
        parallel: usize,
        reversed: bool,
    ) -> MultiDiGraph<OperationNode, DataflowEdge> {
        let mut g = MultiDiGraph::new();
        let (a, b) = if reversed {
            let b = g.add_node(op(second));
            let a = g.add_node(op(first));
            (a, b)
        } else {
            let a = g.add_node(op(first));
            let b = g.add_node(op(second));
            (a, b)
        };
        for w in 0..parallel {
            let wire = WireId(u32::try_from(w).unwrap());
            g.add_edge(a, b, DataflowEdge { wire }).unwrap();
        }
        g
    }

    #[test]
    fn test_hash_independent_of_node_numbering() {
        let labeler = CanonicalLabeler::new(LabelMode::ByOperationName);
        assert_eq!(
            labeler.label(&chain("h", "cx", 1, false)),
            labeler.label(&chain("h", "cx", 1, true))
        );
    }

    #[test]
    fn test_direction_matters() {
        let labeler = CanonicalLabeler::new(LabelMode::ByOperationName);
        assert_ne!(
            labeler.label(&chain("h", "cx", 1, false)),
            labeler.label(&chain("cx", "h", 1, false))
        );
    }

    #[test]
    fn test_multiplicity_matters_by_name() {
        let labeler = CanonicalLabeler::new(LabelMode::ByOperationName);
        assert_ne!(
            labeler.label(&chain("cx", "cx", 1, false)),
            labeler.label(&chain("cx", "cx", 2, false))
        );
    }

    #[test]
    fn test_collapse_by_name_counts_parallel_edges() {
        let labeler = CanonicalLabeler::new(LabelMode::ByOperationName);
        let collapsed = labeler.collapse(&chain("cx", "cx", 2, false));
        assert_eq!(collapsed.edges.len(), 1);
        assert_eq!(collapsed.edges.values().next().unwrap(), "2");
        assert_eq!(collapsed.nodes.values().next().unwrap(), "cx");
    }

    #[test]
    fn test_collapse_by_role_joins_sorted_tags() {
        let mut g = MultiDiGraph::new();
        let a = g.add_node(qnode(0, "cx"));
        let b = g.add_node(qnode(1, "cx"));
        g.add_edge(a, b, interaction("cx")).unwrap();
        g.add_edge(a, b, InteractionEdge::Flow).unwrap();

        let collapsed = CanonicalLabeler::new(LabelMode::ByEdgeRole).collapse(&g);
        assert_eq!(collapsed.edges[&(a, b)], "flow_|interaction_cx");
        assert!(collapsed.nodes.values().all(|l| l == GENERIC_NODE_LABEL));
    }

    #[test]
    fn test_role_mode_ignores_node_operation_names() {
        let build = |node_op: &str| {
            let mut g = MultiDiGraph::new();
            let a = g.add_node(qnode(0, node_op));
            let b = g.add_node(qnode(1, node_op));
            g.add_edge(a, b, interaction("cx")).unwrap();
            g
        };

        let by_role = CanonicalLabeler::new(LabelMode::ByEdgeRole);
        assert_eq!(by_role.label(&build("cx")), by_role.label(&build("cz")));

        let by_name = CanonicalLabeler::new(LabelMode::ByOperationName);
        assert_ne!(by_name.label(&build("cx")), by_name.label(&build("cz")));
    }

    #[test]
    fn test_structurally_equal_relabeled() {
        let labeler = CanonicalLabeler::new(LabelMode::ByOperationName);
        let a = CircuitGraph::Dataflow(chain("h", "cx", 2, false));
        let b = CircuitGraph::Dataflow(chain("h", "cx", 2, true));
        let c = CircuitGraph::Dataflow(chain("x", "cx", 2, false));
        assert!(labeler.structurally_equal(&a, &b));
        assert!(!labeler.structurally_equal(&a, &c));
    }

    #[test]
    fn test_hash_display() {
        let hash =
            CanonicalLabeler::new(LabelMode::ByOperationName).label(&chain("h", "cx", 1, false));
        let text = hash.to_string();
        assert_eq!(text.len(), 32);
        assert!(text.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(hash.short(), text[..8]);
    }

    #[test]
    fn test_label_mode_defaults() {
        assert_eq!(LabelMode::for_mode(GraphMode::Dataflow), LabelMode::ByOperationName);
        assert_eq!(LabelMode::for_mode(GraphMode::Comm), LabelMode::ByEdgeRole);
        assert_eq!("by-edge-role".parse::<LabelMode>(), Ok(LabelMode::ByEdgeRole));
    }
}
