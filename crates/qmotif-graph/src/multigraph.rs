//! Directed multigraph with stable node ids.
//!
//! Edges are stored as an ordered list of records per `(source, target)` pair,
//! so parallel edges keep their insertion order and can be collapsed later.
//! Induced subgraphs keep the node ids of the parent graph.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{GraphError, GraphResult};

/// Identifier of a node within one graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u32);

impl NodeId {
    /// The raw index.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Node payload with the labels the miner needs.
pub trait NodeLabel {
    /// Name of the operation this node belongs to.
    fn operation(&self) -> &str;

    /// Text shown when the node is drawn.
    fn display_label(&self) -> String;

    /// Topological layer, used as the horizontal layout coordinate.
    fn layer(&self) -> u32;

    /// Vertical layout coordinate (wire index or mean wire index).
    fn row(&self) -> f64;
}

/// Edge payload with a type and an optional label.
pub trait EdgeRole {
    /// Edge type, e.g. `flow` or `interaction`.
    fn kind(&self) -> &'static str;

    /// Edge label; empty when the type has none.
    fn label(&self) -> &str;

    /// Composite `{type}_{label}` tag.
    fn tag(&self) -> String {
        format!("{}_{}", self.kind(), self.label())
    }

    /// Whether this edge joins wires of one operation.
    fn is_interaction(&self) -> bool {
        false
    }

    /// Drawing weight.
    fn weight(&self) -> u32 {
        1
    }
}

/// A directed multigraph.
#[derive(Debug, Clone, PartialEq)]
pub struct MultiDiGraph<N, E> {
    nodes: BTreeMap<NodeId, N>,
    edges: BTreeMap<(NodeId, NodeId), Vec<E>>,
    successors: BTreeMap<NodeId, BTreeSet<NodeId>>,
    predecessors: BTreeMap<NodeId, BTreeSet<NodeId>>,
    edge_count: usize,
    next_id: u32,
}

impl<N, E> Default for MultiDiGraph<N, E> {
    fn default() -> Self {
        Self {
            nodes: BTreeMap::new(),
            edges: BTreeMap::new(),
            successors: BTreeMap::new(),
            predecessors: BTreeMap::new(),
            edge_count: 0,
            next_id: 0,
        }
    }
}

static EMPTY: BTreeSet<NodeId> = BTreeSet::new();

impl<N, E> MultiDiGraph<N, E> {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node, returning its id. Ids are assigned sequentially.
    pub fn add_node(&mut self, node: N) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        self.nodes.insert(id, node);
        id
    }

    /// Add an edge record from `source` to `target`.
    pub fn add_edge(&mut self, source: NodeId, target: NodeId, edge: E) -> GraphResult<()> {
        for id in [source, target] {
            if !self.nodes.contains_key(&id) {
                return Err(GraphError::NodeNotFound(id));
            }
        }
        self.edges.entry((source, target)).or_default().push(edge);
        self.successors.entry(source).or_default().insert(target);
        self.predecessors.entry(target).or_default().insert(source);
        self.edge_count += 1;
        Ok(())
    }

    /// Number of nodes.
    #[inline]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of edge records, counting parallel edges separately.
    #[inline]
    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    /// Check whether the graph has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Check whether `id` is a node of this graph.
    pub fn contains_node(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Node payload.
    pub fn node(&self, id: NodeId) -> Option<&N> {
        self.nodes.get(&id)
    }

    /// Nodes in id order.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &N)> {
        self.nodes.iter().map(|(&id, n)| (id, n))
    }

    /// Node ids in ascending order.
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.keys().copied()
    }

    /// Parallel edge groups, ordered by `(source, target)`.
    pub fn edge_groups(&self) -> impl Iterator<Item = ((NodeId, NodeId), &[E])> {
        self.edges.iter().map(|(&k, v)| (k, v.as_slice()))
    }

    /// Every edge record as `(source, target, payload)`.
    pub fn edges(&self) -> impl Iterator<Item = (NodeId, NodeId, &E)> {
        self.edges
            .iter()
            .flat_map(|(&(u, v), records)| records.iter().map(move |e| (u, v, e)))
    }

    /// Edge records from `source` to `target`.
    pub fn edges_between(&self, source: NodeId, target: NodeId) -> &[E] {
        self.edges
            .get(&(source, target))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Distinct successors of `id`.
    pub fn successors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.successors.get(&id).unwrap_or(&EMPTY).iter().copied()
    }

    /// Distinct predecessors of `id`.
    pub fn predecessors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.predecessors.get(&id).unwrap_or(&EMPTY).iter().copied()
    }

    /// Distinct neighbors of `id` in either direction.
    pub fn neighbors(&self, id: NodeId) -> BTreeSet<NodeId> {
        self.successors(id).chain(self.predecessors(id)).collect()
    }

    /// Neighbors of any member of `set` that are not themselves members.
    pub fn open_neighborhood(&self, set: &BTreeSet<NodeId>) -> BTreeSet<NodeId> {
        set.iter()
            .flat_map(|&id| self.successors(id).chain(self.predecessors(id)))
            .filter(|id| !set.contains(id))
            .collect()
    }

    /// Number of incoming edge records.
    pub fn in_degree(&self, id: NodeId) -> usize {
        self.predecessors(id)
            .map(|p| self.edges_between(p, id).len())
            .sum()
    }

    /// Number of outgoing edge records.
    pub fn out_degree(&self, id: NodeId) -> usize {
        self.successors(id)
            .map(|s| self.edges_between(id, s).len())
            .sum()
    }
}

impl<N: Clone, E: Clone> MultiDiGraph<N, E> {
    /// Subgraph induced by `set`, keeping the parent's node ids.
    ///
    /// Ids not present in the graph are ignored.
    pub fn induced_subgraph(&self, set: &BTreeSet<NodeId>) -> Self {
        let mut sub = Self {
            next_id: self.next_id,
            ..Self::default()
        };
        for &id in set {
            if let Some(node) = self.nodes.get(&id) {
                sub.nodes.insert(id, node.clone());
            }
        }
        for &u in sub.nodes.keys() {
            for v in self.successors(u).filter(|v| sub.nodes.contains_key(v)) {
                let records = self.edges_between(u, v).to_vec();
                sub.edge_count += records.len();
                sub.edges.insert((u, v), records);
                sub.successors.entry(u).or_default().insert(v);
                sub.predecessors.entry(v).or_default().insert(u);
            }
        }
        sub
    }
}
