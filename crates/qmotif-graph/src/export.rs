//! Graph export: node-link JSON and Graphviz DOT.

use std::fs;
use std::path::Path;

use petgraph::dot::Dot;
use petgraph::graph::{DiGraph, EdgeReference, NodeIndex};
use petgraph::visit::EdgeRef;
use rustc_hash::FxHashMap;
use serde::Serialize;

use crate::error::{GraphError, GraphResult};
use crate::multigraph::{EdgeRole, MultiDiGraph, NodeId, NodeLabel};
use crate::representation::CircuitGraph;

/// Node-link view of a multigraph, in the layout used by common graph tools:
/// `{"directed", "multigraph", "graph", "nodes": [...], "links": [...]}`.
#[derive(Debug, Serialize)]
pub struct NodeLink<'a, N, E> {
    directed: bool,
    multigraph: bool,
    graph: serde_json::Map<String, serde_json::Value>,
    nodes: Vec<LinkNode<'a, N>>,
    links: Vec<Link<'a, E>>,
}

#[derive(Debug, Serialize)]
struct LinkNode<'a, N> {
    id: NodeId,
    #[serde(flatten)]
    data: &'a N,
}

#[derive(Debug, Serialize)]
struct Link<'a, E> {
    source: NodeId,
    target: NodeId,
    key: usize,
    #[serde(flatten)]
    data: &'a E,
}

impl<'a, N, E> NodeLink<'a, N, E> {
    /// Borrow `graph` as a node-link document.
    pub fn new(graph: &'a MultiDiGraph<N, E>) -> Self {
        let nodes = graph.nodes().map(|(id, data)| LinkNode { id, data }).collect();
        let links = graph
            .edge_groups()
            .flat_map(|((source, target), records)| {
                records.iter().enumerate().map(move |(key, data)| Link {
                    source,
                    target,
                    key,
                    data,
                })
            })
            .collect();
        Self {
            directed: true,
            multigraph: true,
            graph: serde_json::Map::new(),
            nodes,
            links,
        }
    }
}

impl CircuitGraph {
    /// Pretty-printed node-link JSON.
    pub fn to_node_link_json(&self) -> GraphResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Graphviz DOT document, optionally titled.
    pub fn to_dot(&self, title: Option<&str>) -> String {
        match self {
            Self::Dataflow(g) => to_dot(g, title),
            Self::Interaction(g) => to_dot(g, title),
        }
    }

    /// Write the graph to `path`, choosing the format from the extension.
    pub fn write_to(&self, path: &Path) -> GraphResult<()> {
        let contents = match path.extension().and_then(|e| e.to_str()) {
            Some("json") => self.to_node_link_json()?,
            Some("dot" | "gv") => self.to_dot(None),
            _ => return Err(GraphError::UnsupportedFormat(path.to_path_buf())),
        };
        fs::write(path, contents).map_err(|source| GraphError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Render a multigraph as DOT.
///
/// Nodes carry a `pos` hint of `(layer, -row)` for `neato -n`; interaction
/// edges are drawn red and labelled with their operation.
pub fn to_dot<N: NodeLabel, E: EdgeRole>(
    graph: &MultiDiGraph<N, E>,
    title: Option<&str>,
) -> String {
    let mut pg: DiGraph<String, String> = DiGraph::new();
    let mut index: FxHashMap<NodeId, NodeIndex> = FxHashMap::default();
    let mut layout = Vec::with_capacity(graph.node_count());
    let mut interaction = Vec::with_capacity(graph.edge_count());

    for (id, node) in graph.nodes() {
        index.insert(id, pg.add_node(node.display_label()));
        layout.push((node.layer(), node.row()));
    }
    for (u, v, edge) in graph.edges() {
        pg.add_edge(index[&u], index[&v], edge.label().to_string());
        interaction.push(edge.is_interaction());
    }

    let node_attrs = |_: &DiGraph<String, String>, (i, _): (NodeIndex, &String)| {
        let (layer, row) = layout[i.index()];
        format!("pos=\"{layer},{}!\" ", -row)
    };
    let edge_attrs = |_: &DiGraph<String, String>, e: EdgeReference<'_, String>| {
        if interaction[e.id().index()] {
            "color=red penwidth=1.5".to_string()
        } else {
            "color=gray".to_string()
        }
    };
    let dot = Dot::with_attr_getters(&pg, &[], &edge_attrs, &node_attrs).to_string();

    match title {
        Some(title) => {
            let header = format!(
                "{{\n    label=\"{}\"\n    labelloc=t\n",
                title.replace('"', "\\\"")
            );
            dot.replacen("{\n", &header, 1)
        }
        None => dot,
    }
}
