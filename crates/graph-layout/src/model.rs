use derive_more::Constructor;
use petgraph::graph::{DiGraph, EdgeIndex, NodeIndex};
use std::collections::HashMap;
use thiserror::Error;

/// Errors raised while building a [`Diagram`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiagramError {
    /// An edge refers to a node id that is not part of the diagram
    #[error("edge {edge:?} references unknown node {node:?}")]
    UnknownNode { edge: String, node: String },

    /// Two nodes were declared with the same id
    #[error("node {0:?} is declared more than once")]
    DuplicateNode(String),
}

/// A diagram vertex: a stable identity and the text shown for it
#[derive(Debug, Clone, PartialEq, Eq, Constructor)]
pub struct Node {
    pub id: String,
    pub text: String,
}

/// A labelled connection, its endpoints live in the diagram arena
#[derive(Debug, Clone, PartialEq, Eq, Constructor)]
pub struct Edge {
    pub id: String,
    pub text: String,
}

/// Edge declaration as handed over by a loader, endpoints given by node id
#[derive(Debug, Clone, PartialEq, Eq, Constructor)]
pub struct EdgeDef {
    pub id: String,
    pub text: String,
    pub from: String,
    pub to: String,
}

/// Immutable directed multigraph with a name
///
/// Nodes and edges are stored in a petgraph arena and addressed by index.
/// Node indices follow declaration order, which the layout uses to break
/// ties. Self-loops and parallel edges are kept as declared.
#[derive(Debug, Clone)]
pub struct Diagram {
    name: String,
    graph: DiGraph<Node, Edge>,
    ids: HashMap<String, NodeIndex>,
}

impl Diagram {
    /// Build a diagram, checking that every edge endpoint is a declared node
    pub fn new(
        name: impl Into<String>,
        nodes: impl IntoIterator<Item = Node>,
        edges: impl IntoIterator<Item = EdgeDef>,
    ) -> Result<Self, DiagramError> {
        let mut graph = DiGraph::new();
        let mut ids = HashMap::new();

        for node in nodes {
            if ids.contains_key(&node.id) {
                return Err(DiagramError::DuplicateNode(node.id));
            }
            let id = node.id.clone();
            ids.insert(id, graph.add_node(node));
        }

        for EdgeDef { id, text, from, to } in edges {
            let endpoint = |node: &String| {
                ids.get(node)
                    .copied()
                    .ok_or_else(|| DiagramError::UnknownNode {
                        edge: id.clone(),
                        node: node.clone(),
                    })
            };
            let (source, dest) = (endpoint(&from)?, endpoint(&to)?);
            graph.add_edge(source, dest, Edge::new(id, text));
        }

        Ok(Self {
            name: name.into(),
            graph,
            ids,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Node indices in declaration order
    pub fn nodes(&self) -> impl Iterator<Item = NodeIndex> {
        self.graph.node_indices()
    }

    /// Edge indices in declaration order
    pub fn edges(&self) -> impl Iterator<Item = EdgeIndex> {
        self.graph.edge_indices()
    }

    pub fn node(&self, node: NodeIndex) -> Option<&Node> {
        self.graph.node_weight(node)
    }

    pub fn edge(&self, edge: EdgeIndex) -> Option<&Edge> {
        self.graph.edge_weight(edge)
    }

    pub fn source(&self, edge: EdgeIndex) -> Option<NodeIndex> {
        self.graph.edge_endpoints(edge).map(|(source, _)| source)
    }

    pub fn dest(&self, edge: EdgeIndex) -> Option<NodeIndex> {
        self.graph.edge_endpoints(edge).map(|(_, dest)| dest)
    }

    /// Look a node up by its id
    pub fn find(&self, id: &str) -> Option<NodeIndex> {
        self.ids.get(id).copied()
    }

    /// The underlying arena, for algorithms working on petgraph traits
    pub fn graph(&self) -> &DiGraph<Node, Edge> {
        &self.graph
    }
}
