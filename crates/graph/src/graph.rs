//! # Directed Graph
//!
//! Directed multigraph with unique string node ids, backed by petgraph.
//! Self-loops and parallel edges are stored as given.

use std::collections::HashMap;

use netmotif_core::{Error, Result};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use serde::{Deserialize, Deserializer, Serialize};

/// Type alias for a node identifier
pub type NodeId = String;

/// Directed multigraph wrapping petgraph's `DiGraph`
///
/// Node positions (`0..node_count()`) follow insertion order and are what
/// the analysis code works with; ids are only needed at the edges of the
/// system.
#[derive(Debug, Clone, Default)]
pub struct DirectedGraph {
    /// The underlying directed graph
    graph: DiGraph<NodeId, ()>,
    /// Map from NodeId to NodeIndex for O(1) lookups
    node_map: HashMap<NodeId, NodeIndex>,
}

impl DirectedGraph {
    /// Create a new empty graph
    ///
    /// # Examples
    ///
    /// ```
    /// use netmotif_graph::DirectedGraph;
    ///
    /// let graph = DirectedGraph::new();
    /// assert_eq!(graph.node_count(), 0);
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self {
            graph: DiGraph::new(),
            node_map: HashMap::new(),
        }
    }

    /// Build a graph from a node list and an edge list.
    ///
    /// Every edge endpoint must appear in the node list.
    ///
    /// # Errors
    ///
    /// * [`Error::DuplicateNode`] if a node id appears twice
    /// * [`Error::DanglingEndpoint`] naming the first endpoint missing from the node list
    ///
    /// # Examples
    ///
    /// ```
    /// use netmotif_graph::DirectedGraph;
    ///
    /// let graph = DirectedGraph::from_parts(
    ///     ["a", "b"].map(String::from),
    ///     [("a".to_string(), "b".to_string())],
    /// ).unwrap();
    /// assert_eq!(graph.edge_count(), 1);
    ///
    /// let dangling = DirectedGraph::from_parts(
    ///     ["a".to_string()],
    ///     [("a".to_string(), "zzz".to_string())],
    /// );
    /// assert!(dangling.is_err());
    /// ```
    pub fn from_parts<N, E>(nodes: N, edges: E) -> Result<Self>
    where
        N: IntoIterator<Item = NodeId>,
        E: IntoIterator<Item = (NodeId, NodeId)>,
    {
        let mut graph = Self::new();
        for id in nodes {
            graph.add_node(id)?;
        }
        for (source, target) in edges {
            graph.add_edge(&source, &target)?;
        }
        Ok(graph)
    }

    /// Build a graph with nodes `"0".."n-1"` and no edges.
    #[must_use]
    pub fn with_numbered_nodes(n: usize) -> Self {
        let mut graph = Self::new();
        for position in 0..n {
            let id = position.to_string();
            let index = graph.graph.add_node(id.clone());
            graph.node_map.insert(id, index);
        }
        graph
    }

    /// Add a node, returning its position.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateNode`] if the id already exists.
    pub fn add_node(&mut self, id: NodeId) -> Result<usize> {
        if self.node_map.contains_key(&id) {
            return Err(Error::duplicate_node(id));
        }

        let index = self.graph.add_node(id.clone());
        self.node_map.insert(id, index);

        Ok(index.index())
    }

    /// Add a node unless it already exists; returns its position either way.
    pub fn ensure_node(&mut self, id: &str) -> usize {
        if let Some(index) = self.node_map.get(id) {
            return index.index();
        }
        let index = self.graph.add_node(id.to_string());
        self.node_map.insert(id.to_string(), index);
        index.index()
    }

    /// Add an edge between two existing nodes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DanglingEndpoint`] if either endpoint is unknown.
    pub fn add_edge(&mut self, source: &str, target: &str) -> Result<()> {
        let edge_index = self.graph.edge_count();

        let from = *self
            .node_map
            .get(source)
            .ok_or_else(|| Error::dangling_endpoint(source, edge_index))?;
        let to = *self
            .node_map
            .get(target)
            .ok_or_else(|| Error::dangling_endpoint(target, edge_index))?;

        self.graph.add_edge(from, to, ());
        Ok(())
    }

    /// Add an edge between two node positions.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ComputationFailed`] if a position is out of range.
    pub fn add_edge_between(&mut self, source: usize, target: usize) -> Result<()> {
        let count = self.graph.node_count();
        if source >= count || target >= count {
            return Err(Error::computation(format!(
                "edge ({source}, {target}) outside node range 0..{count}"
            )));
        }
        self.graph
            .add_edge(NodeIndex::new(source), NodeIndex::new(target), ());
        Ok(())
    }

    /// Iterate node ids in insertion order
    pub fn nodes(&self) -> impl Iterator<Item = &NodeId> {
        self.graph.node_weights()
    }

    /// Iterate edges as `(source_id, target_id)` in insertion order
    pub fn edges(&self) -> impl Iterator<Item = (&NodeId, &NodeId)> {
        self.graph.edge_references().filter_map(move |edge| {
            let from = self.graph.node_weight(edge.source())?;
            let to = self.graph.node_weight(edge.target())?;
            Some((from, to))
        })
    }

    /// Iterate edges as `(source_position, target_position)` in insertion order
    pub fn edge_positions(&self) -> impl Iterator<Item = (usize, usize)> {
        self.graph
            .edge_references()
            .map(|edge| (edge.source().index(), edge.target().index()))
    }

    /// Position of a node id, if present
    #[must_use]
    pub fn position(&self, id: &str) -> Option<usize> {
        self.node_map.get(id).map(|index| index.index())
    }

    /// Node id at a position, if present
    #[must_use]
    pub fn node_id(&self, position: usize) -> Option<&NodeId> {
        self.graph.node_weight(NodeIndex::new(position))
    }

    /// Whether a node id is present
    #[must_use]
    pub fn contains_node(&self, id: &str) -> bool {
        self.node_map.contains_key(id)
    }

    /// Number of nodes
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of edges, counted with multiplicity
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Whether the graph has no nodes
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }
}

/// Wire form of a node: `{"id": ...}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeData {
    #[serde(deserialize_with = "id_from_string_or_number")]
    pub id: NodeId,
}

/// Wire form of an edge: `{"source": ..., "target": ...}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeData {
    #[serde(deserialize_with = "id_from_string_or_number")]
    pub source: NodeId,
    #[serde(deserialize_with = "id_from_string_or_number")]
    pub target: NodeId,
}

/// Wire form of a graph: `{"nodes": [{id}], "edges": [{source, target}]}`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphData {
    pub nodes: Vec<NodeData>,
    pub edges: Vec<EdgeData>,
}

impl TryFrom<GraphData> for DirectedGraph {
    type Error = Error;

    fn try_from(data: GraphData) -> Result<Self> {
        Self::from_parts(
            data.nodes.into_iter().map(|node| node.id),
            data.edges
                .into_iter()
                .map(|edge| (edge.source, edge.target)),
        )
    }
}

impl From<&DirectedGraph> for GraphData {
    fn from(graph: &DirectedGraph) -> Self {
        Self {
            nodes: graph
                .nodes()
                .map(|id| NodeData { id: id.clone() })
                .collect(),
            edges: graph
                .edges()
                .map(|(source, target)| EdgeData {
                    source: source.clone(),
                    target: target.clone(),
                })
                .collect(),
        }
    }
}

/// Accept node ids written as JSON strings or integers.
fn id_from_string_or_number<'de, D>(deserializer: D) -> std::result::Result<NodeId, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Signed(i64),
        Unsigned(u64),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(text) => text,
        RawId::Signed(value) => value.to_string(),
        RawId::Unsigned(value) => value.to_string(),
    })
}
