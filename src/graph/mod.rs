//! Concept graph data structures
//!
//! A small directed labeled graph over concept names. Nodes are keyed by
//! their label; insertion order is preserved so traversals and serialized
//! output stay deterministic.

mod compose;

pub use compose::{
    GraphComposer, GraphVisualization, RelatedKnowledge, RelatedQuery, VisualLink, VisualNode,
};

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Origin of a graph node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    /// Loaded from the expert concept source
    Concept,
    /// Synthesized from an analyzed keyword
    Keyword,
}

/// A node in the concept graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConceptNode {
    /// Node label, unique within the graph
    pub id: String,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    /// Optional display labels
    #[serde(default)]
    pub labels: Vec<String>,
    /// Teaching descriptions aggregated from the corpus (keyword nodes)
    #[serde(default)]
    pub descriptions: Vec<String>,
    /// Knowledge domains the node belongs to (keyword nodes)
    #[serde(default)]
    pub domains: Vec<String>,
}

impl ConceptNode {
    /// Create a concept node loaded from the expert source
    pub fn concept(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: NodeKind::Concept,
            labels: Vec::new(),
            descriptions: Vec::new(),
            domains: Vec::new(),
        }
    }

    /// Create a keyword node synthesized at analysis time
    pub fn keyword(
        id: impl Into<String>,
        descriptions: Vec<String>,
        domains: Vec<String>,
    ) -> Self {
        Self {
            id: id.into(),
            kind: NodeKind::Keyword,
            labels: Vec::new(),
            descriptions,
            domains,
        }
    }
}

/// A directed edge with a relation label
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConceptEdge {
    pub source: String,
    pub target: String,
    pub relation: String,
}

/// Directed labeled graph with insertion-ordered nodes and deduplicated
/// edges.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConceptGraph {
    nodes: HashMap<String, ConceptNode>,
    /// Node ids in insertion order
    order: Vec<String>,
    edges: Vec<ConceptEdge>,
}

impl ConceptGraph {
    /// Create an empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a concept node if absent
    pub fn add_concept(&mut self, id: &str) {
        if !self.nodes.contains_key(id) {
            self.insert_node(ConceptNode::concept(id));
        }
    }

    /// Add a node. Returns false (and leaves the existing node untouched)
    /// if a node with the same id is already present.
    pub fn add_node(&mut self, node: ConceptNode) -> bool {
        if self.nodes.contains_key(&node.id) {
            return false;
        }
        self.insert_node(node);
        true
    }

    fn insert_node(&mut self, node: ConceptNode) {
        self.order.push(node.id.clone());
        self.nodes.insert(node.id.clone(), node);
    }

    /// Add a directed edge; exact duplicate triples are ignored
    pub fn add_edge(&mut self, source: &str, target: &str, relation: &str) {
        let exists = self
            .edges
            .iter()
            .any(|e| e.source == source && e.target == target && e.relation == relation);
        if !exists {
            self.edges.push(ConceptEdge {
                source: source.to_string(),
                target: target.to_string(),
                relation: relation.to_string(),
            });
        }
    }

    /// Check whether a node exists
    pub fn contains_node(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    /// Get a node by id
    pub fn node(&self, id: &str) -> Option<&ConceptNode> {
        self.nodes.get(id)
    }

    /// All nodes in insertion order
    pub fn nodes(&self) -> impl Iterator<Item = &ConceptNode> {
        self.order.iter().filter_map(|id| self.nodes.get(id))
    }

    /// All edges in insertion order
    pub fn edges(&self) -> &[ConceptEdge] {
        &self.edges
    }

    /// Number of nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of edges
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Outgoing adjacency index for traversal
    pub(crate) fn outgoing_index(&self) -> HashMap<&str, Vec<&ConceptEdge>> {
        let mut index: HashMap<&str, Vec<&ConceptEdge>> = HashMap::new();
        for edge in &self.edges {
            index.entry(edge.source.as_str()).or_default().push(edge);
        }
        index
    }
}
