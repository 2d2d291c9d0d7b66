//! Knowledge graph composition
//!
//! Augments the static expert graph with keyword nodes per analysis call,
//! then extracts an ego subgraph and shortest paths from a seed keyword
//! for visualization.
//!
//! The composer never mutates shared state: `enhance_with_keywords`
//! clones the immutable base graph fresh on every call and returns an
//! owned graph, so sequential analyses cannot contaminate each other.

use super::{ConceptEdge, ConceptGraph, ConceptNode, NodeKind};
use crate::store::CorpusEntry;
use serde::Serialize;
use std::collections::{HashMap, HashSet, VecDeque};

/// Maximum number of paths reported per seed
const MAX_PATHS: usize = 5;

/// Default ego-subgraph radius
const DEFAULT_MAX_DEPTH: usize = 2;

/// Visual styling for the path visualization
const SEED_COLOR: &str = "#ff6b6b";
const KEYWORD_COLOR: &str = "#4ecdc4";
const CONCEPT_COLOR: &str = "#45b7d1";
const SEED_SIZE: u32 = 30;
const NODE_SIZE: u32 = 20;

/// Composes per-request enhanced graphs over the static expert graph
#[derive(Debug, Clone)]
pub struct GraphComposer {
    base: ConceptGraph,
}

impl GraphComposer {
    /// Create a composer over the loaded expert graph
    pub fn new(base: ConceptGraph) -> Self {
        Self { base }
    }

    /// The static base graph
    pub fn base(&self) -> &ConceptGraph {
        &self.base
    }

    /// Clone the base graph and add one keyword node per analyzed keyword,
    /// linked to the knowledge domains that teach it.
    ///
    /// A keyword node is created only if absent (repeat keywords never
    /// duplicate or overwrite it), and `belongs_to` edges are added only
    /// toward domains that already exist as graph nodes; unknown domains
    /// are silently skipped.
    pub fn enhance_with_keywords(
        &self,
        keywords: &[String],
        corpus: &[CorpusEntry],
    ) -> ConceptGraph {
        let mut enhanced = self.base.clone();

        for keyword in keywords {
            let related: Vec<&CorpusEntry> = corpus
                .iter()
                .filter(|entry| entry.keywords.iter().any(|k| k == keyword))
                .collect();

            if !enhanced.contains_node(keyword) {
                let descriptions = related.iter().map(|e| e.description.clone()).collect();
                let mut domains: Vec<String> = Vec::new();
                for entry in &related {
                    if !domains.contains(&entry.knowledge_domain) {
                        domains.push(entry.knowledge_domain.clone());
                    }
                }
                enhanced.add_node(ConceptNode::keyword(keyword.clone(), descriptions, domains));
            }

            for entry in &related {
                if enhanced.contains_node(&entry.knowledge_domain) {
                    enhanced.add_edge(keyword, &entry.knowledge_domain, "belongs_to");
                }
            }
        }

        enhanced
    }

    /// Build the presentation-ready node/link structure for a seed keyword
    pub fn visualize_knowledge_paths(
        &self,
        graph: &ConceptGraph,
        seed: &str,
    ) -> GraphVisualization {
        let related = RelatedQuery::from(seed).execute(graph);

        let mut visualization = GraphVisualization {
            nodes: vec![VisualNode {
                id: seed.to_string(),
                label: seed.to_string(),
                size: SEED_SIZE,
                color: SEED_COLOR.to_string(),
            }],
            links: Vec::new(),
        };

        for node in &related.nodes {
            if node.id == seed {
                continue;
            }
            let color = match node.kind {
                NodeKind::Keyword => KEYWORD_COLOR,
                NodeKind::Concept => CONCEPT_COLOR,
            };
            visualization.nodes.push(VisualNode {
                id: node.id.clone(),
                label: node.id.clone(),
                size: NODE_SIZE,
                color: color.to_string(),
            });
        }

        for edge in &related.edges {
            visualization.links.push(VisualLink {
                source: edge.source.clone(),
                target: edge.target.clone(),
                label: edge.relation.clone(),
            });
        }

        visualization
    }
}

/// Query for the neighborhood of a seed node
#[derive(Debug, Clone)]
pub struct RelatedQuery {
    /// Seed node id
    pub seed: String,
    /// Maximum hops from the seed
    pub max_depth: usize,
}

impl RelatedQuery {
    /// Create a query from a seed node with the default radius
    pub fn from(seed: impl Into<String>) -> Self {
        Self {
            seed: seed.into(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Set the maximum hop radius
    pub fn depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Execute against a graph: ego subgraph plus capped shortest paths.
    ///
    /// An absent seed yields the empty result. Nodes are emitted in BFS
    /// discovery order; edges are every graph edge whose endpoints both
    /// fall inside the ego set; paths run from the seed to each other ego
    /// node, skipping the trivial self-path, capped at [`MAX_PATHS`].
    pub fn execute(&self, graph: &ConceptGraph) -> RelatedKnowledge {
        if !graph.contains_node(&self.seed) {
            return RelatedKnowledge::empty();
        }

        let outgoing = graph.outgoing_index();

        // BFS ego set within max_depth hops, discovery order preserved
        let mut order: Vec<String> = vec![self.seed.clone()];
        let mut visited: HashSet<String> = HashSet::new();
        visited.insert(self.seed.clone());
        let mut frontier: Vec<String> = vec![self.seed.clone()];

        for _depth in 0..self.max_depth {
            if frontier.is_empty() {
                break;
            }
            let mut next: Vec<String> = Vec::new();
            for id in &frontier {
                for edge in outgoing.get(id.as_str()).map(|v| v.as_slice()).unwrap_or(&[]) {
                    if visited.insert(edge.target.clone()) {
                        order.push(edge.target.clone());
                        next.push(edge.target.clone());
                    }
                }
            }
            frontier = next;
        }

        let nodes: Vec<ConceptNode> = order
            .iter()
            .filter_map(|id| graph.node(id))
            .cloned()
            .collect();

        let edges: Vec<ConceptEdge> = graph
            .edges()
            .iter()
            .filter(|e| visited.contains(&e.source) && visited.contains(&e.target))
            .cloned()
            .collect();

        // Shortest paths from the seed to each ego node, over the full graph
        let mut paths: Vec<Vec<String>> = Vec::new();
        for target in order.iter().skip(1) {
            if paths.len() >= MAX_PATHS {
                break;
            }
            if let Some(path) = shortest_path(&outgoing, &self.seed, target) {
                if path.len() > 1 {
                    paths.push(path);
                }
            }
        }

        RelatedKnowledge { nodes, edges, paths }
    }
}

/// Neighborhood extraction result
#[derive(Debug, Clone, Default, Serialize)]
pub struct RelatedKnowledge {
    pub nodes: Vec<ConceptNode>,
    pub edges: Vec<ConceptEdge>,
    pub paths: Vec<Vec<String>>,
}

impl RelatedKnowledge {
    /// The canonical empty result
    pub fn empty() -> Self {
        Self::default()
    }
}

/// Presentation-ready node/link structure
#[derive(Debug, Clone, Default, Serialize)]
pub struct GraphVisualization {
    pub nodes: Vec<VisualNode>,
    pub links: Vec<VisualLink>,
}

impl GraphVisualization {
    /// The canonical empty visualization
    pub fn empty() -> Self {
        Self::default()
    }
}

/// A styled node for rendering
#[derive(Debug, Clone, Serialize)]
pub struct VisualNode {
    pub id: String,
    pub label: String,
    pub size: u32,
    pub color: String,
}

/// A labeled link for rendering
#[derive(Debug, Clone, Serialize)]
pub struct VisualLink {
    pub source: String,
    pub target: String,
    pub label: String,
}

/// BFS shortest path following outgoing edges; `None` if unreachable
fn shortest_path(
    outgoing: &HashMap<&str, Vec<&ConceptEdge>>,
    source: &str,
    target: &str,
) -> Option<Vec<String>> {
    if source == target {
        return Some(vec![source.to_string()]);
    }

    let mut visited: HashSet<&str> = HashSet::new();
    let mut predecessors: HashMap<&str, &str> = HashMap::new();
    let mut queue: VecDeque<&str> = VecDeque::new();

    visited.insert(source);
    queue.push_back(source);

    while let Some(current) = queue.pop_front() {
        for edge in outgoing.get(current).map(|v| v.as_slice()).unwrap_or(&[]) {
            let neighbor = edge.target.as_str();
            if !visited.insert(neighbor) {
                continue;
            }
            predecessors.insert(neighbor, current);
            if neighbor == target {
                // Walk backwards from target to source
                let mut path = vec![neighbor.to_string()];
                let mut cursor = neighbor;
                while let Some(&pred) = predecessors.get(cursor) {
                    path.push(pred.to_string());
                    cursor = pred;
                }
                path.reverse();
                return Some(path);
            }
            queue.push_back(neighbor);
        }
    }

    None
}
