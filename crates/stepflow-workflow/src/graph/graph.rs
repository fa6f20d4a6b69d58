//! Editor graph snapshot.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{GraphEdge, GraphNode, StepId, SubtreePreview, SubtreeScopeResolver, Transition};
use crate::condition::Condition;
use crate::definition::RepeatScope;
use crate::error::{Error, Result};

const fn default_version() -> u32 {
    1
}

/// Document-level settings carried through compilation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphSettings {
    /// Pinned entry node.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<StepId>,
    /// Page the workflow starts on.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_url: Option<String>,
    /// Initial variables.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub vars: Map<String, Value>,
    /// Document format version.
    #[serde(default = "default_version")]
    pub version: u32,
}

impl Default for GraphSettings {
    fn default() -> Self {
        Self {
            start: None,
            target_url: None,
            vars: Map::new(),
            version: default_version(),
        }
    }
}

/// Nodes and edges as authored in the editor.
///
/// Node and edge order is insertion order, which is significant: it decides
/// the order of compiled steps and of `switch` entries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkflowGraph {
    /// Graph nodes.
    #[serde(default)]
    pub nodes: Vec<GraphNode>,
    /// Graph edges.
    #[serde(default)]
    pub edges: Vec<GraphEdge>,
    /// Document settings.
    #[serde(default)]
    pub settings: GraphSettings,
}

impl WorkflowGraph {
    /// Creates a new empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new empty graph with settings.
    pub fn with_settings(settings: GraphSettings) -> Self {
        Self {
            settings,
            ..Default::default()
        }
    }

    /// Returns the number of nodes in the graph.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Returns the number of edges in the graph.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Returns whether the graph is empty.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Adds a node, rejecting duplicate IDs.
    pub fn add_node(&mut self, node: GraphNode) -> Result<()> {
        if self.contains_node(node.id.as_str()) {
            return Err(Error::InvalidGraph(format!(
                "duplicate node id `{}`",
                node.id
            )));
        }

        self.nodes.push(node);
        Ok(())
    }

    /// Adds an edge between existing nodes.
    pub fn add_edge(&mut self, edge: GraphEdge) -> Result<()> {
        self.check_endpoints(&edge)?;
        self.edges.push(edge);
        Ok(())
    }

    /// Connects two nodes with an unconditional edge.
    pub fn connect(&mut self, source: impl Into<StepId>, target: impl Into<StepId>) -> Result<()> {
        self.add_edge(GraphEdge::default_edge(source, target))
    }

    /// Connects two nodes with a conditional edge.
    pub fn connect_when(
        &mut self,
        source: impl Into<StepId>,
        target: impl Into<StepId>,
        condition: Condition,
    ) -> Result<()> {
        self.add_edge(GraphEdge::conditional(source, target, condition))
    }

    /// Connects two nodes through a named transition.
    pub fn connect_transition(
        &mut self,
        source: impl Into<StepId>,
        target: impl Into<StepId>,
        transition: Transition,
    ) -> Result<()> {
        self.add_edge(GraphEdge::transition(source, target, transition))
    }

    /// Returns the node with the given ID.
    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.nodes.iter().find(|node| node.id.as_str() == id)
    }

    /// Returns a mutable reference to the node with the given ID.
    pub fn node_mut(&mut self, id: &str) -> Option<&mut GraphNode> {
        self.nodes.iter_mut().find(|node| node.id.as_str() == id)
    }

    /// Returns whether a node exists.
    pub fn contains_node(&self, id: &str) -> bool {
        self.node(id).is_some()
    }

    /// Returns edges originating from a node, in insertion order.
    pub fn outgoing<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a GraphEdge> + 'a {
        self.edges
            .iter()
            .filter(move |edge| edge.source.as_str() == id)
    }

    /// Returns edges targeting a node, in insertion order.
    pub fn incoming<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a GraphEdge> + 'a {
        self.edges
            .iter()
            .filter(move |edge| edge.target.as_str() == id)
    }

    /// Returns `(source, target)` for every edge.
    pub fn edge_pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.edges
            .iter()
            .map(|edge| (edge.source.as_str(), edge.target.as_str()))
    }

    /// Returns the entry node.
    ///
    /// A pinned `settings.start` wins, then the first node without incoming
    /// edges, then the first node.
    pub fn start_node(&self) -> Option<&GraphNode> {
        if let Some(node) = self.settings.start.as_ref().and_then(|id| self.node(id.as_str())) {
            return Some(node);
        }

        let targets: HashSet<&str> = self.edges.iter().map(|e| e.target.as_str()).collect();
        self.nodes
            .iter()
            .find(|node| !targets.contains(node.id.as_str()))
            .or_else(|| self.nodes.first())
    }

    /// Resolves the repeat subtree owned by a node.
    ///
    /// Returns `None` unless the node repeats with `scope: subtree` and
    /// names a boundary.
    pub fn scope_preview(&self, id: &str) -> Option<SubtreePreview> {
        let node = self.node(id)?;
        let end = node.repeat.as_ref()?.subtree_boundary()?;
        Some(SubtreeScopeResolver::from_graph(self).resolve(node.id.as_str(), end.as_str()))
    }

    /// Checks the structural rules compilation relies on.
    ///
    /// Node IDs are unique and non-empty, every edge connects existing
    /// nodes, no node has two default edges resolving to the same
    /// transition, and every subtree repeat names a reachable boundary.
    pub fn validate(&self) -> Result<()> {
        if self.nodes.is_empty() {
            return Err(Error::InvalidGraph("graph has no nodes".into()));
        }

        let mut seen = HashSet::new();
        for node in &self.nodes {
            if node.id.as_str().is_empty() {
                return Err(Error::InvalidGraph("node id must not be empty".into()));
            }
            if !seen.insert(node.id.as_str()) {
                return Err(Error::InvalidGraph(format!(
                    "duplicate node id `{}`",
                    node.id
                )));
            }
        }

        if let Some(start) = &self.settings.start
            && !seen.contains(start.as_str())
        {
            return Err(Error::InvalidGraph(format!(
                "start node `{start}` does not exist"
            )));
        }

        let mut defaults: HashMap<(&str, Transition), &GraphEdge> = HashMap::new();
        for edge in &self.edges {
            self.check_endpoints(edge)?;
            let Some(transition) = edge.transition_kind() else {
                continue;
            };
            if defaults.insert((edge.source.as_str(), transition), edge).is_some() {
                return Err(Error::ConflictingTransition {
                    node: edge.source.clone(),
                    transition,
                });
            }
        }

        self.nodes.iter().try_for_each(|node| self.check_repeat(node))
    }

    fn check_endpoints(&self, edge: &GraphEdge) -> Result<()> {
        for (end, id) in [("source", &edge.source), ("target", &edge.target)] {
            if !self.contains_node(id.as_str()) {
                return Err(Error::InvalidGraph(format!(
                    "edge {} {end} node `{id}` does not exist",
                    edge.id
                )));
            }
        }
        Ok(())
    }

    fn check_repeat(&self, node: &GraphNode) -> Result<()> {
        let Some(repeat) = &node.repeat else {
            return Ok(());
        };
        if repeat.scope != RepeatScope::Subtree {
            return Ok(());
        }

        let end = repeat
            .subtree_end
            .as_ref()
            .ok_or_else(|| Error::invalid_repeat(&node.id, "subtree scope requires `subtreeEnd`"))?;
        if end == &node.id {
            return Err(Error::invalid_repeat(&node.id, "`subtreeEnd` must not be the node itself"));
        }
        if !self.contains_node(end.as_str()) {
            return Err(Error::invalid_repeat(
                &node.id,
                format!("`subtreeEnd` node `{end}` does not exist"),
            ));
        }

        let preview = SubtreeScopeResolver::from_graph(self).resolve(node.id.as_str(), end.as_str());
        if !preview.boundary_reached {
            return Err(Error::invalid_repeat(
                &node.id,
                format!("`subtreeEnd` node `{end}` is not reachable"),
            ));
        }
        Ok(())
    }
}
