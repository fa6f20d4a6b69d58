//! Repeat-scope resolution.
//!
//! A repeat with `scope: subtree` re-executes every step between its owner
//! and a boundary node. The resolver walks forward from the owner without
//! passing the boundary and classifies the nodes that lie on some path to
//! it. Dead-end branches that never reach the boundary are excluded.

use std::collections::{BTreeMap, HashSet, VecDeque};

use petgraph::Direction;
use petgraph::graphmap::DiGraphMap;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display};

use super::{StepId, WorkflowGraph};
use crate::definition::Step;

/// Role of a node inside a repeat subtree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[derive(AsRefStr, Display)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum ScopeRole {
    /// The repeating node itself.
    Start,
    /// Inside the subtree.
    Middle,
    /// Last node before the boundary.
    EndNeighbor,
}

/// Derived view of a repeat subtree. Never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubtreePreview {
    /// Role of every node in the subtree.
    pub roles: BTreeMap<StepId, ScopeRole>,
    /// Whether the boundary was found. When it was not, `roles` only holds
    /// the start node and its direct successors.
    pub boundary_reached: bool,
}

impl SubtreePreview {
    /// Returns the role of a node, if it belongs to the subtree.
    pub fn role(&self, id: &str) -> Option<ScopeRole> {
        self.roles.get(id).copied()
    }

    /// Returns whether a node belongs to the subtree.
    pub fn contains(&self, id: &str) -> bool {
        self.roles.contains_key(id)
    }

    /// Returns the nodes directly in front of the boundary.
    pub fn end_neighbors(&self) -> impl Iterator<Item = &StepId> {
        self.roles
            .iter()
            .filter(|(_, role)| **role == ScopeRole::EndNeighbor)
            .map(|(id, _)| id)
    }

    /// Returns the number of nodes with a role.
    pub fn len(&self) -> usize {
        self.roles.len()
    }

    /// Returns whether no node has a role.
    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }
}

/// Partitions nodes into repeat-scope roles.
#[derive(Debug, Clone, Default)]
pub struct SubtreeScopeResolver<'a> {
    graph: DiGraphMap<&'a str, ()>,
}

impl<'a> SubtreeScopeResolver<'a> {
    /// Builds a resolver over `(source, target)` pairs.
    pub fn new(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Self {
            graph: DiGraphMap::from_edges(pairs),
        }
    }

    /// Builds a resolver over the edges of an editor graph.
    pub fn from_graph(graph: &'a WorkflowGraph) -> Self {
        Self::new(graph.edge_pairs())
    }

    /// Builds a resolver over the transitions of compiled steps.
    pub fn from_steps(steps: &'a [Step]) -> Self {
        Self::new(steps.iter().flat_map(|step| {
            step.transitions()
                .map(move |(_, target)| (step.id.as_str(), target.as_str()))
        }))
    }

    /// Resolves the subtree from `start` up to, not including, `end`.
    pub fn resolve(&self, start: &str, end: &str) -> SubtreePreview {
        let mut preview = SubtreePreview::default();
        preview.roles.insert(StepId::from(start), ScopeRole::Start);
        if start == end {
            return preview;
        }
        let Some(start) = self.node(start) else {
            return preview;
        };

        let (reached, feeders) = self.walk_forward(start, end);
        if feeders.is_empty() {
            for next in self.successors(start).filter(|&next| next != start) {
                preview.roles.insert(StepId::from(next), ScopeRole::Middle);
            }
            return preview;
        }

        let on_path = self.walk_backward(&feeders, &reached);
        for &node in on_path.iter().filter(|&&node| node != start) {
            let role = if feeders.contains(node) && self.leads_only_out(node, end, &on_path) {
                ScopeRole::EndNeighbor
            } else {
                ScopeRole::Middle
            };
            preview.roles.insert(StepId::from(node), role);
        }

        preview.boundary_reached = true;
        preview
    }

    /// Breadth-first walk from `start` that never expands `end`. Returns the
    /// reached nodes and those with an edge into `end`.
    fn walk_forward(&self, start: &'a str, end: &str) -> (HashSet<&'a str>, HashSet<&'a str>) {
        let mut reached = HashSet::from([start]);
        let mut feeders = HashSet::new();
        let mut queue = VecDeque::from([start]);

        while let Some(node) = queue.pop_front() {
            for next in self.successors(node) {
                if next == end {
                    feeders.insert(node);
                } else if reached.insert(next) {
                    queue.push_back(next);
                }
            }
        }

        (reached, feeders)
    }

    /// Collects the reached nodes from which some feeder is reachable.
    fn walk_backward(
        &self,
        feeders: &HashSet<&'a str>,
        reached: &HashSet<&'a str>,
    ) -> HashSet<&'a str> {
        let mut on_path = feeders.clone();
        let mut queue: VecDeque<_> = feeders.iter().copied().collect();

        while let Some(node) = queue.pop_front() {
            for prev in self.graph.neighbors_directed(node, Direction::Incoming) {
                if reached.contains(prev) && on_path.insert(prev) {
                    queue.push_back(prev);
                }
            }
        }

        on_path
    }

    /// Returns whether no edge from `node` stays inside the subtree.
    fn leads_only_out(&self, node: &'a str, end: &str, on_path: &HashSet<&'a str>) -> bool {
        self.successors(node)
            .all(|next| next == end || !on_path.contains(next))
    }

    fn successors(&self, node: &'a str) -> impl Iterator<Item = &'a str> + '_ {
        self.graph.neighbors_directed(node, Direction::Outgoing)
    }

    fn node(&self, id: &str) -> Option<&'a str> {
        self.graph.nodes().find(|&node| node == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver(pairs: &[(&'static str, &'static str)]) -> SubtreeScopeResolver<'static> {
        SubtreeScopeResolver::new(pairs.iter().copied())
    }

    fn roles(preview: &SubtreePreview) -> Vec<(&str, ScopeRole)> {
        preview
            .roles
            .iter()
            .map(|(id, role)| (id.as_str(), *role))
            .collect()
    }

    #[test]
    fn test_linear_chain_with_dead_end() {
        let resolver = resolver(&[("A", "B"), ("B", "C"), ("C", "D"), ("A", "E")]);
        let preview = resolver.resolve("A", "D");
        assert!(preview.boundary_reached);
        assert_eq!(
            roles(&preview),
            vec![
                ("A", ScopeRole::Start),
                ("B", ScopeRole::Middle),
                ("C", ScopeRole::EndNeighbor),
            ]
        );
    }

    #[test]
    fn test_diamond_has_two_end_neighbors() {
        let resolver = resolver(&[("A", "B"), ("A", "C"), ("B", "D"), ("C", "D"), ("D", "E")]);
        let preview = resolver.resolve("A", "D");
        assert_eq!(preview.role("B"), Some(ScopeRole::EndNeighbor));
        assert_eq!(preview.role("C"), Some(ScopeRole::EndNeighbor));
        assert!(!preview.contains("D"));
        assert!(!preview.contains("E"));
        assert_eq!(preview.end_neighbors().count(), 2);
    }

    #[test]
    fn test_start_feeding_boundary_stays_start() {
        let resolver = resolver(&[("A", "B")]);
        let preview = resolver.resolve("A", "B");
        assert!(preview.boundary_reached);
        assert_eq!(roles(&preview), vec![("A", ScopeRole::Start)]);
    }

    #[test]
    fn test_feeder_with_inner_edge_is_middle() {
        let resolver = resolver(&[("A", "B"), ("B", "D"), ("B", "C"), ("C", "D")]);
        let preview = resolver.resolve("A", "D");
        assert_eq!(preview.role("B"), Some(ScopeRole::Middle));
        assert_eq!(preview.role("C"), Some(ScopeRole::EndNeighbor));
    }

    #[test]
    fn test_unreachable_boundary() {
        let resolver = resolver(&[("A", "B"), ("B", "C"), ("X", "Y")]);
        let preview = resolver.resolve("A", "Y");
        assert!(!preview.boundary_reached);
        assert_eq!(
            roles(&preview),
            vec![("A", ScopeRole::Start), ("B", ScopeRole::Middle)]
        );
        assert_eq!(preview.end_neighbors().count(), 0);
    }

    #[test]
    fn test_degenerate_inputs() {
        let resolver = resolver(&[("A", "B")]);
        let preview = resolver.resolve("A", "A");
        assert!(!preview.boundary_reached);
        assert_eq!(preview.len(), 1);

        let preview = resolver.resolve("Z", "B");
        assert!(!preview.boundary_reached);
        assert_eq!(roles(&preview), vec![("Z", ScopeRole::Start)]);
    }

    #[test]
    fn test_cycle_inside_subtree() {
        let resolver = resolver(&[("A", "B"), ("B", "C"), ("C", "B"), ("C", "D")]);
        let preview = resolver.resolve("A", "D");
        assert!(preview.boundary_reached);
        assert_eq!(preview.role("B"), Some(ScopeRole::Middle));
        assert_eq!(preview.role("C"), Some(ScopeRole::Middle));
    }

    #[test]
    fn test_role_names() {
        assert_eq!(ScopeRole::EndNeighbor.to_string(), "end-neighbor");
        assert_eq!(
            serde_json::to_value(ScopeRole::Start).unwrap(),
            serde_json::json!("start")
        );
    }
}
