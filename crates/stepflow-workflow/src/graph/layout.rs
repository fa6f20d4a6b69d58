//! Automatic node placement for graphs rebuilt without saved geometry.

use std::collections::{BTreeMap, HashMap, VecDeque};

use petgraph::graphmap::DiGraphMap;
use serde::{Deserialize, Serialize};

use super::{StepId, WorkflowGraph};
use crate::definition::Position;

/// Assigns canvas positions to graph nodes.
pub trait AutoLayout {
    /// Computes a position for every node of the graph.
    fn layout(&self, graph: &WorkflowGraph) -> BTreeMap<StepId, Position>;
}

/// Places nodes in columns by breadth-first depth from the start node.
///
/// Nodes not reachable from the start are stacked in one extra column
/// after the deepest layer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayeredLayout {
    /// Horizontal distance between layers.
    pub column_spacing: f64,
    /// Vertical distance between nodes of one layer.
    pub row_spacing: f64,
}

impl LayeredLayout {
    /// Default horizontal distance between layers.
    pub const DEFAULT_COLUMN_SPACING: f64 = 250.0;
    /// Default vertical distance between nodes of one layer.
    pub const DEFAULT_ROW_SPACING: f64 = 120.0;

    /// Creates a layout with the given spacing.
    pub fn new(column_spacing: f64, row_spacing: f64) -> Self {
        Self {
            column_spacing,
            row_spacing,
        }
    }

    fn depths<'a>(&self, graph: &'a WorkflowGraph) -> HashMap<&'a str, usize> {
        let mut depths = HashMap::new();
        let Some(start) = graph.start_node() else {
            return depths;
        };

        let edges: DiGraphMap<&str, ()> = DiGraphMap::from_edges(graph.edge_pairs());
        let start = start.id.as_str();
        depths.insert(start, 0);
        let mut queue = VecDeque::from([start]);

        while let Some(node) = queue.pop_front() {
            let depth = depths[node] + 1;
            if !edges.contains_node(node) {
                continue;
            }
            for next in edges.neighbors(node) {
                depths.entry(next).or_insert_with(|| {
                    queue.push_back(next);
                    depth
                });
            }
        }

        depths
    }
}

impl Default for LayeredLayout {
    fn default() -> Self {
        Self::new(Self::DEFAULT_COLUMN_SPACING, Self::DEFAULT_ROW_SPACING)
    }
}

impl AutoLayout for LayeredLayout {
    fn layout(&self, graph: &WorkflowGraph) -> BTreeMap<StepId, Position> {
        let depths = self.depths(graph);
        let orphan_column = depths.values().max().map_or(0, |max| max + 1);

        let mut rows: HashMap<usize, usize> = HashMap::new();
        graph
            .nodes
            .iter()
            .map(|node| {
                let column = depths
                    .get(node.id.as_str())
                    .copied()
                    .unwrap_or(orphan_column);
                let row = rows.entry(column).or_default();
                let position = Position::new(
                    column as f64 * self.column_spacing,
                    *row as f64 * self.row_spacing,
                );
                *row += 1;
                (node.id.clone(), position)
            })
            .collect()
    }
}
