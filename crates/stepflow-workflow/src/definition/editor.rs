//! Saved editor geometry.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::graph::StepId;

/// Canvas coordinates of a node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// X coordinate.
    pub x: f64,
    /// Y coordinate.
    pub y: f64,
}

impl Position {
    /// Creates a new position.
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Presentation state of a single node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeView {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
}

impl NodeView {
    /// Returns whether the view carries nothing worth saving.
    pub fn is_empty(&self) -> bool {
        self.position.is_none() && self.alias.is_none()
    }
}

/// Editor state stored alongside a workflow so decompilation can restore
/// node placement and display names.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EditorLayout {
    #[serde(default)]
    pub nodes: BTreeMap<StepId, NodeView>,
}

impl EditorLayout {
    /// Returns the saved view of a node.
    pub fn view(&self, id: &StepId) -> Option<&NodeView> {
        self.nodes.get(id)
    }

    /// Records a node's view, skipping empty ones.
    pub fn insert(&mut self, id: StepId, view: NodeView) {
        if !view.is_empty() {
            self.nodes.insert(id, view);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
