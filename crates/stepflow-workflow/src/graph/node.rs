//! Nodes of the editor graph.

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use super::StepId;
use crate::definition::{Block, ExecutionPolicy, NodeView, Position, RepeatConfig};

/// A step as authored in the editor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Builder)]
#[builder(
    name = "GraphNodeBuilder",
    pattern = "owned",
    setter(into, strip_option, prefix = "with"),
    build_fn(validate = "Self::validate")
)]
#[serde(rename_all = "camelCase")]
pub struct GraphNode {
    /// Node ID, reused as the compiled step's ID.
    pub id: StepId,
    /// Opaque action descriptor.
    #[serde(default)]
    #[builder(default)]
    pub block: Block,
    /// Repeat configuration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default)]
    pub repeat: Option<RepeatConfig>,
    /// Executor hints, passed through to the step.
    #[serde(flatten)]
    #[builder(default)]
    pub policy: ExecutionPolicy,
    /// Display name shown instead of the ID.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default)]
    pub alias: Option<String>,
    /// Canvas position.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default)]
    pub position: Option<Position>,
}

impl GraphNodeBuilder {
    fn validate(&self) -> Result<(), String> {
        match &self.id {
            None => Err("id is required".into()),
            Some(id) if id.as_str().is_empty() => Err("id must not be empty".into()),
            Some(_) => Ok(()),
        }
    }
}

impl GraphNode {
    /// Creates a node with a block.
    pub fn new(id: impl Into<StepId>, block: Block) -> Self {
        Self {
            id: id.into(),
            block,
            repeat: None,
            policy: ExecutionPolicy::default(),
            alias: None,
            position: None,
        }
    }

    /// Returns a builder for creating a node.
    pub fn builder() -> GraphNodeBuilder {
        GraphNodeBuilder::default()
    }

    /// Returns the alias, falling back to the ID.
    pub fn display_name(&self) -> &str {
        self.alias.as_deref().unwrap_or(self.id.as_str())
    }

    /// Returns the presentation state worth persisting.
    pub fn view(&self) -> NodeView {
        NodeView {
            position: self.position,
            alias: self.alias.clone(),
        }
    }
}
