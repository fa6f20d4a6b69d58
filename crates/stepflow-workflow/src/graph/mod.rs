//! Editor graph model.
//!
//! - [`WorkflowGraph`]: nodes and edges in insertion order, plus settings
//! - [`GraphNode`] / [`GraphEdge`]: the authored steps and their connections
//! - [`StepId`] / [`EdgeId`]: identifiers
//! - [`SubtreeScopeResolver`]: repeat-subtree role assignment
//! - [`AutoLayout`]: placement for graphs without saved geometry

mod edge;
mod graph;
mod id;
mod layout;
mod node;
mod scope;

pub use edge::{GraphEdge, GraphEdgeBuilder, Transition};
pub use graph::{GraphSettings, WorkflowGraph};
pub use id::{EdgeId, StepId};
pub use layout::{AutoLayout, LayeredLayout};
pub use node::{GraphNode, GraphNodeBuilder};
pub use scope::{ScopeRole, SubtreePreview, SubtreeScopeResolver};
