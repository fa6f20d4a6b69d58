//! Prelude module for convenient imports.
//!
//! This module re-exports commonly used types for ergonomic imports:
//!
//! ```rust
//! use stepflow_workflow::prelude::*;
//! ```

pub use crate::condition::{Condition, ConditionForm, ConditionKind, WhenCondition};
pub use crate::definition::{
    Block, ExecutionContext, RepeatConfig, RepeatScope, Step, SwitchCase, Workflow,
    WorkflowExport,
};
pub use crate::engine::{GraphCompiler, GraphDecompiler};
pub use crate::error::{Error, ErrorKind, Result};
pub use crate::graph::{
    EdgeId, GraphEdge, GraphNode, ScopeRole, StepId, SubtreePreview, SubtreeScopeResolver,
    Transition, WorkflowGraph,
};
pub use crate::validate::{ValidationError, WorkflowValidator};
