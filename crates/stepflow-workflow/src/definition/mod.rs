//! Workflow definition types.
//!
//! These are the artifacts produced by [`GraphCompiler`](crate::engine::GraphCompiler)
//! and consumed by the executor: [`Workflow`] documents made of [`Step`]s,
//! their [`RepeatConfig`]s and opaque [`Block`] payloads.

mod block;
mod context;
mod editor;
mod export;
mod repeat;
mod step;
mod workflow;

pub use block::{Block, BlockRegistry, BlockSchemas};
pub use context::{ExecutionContext, ForEachState, LoopState, StepResult, StepState};
pub use editor::{EditorLayout, NodeView, Position};
pub use export::{EXPORT_FORMAT_VERSION, ExportMetadata, WorkflowExport, import_workflow};
pub use repeat::{RepeatConfig, RepeatCount, RepeatMode, RepeatScope};
pub use step::{ExecutionPolicy, RetryPolicy, Step, SwitchCase};
pub use workflow::Workflow;
