#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

pub mod condition;
pub mod definition;
pub mod engine;
mod error;
pub mod graph;
pub mod path;
pub mod validate;

#[doc(hidden)]
pub mod prelude;

pub use error::{Error, ErrorKind, Result};

/// Tracing target for graph compilation.
pub const TRACING_TARGET_COMPILER: &str = "stepflow_workflow::compiler";

/// Tracing target for graph reconstruction from step lists.
pub const TRACING_TARGET_DECOMPILER: &str = "stepflow_workflow::decompiler";

/// Tracing target for workflow validation.
pub const TRACING_TARGET_VALIDATOR: &str = "stepflow_workflow::validator";

/// Tracing target for workflow import and export.
pub const TRACING_TARGET_EXPORT: &str = "stepflow_workflow::export";
