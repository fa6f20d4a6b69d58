//! Subcommands.

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use clap::Subcommand;
use serde::{Deserialize, Serialize};
use serde_json::json;
use stepflow_workflow::definition::{Workflow, WorkflowExport, import_workflow};
use stepflow_workflow::engine::{GraphCompiler, GraphDecompiler};
use stepflow_workflow::graph::{LayeredLayout, WorkflowGraph};

use crate::TRACING_TARGET_CLI;
use crate::config::{LayoutConfig, OutputConfig};

const STDIN: &str = "-";

/// Operations on workflow documents.
///
/// Every input argument accepts `-` to read from stdin.
#[derive(Debug, Clone, Subcommand, Serialize, Deserialize)]
pub enum Command {
    /// Compile an editor graph into a workflow document.
    Compile {
        /// Editor graph JSON.
        #[arg(value_name = "GRAPH", default_value = STDIN)]
        input: PathBuf,
    },

    /// Rebuild an editor graph from a workflow or export document.
    Decompile {
        /// Workflow JSON, bare or wrapped in an export envelope.
        #[arg(value_name = "WORKFLOW", default_value = STDIN)]
        input: PathBuf,

        #[clap(flatten)]
        layout: LayoutConfig,
    },

    /// Check a workflow document for broken references.
    Validate {
        /// Workflow JSON, bare or wrapped in an export envelope.
        #[arg(value_name = "WORKFLOW", default_value = STDIN)]
        input: PathBuf,
    },

    /// Wrap a workflow document in an export envelope.
    Export {
        /// Workflow JSON, bare or wrapped in an export envelope.
        #[arg(value_name = "WORKFLOW", default_value = STDIN)]
        input: PathBuf,

        /// Description stored in the export metadata.
        #[arg(short = 'd', long, default_value = "")]
        description: String,
    },

    /// Show which nodes a subtree repeat re-executes.
    Scope {
        /// Editor graph JSON.
        #[arg(value_name = "GRAPH", default_value = STDIN)]
        input: PathBuf,

        /// ID of the repeating node.
        #[arg(short = 'n', long)]
        node: String,
    },
}

impl Command {
    /// Returns the subcommand name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Compile { .. } => "compile",
            Self::Decompile { .. } => "decompile",
            Self::Validate { .. } => "validate",
            Self::Export { .. } => "export",
            Self::Scope { .. } => "scope",
        }
    }

    /// Runs the command, writing its result through `output`.
    pub fn run(&self, output: &OutputConfig) -> anyhow::Result<()> {
        match self {
            Self::Compile { input } => {
                let graph = read_graph(input)?;
                let workflow = GraphCompiler::new(&graph)
                    .compile_workflow()
                    .context("failed to compile graph")?;
                tracing::info!(
                    target: TRACING_TARGET_CLI,
                    steps = workflow.steps.len(),
                    start = %workflow.start,
                    "Compiled graph"
                );
                output.write(&workflow)
            }
            Self::Decompile { input, layout } => {
                let workflow = read_workflow(input)?;
                let graph = GraphDecompiler::with_layout(LayeredLayout::from(*layout))
                    .decompile(&workflow)
                    .context("failed to decompile workflow")?;
                tracing::info!(
                    target: TRACING_TARGET_CLI,
                    nodes = graph.node_count(),
                    edges = graph.edge_count(),
                    "Decompiled workflow"
                );
                output.write(&graph)
            }
            Self::Validate { input } => {
                let workflow = read_workflow(input)?;
                output.write(&json!({
                    "valid": true,
                    "start": workflow.start,
                    "steps": workflow.steps.len(),
                }))
            }
            Self::Export { input, description } => {
                let workflow = read_workflow(input)?;
                output.write(&WorkflowExport::new(workflow, description.as_str()))
            }
            Self::Scope { input, node } => {
                let graph = read_graph(input)?;
                if !graph.contains_node(node) {
                    bail!("node `{node}` does not exist");
                }
                let Some(preview) = graph.scope_preview(node) else {
                    bail!("node `{node}` does not repeat over a subtree");
                };
                if !preview.boundary_reached {
                    bail!("subtree end of node `{node}` is not reachable from it");
                }
                output.write(&preview)
            }
        }
    }
}

/// Reads an input argument, treating `-` as stdin.
fn read_input(path: &Path) -> anyhow::Result<String> {
    if path.as_os_str() == STDIN {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("failed to read stdin")?;
        return Ok(buffer);
    }

    fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

fn read_graph(path: &Path) -> anyhow::Result<WorkflowGraph> {
    let json = read_input(path)?;
    serde_json::from_str(&json).with_context(|| format!("{} is not a workflow graph", path.display()))
}

fn read_workflow(path: &Path) -> anyhow::Result<Workflow> {
    let json = read_input(path)?;
    import_workflow(&json).with_context(|| format!("{} is not a valid workflow", path.display()))
}
