//! Graph decompiler.
//!
//! Rebuilds an editor [`WorkflowGraph`] from a compiled [`Workflow`]. Edge
//! IDs are derived from the edge's endpoints and the transition it came
//! from, so decompiling the same document twice yields the same graph.

use crate::condition::{Condition, ConditionForm};
use crate::definition::{Step, Workflow};
use crate::error::Result;
use crate::graph::{
    AutoLayout, EdgeId, GraphEdge, GraphNode, GraphSettings, LayeredLayout, StepId, Transition,
    WorkflowGraph,
};
use crate::validate::WorkflowValidator;
use crate::TRACING_TARGET_DECOMPILER;

/// Reconstructs editor graphs from workflow documents.
#[derive(Debug, Clone, Default)]
pub struct GraphDecompiler<L = LayeredLayout> {
    layout: L,
}

impl GraphDecompiler {
    /// Creates a decompiler with the default layered layout.
    pub fn new() -> Self {
        Self::default()
    }
}

impl<L: AutoLayout> GraphDecompiler<L> {
    /// Creates a decompiler placing unsaved nodes with `layout`.
    pub fn with_layout(layout: L) -> Self {
        Self { layout }
    }

    /// Validates a workflow and rebuilds its graph.
    ///
    /// Saved editor geometry is restored; nodes without a saved position are
    /// placed by the layout.
    pub fn decompile(&self, workflow: &Workflow) -> Result<WorkflowGraph> {
        WorkflowValidator::new().validate(workflow).inspect_err(|error| {
            tracing::warn!(
                target: TRACING_TARGET_DECOMPILER,
                %error,
                "Rejected workflow document"
            );
        })?;

        let mut graph = WorkflowGraph::with_settings(GraphSettings {
            start: Some(workflow.start.clone()),
            target_url: workflow.target_url.clone(),
            vars: workflow.vars.clone(),
            version: workflow.version,
        });

        for step in &workflow.steps {
            graph.nodes.push(self.decompile_node(workflow, step));
        }
        for step in &workflow.steps {
            graph.edges.extend(self.decompile_edges(step));
        }

        self.place_nodes(&mut graph);

        tracing::debug!(
            target: TRACING_TARGET_DECOMPILER,
            node_count = graph.node_count(),
            edge_count = graph.edge_count(),
            "Decompiled workflow"
        );

        Ok(graph)
    }

    fn decompile_node(&self, workflow: &Workflow, step: &Step) -> GraphNode {
        let mut node = GraphNode::new(step.id.clone(), step.block.clone());
        node.repeat = step.repeat.clone();
        node.policy = step.policy.clone();

        if let Some(view) = workflow.editor.as_ref().and_then(|e| e.view(&step.id)) {
            node.position = view.position;
            node.alias = view.alias.clone();
        }
        node
    }

    fn decompile_edges(&self, step: &Step) -> Vec<GraphEdge> {
        let source = &step.id;
        let mut edges: Vec<_> = step
            .switch
            .iter()
            .enumerate()
            .map(|(j, case)| GraphEdge {
                id: EdgeId::derived(source, &case.next, &format!("switch-{j}")),
                source: source.clone(),
                target: case.next.clone(),
                condition: case.when.clone(),
                is_default: false,
                label: ConditionForm::decode(&case.when).label(),
            })
            .collect();

        let named = [
            (Transition::Next, &step.next),
            (Transition::OnSuccess, &step.on_success),
            (Transition::OnFailure, &step.on_failure),
        ];
        for (transition, target) in named {
            if let Some(target) = target {
                edges.push(default_edge(source, target, transition));
            }
        }

        edges
    }

    fn place_nodes(&self, graph: &mut WorkflowGraph) {
        if graph.nodes.iter().all(|node| node.position.is_some()) {
            return;
        }

        let mut positions = self.layout.layout(graph);
        for node in graph.nodes.iter_mut().filter(|n| n.position.is_none()) {
            node.position = positions.remove(&node.id);
        }
    }
}

fn default_edge(source: &StepId, target: &StepId, transition: Transition) -> GraphEdge {
    let label = match transition {
        Transition::Next => String::new(),
        named => named.to_string(),
    };

    GraphEdge {
        id: EdgeId::derived(source, target, transition.as_ref()),
        source: source.clone(),
        target: target.clone(),
        condition: Condition::Default,
        is_default: true,
        label,
    }
}
