//! Graph compiler.
//!
//! Turns an editor [`WorkflowGraph`] into the ordered [`Step`] list the
//! executor consumes.
//!
//! # Compilation Process
//!
//! 1. **Validation**: check the graph's structural rules
//! 2. **Node Compilation**: one step per node, block and repeat carried verbatim
//! 3. **Edge Routing**: conditional edges become `switch` entries in insertion
//!    order, default edges fill `next`, `onSuccess` or `onFailure`

use crate::definition::{EditorLayout, Step, SwitchCase, Workflow};
use crate::error::{Error, Result};
use crate::graph::{GraphNode, Transition, WorkflowGraph};
use crate::TRACING_TARGET_COMPILER;

/// Compiles an editor graph into a step list.
#[derive(Debug, Clone, Copy)]
pub struct GraphCompiler<'a> {
    graph: &'a WorkflowGraph,
}

impl<'a> GraphCompiler<'a> {
    /// Creates a compiler over a graph snapshot.
    pub fn new(graph: &'a WorkflowGraph) -> Self {
        Self { graph }
    }

    /// Compiles the graph into steps, one per node in node order.
    pub fn compile(&self) -> Result<Vec<Step>> {
        // Phase 1: Validate graph structure
        self.graph.validate().inspect_err(|error| {
            tracing::warn!(
                target: TRACING_TARGET_COMPILER,
                kind = error.kind_str(),
                %error,
                "Rejected workflow graph"
            );
        })?;

        // Phase 2: Compile each node with its outgoing edges
        let steps = self
            .graph
            .nodes
            .iter()
            .map(|node| self.compile_node(node))
            .collect::<Result<Vec<_>>>()?;

        tracing::debug!(
            target: TRACING_TARGET_COMPILER,
            node_count = self.graph.node_count(),
            edge_count = self.graph.edge_count(),
            "Compiled workflow graph"
        );

        Ok(steps)
    }

    /// Compiles the graph into a complete workflow document.
    ///
    /// Node positions and aliases are saved under `editor` so that
    /// decompilation can restore them.
    pub fn compile_workflow(&self) -> Result<Workflow> {
        let steps = self.compile()?;
        let start = self
            .graph
            .start_node()
            .map(|node| node.id.clone())
            .ok_or_else(|| Error::InvalidGraph("graph has no start node".into()))?;

        let mut editor = EditorLayout::default();
        for node in &self.graph.nodes {
            editor.insert(node.id.clone(), node.view());
        }

        let settings = &self.graph.settings;
        Ok(Workflow {
            version: settings.version,
            start,
            steps,
            target_url: settings.target_url.clone(),
            vars: settings.vars.clone(),
            editor: (!editor.is_empty()).then_some(editor),
        })
    }

    fn compile_node(&self, node: &GraphNode) -> Result<Step> {
        let mut step = Step::new(node.id.clone(), node.block.clone());
        step.repeat = node.repeat.clone();
        step.policy = node.policy.clone();

        for edge in self.graph.outgoing(node.id.as_str()) {
            let Some(transition) = edge.transition_kind() else {
                step.switch.push(SwitchCase {
                    when: edge.condition.clone(),
                    next: edge.target.clone(),
                });
                continue;
            };

            let slot = match transition {
                Transition::Next => &mut step.next,
                Transition::OnSuccess => &mut step.on_success,
                Transition::OnFailure => &mut step.on_failure,
            };
            if slot.replace(edge.target.clone()).is_some() {
                return Err(Error::ConflictingTransition {
                    node: node.id.clone(),
                    transition,
                });
            }
        }

        tracing::trace!(
            target: TRACING_TARGET_COMPILER,
            step_id = %step.id,
            switch_count = step.switch.len(),
            terminal = step.is_terminal(),
            "Compiled node"
        );

        Ok(step)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::ErrorKind;
    use crate::condition::Condition;
    use crate::definition::{Block, Position, RepeatConfig};
    use crate::engine::GraphDecompiler;
    use crate::graph::{GraphEdge, StepId};

    fn block(kind: &str) -> Block {
        Block::new(json!({ "type": kind }))
    }

    fn graph(ids: &[&str]) -> WorkflowGraph {
        let mut graph = WorkflowGraph::new();
        for id in ids {
            graph
                .add_node(GraphNode::new(*id, block("click")))
                .unwrap();
        }
        graph
    }

    fn exists(step: &str) -> Condition {
        Condition::Exists {
            path: format!("steps.{step}.result.data"),
        }
    }

    #[test]
    fn test_switch_follows_edge_order() {
        let mut graph = graph(&["a", "c1", "c2", "c3"]);
        graph.connect_when("a", "c1", exists("a")).unwrap();
        graph.connect_when("a", "c2", Condition::Expr("x > 1".into())).unwrap();
        graph.connect_when("a", "c3", Condition::Expr("x > 2".into())).unwrap();

        let steps = GraphCompiler::new(&graph).compile().unwrap();
        let targets: Vec<_> = steps[0].switch.iter().map(|c| c.next.as_str()).collect();
        assert_eq!(targets, vec!["c1", "c2", "c3"]);
        assert_eq!(steps[0].switch[0].when, exists("a"));
        assert!(steps[0].next.is_none());
        assert!(steps[1].is_terminal());
    }

    #[test]
    fn test_default_edges_route_by_label() {
        let mut graph = graph(&["a", "b", "ok", "err"]);
        graph.connect("a", "b").unwrap();
        graph.connect_transition("a", "ok", Transition::OnSuccess).unwrap();
        graph.connect_transition("a", "err", Transition::OnFailure).unwrap();

        let steps = GraphCompiler::new(&graph).compile().unwrap();
        assert_eq!(steps[0].next, Some(StepId::from("b")));
        assert_eq!(steps[0].on_success, Some(StepId::from("ok")));
        assert_eq!(steps[0].on_failure, Some(StepId::from("err")));
        assert!(steps[0].switch.is_empty());
    }

    #[test]
    fn test_conflicting_default_edges() {
        let mut graph = graph(&["a", "b", "c"]);
        graph.connect("a", "b").unwrap();
        graph.connect("a", "c").unwrap();

        let error = GraphCompiler::new(&graph).compile().unwrap_err();
        assert_eq!(error.kind(), ErrorKind::ConflictingTransition);
    }

    #[test]
    fn test_non_exact_label_is_next() {
        let mut graph = graph(&["a", "b"]);
        let edge = GraphEdge::builder()
            .with_source("a")
            .with_target("b")
            .with_is_default(true)
            .with_label("on success")
            .build()
            .unwrap();
        graph.add_edge(edge).unwrap();

        let steps = GraphCompiler::new(&graph).compile().unwrap();
        assert_eq!(steps[0].next, Some(StepId::from("b")));
        assert!(steps[0].on_success.is_none());
    }

    #[test]
    fn test_block_and_repeat_carried_verbatim() {
        let mut graph = graph(&["a", "b"]);
        let node = graph.node_mut("a").unwrap();
        node.block = Block::new(json!({ "type": "type", "text": "hello", "nested": [1, 2] }));
        node.repeat = Some(RepeatConfig::for_each("steps.list.result.data").with_subtree("b"));
        graph.connect("a", "b").unwrap();

        let steps = GraphCompiler::new(&graph).compile().unwrap();
        assert_eq!(steps[0].block, graph.nodes[0].block);
        assert_eq!(steps[0].repeat, graph.nodes[0].repeat);
    }

    #[test]
    fn test_compile_workflow_document() {
        let mut graph = graph(&["a", "b"]);
        graph.connect("a", "b").unwrap();
        graph.settings.target_url = Some("https://example.com".into());
        graph.node_mut("b").unwrap().position = Some(Position::new(10.0, 20.0));

        let workflow = GraphCompiler::new(&graph).compile_workflow().unwrap();
        assert_eq!(workflow.start.as_str(), "a");
        assert_eq!(workflow.version, 1);
        assert_eq!(workflow.target_url.as_deref(), Some("https://example.com"));

        let editor = workflow.editor.unwrap();
        assert_eq!(editor.nodes.len(), 1);
        assert_eq!(
            editor.view(&"b".into()).unwrap().position,
            Some(Position::new(10.0, 20.0))
        );
    }

    #[test]
    fn test_compile_then_decompile_preserves_graph() {
        let mut graph = graph(&["a", "b", "c", "d"]);
        graph.node_mut("a").unwrap().repeat = Some(RepeatConfig::count(3u64).with_subtree("d"));
        graph
            .connect_when("a", "b", Condition::Or(vec![exists("a"), Condition::Expr("y".into())]))
            .unwrap();
        graph.connect("a", "c").unwrap();
        graph.connect_transition("b", "d", Transition::OnFailure).unwrap();
        graph.connect("c", "d").unwrap();

        let workflow = GraphCompiler::new(&graph).compile_workflow().unwrap();
        let rebuilt = GraphDecompiler::new().decompile(&workflow).unwrap();

        assert_eq!(rebuilt.node_count(), graph.node_count());
        for (original, node) in graph.nodes.iter().zip(&rebuilt.nodes) {
            assert_eq!(original.id, node.id);
            assert_eq!(original.block, node.block);
            assert_eq!(original.repeat, node.repeat);
        }

        assert_eq!(rebuilt.edge_count(), graph.edge_count());
        for original in &graph.edges {
            let matched = rebuilt.edges.iter().any(|edge| {
                edge.source == original.source
                    && edge.target == original.target
                    && edge.condition == original.condition
                    && edge.transition_kind() == original.transition_kind()
            });
            assert!(matched, "no equivalent edge for {}", original.id);
        }
    }
}
