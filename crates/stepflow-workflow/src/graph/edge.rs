//! Edges of the editor graph.

use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString, IntoStaticStr};

use super::{EdgeId, StepId};
use crate::condition::{Condition, ConditionForm};

/// Named transition a default edge compiles into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[derive(AsRefStr, Display, EnumString, IntoStaticStr)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum Transition {
    /// Unconditional successor.
    Next,
    /// Successor after a successful run.
    OnSuccess,
    /// Successor after a failed run.
    OnFailure,
}

impl Transition {
    /// Picks the transition for a default edge from its label.
    ///
    /// Only the exact labels `onSuccess` and `onFailure` select a named
    /// transition; anything else is `next`.
    pub fn from_label(label: &str) -> Self {
        match label {
            "onSuccess" => Self::OnSuccess,
            "onFailure" => Self::OnFailure,
            _ => Self::Next,
        }
    }
}

/// A directed edge carrying a branch condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Builder)]
#[builder(
    name = "GraphEdgeBuilder",
    pattern = "owned",
    setter(into, strip_option, prefix = "with"),
    build_fn(validate = "Self::validate")
)]
#[serde(rename_all = "camelCase")]
pub struct GraphEdge {
    /// Edge ID.
    #[builder(default = "EdgeId::generate()")]
    pub id: EdgeId,
    /// Source node ID.
    pub source: StepId,
    /// Target node ID.
    pub target: StepId,
    /// Branch predicate; ignored when `is_default` is set.
    #[serde(default)]
    #[builder(default)]
    pub condition: Condition,
    /// Whether this is an unconditional edge.
    #[serde(default)]
    #[builder(default)]
    pub is_default: bool,
    /// Cached display label.
    #[serde(default)]
    #[builder(default)]
    pub label: String,
}

impl GraphEdgeBuilder {
    fn validate(&self) -> Result<(), String> {
        if self.source.is_none() {
            return Err("source is required".into());
        }
        if self.target.is_none() {
            return Err("target is required".into());
        }
        Ok(())
    }
}

impl GraphEdge {
    /// Creates an unconditional edge.
    pub fn default_edge(source: impl Into<StepId>, target: impl Into<StepId>) -> Self {
        Self {
            id: EdgeId::generate(),
            source: source.into(),
            target: target.into(),
            condition: Condition::Default,
            is_default: true,
            label: String::new(),
        }
    }

    /// Creates a default edge routed to a named transition.
    pub fn transition(
        source: impl Into<StepId>,
        target: impl Into<StepId>,
        transition: Transition,
    ) -> Self {
        let mut edge = Self::default_edge(source, target);
        if transition != Transition::Next {
            edge.label = transition.to_string();
        }
        edge
    }

    /// Creates a conditional edge, labelled from its condition.
    pub fn conditional(
        source: impl Into<StepId>,
        target: impl Into<StepId>,
        condition: Condition,
    ) -> Self {
        let label = ConditionForm::decode(&condition).label();
        Self {
            id: EdgeId::generate(),
            source: source.into(),
            target: target.into(),
            condition,
            is_default: false,
            label,
        }
    }

    /// Returns a builder for creating an edge.
    pub fn builder() -> GraphEdgeBuilder {
        GraphEdgeBuilder::default()
    }

    /// Replaces the edge ID.
    pub fn with_id(mut self, id: impl Into<EdgeId>) -> Self {
        self.id = id.into();
        self
    }

    /// Returns the named transition of a default edge, or `None` for a
    /// conditional one.
    pub fn transition_kind(&self) -> Option<Transition> {
        self.is_default.then(|| Transition::from_label(&self.label))
    }

    /// Recomputes the cached label from the condition.
    ///
    /// Default edges keep their label, since it selects the transition.
    pub fn refresh_label(&mut self) {
        if !self.is_default {
            self.label = ConditionForm::decode(&self.condition).label();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn test_transition_names() {
        assert_eq!(Transition::Next.to_string(), "next");
        assert_eq!(Transition::OnFailure.as_ref(), "onFailure");
        assert_eq!(Transition::from_str("onSuccess").unwrap(), Transition::OnSuccess);
    }

    #[test]
    fn test_from_label_is_exact() {
        assert_eq!(Transition::from_label("onSuccess"), Transition::OnSuccess);
        assert_eq!(Transition::from_label("onFailure"), Transition::OnFailure);
        assert_eq!(Transition::from_label("OnSuccess"), Transition::Next);
        assert_eq!(Transition::from_label("on failure"), Transition::Next);
        assert_eq!(Transition::from_label(""), Transition::Next);
    }

    #[test]
    fn test_edge_builder() {
        let edge = GraphEdge::builder()
            .with_source("a")
            .with_target("b")
            .with_is_default(true)
            .with_label("onFailure")
            .build()
            .unwrap();
        assert_eq!(edge.transition_kind(), Some(Transition::OnFailure));
        assert!(!edge.id.as_str().is_empty());
    }

    #[test]
    fn test_edge_builder_requires_endpoints() {
        let result = GraphEdge::builder().with_source("a").build();
        assert!(result.is_err());
    }

    #[test]
    fn test_conditional_edge_label() {
        let edge = GraphEdge::conditional(
            "a",
            "b",
            Condition::Exists {
                path: "steps.a.result.data".into(),
            },
        );
        assert_eq!(edge.label, "exists");
        assert_eq!(edge.transition_kind(), None);
    }

    #[test]
    fn test_refresh_label_follows_condition() {
        let mut edge = GraphEdge::conditional("a", "b", Condition::Expr("vars.ok".into()));
        assert_eq!(edge.label, "vars.ok");

        edge.condition = Condition::Exists {
            path: "steps.a.result.data".into(),
        };
        edge.refresh_label();
        assert_eq!(edge.label, "exists");

        let mut edge = GraphEdge::transition("a", "b", Transition::OnFailure);
        edge.refresh_label();
        assert_eq!(edge.label, "onFailure");
    }

    #[test]
    fn test_named_transition_edge() {
        let edge = GraphEdge::transition("a", "b", Transition::OnSuccess);
        assert!(edge.is_default);
        assert_eq!(edge.label, "onSuccess");
        assert_eq!(
            GraphEdge::transition("a", "b", Transition::Next).label,
            ""
        );
    }
}
