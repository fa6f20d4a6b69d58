//! Compiled steps.

use serde::{Deserialize, Serialize};

use super::{Block, RepeatConfig};
use crate::condition::Condition;
use crate::graph::StepId;

/// One entry of a compiled workflow.
///
/// Transition targets are not checked here; see
/// [`WorkflowValidator`](crate::validate::WorkflowValidator).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Step {
    /// Step ID, equal to the originating graph node's ID.
    pub id: StepId,
    /// Opaque action descriptor.
    #[serde(default)]
    pub block: Block,
    /// Repeat configuration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repeat: Option<RepeatConfig>,
    /// Conditional branches, tested in order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub switch: Vec<SwitchCase>,
    /// Unconditional successor.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<StepId>,
    /// Successor after a successful run.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_success: Option<StepId>,
    /// Successor after a failed run.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_failure: Option<StepId>,
    /// Executor hints, passed through.
    #[serde(flatten)]
    pub policy: ExecutionPolicy,
}

impl Step {
    /// Creates a terminal step.
    pub fn new(id: impl Into<StepId>, block: Block) -> Self {
        Self {
            id: id.into(),
            block,
            repeat: None,
            switch: Vec::new(),
            next: None,
            on_success: None,
            on_failure: None,
            policy: ExecutionPolicy::default(),
        }
    }

    /// Sets the unconditional successor.
    pub fn with_next(mut self, next: impl Into<StepId>) -> Self {
        self.next = Some(next.into());
        self
    }

    /// Appends a conditional branch.
    pub fn with_case(mut self, when: Condition, next: impl Into<StepId>) -> Self {
        self.switch.push(SwitchCase {
            when,
            next: next.into(),
        });
        self
    }

    /// Sets the repeat configuration.
    pub fn with_repeat(mut self, repeat: RepeatConfig) -> Self {
        self.repeat = Some(repeat);
        self
    }

    /// Returns whether the step has no successor.
    pub fn is_terminal(&self) -> bool {
        self.transitions().next().is_none()
    }

    /// Iterates over every transition target with its field path relative
    /// to the step, such as `switch[1].next` or `onSuccess`.
    pub fn transitions(&self) -> impl Iterator<Item = (String, &StepId)> {
        let cases = self
            .switch
            .iter()
            .enumerate()
            .map(|(j, case)| (format!("switch[{j}].next"), &case.next));
        let named = [
            ("next", self.next.as_ref()),
            ("onSuccess", self.on_success.as_ref()),
            ("onFailure", self.on_failure.as_ref()),
        ]
        .into_iter()
        .filter_map(|(field, target)| target.map(|t| (field.to_owned(), t)));

        cases.chain(named)
    }
}

/// A conditional branch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwitchCase {
    /// Predicate selecting this branch.
    pub when: Condition,
    /// Target step.
    pub next: StepId,
}

/// Per-step execution hints consumed by the executor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionPolicy {
    /// Pause after the step completes, in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delay_after_ms: Option<u64>,
    /// Retry policy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry: Option<RetryPolicy>,
    /// Step timeout in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
}

impl ExecutionPolicy {
    /// Returns whether no hint is set.
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// Retry behaviour of a failed step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Maximum number of attempts.
    pub attempts: u32,
}
