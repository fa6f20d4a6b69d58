//! Execution-context addressing contract.
//!
//! The executor exposes its state to conditions and repeat sources through
//! the shape defined here. Paths such as `steps.login.result.data.token`,
//! `vars.user`, `forEach.item` and `loop.index` resolve against it.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::graph::StepId;
use crate::path::strip_root;

/// Runtime state visible to branch conditions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionContext {
    #[serde(default)]
    pub steps: HashMap<StepId, StepState>,
    #[serde(default)]
    pub vars: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub for_each: Option<ForEachState>,
    #[serde(default, rename = "loop", skip_serializing_if = "Option::is_none")]
    pub loop_state: Option<LoopState>,
}

/// Outcome of a finished step.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StepState {
    pub result: StepResult,
    pub success: bool,
    #[serde(default)]
    pub skipped: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StepResult {
    #[serde(default)]
    pub data: Value,
}

/// Current `forEach` iteration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForEachState {
    pub item: Value,
    pub index: u64,
    pub total: u64,
}

/// Current `count` iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoopState {
    pub index: u64,
    pub count: u64,
}

impl ExecutionContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a successful step with its output.
    pub fn record_success(&mut self, id: impl Into<StepId>, data: Value) {
        self.record(id.into(), data, true, false);
    }

    /// Records a failed step.
    pub fn record_failure(&mut self, id: impl Into<StepId>) {
        self.record(id.into(), Value::Null, false, false);
    }

    /// Records a step that was skipped.
    pub fn record_skipped(&mut self, id: impl Into<StepId>) {
        self.record(id.into(), Value::Null, false, true);
    }

    fn record(&mut self, id: StepId, data: Value, success: bool, skipped: bool) {
        let state = StepState {
            result: StepResult { data },
            success,
            skipped,
        };
        self.steps.insert(id, state);
    }

    /// Resolves a dotted path, with optional `$.` root, to a value.
    ///
    /// Numeric segments index into arrays. Returns `None` for unknown roots
    /// and missing keys.
    pub fn lookup(&self, path: &str) -> Option<Value> {
        let mut segments = strip_root(path).split('.');
        match segments.next()? {
            "steps" => {
                let state = self.steps.get(segments.next()?)?;
                let state = serde_json::to_value(state).ok()?;
                descend(&state, segments).cloned()
            }
            "vars" => descend(self.vars.get(segments.next()?)?, segments).cloned(),
            "forEach" => {
                let state = serde_json::to_value(self.for_each.as_ref()?).ok()?;
                descend(&state, segments).cloned()
            }
            "loop" => {
                let state = serde_json::to_value(self.loop_state?).ok()?;
                descend(&state, segments).cloned()
            }
            _ => None,
        }
    }
}

fn descend<'a, 'p>(
    mut value: &'a Value,
    segments: impl Iterator<Item = &'p str>,
) -> Option<&'a Value> {
    for segment in segments.filter(|s| !s.is_empty()) {
        value = match value {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(value)
}
