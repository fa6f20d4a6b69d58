//! Workflow documents.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{EditorLayout, Step};
use crate::graph::StepId;

const fn default_version() -> u32 {
    1
}

/// Compiled workflow document consumed by the executor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workflow {
    /// Document format version.
    #[serde(default = "default_version")]
    pub version: u32,
    /// ID of the entry step.
    pub start: StepId,
    /// Steps, in graph node order.
    pub steps: Vec<Step>,
    /// Page the workflow starts on.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_url: Option<String>,
    /// Initial variables.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub vars: Map<String, Value>,
    /// Saved editor geometry.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub editor: Option<EditorLayout>,
}

impl Workflow {
    /// Creates a workflow with the given entry point and steps.
    pub fn new(start: impl Into<StepId>, steps: Vec<Step>) -> Self {
        Self {
            version: default_version(),
            start: start.into(),
            steps,
            target_url: None,
            vars: Map::new(),
            editor: None,
        }
    }

    /// Returns the step with the given ID.
    pub fn step(&self, id: &str) -> Option<&Step> {
        self.steps.iter().find(|step| step.id.as_str() == id)
    }

    /// Returns the entry step.
    pub fn start_step(&self) -> Option<&Step> {
        self.step(self.start.as_str())
    }

    /// Returns `(source, target)` pairs for every transition.
    pub fn transition_pairs(&self) -> Vec<(&StepId, &StepId)> {
        self.steps
            .iter()
            .flat_map(|step| step.transitions().map(move |(_, target)| (&step.id, target)))
            .collect()
    }
}
