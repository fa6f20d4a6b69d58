//! Repeat configuration for steps.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display};

use crate::graph::StepId;

/// How often, or over what, a step repeats.
///
/// Holds exactly one of `forEach` or `count`. Documents setting both, or
/// neither, fail to deserialize.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RepeatConfigWire", into = "RepeatConfigWire")]
pub struct RepeatConfig {
    /// Iteration source.
    pub mode: RepeatMode,
    /// Keep repeating after a failed iteration.
    pub continue_on_error: Option<bool>,
    /// Delay between iterations in milliseconds.
    pub delay_between: Option<u64>,
    /// What one iteration re-executes.
    pub scope: RepeatScope,
    /// Boundary node of a subtree scope, not itself repeated.
    pub subtree_end: Option<StepId>,
}

/// JSON shape of [`RepeatConfig`], with both iteration sources optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RepeatConfigWire {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    for_each: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    count: Option<RepeatCount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    continue_on_error: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    delay_between: Option<u64>,
    #[serde(default, skip_serializing_if = "RepeatScope::is_block")]
    scope: RepeatScope,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    subtree_end: Option<StepId>,
}

impl TryFrom<RepeatConfigWire> for RepeatConfig {
    type Error = String;

    fn try_from(wire: RepeatConfigWire) -> Result<Self, Self::Error> {
        let mode = match (wire.for_each, wire.count) {
            (Some(path), None) => RepeatMode::ForEach(path),
            (None, Some(count)) => RepeatMode::Count(count),
            (Some(_), Some(_)) => {
                return Err("repeat sets both `forEach` and `count`".to_owned());
            }
            (None, None) => {
                return Err("repeat needs one of `forEach` or `count`".to_owned());
            }
        };

        Ok(Self {
            mode,
            continue_on_error: wire.continue_on_error,
            delay_between: wire.delay_between,
            scope: wire.scope,
            subtree_end: wire.subtree_end,
        })
    }
}

impl From<RepeatConfig> for RepeatConfigWire {
    fn from(config: RepeatConfig) -> Self {
        let (for_each, count) = match config.mode {
            RepeatMode::ForEach(path) => (Some(path), None),
            RepeatMode::Count(count) => (None, Some(count)),
        };

        Self {
            for_each,
            count,
            continue_on_error: config.continue_on_error,
            delay_between: config.delay_between,
            scope: config.scope,
            subtree_end: config.subtree_end,
        }
    }
}

impl RepeatConfig {
    /// Repeats over the items found at a path.
    pub fn for_each(path: impl Into<String>) -> Self {
        Self::with_mode(RepeatMode::ForEach(path.into()))
    }

    /// Repeats a fixed or variable number of times.
    pub fn count(count: impl Into<RepeatCount>) -> Self {
        Self::with_mode(RepeatMode::Count(count.into()))
    }

    fn with_mode(mode: RepeatMode) -> Self {
        Self {
            mode,
            continue_on_error: None,
            delay_between: None,
            scope: RepeatScope::Block,
            subtree_end: None,
        }
    }

    /// Repeats the region up to, not including, `end`.
    pub fn with_subtree(mut self, end: impl Into<StepId>) -> Self {
        self.scope = RepeatScope::Subtree;
        self.subtree_end = Some(end.into());
        self
    }

    /// Keeps repeating after failures.
    pub fn with_continue_on_error(mut self, continue_on_error: bool) -> Self {
        self.continue_on_error = Some(continue_on_error);
        self
    }

    /// Sets the delay between iterations.
    pub fn with_delay_between(mut self, delay_ms: u64) -> Self {
        self.delay_between = Some(delay_ms);
        self
    }

    /// Returns the boundary node when the scope is a subtree.
    pub fn subtree_boundary(&self) -> Option<&StepId> {
        match self.scope {
            RepeatScope::Subtree => self.subtree_end.as_ref(),
            RepeatScope::Block => None,
        }
    }
}

/// Iteration source of a repeat.
#[derive(Debug, Clone, PartialEq)]
pub enum RepeatMode {
    /// Path expression yielding the items to iterate.
    ForEach(String),
    /// Number of iterations.
    Count(RepeatCount),
}

/// Iteration count: a literal or a path resolved at run time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RepeatCount {
    /// Literal number of iterations.
    Fixed(u64),
    /// Path expression resolving to the number of iterations.
    Variable(String),
}

impl From<u64> for RepeatCount {
    fn from(count: u64) -> Self {
        Self::Fixed(count)
    }
}

impl From<&str> for RepeatCount {
    fn from(path: &str) -> Self {
        Self::Variable(path.to_owned())
    }
}

impl From<String> for RepeatCount {
    fn from(path: String) -> Self {
        Self::Variable(path)
    }
}

/// Region re-executed by one iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[derive(AsRefStr, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum RepeatScope {
    /// Only the owning step.
    #[default]
    Block,
    /// The owning step and everything up to `subtreeEnd`.
    Subtree,
}

impl RepeatScope {
    /// Returns whether this is the default block scope.
    pub fn is_block(&self) -> bool {
        matches!(self, Self::Block)
    }
}
