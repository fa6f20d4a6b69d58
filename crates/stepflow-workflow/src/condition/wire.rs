//! JSON wire shape of branch conditions.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Branch condition as stored in a workflow document.
///
/// Every predicate is an optional field. Documents that set more than one
/// are interpreted by precedence, see [`super::ConditionKind::DETECTION_ORDER`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WhenCondition {
    /// Free-form expression evaluated by the executor.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expr: Option<String>,
    /// Value at `left` equals the literal `right`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub equals: Option<EqualsOperands>,
    /// A value exists at the path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exists: Option<String>,
    /// Value at `value` matches `pattern`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regex: Option<RegexOperands>,
    /// Value at `value` contains `search`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contains: Option<ContainsOperands>,
    /// All children hold.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub and: Option<Vec<WhenCondition>>,
    /// Any child holds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub or: Option<Vec<WhenCondition>>,
}

impl WhenCondition {
    /// Returns whether no predicate field is set.
    pub fn is_empty(&self) -> bool {
        self.expr.is_none()
            && self.equals.is_none()
            && self.exists.is_none()
            && self.regex.is_none()
            && self.contains.is_none()
            && self.and.is_none()
            && self.or.is_none()
    }
}

/// Operands of an `equals` predicate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EqualsOperands {
    /// Path into execution state.
    pub left: String,
    /// Literal to compare against.
    pub right: Value,
}

/// Operands of a `regex` predicate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegexOperands {
    /// Path into execution state.
    pub value: String,
    /// Regular expression source.
    pub pattern: String,
}

/// Operands of a `contains` predicate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainsOperands {
    /// Path into execution state.
    pub value: String,
    /// Substring to look for.
    pub search: String,
}
