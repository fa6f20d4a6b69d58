//! Editable form of branch conditions.
//!
//! The editor shows a condition as a flat form: a kind selector, the step and
//! path the predicate reads, and the kind-specific operands. Composite
//! conditions hold one [`LeafRow`] per child. Each kind owns one arm of the
//! `parse`/`build`/`label` matches below, so adding a kind without a codec
//! arm does not compile.

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use strum::{AsRefStr, Display, EnumString};

use super::ast::{Condition, ConditionKind};
use super::wire::WhenCondition;
use crate::path::{StepPath, build_path};

/// Number of expression characters kept in a label.
const EXPR_LABEL_CHARS: usize = 15;

/// Type inferred for, and coerced onto, an equals literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[derive(AsRefStr, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ValueType {
    #[default]
    String,
    Number,
    Boolean,
}

impl ValueType {
    /// Infers the type of a literal.
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Bool(_) => Self::Boolean,
            Value::Number(_) => Self::Number,
            _ => Self::String,
        }
    }

    /// Coerces raw form input to a literal of this type.
    ///
    /// Booleans accept `"true"` and `"1"`; numbers that fail to parse become 0.
    pub fn coerce(self, raw: &str) -> Value {
        match self {
            Self::String => Value::String(raw.to_owned()),
            Self::Boolean => Value::Bool(matches!(raw, "true" | "1")),
            Self::Number => {
                let trimmed = raw.trim();
                let parsed = if trimmed.is_empty() {
                    0.0
                } else {
                    trimmed.parse::<f64>().unwrap_or(0.0)
                };
                number_value(parsed)
            }
        }
    }
}

/// Converts a float to a JSON number, preferring an integer representation.
fn number_value(n: f64) -> Value {
    if !n.is_finite() {
        return Value::from(0);
    }
    if n.fract() == 0.0 && n.abs() < 9_007_199_254_740_992.0 {
        return Value::from(n as i64);
    }
    Number::from_f64(n).map_or_else(|| Value::from(0), Value::Number)
}

/// Renders a literal back into form input.
fn literal_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Field values shared by every form row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormFields {
    /// Referenced step, empty for references outside `steps.*`.
    #[serde(default)]
    pub step: String,
    /// Path relative to the step, or a raw path when `step` is empty.
    #[serde(default)]
    pub path: String,
    /// Equals literal as typed.
    #[serde(default)]
    pub value: String,
    /// Type the equals literal is coerced to.
    #[serde(default)]
    pub value_type: ValueType,
    /// Regex source.
    #[serde(default)]
    pub pattern: String,
    /// Contains substring.
    #[serde(default)]
    pub search: String,
    /// Free-form expression.
    #[serde(default)]
    pub expr: String,
}

impl FormFields {
    fn with_reference(reference: &str) -> Self {
        let (step, path) = split_reference(reference);
        Self {
            step,
            path,
            ..Self::default()
        }
    }

    /// Joins `step` and `path` back into a reference.
    pub fn reference(&self) -> String {
        if self.step.is_empty() {
            return self.path.clone();
        }
        let path = if self.path.is_empty() {
            crate::path::DEFAULT_RESULT_PATH
        } else {
            self.path.as_str()
        };
        build_path(&self.step, path)
    }
}

fn split_reference(reference: &str) -> (String, String) {
    match StepPath::parse(reference) {
        Some(parsed) => (
            parsed.step_id.to_owned(),
            parsed.relative_or_default().to_owned(),
        ),
        None => (String::new(), reference.to_owned()),
    }
}

/// One child of a composite condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeafRow {
    /// Leaf predicate kind.
    pub kind: ConditionKind,
    /// Operands.
    #[serde(flatten)]
    pub fields: FormFields,
}

impl Default for LeafRow {
    fn default() -> Self {
        Self {
            kind: ConditionKind::Equals,
            fields: FormFields::default(),
        }
    }
}

impl LeafRow {
    /// Parses a composite child into a row.
    ///
    /// Children that cannot be shown as a leaf become an empty equals row,
    /// so the row count always matches the child count.
    pub fn parse(child: &Condition) -> Self {
        match parse_leaf(child) {
            Some(fields) if child.kind().is_leaf() => Self {
                kind: child.kind(),
                fields,
            },
            _ => Self::default(),
        }
    }

    /// Builds the child condition for this row.
    pub fn build(&self) -> Condition {
        build_leaf(self.kind, &self.fields)
    }
}

/// Editable form of a whole edge condition.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConditionForm {
    /// Selected predicate kind.
    pub kind: ConditionKind,
    /// Operands for leaf kinds.
    #[serde(flatten)]
    pub fields: FormFields,
    /// Child rows for `and`/`or`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<LeafRow>,
}

impl ConditionForm {
    /// Creates an empty form of the given kind.
    pub fn new(kind: ConditionKind) -> Self {
        Self {
            kind,
            ..Self::default()
        }
    }

    /// Decodes the stored condition of an edge.
    pub fn from_edge(is_default: bool, when: &WhenCondition) -> Self {
        if ConditionKind::detect(is_default, when) == ConditionKind::Default {
            return Self::default();
        }
        Self::decode(&Condition::from(when.clone()))
    }

    /// Decodes a condition into its form.
    pub fn decode(condition: &Condition) -> Self {
        match condition {
            Condition::And(children) | Condition::Or(children) => Self {
                kind: condition.kind(),
                fields: FormFields::default(),
                children: children.iter().map(LeafRow::parse).collect(),
            },
            leaf => Self {
                kind: leaf.kind(),
                fields: parse_leaf(leaf).unwrap_or_default(),
                children: Vec::new(),
            },
        }
    }

    /// Encodes the form into a condition.
    pub fn encode(&self) -> Condition {
        match self.kind {
            ConditionKind::And => Condition::And(self.children.iter().map(LeafRow::build).collect()),
            ConditionKind::Or => Condition::Or(self.children.iter().map(LeafRow::build).collect()),
            kind => build_leaf(kind, &self.fields),
        }
    }

    /// Short display label for the edge.
    pub fn label(&self) -> String {
        match self.kind {
            ConditionKind::Default => String::new(),
            ConditionKind::Equals => format!("== {}", self.fields.value),
            ConditionKind::Exists => "exists".to_owned(),
            ConditionKind::Expr => truncate(&self.fields.expr, EXPR_LABEL_CHARS),
            ConditionKind::Regex => format!("~= {}", self.fields.pattern),
            ConditionKind::Contains => format!("contains {}", self.fields.search),
            ConditionKind::And => format!("AND ({})", self.children.len()),
            ConditionKind::Or => format!("OR ({})", self.children.len()),
        }
    }
}

/// Reads the operands of a leaf condition, `None` for composites.
fn parse_leaf(condition: &Condition) -> Option<FormFields> {
    let fields = match condition {
        Condition::Default => FormFields::default(),
        Condition::Expr(expr) => FormFields {
            expr: expr.clone(),
            ..FormFields::default()
        },
        Condition::Equals { path, value } => FormFields {
            value: literal_text(value),
            value_type: ValueType::of(value),
            ..FormFields::with_reference(path)
        },
        Condition::Exists { path } => FormFields::with_reference(path),
        Condition::Regex { path, pattern } => FormFields {
            pattern: pattern.clone(),
            ..FormFields::with_reference(path)
        },
        Condition::Contains { path, search } => FormFields {
            search: search.clone(),
            ..FormFields::with_reference(path)
        },
        Condition::And(_) | Condition::Or(_) => return None,
    };
    Some(fields)
}

/// Builds a leaf condition; composite kinds have no leaf shape.
fn build_leaf(kind: ConditionKind, fields: &FormFields) -> Condition {
    match kind {
        ConditionKind::Default | ConditionKind::And | ConditionKind::Or => Condition::Default,
        ConditionKind::Expr => Condition::Expr(fields.expr.clone()),
        ConditionKind::Equals => Condition::Equals {
            path: fields.reference(),
            value: fields.value_type.coerce(&fields.value),
        },
        ConditionKind::Exists => Condition::Exists {
            path: fields.reference(),
        },
        ConditionKind::Regex => Condition::Regex {
            path: fields.reference(),
            pattern: fields.pattern.clone(),
        },
        ConditionKind::Contains => Condition::Contains {
            path: fields.reference(),
            search: fields.search.clone(),
        },
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_owned();
    }
    let mut truncated: String = text.chars().take(max_chars).collect();
    truncated.push('…');
    truncated
}
