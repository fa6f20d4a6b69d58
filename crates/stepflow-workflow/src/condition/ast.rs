//! Branch condition AST.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::{AsRefStr, Display, IntoStaticStr};

use super::wire::{ContainsOperands, EqualsOperands, RegexOperands, WhenCondition};

/// Predicate kinds, one per [`Condition`] variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[derive(AsRefStr, Display, IntoStaticStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ConditionKind {
    /// No predicate.
    #[default]
    Default,
    /// Value at a path equals a literal.
    Equals,
    /// A path resolves to a value.
    Exists,
    /// Free-form boolean expression.
    Expr,
    /// Value at a path matches a pattern.
    Regex,
    /// Value at a path contains a substring or element.
    Contains,
    /// Every child holds.
    And,
    /// Any child holds.
    Or,
}

impl ConditionKind {
    /// Order in which predicate fields are tested when decoding a
    /// [`WhenCondition`]. The first present field wins; composites are
    /// tested after all leaf predicates.
    pub const DETECTION_ORDER: [ConditionKind; 7] = [
        Self::Equals,
        Self::Exists,
        Self::Expr,
        Self::Regex,
        Self::Contains,
        Self::And,
        Self::Or,
    ];

    /// Detects the kind of a wire condition.
    ///
    /// `is_default` wins outright, mirroring the editor's default-edge flag.
    pub fn detect(is_default: bool, when: &WhenCondition) -> Self {
        if is_default || when.is_empty() {
            return Self::Default;
        }

        Self::DETECTION_ORDER
            .into_iter()
            .find(|kind| kind.is_set_on(when))
            .unwrap_or(Self::Default)
    }

    /// Returns whether this kind's field is present on the wire condition.
    fn is_set_on(self, when: &WhenCondition) -> bool {
        match self {
            Self::Default => false,
            Self::Equals => when.equals.is_some(),
            Self::Exists => when.exists.is_some(),
            Self::Expr => when.expr.is_some(),
            Self::Regex => when.regex.is_some(),
            Self::Contains => when.contains.is_some(),
            Self::And => when.and.is_some(),
            Self::Or => when.or.is_some(),
        }
    }

    /// Returns whether this kind combines child conditions.
    pub const fn is_composite(self) -> bool {
        matches!(self, Self::And | Self::Or)
    }

    /// Returns whether this kind can appear as a row inside a composite.
    pub const fn is_leaf(self) -> bool {
        !self.is_composite() && !matches!(self, Self::Default)
    }
}

/// A branch predicate evaluated by the executor against execution context.
///
/// Serializes to and from the [`WhenCondition`] wire shape.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "WhenCondition", into = "WhenCondition")]
pub enum Condition {
    /// Always taken.
    #[default]
    Default,
    /// Executor-evaluated expression.
    Expr(String),
    /// Value at `path` equals `value`.
    Equals { path: String, value: Value },
    /// A value exists at `path`.
    Exists { path: String },
    /// Value at `path` matches `pattern`.
    Regex { path: String, pattern: String },
    /// Value at `path` contains `search`.
    Contains { path: String, search: String },
    /// All children hold.
    And(Vec<Condition>),
    /// Any child holds.
    Or(Vec<Condition>),
}

impl Condition {
    /// Returns the predicate kind.
    pub fn kind(&self) -> ConditionKind {
        match self {
            Self::Default => ConditionKind::Default,
            Self::Expr(_) => ConditionKind::Expr,
            Self::Equals { .. } => ConditionKind::Equals,
            Self::Exists { .. } => ConditionKind::Exists,
            Self::Regex { .. } => ConditionKind::Regex,
            Self::Contains { .. } => ConditionKind::Contains,
            Self::And(_) => ConditionKind::And,
            Self::Or(_) => ConditionKind::Or,
        }
    }

    /// Returns whether this is the empty predicate.
    pub fn is_default(&self) -> bool {
        matches!(self, Self::Default)
    }

    /// Returns the child conditions of a composite, or an empty slice.
    pub fn children(&self) -> &[Condition] {
        match self {
            Self::And(children) | Self::Or(children) => children,
            _ => &[],
        }
    }

    /// Visits this condition and every nested child, depth first.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a Condition)) {
        visit(self);
        for child in self.children() {
            child.walk(visit);
        }
    }
}

impl From<WhenCondition> for Condition {
    fn from(when: WhenCondition) -> Self {
        let kind = ConditionKind::detect(false, &when);
        let WhenCondition {
            expr,
            equals,
            exists,
            regex,
            contains,
            and,
            or,
        } = when;

        match kind {
            ConditionKind::Default => Self::Default,
            ConditionKind::Equals => equals
                .map(|e| Self::Equals {
                    path: e.left,
                    value: e.right,
                })
                .unwrap_or_default(),
            ConditionKind::Exists => exists
                .map(|path| Self::Exists { path })
                .unwrap_or_default(),
            ConditionKind::Expr => expr.map(Self::Expr).unwrap_or_default(),
            ConditionKind::Regex => regex
                .map(|r| Self::Regex {
                    path: r.value,
                    pattern: r.pattern,
                })
                .unwrap_or_default(),
            ConditionKind::Contains => contains
                .map(|c| Self::Contains {
                    path: c.value,
                    search: c.search,
                })
                .unwrap_or_default(),
            ConditionKind::And => Self::And(and.into_iter().flatten().map(Into::into).collect()),
            ConditionKind::Or => Self::Or(or.into_iter().flatten().map(Into::into).collect()),
        }
    }
}

impl From<Condition> for WhenCondition {
    fn from(condition: Condition) -> Self {
        match condition {
            Condition::Default => Self::default(),
            Condition::Expr(expr) => Self {
                expr: Some(expr),
                ..Self::default()
            },
            Condition::Equals { path, value } => Self {
                equals: Some(EqualsOperands {
                    left: path,
                    right: value,
                }),
                ..Self::default()
            },
            Condition::Exists { path } => Self {
                exists: Some(path),
                ..Self::default()
            },
            Condition::Regex { path, pattern } => Self {
                regex: Some(RegexOperands {
                    value: path,
                    pattern,
                }),
                ..Self::default()
            },
            Condition::Contains { path, search } => Self {
                contains: Some(ContainsOperands {
                    value: path,
                    search,
                }),
                ..Self::default()
            },
            Condition::And(children) => Self {
                and: Some(children.into_iter().map(Into::into).collect()),
                ..Self::default()
            },
            Condition::Or(children) => Self {
                or: Some(children.into_iter().map(Into::into).collect()),
                ..Self::default()
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn when(value: serde_json::Value) -> WhenCondition {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_detect_default_flag_wins() {
        let w = when(json!({ "exists": "steps.a.result.data" }));
        assert_eq!(ConditionKind::detect(true, &w), ConditionKind::Default);
        assert_eq!(ConditionKind::detect(false, &w), ConditionKind::Exists);
    }

    #[test]
    fn test_detect_precedence() {
        let w = when(json!({
            "contains": { "value": "steps.a.result.data", "search": "x" },
            "expr": "a > 1",
            "exists": "steps.a.result.data",
            "equals": { "left": "steps.a.result.data", "right": 1 }
        }));
        assert_eq!(ConditionKind::detect(false, &w), ConditionKind::Equals);

        let w = when(json!({
            "contains": { "value": "steps.a.result.data", "search": "x" },
            "regex": { "value": "steps.a.result.data", "pattern": "^x" },
            "expr": "a > 1"
        }));
        assert_eq!(ConditionKind::detect(false, &w), ConditionKind::Expr);

        let w = when(json!({
            "contains": { "value": "steps.a.result.data", "search": "x" },
            "regex": { "value": "steps.a.result.data", "pattern": "^x" }
        }));
        assert_eq!(ConditionKind::detect(false, &w), ConditionKind::Regex);

        let w = when(json!({
            "and": [],
            "contains": { "value": "steps.a.result.data", "search": "x" }
        }));
        assert_eq!(ConditionKind::detect(false, &w), ConditionKind::Contains);
    }

    #[test]
    fn test_detect_empty_is_default() {
        assert_eq!(
            ConditionKind::detect(false, &WhenCondition::default()),
            ConditionKind::Default
        );
    }

    #[test]
    fn test_from_wire_uses_precedence() {
        let condition: Condition = when(json!({
            "exists": "steps.a.result.data",
            "expr": "true"
        }))
        .into();
        assert_eq!(
            condition,
            Condition::Exists {
                path: "steps.a.result.data".into()
            }
        );
    }

    #[test]
    fn test_nested_composite_serialization() {
        let condition = Condition::Or(vec![
            Condition::Expr("vars.retry".into()),
            Condition::And(vec![
                Condition::Equals {
                    path: "steps.a.result.data".into(),
                    value: json!(3),
                },
                Condition::Contains {
                    path: "steps.b.result.data".into(),
                    search: "ok".into(),
                },
            ]),
        ]);

        let value = serde_json::to_value(&condition).unwrap();
        assert_eq!(
            value,
            json!({
                "or": [
                    { "expr": "vars.retry" },
                    { "and": [
                        { "equals": { "left": "steps.a.result.data", "right": 3 } },
                        { "contains": { "value": "steps.b.result.data", "search": "ok" } }
                    ] }
                ]
            })
        );

        let back: Condition = serde_json::from_value(value).unwrap();
        assert_eq!(back, condition);
    }

    #[test]
    fn test_default_serializes_empty() {
        let value = serde_json::to_value(Condition::Default).unwrap();
        assert_eq!(value, json!({}));
    }

    #[test]
    fn test_walk_visits_all() {
        let condition = Condition::And(vec![
            Condition::Expr("a".into()),
            Condition::Or(vec![Condition::Expr("b".into())]),
        ]);
        let mut kinds = Vec::new();
        condition.walk(&mut |c| kinds.push(c.kind()));
        assert_eq!(
            kinds,
            vec![
                ConditionKind::And,
                ConditionKind::Expr,
                ConditionKind::Or,
                ConditionKind::Expr
            ]
        );
    }
}
