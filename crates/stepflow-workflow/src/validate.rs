//! Referential-integrity checks over compiled workflows.
//!
//! The validator stops at the first violation and reports it with a dotted
//! field path such as `steps[2].switch[0].next`.

use std::collections::HashSet;
use std::fmt;

use regex::Regex;
use thiserror::Error;

use crate::condition::Condition;
use crate::definition::{BlockRegistry, RepeatConfig, RepeatCount, RepeatMode, Step, Workflow};
use crate::graph::SubtreeScopeResolver;
use crate::TRACING_TARGET_VALIDATOR;

/// First violation found in a workflow document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: String,
    /// What is wrong with it.
    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }

    fn missing_step(field: impl Into<String>, id: impl fmt::Display) -> Self {
        Self::new(field, format!("step `{id}` does not exist"))
    }
}

type ValidationResult = Result<(), ValidationError>;

/// Checks that a workflow is executable as written.
///
/// At least one step exists, step IDs are unique, `start` and every
/// transition target name an existing step, regex conditions compile and
/// repeat configurations are complete. With a [`BlockRegistry`] attached,
/// every block is validated as well.
#[derive(Clone, Copy, Default)]
pub struct WorkflowValidator<'a> {
    registry: Option<&'a dyn BlockRegistry>,
}

impl<'a> WorkflowValidator<'a> {
    /// Creates a validator without block checks.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a validator that also checks blocks against a registry.
    pub fn with_registry(registry: &'a dyn BlockRegistry) -> Self {
        Self {
            registry: Some(registry),
        }
    }

    /// Validates a workflow, returning the first violation.
    pub fn validate(&self, workflow: &Workflow) -> ValidationResult {
        let result = self.check(workflow);
        match &result {
            Ok(()) => tracing::debug!(
                target: TRACING_TARGET_VALIDATOR,
                step_count = workflow.steps.len(),
                "Workflow is valid"
            ),
            Err(error) => tracing::debug!(
                target: TRACING_TARGET_VALIDATOR,
                field = %error.field,
                message = %error.message,
                "Workflow is invalid"
            ),
        }
        result
    }

    fn check(&self, workflow: &Workflow) -> ValidationResult {
        if workflow.steps.is_empty() {
            return Err(ValidationError::new("steps", "workflow has no steps"));
        }

        let mut ids = HashSet::with_capacity(workflow.steps.len());
        for (i, step) in workflow.steps.iter().enumerate() {
            if step.id.as_str().is_empty() {
                return Err(ValidationError::new(
                    format!("steps[{i}].id"),
                    "step id must not be empty",
                ));
            }
            if !ids.insert(step.id.as_str()) {
                return Err(ValidationError::new(
                    format!("steps[{i}].id"),
                    format!("duplicate step id `{}`", step.id),
                ));
            }
        }

        if !ids.contains(workflow.start.as_str()) {
            return Err(ValidationError::missing_step("start", &workflow.start));
        }

        let resolver = SubtreeScopeResolver::from_steps(&workflow.steps);
        for (i, step) in workflow.steps.iter().enumerate() {
            let field = format!("steps[{i}]");
            for (transition, target) in step.transitions() {
                if !ids.contains(target.as_str()) {
                    return Err(ValidationError::missing_step(
                        format!("{field}.{transition}"),
                        target,
                    ));
                }
            }

            self.check_conditions(&field, step)?;
            if let Some(repeat) = &step.repeat {
                self.check_repeat(&field, step, repeat, &ids, &resolver)?;
            }
            if let Some(registry) = self.registry {
                registry
                    .validate(&step.block)
                    .map_err(|message| ValidationError::new(format!("{field}.block"), message))?;
            }
        }

        Ok(())
    }

    fn check_conditions(&self, field: &str, step: &Step) -> ValidationResult {
        for (j, case) in step.switch.iter().enumerate() {
            let mut invalid = None;
            case.when.walk(&mut |condition| {
                if let Condition::Regex { pattern, .. } = condition
                    && invalid.is_none()
                    && let Err(error) = Regex::new(pattern)
                {
                    invalid = Some(format!("invalid pattern `{pattern}`: {error}"));
                }
            });

            if let Some(message) = invalid {
                return Err(ValidationError::new(
                    format!("{field}.switch[{j}].when"),
                    message,
                ));
            }
        }
        Ok(())
    }

    fn check_repeat(
        &self,
        field: &str,
        step: &Step,
        repeat: &RepeatConfig,
        ids: &HashSet<&str>,
        resolver: &SubtreeScopeResolver<'_>,
    ) -> ValidationResult {
        match &repeat.mode {
            RepeatMode::ForEach(path) if path.trim().is_empty() => {
                return Err(ValidationError::new(
                    format!("{field}.repeat.forEach"),
                    "path must not be empty",
                ));
            }
            RepeatMode::Count(RepeatCount::Variable(path)) if path.trim().is_empty() => {
                return Err(ValidationError::new(
                    format!("{field}.repeat.count"),
                    "variable path must not be empty",
                ));
            }
            _ => {}
        }

        if repeat.scope.is_block() {
            return Ok(());
        }

        let end_field = format!("{field}.repeat.subtreeEnd");
        let Some(end) = &repeat.subtree_end else {
            return Err(ValidationError::new(
                end_field,
                "required when scope is `subtree`",
            ));
        };
        if end == &step.id {
            return Err(ValidationError::new(
                end_field,
                "must not be the repeating step itself",
            ));
        }
        if !ids.contains(end.as_str()) {
            return Err(ValidationError::missing_step(end_field, end));
        }
        if !resolver.resolve(step.id.as_str(), end.as_str()).boundary_reached {
            return Err(ValidationError::new(
                end_field,
                format!("step `{end}` is not reachable from `{}`", step.id),
            ));
        }

        Ok(())
    }
}

impl fmt::Debug for WorkflowValidator<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkflowValidator")
            .field("registry", &self.registry.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};

    use super::*;
    use crate::definition::BlockSchemas;

    fn workflow(value: Value) -> Workflow {
        serde_json::from_value(value).unwrap()
    }

    fn error(value: Value) -> String {
        WorkflowValidator::new()
            .validate(&workflow(value))
            .unwrap_err()
            .to_string()
    }

    #[test]
    fn test_missing_start_then_fixed() {
        assert_eq!(
            error(json!({ "start": "x", "steps": [{ "id": "a", "next": "b" }] })),
            "start: step `x` does not exist"
        );
        assert_eq!(
            error(json!({ "start": "a", "steps": [{ "id": "a", "next": "b" }] })),
            "steps[0].next: step `b` does not exist"
        );

        let fixed = workflow(json!({
            "start": "a",
            "steps": [{ "id": "a", "next": "b" }, { "id": "b" }]
        }));
        assert!(WorkflowValidator::new().validate(&fixed).is_ok());
    }

    #[test]
    fn test_empty_and_duplicate_steps() {
        assert_eq!(
            error(json!({ "start": "a", "steps": [] })),
            "steps: workflow has no steps"
        );
        assert_eq!(
            error(json!({ "start": "a", "steps": [{ "id": "a" }, { "id": "a" }] })),
            "steps[1].id: duplicate step id `a`"
        );
    }

    #[test]
    fn test_transition_field_paths() {
        assert_eq!(
            error(json!({
                "start": "a",
                "steps": [
                    { "id": "a", "next": "b" },
                    { "id": "b", "switch": [
                        { "when": { "expr": "x" }, "next": "a" },
                        { "when": { "expr": "y" }, "next": "zzz" }
                    ] }
                ]
            })),
            "steps[1].switch[1].next: step `zzz` does not exist"
        );
        assert_eq!(
            error(json!({ "start": "a", "steps": [{ "id": "a", "onFailure": "b" }] })),
            "steps[0].onFailure: step `b` does not exist"
        );
    }

    #[test]
    fn test_invalid_regex_in_nested_condition() {
        let message = error(json!({
            "start": "a",
            "steps": [
                { "id": "a", "switch": [{ "when": { "and": [
                    { "exists": "steps.a.result.data" },
                    { "regex": { "value": "steps.a.result.data", "pattern": "(" } }
                ] }, "next": "a" }] }
            ]
        }));
        assert!(message.starts_with("steps[0].switch[0].when: invalid pattern `(`"));
    }

    #[test]
    fn test_repeat_subtree_checks() {
        let base = |repeat: Value| {
            json!({
                "start": "a",
                "steps": [
                    { "id": "a", "repeat": repeat, "next": "b" },
                    { "id": "b", "next": "c" },
                    { "id": "c" }
                ]
            })
        };

        let valid = workflow(base(json!({ "count": 2, "scope": "subtree", "subtreeEnd": "c" })));
        assert!(WorkflowValidator::new().validate(&valid).is_ok());

        assert_eq!(
            error(base(json!({ "count": 2, "scope": "subtree" }))),
            "steps[0].repeat.subtreeEnd: required when scope is `subtree`"
        );
        assert_eq!(
            error(base(json!({ "count": 2, "scope": "subtree", "subtreeEnd": "a" }))),
            "steps[0].repeat.subtreeEnd: must not be the repeating step itself"
        );
        assert_eq!(
            error(base(json!({ "count": 2, "scope": "subtree", "subtreeEnd": "q" }))),
            "steps[0].repeat.subtreeEnd: step `q` does not exist"
        );
        assert_eq!(
            error(base(json!({ "forEach": " " }))),
            "steps[0].repeat.forEach: path must not be empty"
        );
    }

    #[test]
    fn test_unreachable_subtree_end() {
        assert_eq!(
            error(json!({
                "start": "a",
                "steps": [
                    { "id": "a", "next": "b" },
                    { "id": "b", "repeat": { "count": 2, "scope": "subtree", "subtreeEnd": "a" } }
                ]
            })),
            "steps[1].repeat.subtreeEnd: step `a` is not reachable from `b`"
        );
    }

    #[test]
    fn test_block_registry() {
        let schemas = BlockSchemas::new().register("click", |_| Ok(()));
        let validator = WorkflowValidator::with_registry(&schemas);

        let ok = workflow(json!({ "start": "a", "steps": [{ "id": "a", "block": { "type": "click" } }] }));
        assert!(validator.validate(&ok).is_ok());

        let bad = workflow(json!({ "start": "a", "steps": [{ "id": "a", "block": { "type": "drag" } }] }));
        assert_eq!(
            validator.validate(&bad).unwrap_err(),
            ValidationError::new("steps[0].block", "unknown block type `drag`")
        );
    }
}
