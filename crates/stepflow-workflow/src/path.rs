//! References into execution state.
//!
//! Step outputs are addressed as `steps.<stepId>.<relativePath>`, optionally
//! rooted with `$.`. Parsing never fails: a string that is not a step
//! reference yields an empty string and callers fall back to
//! [`DEFAULT_RESULT_PATH`].

/// Relative path used when a reference does not name one.
pub const DEFAULT_RESULT_PATH: &str = "result.data";

const STEPS_PREFIX: &str = "steps.";
const ROOT_PREFIX: &str = "$.";

/// A borrowed, parsed step reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepPath<'a> {
    /// ID of the referenced step.
    pub step_id: &'a str,
    /// Path inside the step's state, possibly empty.
    pub relative: &'a str,
}

impl<'a> StepPath<'a> {
    /// Parses `steps.X.Y` or `$.steps.X.Y`.
    pub fn parse(path: &'a str) -> Option<Self> {
        let rest = strip_root(path).strip_prefix(STEPS_PREFIX)?;
        let (step_id, relative) = rest.split_once('.').unwrap_or((rest, ""));
        if step_id.is_empty() {
            return None;
        }

        Some(Self { step_id, relative })
    }

    /// Returns the relative path, or [`DEFAULT_RESULT_PATH`] when it is empty.
    pub fn relative_or_default(&self) -> &'a str {
        if self.relative.is_empty() {
            DEFAULT_RESULT_PATH
        } else {
            self.relative
        }
    }
}

/// Removes an optional leading `$.` from a path.
pub fn strip_root(path: &str) -> &str {
    path.strip_prefix(ROOT_PREFIX).unwrap_or(path)
}

/// Builds `steps.<step_id>.<relative>`.
pub fn build_path(step_id: &str, relative: &str) -> String {
    format!("{STEPS_PREFIX}{step_id}.{relative}")
}

/// Extracts the step ID from a reference, or an empty string.
pub fn parse_node_id(path: &str) -> String {
    StepPath::parse(path)
        .map(|p| p.step_id.to_owned())
        .unwrap_or_default()
}

/// Extracts the relative path from a reference, or an empty string.
pub fn parse_path(path: &str) -> String {
    StepPath::parse(path)
        .map(|p| p.relative.to_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_path() {
        assert_eq!(build_path("step1", "result.data"), "steps.step1.result.data");
    }

    #[test]
    fn test_parse_inverts_build() {
        let path = build_path("step1", "result.data");
        assert_eq!(parse_node_id(&path), "step1");
        assert_eq!(parse_path(&path), "result.data");
    }

    #[test]
    fn test_parse_rooted_path() {
        assert_eq!(parse_node_id("$.steps.login.result.data.token"), "login");
        assert_eq!(parse_path("$.steps.login.result.data.token"), "result.data.token");
    }

    #[test]
    fn test_parse_mismatch() {
        assert_eq!(parse_node_id("not-a-path"), "");
        assert_eq!(parse_path("not-a-path"), "");
        assert_eq!(parse_node_id("vars.user"), "");
        assert_eq!(parse_node_id("steps."), "");
        assert!(StepPath::parse("stepsX.a").is_none());
    }

    #[test]
    fn test_parse_without_relative() {
        let parsed = StepPath::parse("steps.fetch").unwrap();
        assert_eq!(parsed.step_id, "fetch");
        assert_eq!(parsed.relative, "");
        assert_eq!(parsed.relative_or_default(), DEFAULT_RESULT_PATH);
    }
}
