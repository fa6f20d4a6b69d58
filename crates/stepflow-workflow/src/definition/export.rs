//! Export envelope and import.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::Workflow;
use crate::validate::WorkflowValidator;
use crate::{Result, TRACING_TARGET_EXPORT};

/// Version of the export envelope format.
pub const EXPORT_FORMAT_VERSION: &str = "1.0";

fn default_format_version() -> String {
    EXPORT_FORMAT_VERSION.to_owned()
}

/// Metadata attached to an exported workflow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportMetadata {
    /// Free-form description.
    #[serde(default)]
    pub description: String,
    /// Export time.
    pub exported_at: Timestamp,
    /// Envelope format version.
    #[serde(default = "default_format_version")]
    pub version: String,
}

/// A workflow wrapped for sharing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowExport {
    pub workflow: Workflow,
    pub metadata: ExportMetadata,
}

impl WorkflowExport {
    /// Wraps a workflow, stamping the current time.
    pub fn new(workflow: Workflow, description: impl Into<String>) -> Self {
        Self::at(workflow, description, Timestamp::now())
    }

    /// Wraps a workflow with an explicit export time.
    pub fn at(workflow: Workflow, description: impl Into<String>, exported_at: Timestamp) -> Self {
        Self {
            workflow,
            metadata: ExportMetadata {
                description: description.into(),
                exported_at,
                version: default_format_version(),
            },
        }
    }

    /// Serializes the envelope.
    pub fn to_json(&self, pretty: bool) -> Result<String> {
        let json = if pretty {
            serde_json::to_string_pretty(self)?
        } else {
            serde_json::to_string(self)?
        };
        Ok(json)
    }
}

/// Parses an exported or bare workflow document and validates it.
///
/// A top-level `workflow` key selects the envelope form.
pub fn import_workflow(json: &str) -> Result<Workflow> {
    let value: Value = serde_json::from_str(json)?;
    let wrapped = value.get("workflow").is_some();
    let workflow: Workflow = if wrapped {
        serde_json::from_value::<WorkflowExport>(value)?.workflow
    } else {
        serde_json::from_value(value)?
    };

    tracing::debug!(
        target: TRACING_TARGET_EXPORT,
        wrapped,
        start = %workflow.start,
        steps = workflow.steps.len(),
        "Imported workflow"
    );

    WorkflowValidator::new().validate(&workflow).inspect_err(|error| {
        tracing::warn!(target: TRACING_TARGET_EXPORT, %error, "Rejected imported workflow");
    })?;

    Ok(workflow)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::ErrorKind;

    fn document() -> Value {
        json!({ "start": "a", "steps": [{ "id": "a", "next": "b" }, { "id": "b" }] })
    }

    #[test]
    fn test_import_bare() {
        let workflow = import_workflow(&document().to_string()).unwrap();
        assert_eq!(workflow.steps.len(), 2);
    }

    #[test]
    fn test_import_wrapped() {
        let json = json!({
            "workflow": document(),
            "metadata": {
                "description": "demo",
                "exportedAt": "2024-05-01T12:00:00Z",
                "version": "1.0"
            }
        });
        let workflow = import_workflow(&json.to_string()).unwrap();
        assert_eq!(workflow.start.as_str(), "a");
    }

    #[test]
    fn test_import_rejects_invalid() {
        let json = json!({ "start": "x", "steps": [{ "id": "a" }] });
        let error = import_workflow(&json.to_string()).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Validation);

        let error = import_workflow("{").unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Serialization);
    }

    #[test]
    fn test_import_rejects_ambiguous_repeat() {
        let json = json!({
            "start": "a",
            "steps": [{
                "id": "a",
                "repeat": { "count": 3, "forEach": "vars.list" }
            }]
        });
        let error = import_workflow(&json.to_string()).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Serialization);
    }

    #[test]
    fn test_export_envelope() {
        let workflow: Workflow = serde_json::from_value(document()).unwrap();
        let exported_at: Timestamp = "2024-05-01T12:00:00Z".parse().unwrap();
        let export = WorkflowExport::at(workflow.clone(), "demo", exported_at);

        let value: Value = serde_json::from_str(&export.to_json(false).unwrap()).unwrap();
        assert_eq!(value["metadata"]["version"], "1.0");
        assert_eq!(value["metadata"]["exportedAt"], "2024-05-01T12:00:00Z");

        let back = import_workflow(&export.to_json(true).unwrap()).unwrap();
        assert_eq!(back, workflow);
    }
}
