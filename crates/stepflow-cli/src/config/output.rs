//! Output configuration.

use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result as AnyhowResult, anyhow};
use clap::Args;
use serde::{Deserialize, Serialize};

use crate::TRACING_TARGET_CONFIG;

/// Where and how command results are written.
///
/// # Environment Variables
///
/// - `STEPFLOW_OUTPUT` - File to write results to (default: stdout)
/// - `STEPFLOW_PRETTY` - Pretty-print JSON output (default: false)
#[derive(Debug, Clone, Default, Args, Serialize, Deserialize)]
#[must_use = "config does nothing unless you use it"]
pub struct OutputConfig {
    /// File to write the result to instead of stdout.
    #[arg(short = 'o', long = "output", env = "STEPFLOW_OUTPUT", global = true)]
    #[serde(default)]
    pub output: Option<PathBuf>,

    /// Pretty-print JSON output.
    #[arg(long, env = "STEPFLOW_PRETTY", global = true)]
    #[serde(default)]
    pub pretty: bool,
}

impl OutputConfig {
    /// Rejects output paths that cannot be written as files.
    pub fn validate(&self) -> AnyhowResult<()> {
        let Some(path) = &self.output else {
            return Ok(());
        };

        if path.as_os_str().is_empty() {
            return Err(anyhow!("Output path must not be empty."));
        }
        if path.is_dir() {
            return Err(anyhow!(
                "Output path {} is a directory. Provide a file path.",
                path.display()
            ));
        }
        Ok(())
    }

    /// Serializes a value as JSON.
    pub fn render<T: Serialize>(&self, value: &T) -> AnyhowResult<String> {
        let json = if self.pretty {
            serde_json::to_string_pretty(value)
        } else {
            serde_json::to_string(value)
        };
        json.context("failed to serialize output")
    }

    /// Writes a value as JSON to the configured destination.
    pub fn write<T: Serialize>(&self, value: &T) -> AnyhowResult<()> {
        let mut json = self.render(value)?;
        json.push('\n');

        match &self.output {
            Some(path) => fs::write(path, json)
                .with_context(|| format!("failed to write {}", path.display())),
            None => io::stdout()
                .lock()
                .write_all(json.as_bytes())
                .context("failed to write to stdout"),
        }
    }

    pub fn log(&self) {
        tracing::debug!(
            target: TRACING_TARGET_CONFIG,
            output = ?self.output,
            pretty = self.pretty,
            "Output configuration"
        );
    }
}
