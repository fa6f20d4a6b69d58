//! CLI configuration management.
//!
//! ```text
//! Cli
//! ├── output: OutputConfig   # Destination and formatting of results
//! └── command: Command       # Subcommand and its arguments
//!     └── decompile
//!         └── layout: LayoutConfig  # Auto-layout spacing
//! ```
//!
//! All configuration can be provided via CLI arguments or environment variables.
//! Use `--help` to see all available options.
//!
//! # Example
//!
//! ```bash
//! # Compile an editor graph, pretty-printing the workflow
//! stepflow --pretty compile graph.json
//!
//! # Or via environment variables, reading from stdin
//! STEPFLOW_PRETTY=true STEPFLOW_OUTPUT=workflow.json stepflow compile - < graph.json
//! ```

mod layout;
mod output;

use std::process;

use anyhow::Context;
use clap::Parser;
pub use layout::LayoutConfig;
pub use output::OutputConfig;
use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::command::Command;
use crate::{TRACING_TARGET_CLI, TRACING_TARGET_CONFIG};

/// Complete CLI configuration.
#[derive(Debug, Clone, Parser, Serialize, Deserialize)]
#[command(name = "stepflow")]
#[command(about = "Compile, decompile and validate stepflow workflows")]
#[command(version)]
pub struct Cli {
    /// Output destination and formatting.
    #[clap(flatten)]
    pub output: OutputConfig,

    /// Command to run.
    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Loads environment variables from .env file (if enabled) and parses CLI arguments.
    ///
    /// The .env file is loaded first so that clap's `env` fallbacks can see
    /// its values.
    pub fn init() -> Self {
        Self::load_dotenv();
        Self::parse()
    }

    #[cfg(feature = "dotenv")]
    fn load_dotenv() {
        if let Err(err) = dotenvy::dotenv()
            && !err.not_found()
        {
            eprintln!("Warning: failed to load .env file: {err}");
        }
    }

    #[cfg(not(feature = "dotenv"))]
    fn load_dotenv() {}

    /// Initializes tracing with environment-based filtering.
    ///
    /// Events go to stderr so they never mix with JSON written to stdout.
    pub fn init_tracing() {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    /// Validates all configuration values.
    pub fn validate(&self) -> anyhow::Result<()> {
        self.output
            .validate()
            .context("invalid output configuration")?;
        if let Command::Decompile { layout, .. } = &self.command {
            layout.validate().context("invalid layout configuration")?;
        }
        Ok(())
    }

    /// Logs configuration at debug level.
    pub fn log(&self) {
        tracing::debug!(
            target: TRACING_TARGET_CLI,
            version = env!("CARGO_PKG_VERSION"),
            pid = process::id(),
            features = ?Self::enabled_features(),
            "Build information"
        );

        tracing::debug!(
            target: TRACING_TARGET_CONFIG,
            command = self.command.name(),
            "Command configuration"
        );

        self.output.log();
        if let Command::Decompile { layout, .. } = &self.command {
            layout.log();
        }
    }

    fn enabled_features() -> Vec<&'static str> {
        [cfg!(feature = "dotenv").then_some("dotenv")]
            .into_iter()
            .flatten()
            .collect()
    }
}
