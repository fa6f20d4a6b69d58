//! Auto-layout configuration for decompiled graphs.

use anyhow::{Result as AnyhowResult, anyhow};
use clap::Args;
use serde::{Deserialize, Serialize};
use stepflow_workflow::graph::LayeredLayout;

use crate::TRACING_TARGET_CONFIG;

/// Spacing used to place nodes that have no saved position.
///
/// # Environment Variables
///
/// - `STEPFLOW_COLUMN_SPACING` - Distance between layers (default: 250)
/// - `STEPFLOW_ROW_SPACING` - Distance between nodes in a layer (default: 120)
#[derive(Debug, Clone, Copy, Args, Serialize, Deserialize)]
#[must_use = "config does nothing unless you use it"]
pub struct LayoutConfig {
    /// Horizontal distance between graph layers.
    #[arg(long, env = "STEPFLOW_COLUMN_SPACING", default_value_t = LayeredLayout::DEFAULT_COLUMN_SPACING)]
    pub column_spacing: f64,

    /// Vertical distance between nodes of one layer.
    #[arg(long, env = "STEPFLOW_ROW_SPACING", default_value_t = LayeredLayout::DEFAULT_ROW_SPACING)]
    pub row_spacing: f64,
}

impl LayoutConfig {
    /// Validates that both spacings are positive, finite numbers.
    pub fn validate(&self) -> AnyhowResult<()> {
        for (name, value) in [
            ("Column spacing", self.column_spacing),
            ("Row spacing", self.row_spacing),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(anyhow!("{name} {value} is invalid. Must be a positive number."));
            }
        }
        Ok(())
    }

    pub fn log(&self) {
        tracing::debug!(
            target: TRACING_TARGET_CONFIG,
            column_spacing = self.column_spacing,
            row_spacing = self.row_spacing,
            "Layout configuration"
        );
    }
}

impl Default for LayoutConfig {
    fn default() -> Self {
        LayeredLayout::default().into()
    }
}

impl From<LayeredLayout> for LayoutConfig {
    fn from(layout: LayeredLayout) -> Self {
        Self {
            column_spacing: layout.column_spacing,
            row_spacing: layout.row_spacing,
        }
    }
}

impl From<LayoutConfig> for LayeredLayout {
    fn from(config: LayoutConfig) -> Self {
        Self::new(config.column_spacing, config.row_spacing)
    }
}
