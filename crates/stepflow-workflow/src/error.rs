//! Workflow error types.

use strum::{AsRefStr, IntoStaticStr};
use thiserror::Error;

use crate::graph::{StepId, Transition};
use crate::validate::ValidationError;

/// Result type for workflow operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Categories of errors that can occur in workflow operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    /// The editor graph is structurally broken.
    InvalidGraph,
    /// A repeat configuration cannot be honored.
    InvalidRepeat,
    /// Two default edges compete for the same transition.
    ConflictingTransition,
    /// A compiled step list failed validation.
    Validation,
    /// Serialization/deserialization error.
    Serialization,
}

/// Errors that can occur during workflow operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Graph structure is invalid.
    #[error("invalid workflow graph: {0}")]
    InvalidGraph(String),

    /// Repeat configuration of a node is invalid.
    #[error("invalid repeat on node {node}: {message}")]
    InvalidRepeat {
        /// ID of the repeating node.
        node: StepId,
        /// Error message.
        message: String,
    },

    /// More than one default edge leaves a node for the same transition.
    #[error("node {node} has more than one default edge for `{transition}`")]
    ConflictingTransition {
        /// ID of the source node.
        node: StepId,
        /// Transition both edges resolve to.
        transition: Transition,
    },

    /// Compiled workflow was rejected.
    #[error("invalid workflow: {0}")]
    Validation(#[from] ValidationError),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Returns the error kind.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidGraph(_) => ErrorKind::InvalidGraph,
            Self::InvalidRepeat { .. } => ErrorKind::InvalidRepeat,
            Self::ConflictingTransition { .. } => ErrorKind::ConflictingTransition,
            Self::Validation(_) => ErrorKind::Validation,
            Self::Serialization(_) => ErrorKind::Serialization,
        }
    }

    /// Returns the error kind as a string.
    pub fn kind_str(&self) -> &'static str {
        self.kind().into()
    }

    pub(crate) fn invalid_repeat(node: &StepId, message: impl Into<String>) -> Self {
        Self::InvalidRepeat {
            node: node.clone(),
            message: message.into(),
        }
    }
}
