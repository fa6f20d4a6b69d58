//! Step and edge identifier types.

use std::borrow::Borrow;

use derive_more::{Debug, Display, From, Into};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a step, shared by the graph node and the compiled step.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[derive(Debug, Display, From, Into)]
#[debug("{_0}")]
#[display("{_0}")]
#[serde(transparent)]
pub struct StepId(String);

impl StepId {
    /// Creates a step ID from any string.
    #[inline]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Mints a fresh, time-ordered step ID.
    #[inline]
    pub fn generate() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    /// Returns the ID as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for StepId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl AsRef<str> for StepId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for StepId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Unique identifier for an edge in the editor graph.
///
/// Edge identity is not stable across a compile/decompile round-trip.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[derive(Debug, Display, From, Into)]
#[debug("{_0}")]
#[display("{_0}")]
#[serde(transparent)]
pub struct EdgeId(String);

impl EdgeId {
    /// Creates an edge ID from any string.
    #[inline]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Mints a fresh, time-ordered edge ID.
    #[inline]
    pub fn generate() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    /// Derives a deterministic ID from the edge's endpoints and a discriminator.
    pub fn derived(source: &StepId, target: &StepId, discriminator: &str) -> Self {
        Self(format!("{source}->{target}:{discriminator}"))
    }

    /// Returns the ID as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for EdgeId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl AsRef<str> for EdgeId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn test_step_id_lookup_by_str() {
        let mut map = HashMap::new();
        map.insert(StepId::from("fetch"), 1);
        assert_eq!(map.get("fetch"), Some(&1));
    }

    #[test]
    fn test_generated_ids_are_unique() {
        assert_ne!(StepId::generate(), StepId::generate());
        assert_ne!(EdgeId::generate(), EdgeId::generate());
    }

    #[test]
    fn test_derived_edge_id() {
        let id = EdgeId::derived(&"a".into(), &"b".into(), "switch-0");
        assert_eq!(id.as_str(), "a->b:switch-0");
    }

    #[test]
    fn test_serialization_is_transparent() {
        let json = serde_json::to_string(&StepId::from("s1")).unwrap();
        assert_eq!(json, "\"s1\"");
        let id: StepId = serde_json::from_str("\"s2\"").unwrap();
        assert_eq!(id.as_str(), "s2");
    }
}
