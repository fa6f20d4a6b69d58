//! Opaque block payloads and the block-schema registry seam.

use std::collections::HashMap;
use std::fmt;

use derive_more::{From, Into};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Descriptor of a single automation action.
///
/// The payload is carried through compilation untouched. Only the `type`
/// field is read, to pick a validator from a [`BlockRegistry`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, From, Into)]
#[serde(transparent)]
pub struct Block(Value);

impl Block {
    /// Wraps a JSON payload.
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// Returns the block's type name, if it has one.
    pub fn type_name(&self) -> Option<&str> {
        self.0.get("type").and_then(Value::as_str)
    }

    /// Returns the raw payload.
    pub fn as_value(&self) -> &Value {
        &self.0
    }
}

/// Validates block payloads on behalf of the executor.
pub trait BlockRegistry {
    /// Checks a block, returning a human-readable reason on failure.
    fn validate(&self, block: &Block) -> Result<(), String>;
}

type BlockValidatorFn = Box<dyn Fn(&Value) -> Result<(), String> + Send + Sync>;

/// [`BlockRegistry`] keyed by block type name.
#[derive(Default)]
pub struct BlockSchemas {
    validators: HashMap<String, BlockValidatorFn>,
}

impl BlockSchemas {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the validator for a block type.
    pub fn register<F>(mut self, type_name: impl Into<String>, validator: F) -> Self
    where
        F: Fn(&Value) -> Result<(), String> + Send + Sync + 'static,
    {
        self.validators.insert(type_name.into(), Box::new(validator));
        self
    }

    /// Returns whether a validator is registered for the type.
    pub fn contains(&self, type_name: &str) -> bool {
        self.validators.contains_key(type_name)
    }
}

impl BlockRegistry for BlockSchemas {
    fn validate(&self, block: &Block) -> Result<(), String> {
        let type_name = block
            .type_name()
            .ok_or_else(|| "block has no `type`".to_owned())?;
        let validator = self
            .validators
            .get(type_name)
            .ok_or_else(|| format!("unknown block type `{type_name}`"))?;
        validator(block.as_value())
    }
}

impl fmt::Debug for BlockSchemas {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlockSchemas")
            .field("types", &self.validators.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn schemas() -> BlockSchemas {
        BlockSchemas::new().register("click", |value| {
            value
                .get("selector")
                .and_then(Value::as_str)
                .map(|_| ())
                .ok_or_else(|| "click requires a selector".to_owned())
        })
    }

    #[test]
    fn test_block_is_transparent() {
        let block = Block::new(json!({ "type": "click", "selector": "#go" }));
        let json = serde_json::to_value(&block).unwrap();
        assert_eq!(json, json!({ "type": "click", "selector": "#go" }));
        assert_eq!(block.type_name(), Some("click"));
    }

    #[test]
    fn test_registry_validates_by_type() {
        let schemas = schemas();
        assert!(schemas.contains("click"));
        assert!(
            schemas
                .validate(&Block::new(json!({ "type": "click", "selector": "a" })))
                .is_ok()
        );
        assert_eq!(
            schemas.validate(&Block::new(json!({ "type": "click" }))),
            Err("click requires a selector".to_owned())
        );
        assert_eq!(
            schemas.validate(&Block::new(json!({ "type": "scroll" }))),
            Err("unknown block type `scroll`".to_owned())
        );
        assert_eq!(
            schemas.validate(&Block::default()),
            Err("block has no `type`".to_owned())
        );
    }
}
