//! Branch conditions.
//!
//! - [`Condition`]: the predicate AST carried by edges and switch entries
//! - [`WhenCondition`]: its JSON wire shape, decoded by field precedence
//! - [`ConditionForm`]: the editable form used by the graph editor

mod ast;
mod codec;
mod wire;

pub use ast::{Condition, ConditionKind};
pub use codec::{ConditionForm, FormFields, LeafRow, ValueType};
pub use wire::{ContainsOperands, EqualsOperands, RegexOperands, WhenCondition};
