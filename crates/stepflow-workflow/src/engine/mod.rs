//! Graph ⇄ step-list translation.

mod compiler;
mod decompiler;

pub use compiler::GraphCompiler;
pub use decompiler::GraphDecompiler;
