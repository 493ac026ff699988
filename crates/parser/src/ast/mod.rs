//! Abstract Syntax Tree (AST) definition.
//!
//! The tree is owned: every node owns its children and nothing points back
//! up. All nodes serialize to a JSON interchange form tagged by `"type"`.

pub mod display;
pub mod expr;
pub mod location;
pub mod nodes;

pub use display::Printer;
pub use expr::*;
pub use location::{LineIndex, Position, SourceLocation};
pub use nodes::*;
