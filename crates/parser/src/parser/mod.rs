//! Recursive-descent parser producing the template AST.
//!
//! Grammar, loosely:
//!
//! ```text
//! program   := statement*
//! statement := mustache | block | raw_block | partial | partial_block
//!            | content | comment
//! call      := helper_name param* hash?
//! param     := helper_name | '(' call ')'
//! hash      := (ID '=' param)+
//! ```

mod expr;
mod stmt;
mod types;

pub use types::{MAX_NESTING_DEPTH, ParseOptions, ParseResult, Parser};
