//! Syntax errors for the template lexer and parser.
//!
//! Every error carries the byte span and line/column location it was raised
//! at; mismatched blocks additionally point at the opening tag.

pub mod formatter;
pub mod kinds;
pub mod types;

pub use formatter::{DiagnosticFormatter, FormatterConfig};
pub use kinds::ErrorKind;
pub use types::{Error, RelatedInformation, error};

pub use types::Error as ParseError;

pub type ParseResult<T> = Result<T, Box<ParseError>>;
