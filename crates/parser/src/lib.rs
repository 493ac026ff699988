//! Whisker: parser for a mustache-style template language.
//!
//! The crate turns template source into an owned, serializable syntax tree:
//!
//! - A [`Lexer`] splitting text from `{{ .. }}` tags
//! - A recursive-descent [`Parser`] producing a [`Program`]
//! - [`Visitor`] and [`Transform`] traits for reading and rewriting trees
//! - The whitespace-control pass applying `~` markers and standalone lines
//!
//! # Parsing
//!
//! ```
//! use whisker_parser::{ParseOptions, Statement, parse};
//!
//! let program = parse("Hello {{name}}!", &ParseOptions::default()).unwrap();
//! assert_eq!(program.body.len(), 3);
//! assert!(matches!(program.body[1], Statement::Mustache(_)));
//! ```
//!
//! Errors carry the location they were raised at and render as a code frame
//! with [`DiagnosticFormatter`]:
//!
//! ```
//! use whisker_parser::{DiagnosticFormatter, FormatterConfig, ParseOptions, parse};
//!
//! let source = "{{#if ok}}yes{{/unless}}";
//! let error = parse(source, &ParseOptions::default()).unwrap_err();
//! assert_eq!(error.message(), "if doesn't match unless");
//! let frame = DiagnosticFormatter::new(FormatterConfig::plain()).format(&error, source);
//! assert!(frame.contains("{{#if ok}}yes{{/unless}}"));
//! ```

pub mod ast;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod visitor;
pub mod whitespace;

pub use ast::*;
pub use error::{DiagnosticFormatter, ErrorKind, FormatterConfig, ParseError, ParseResult};
pub use lexer::{Lexer, Token, TokenKind};
pub use parser::{MAX_NESTING_DEPTH, ParseOptions, Parser};
pub use visitor::{Statements, Transform, Visitor};
pub use whitespace::WhitespaceControl;

/// Parse a template and apply whitespace control.
pub fn parse(source: &str, options: &ParseOptions) -> ParseResult<Program> {
    let program = parse_without_processing(source, options)?;
    let mut control = WhitespaceControl::new(options.ignore_standalone);
    let program = control.transform_program(program);
    tracing::debug!(
        statements = program.body.len(),
        source = options.source_name.as_deref().unwrap_or("<template>"),
        "parsed template"
    );
    Ok(program)
}

/// Parse a template without the whitespace pass. Content keeps its source
/// text and partials have no recorded indentation.
pub fn parse_without_processing(source: &str, options: &ParseOptions) -> ParseResult<Program> {
    tracing::debug!(bytes = source.len(), "parsing template");
    let mut parser = Parser::new(source, options)?;
    parser.parse_template()
}
