//! Error kind definitions for template syntax errors.

use std::fmt;

/// Every way a template can fail to lex or parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// Character that cannot start any token inside a mustache
    InvalidCharacter { found: char },

    /// `{{` without a matching `}}`
    UnterminatedMustache,

    /// `{{!` or `{{!--` without its closing delimiter
    UnterminatedComment,

    /// `{{{{name}}}}` without `{{{{/name}}}}`
    UnterminatedRawBlock { name: String },

    /// String literal without its closing quote
    UnterminatedString,

    /// `~` anywhere but right after `{{` or right before `}}`
    InvalidStripMarker,

    /// Unexpected token encountered during parsing
    UnexpectedToken {
        expected: Option<String>,
        found: String,
    },

    /// Template ended in the middle of a construct
    UnexpectedEof { expected: String },

    /// `{{#a}}` closed by `{{/b}}`
    MismatchedBlock { open: String, close: String },

    /// `foo.`, `foo/../bar`, `foo.this` and friends
    InvalidPath { path: String },

    /// `{{/name}}` with no open block
    UnexpectedClose { name: String },

    /// `{{else}}` or `{{^}}` outside of a block
    UnexpectedInverse,

    /// Block still open at end of input
    UnclosedBlock { name: String },

    /// A partial given more than one context argument
    UnsupportedPartialArguments { count: usize },

    /// `{{* decorator}}` and `{{#* inline}}`
    UnsupportedDecorator,

    /// Blocks or sub-expressions nested past the parser's limit
    NestingTooDeep { limit: u32 },
}

impl ErrorKind {
    /// Short, stable title for the error class.
    pub fn title(&self) -> &'static str {
        match self {
            ErrorKind::InvalidCharacter { .. } => "invalid character",
            ErrorKind::UnterminatedMustache => "unterminated mustache",
            ErrorKind::UnterminatedComment => "unterminated comment",
            ErrorKind::UnterminatedRawBlock { .. } => "unterminated raw block",
            ErrorKind::UnterminatedString => "unterminated string",
            ErrorKind::InvalidStripMarker => "invalid strip marker",
            ErrorKind::UnexpectedToken { .. } => "unexpected token",
            ErrorKind::UnexpectedEof { .. } => "unexpected end of template",
            ErrorKind::MismatchedBlock { .. } => "mismatched block",
            ErrorKind::InvalidPath { .. } => "invalid path",
            ErrorKind::UnexpectedClose { .. } => "unexpected close",
            ErrorKind::UnexpectedInverse => "unexpected inverse",
            ErrorKind::UnclosedBlock { .. } => "unclosed block",
            ErrorKind::UnsupportedPartialArguments { .. } => "unsupported partial arguments",
            ErrorKind::UnsupportedDecorator => "unsupported decorator",
            ErrorKind::NestingTooDeep { .. } => "nesting too deep",
        }
    }

    pub fn format_message(&self) -> String {
        match self {
            ErrorKind::InvalidCharacter { found } => format!("invalid character '{}'", found),
            ErrorKind::UnterminatedMustache => "expected '}}' to close the mustache".to_string(),
            ErrorKind::UnterminatedComment => "comment is never closed".to_string(),
            ErrorKind::UnterminatedRawBlock { name } => {
                format!("raw block '{}' is never closed with {{{{{{{{/{}}}}}}}}}", name, name)
            }
            ErrorKind::UnterminatedString => "string literal is never closed".to_string(),
            ErrorKind::InvalidStripMarker => {
                "'~' is only allowed right after '{{' or right before '}}'".to_string()
            }
            ErrorKind::UnexpectedToken { expected, found } => match expected {
                Some(expected) => format!("expected {}, found {}", expected, found),
                None => format!("unexpected {}", found),
            },
            ErrorKind::UnexpectedEof { expected } => {
                format!("unexpected end of template, expected {}", expected)
            }
            ErrorKind::MismatchedBlock { open, close } => {
                format!("{} doesn't match {}", open, close)
            }
            ErrorKind::InvalidPath { path } => format!("Invalid path: {}", path),
            ErrorKind::UnexpectedClose { name } => {
                format!("closing tag {{{{/{}}}}} has no open block", name)
            }
            ErrorKind::UnexpectedInverse => "'else' is only allowed inside a block".to_string(),
            ErrorKind::UnclosedBlock { name } => format!("block '{}' is never closed", name),
            ErrorKind::UnsupportedPartialArguments { count } => {
                format!("Unsupported number of partial arguments: {}", count)
            }
            ErrorKind::UnsupportedDecorator => "decorators are not supported".to_string(),
            ErrorKind::NestingTooDeep { limit } => {
                format!("nesting depth exceeds maximum of {}", limit)
            }
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format_message())
    }
}
