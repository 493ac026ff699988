//! The syntax error type produced by the lexer and parser.

use super::kinds::ErrorKind;
use crate::ast::SourceLocation;
use text_size::TextRange;
use thin_vec::ThinVec;

/// Additional information related to the main error.
#[derive(Debug, Clone, PartialEq)]
pub struct RelatedInformation {
    pub span: TextRange,
    pub location: SourceLocation,
    pub message: String,
}

/// A template syntax error. Always carries the location it was raised at.
#[derive(Debug, Clone, PartialEq)]
pub struct Error {
    pub kind: ErrorKind,
    pub span: TextRange,
    pub location: SourceLocation,
    pub related_info: ThinVec<RelatedInformation>,
}

impl Error {
    /// Create a new error with the given kind and span.
    pub fn new(kind: ErrorKind, span: TextRange, location: SourceLocation) -> Self {
        Self {
            kind,
            span,
            location,
            related_info: ThinVec::new(),
        }
    }

    /// Add related information with a span and message.
    pub fn with_related(
        mut self,
        span: TextRange,
        location: SourceLocation,
        message: impl Into<String>,
    ) -> Self {
        self.related_info.push(RelatedInformation {
            span,
            location,
            message: message.into(),
        });
        self
    }

    pub fn title(&self) -> &'static str {
        self.kind.title()
    }

    pub fn message(&self) -> String {
        self.kind.format_message()
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Parse error on {}: {}", self.location, self.kind)
    }
}

impl std::error::Error for Error {}

/// Helper function to create a boxed error.
pub fn error(kind: ErrorKind, span: TextRange, location: SourceLocation) -> Box<Error> {
    Box::new(Error::new(kind, span, location))
}
