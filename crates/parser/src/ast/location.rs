//! Source positions attached to AST nodes and diagnostics.

use serde::{Deserialize, Serialize};
use std::fmt;
use text_size::{TextRange, TextSize};

/// A line/column pair. Lines start at 1, columns at 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

impl Position {
    pub fn new(line: u32, column: u32) -> Self {
        Position { line, column }
    }
}

impl Default for Position {
    fn default() -> Self {
        Position { line: 1, column: 0 }
    }
}

/// The region of a template a node was parsed from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct SourceLocation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    pub start: Position,
    pub end: Position,
}

impl SourceLocation {
    pub fn new(start: Position, end: Position) -> Self {
        SourceLocation {
            source: None,
            start,
            end,
        }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.source {
            Some(source) => write!(f, "{}:{}:{}", source, self.start.line, self.start.column),
            None => write!(f, "line {}, column {}", self.start.line, self.start.column),
        }
    }
}

/// Maps byte offsets of a template to line/column positions.
#[derive(Debug, Clone)]
pub struct LineIndex<'src> {
    text: &'src str,
    line_starts: Vec<TextSize>,
}

impl<'src> LineIndex<'src> {
    pub fn new(text: &'src str) -> Self {
        let mut line_starts = vec![TextSize::from(0)];
        for (offset, byte) in text.bytes().enumerate() {
            if byte == b'\n' {
                line_starts.push(TextSize::from(offset as u32 + 1));
            }
        }
        LineIndex { text, line_starts }
    }

    /// Position of a byte offset. Columns count characters, not bytes.
    pub fn position(&self, offset: TextSize) -> Position {
        let offset = offset.min(TextSize::of(self.text));
        let line = match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(next) => next - 1,
        };
        let line_start = usize::from(self.line_starts[line]);
        let column = self
            .text
            .get(line_start..usize::from(offset))
            .map_or(0, |prefix| prefix.chars().count());
        Position::new(line as u32 + 1, column as u32)
    }

    pub fn location(&self, range: TextRange, source: Option<&str>) -> SourceLocation {
        SourceLocation {
            source: source.map(str::to_string),
            start: self.position(range.start()),
            end: self.position(range.end()),
        }
    }
}
