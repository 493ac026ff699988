use crate::ast::*;
pub use crate::error::ParseResult;
use crate::error::{ErrorKind, ParseError as Error, error};
use crate::lexer::{Lexer, Token, TokenKind};
use text_size::TextRange;

/// Parser configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOptions {
    /// Attach `loc` to every node. Errors carry locations regardless.
    pub track_locations: bool,
    /// Skip the standalone-line rule of the whitespace pass; explicit `~`
    /// markers still apply.
    pub ignore_standalone: bool,
    /// Template name reported in locations.
    pub source_name: Option<String>,
}

impl Default for ParseOptions {
    fn default() -> Self {
        ParseOptions {
            track_locations: true,
            ignore_standalone: false,
            source_name: None,
        }
    }
}

/// Deepest allowed nesting of blocks, partial blocks and sub-expressions.
pub const MAX_NESTING_DEPTH: u32 = 64;

/// Recursive-descent parser over the token vector produced by [`Lexer`].
pub struct Parser<'a> {
    pub(super) tokens: Vec<Token>,
    pub(super) current: usize,
    pub(super) source: &'a str,
    pub(super) options: &'a ParseOptions,
    pub(super) line_index: LineIndex<'a>,
    depth: u32,
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a str, options: &'a ParseOptions) -> ParseResult<Self> {
        let tokens = Lexer::new(source)
            .with_source_name(options.source_name.as_deref())
            .tokenize()?;
        Ok(Parser {
            tokens,
            current: 0,
            source,
            options,
            line_index: LineIndex::new(source),
            depth: 0,
        })
    }

    /// Parse the whole template into its root program.
    pub fn parse_template(&mut self) -> ParseResult<Program> {
        let mut program = self.parse_program(Vec::new())?;
        let next = self.peek();
        match next.kind {
            TokenKind::Eof => {}
            TokenKind::OpenEndBlock => {
                self.advance();
                let name = self.parse_helper_name()?.original();
                return Err(self.error(ErrorKind::UnexpectedClose { name }, next.span));
            }
            TokenKind::Inverse | TokenKind::OpenInverseChain => {
                return Err(self.error(ErrorKind::UnexpectedInverse, next.span));
            }
            _ => return Err(self.unexpected(None)),
        }
        program.loc = self.loc(TextRange::up_to(text_size::TextSize::of(self.source)));
        Ok(program)
    }

    pub(super) fn peek(&self) -> Token {
        self.peek_nth(0)
    }

    pub(super) fn peek_nth(&self, n: usize) -> Token {
        match self.tokens.get(self.current + n) {
            Some(token) => *token,
            None => self.tokens[self.tokens.len() - 1],
        }
    }

    pub(super) fn prev(&self) -> Token {
        self.tokens[self.current.saturating_sub(1)]
    }

    pub(super) fn advance(&mut self) -> Token {
        if !self.is_at_end() {
            self.current += 1;
        }
        self.prev()
    }

    pub(super) fn is_at_end(&self) -> bool {
        self.peek().kind == TokenKind::Eof
    }

    pub(super) fn check(&self, kind: TokenKind) -> bool {
        self.peek().kind == kind
    }

    pub(super) fn consume(&mut self, kind: TokenKind) -> ParseResult<Token> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(self.unexpected(Some(kind.describe())))
        }
    }

    /// Run `parse` one nesting level deeper. Past [`MAX_NESTING_DEPTH`] the
    /// construct opened at `span` is rejected.
    pub(super) fn nested<T>(
        &mut self,
        span: TextRange,
        parse: impl FnOnce(&mut Self) -> ParseResult<T>,
    ) -> ParseResult<T> {
        if self.depth >= MAX_NESTING_DEPTH {
            return Err(self.error(
                ErrorKind::NestingTooDeep {
                    limit: MAX_NESTING_DEPTH,
                },
                span,
            ));
        }
        self.depth += 1;
        let result = parse(self);
        self.depth -= 1;
        result
    }

    pub(super) fn text(&self, token: Token) -> &'a str {
        token.text(self.source)
    }

    /// Location of a span, honoring `track_locations`.
    pub(super) fn loc(&self, span: TextRange) -> Option<SourceLocation> {
        self.options
            .track_locations
            .then(|| self.location(span))
    }

    pub(super) fn location(&self, span: TextRange) -> SourceLocation {
        self.line_index
            .location(span, self.options.source_name.as_deref())
    }

    pub(super) fn error(&self, kind: ErrorKind, span: TextRange) -> Box<Error> {
        error(kind, span, self.location(span))
    }

    pub(super) fn unexpected(&self, expected: Option<&str>) -> Box<Error> {
        let token = self.peek();
        if token.kind == TokenKind::Eof {
            return self.error(
                ErrorKind::UnexpectedEof {
                    expected: expected.unwrap_or("more input").to_string(),
                },
                token.span,
            );
        }
        let found = match token.kind {
            TokenKind::Id | TokenKind::Number | TokenKind::String | TokenKind::Content => {
                format!("{} '{}'", token.kind.describe(), self.text(token))
            }
            kind => kind.describe().to_string(),
        };
        self.error(
            ErrorKind::UnexpectedToken {
                expected: expected.map(str::to_string),
                found,
            },
            token.span,
        )
    }

    /// Strip flags of a single delimiter pair spanning `open..close`.
    pub(super) fn strip_flags(&self, open: Token, close: Token) -> StripFlags {
        let open_text = self.text(open);
        let close_text = self.text(close);
        StripFlags::new(
            open_text.as_bytes().get(2) == Some(&b'~'),
            close_text.len() >= 3 && close_text.as_bytes()[close_text.len() - 3] == b'~',
        )
    }
}
