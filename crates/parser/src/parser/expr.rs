use super::types::{ParseResult, Parser};
use crate::ast::*;
use crate::error::ErrorKind;
use crate::lexer::{Token, TokenKind};
use text_size::TextRange;

/// The pieces of a call form: `head param* hash?`.
pub(super) struct CallParts {
    pub(super) head: Expression,
    pub(super) params: Vec<Expression>,
    pub(super) hash: Option<Hash>,
    pub(super) span: TextRange,
}

impl CallParts {
    /// Collapse into a single expression: the bare head when there are no
    /// arguments, a sub-expression otherwise.
    pub(super) fn into_expression(self, loc: Option<SourceLocation>) -> Expression {
        if self.params.is_empty() && self.hash.is_none() {
            return self.head;
        }
        let path = match self.head.literal_to_path() {
            Expression::Path(path) => path,
            // callers only build heads from `parse_helper_name`
            other => PathExpression::new(vec![other.original()]),
        };
        Expression::SubExpression(SubExpression {
            path,
            params: self.params,
            hash: self.hash,
            is_helper: None,
            loc,
        })
    }
}

struct Segment {
    part: String,
    literal: bool,
    separator: Option<char>,
}

impl<'a> Parser<'a> {
    /// `helper_name param* hash?`
    pub(super) fn parse_call(&mut self) -> ParseResult<CallParts> {
        let start = self.peek().span.start();
        let head = self.parse_helper_name()?;
        let mut params = Vec::new();
        while self.at_param() {
            params.push(self.parse_param()?);
        }
        let hash = self.parse_hash()?;
        let span = TextRange::new(start, self.prev().span.end());
        Ok(CallParts {
            head,
            params,
            hash,
            span,
        })
    }

    /// Whether the next tokens start a positional parameter (and not a hash pair).
    fn at_param(&self) -> bool {
        let token = self.peek();
        match token.kind {
            TokenKind::Id => self.peek_nth(1).kind != TokenKind::Equals,
            TokenKind::Data | TokenKind::OpenSexpr => true,
            kind => kind.is_literal(),
        }
    }

    /// `path | data_path | STRING | NUMBER | BOOLEAN | UNDEFINED | NULL`
    pub(super) fn parse_helper_name(&mut self) -> ParseResult<Expression> {
        let token = self.peek();
        let loc = self.loc(token.span);
        match token.kind {
            TokenKind::Id => Ok(Expression::Path(self.parse_path(false)?)),
            TokenKind::Data => {
                self.advance();
                Ok(Expression::Path(self.parse_path(true)?))
            }
            TokenKind::String => {
                self.advance();
                let value = unescape_string(self.text(token));
                Ok(Expression::String(StringLiteral {
                    original: value.clone(),
                    value,
                    loc,
                }))
            }
            TokenKind::Number => {
                self.advance();
                let original = self.text(token).to_string();
                let value = original.parse::<f64>().map_err(|_| {
                    self.error(
                        ErrorKind::UnexpectedToken {
                            expected: Some("number".into()),
                            found: original.clone(),
                        },
                        token.span,
                    )
                })?;
                Ok(Expression::Number(NumberLiteral {
                    value,
                    original,
                    loc,
                }))
            }
            TokenKind::Boolean => {
                self.advance();
                let original = self.text(token).to_string();
                Ok(Expression::Boolean(BooleanLiteral {
                    value: original == "true",
                    original,
                    loc,
                }))
            }
            TokenKind::Undefined => {
                self.advance();
                Ok(Expression::Undefined(UndefinedLiteral { loc }))
            }
            TokenKind::Null => {
                self.advance();
                Ok(Expression::Null(NullLiteral { loc }))
            }
            _ => Err(self.unexpected(Some("a helper name or path"))),
        }
    }

    /// `helper_name | sexpr`
    pub(super) fn parse_param(&mut self) -> ParseResult<Expression> {
        if self.check(TokenKind::OpenSexpr) {
            self.parse_sexpr()
        } else {
            self.parse_helper_name()
        }
    }

    /// `'(' helper_name param* hash? ')'`
    pub(super) fn parse_sexpr(&mut self) -> ParseResult<Expression> {
        let open = self.consume(TokenKind::OpenSexpr)?;
        self.nested(open.span, |parser| parser.parse_sexpr_rest(open))
    }

    fn parse_sexpr_rest(&mut self, open: Token) -> ParseResult<Expression> {
        let call = self.parse_call()?;
        let close = self.consume(TokenKind::CloseSexpr)?;
        let loc = self.loc(TextRange::new(open.start(), close.end()));
        let path = match call.head.literal_to_path() {
            Expression::Path(path) => path,
            other => PathExpression::new(vec![other.original()]),
        };
        Ok(Expression::SubExpression(SubExpression {
            path,
            params: call.params,
            hash: call.hash,
            is_helper: Some(true),
            loc,
        }))
    }

    /// `(ID '=' param)+`, or nothing.
    pub(super) fn parse_hash(&mut self) -> ParseResult<Option<Hash>> {
        let start = self.peek().span.start();
        let mut pairs = Vec::new();
        while self.check(TokenKind::Id) && self.peek_nth(1).kind == TokenKind::Equals {
            let key_token = self.advance();
            self.advance();
            let key = segment_text(self.text(key_token)).to_string();
            let value = self.parse_param()?;
            let span = TextRange::new(key_token.start(), self.prev().span.end());
            pairs.push(HashPair {
                key,
                value,
                loc: self.loc(span),
            });
        }
        if pairs.is_empty() {
            return Ok(None);
        }
        let span = TextRange::new(start, self.prev().span.end());
        Ok(Some(Hash {
            pairs,
            loc: self.loc(span),
        }))
    }

    /// `'as |' ID+ '|'`, or nothing.
    pub(super) fn parse_block_params(&mut self) -> ParseResult<Vec<String>> {
        if !self.check(TokenKind::OpenBlockParams) {
            return Ok(Vec::new());
        }
        self.advance();
        let mut names = Vec::new();
        while self.check(TokenKind::Id) {
            let token = self.advance();
            names.push(segment_text(self.text(token)).to_string());
        }
        if names.is_empty() {
            return Err(self.unexpected(Some("a block parameter name")));
        }
        self.consume(TokenKind::CloseBlockParams)?;
        Ok(names)
    }

    /// Path segments joined by `.` or `/`, with no whitespace in between.
    /// The leading `@` of a data path has already been consumed.
    pub(super) fn parse_path(&mut self, data: bool) -> ParseResult<PathExpression> {
        let first = self.consume(TokenKind::Id)?;
        let start = if data { self.prev_data_start(first) } else { first.start() };
        let mut segments = vec![self.segment(first, None)];
        let mut last = first;

        loop {
            let next = self.peek();
            if next.start() != last.end() {
                break;
            }
            match next.kind {
                TokenKind::Separator => {
                    self.advance();
                    let after = self.peek();
                    if after.kind != TokenKind::Id || after.start() != next.end() {
                        let span = TextRange::new(start, next.end());
                        return Err(self.invalid_path(span));
                    }
                    self.advance();
                    let separator = self.text(next).chars().next();
                    segments.push(self.segment(after, separator));
                    last = after;
                }
                TokenKind::Id => {
                    // `foo.` lexes as two adjacent segments
                    let span = TextRange::new(start, next.end());
                    return Err(self.invalid_path(span));
                }
                _ => break,
            }
        }

        let span = TextRange::new(start, last.end());
        self.prepare_path(data, segments, span)
    }

    fn prev_data_start(&self, first: Token) -> text_size::TextSize {
        let at = self.prev();
        if at.kind == TokenKind::Data && at.end() == first.start() {
            at.start()
        } else {
            first.start()
        }
    }

    fn segment(&self, token: Token, separator: Option<char>) -> Segment {
        let text = self.text(token);
        let part = segment_text(text);
        Segment {
            literal: part.len() != text.len(),
            part: part.to_string(),
            separator,
        }
    }

    fn invalid_path(&self, span: TextRange) -> Box<crate::error::ParseError> {
        let path = self.source[span].to_string();
        self.error(ErrorKind::InvalidPath { path }, span)
    }

    /// Fold raw segments into a path: `..` raises depth, `.`/`this` are dropped,
    /// and scope tokens after a real segment are rejected.
    fn prepare_path(
        &self,
        data: bool,
        segments: Vec<Segment>,
        span: TextRange,
    ) -> ParseResult<PathExpression> {
        let mut original = if data { "@".to_string() } else { String::new() };
        let mut parts: Vec<String> = Vec::new();
        let mut depth = 0;

        for segment in segments {
            if let Some(separator) = segment.separator {
                original.push(separator);
            }
            original.push_str(&segment.part);

            let scope_token = matches!(segment.part.as_str(), ".." | "." | "this");
            if !segment.literal && scope_token {
                if !parts.is_empty() {
                    return Err(self.error(ErrorKind::InvalidPath { path: original }, span));
                }
                if segment.part == ".." {
                    depth += 1;
                }
            } else {
                parts.push(segment.part);
            }
        }

        Ok(PathExpression {
            data,
            depth,
            parts,
            original,
            loc: self.loc(span),
        })
    }
}

/// Strip the brackets of a `[literal]` segment and unescape `\]`.
fn segment_text(text: &str) -> std::borrow::Cow<'_, str> {
    match text.strip_prefix('[').and_then(|t| t.strip_suffix(']')) {
        Some(inner) if inner.contains("\\]") || inner.contains("\\\\") => {
            std::borrow::Cow::Owned(inner.replace("\\]", "]").replace("\\\\", "\\"))
        }
        Some(inner) => std::borrow::Cow::Borrowed(inner),
        None => std::borrow::Cow::Borrowed(text),
    }
}

/// Drop the quotes of a string literal; only the quote character itself is
/// escapable.
fn unescape_string(text: &str) -> String {
    let quote = &text[..1];
    let inner = &text[1..text.len() - 1];
    inner.replace(&format!("\\{}", quote), quote)
}
