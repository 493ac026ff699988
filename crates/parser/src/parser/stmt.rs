use super::expr::CallParts;
use super::types::{ParseResult, Parser};
use crate::ast::*;
use crate::error::ErrorKind;
use crate::lexer::{Token, TokenKind};
use text_size::TextRange;

/// An opening tag of a block or chained inverse: `{{#head params hash as |x|}}`.
struct OpenTag {
    call: CallParts,
    block_params: Vec<String>,
    strip: StripFlags,
    span: TextRange,
}

/// `{{else}} program` or a chain of `{{else helper}} program` sections.
struct InverseSection {
    strip: StripFlags,
    program: Program,
}

impl<'a> Parser<'a> {
    /// `statement*`, stopping before any closing or inverse tag.
    pub(super) fn parse_program(&mut self, block_params: Vec<String>) -> ParseResult<Program> {
        let start = self.peek().span.start();
        let mut body = Vec::new();
        loop {
            match self.peek().kind {
                TokenKind::Eof
                | TokenKind::OpenEndBlock
                | TokenKind::Inverse
                | TokenKind::OpenInverseChain => break,
                _ => body.push(self.parse_statement()?),
            }
        }
        let end = if body.is_empty() { start } else { self.prev().span.end() };
        Ok(Program {
            body,
            block_params,
            chained: false,
            loc: self.loc(TextRange::new(start, end)),
        })
    }

    pub(super) fn parse_statement(&mut self) -> ParseResult<Statement> {
        let token = self.peek();
        match token.kind {
            TokenKind::Content => {
                self.advance();
                let mut content = ContentStatement::new(self.text(token));
                content.loc = self.loc(token.span);
                Ok(Statement::Content(content))
            }
            TokenKind::Comment => {
                self.advance();
                Ok(Statement::Comment(CommentStatement {
                    value: strip_comment(self.text(token)).to_string(),
                    strip: self.strip_flags(token, token),
                    loc: self.loc(token.span),
                }))
            }
            TokenKind::Open | TokenKind::OpenUnescaped => self.parse_mustache(),
            TokenKind::OpenBlock | TokenKind::OpenInverse => self.parse_block(),
            TokenKind::OpenRawBlock => self.parse_raw_block(),
            TokenKind::OpenPartial => self.parse_partial(),
            TokenKind::OpenPartialBlock => self.parse_partial_block(),
            _ => Err(self.unexpected(None)),
        }
    }

    fn parse_mustache(&mut self) -> ParseResult<Statement> {
        let open = self.advance();
        let unescaped = open.kind == TokenKind::OpenUnescaped;
        let escaped = !unescaped && !self.text(open).ends_with('&');
        let call = self.parse_call()?;
        let close = if unescaped {
            self.consume(TokenKind::CloseUnescaped)?
        } else {
            self.consume(TokenKind::Close)?
        };
        let loc = self.loc(call.span);
        Ok(Statement::Mustache(MustacheStatement {
            expr: call.into_expression(loc),
            escaped,
            strip: self.strip_flags(open, close),
            loc: self.loc(TextRange::new(open.start(), close.end())),
        }))
    }

    /// Parse the remainder of an opening tag whose delimiter was just consumed.
    fn parse_open_tag(&mut self, open: Token) -> ParseResult<OpenTag> {
        let call = self.parse_call()?;
        let block_params = self.parse_block_params()?;
        let close = self.consume(TokenKind::Close)?;
        Ok(OpenTag {
            call,
            block_params,
            strip: self.strip_flags(open, close),
            span: TextRange::new(open.start(), close.end()),
        })
    }

    /// `{{/name}}`, checked against the opening tag's head.
    fn parse_close_block(
        &mut self,
        open_name: &str,
        open_span: TextRange,
    ) -> ParseResult<(PathExpression, StripFlags, TextRange)> {
        let open_end = match self.peek().kind {
            TokenKind::OpenEndBlock => self.advance(),
            TokenKind::Eof => {
                return Err(self.error(
                    ErrorKind::UnclosedBlock {
                        name: open_name.to_string(),
                    },
                    open_span,
                ));
            }
            _ => return Err(self.unexpected(Some("a closing tag"))),
        };
        let name = self.parse_helper_name()?;
        let close = self.consume(TokenKind::Close)?;
        let span = TextRange::new(open_end.start(), close.end());
        let close_name = name.original();
        if close_name != open_name {
            let kind = ErrorKind::MismatchedBlock {
                open: open_name.to_string(),
                close: close_name,
            };
            let related = self.location(open_span);
            return Err(Box::new(
                (*self.error(kind, span)).with_related(open_span, related, "block opened here"),
            ));
        }
        let path = match name.literal_to_path() {
            Expression::Path(path) => path,
            other => PathExpression::new(vec![other.original()]),
        };
        Ok((path, self.strip_flags(open_end, close), span))
    }

    fn parse_block(&mut self) -> ParseResult<Statement> {
        let open = self.advance();
        self.nested(open.span, |parser| parser.parse_block_rest(open))
    }

    fn parse_block_rest(&mut self, open: Token) -> ParseResult<Statement> {
        let inverted = open.kind == TokenKind::OpenInverse;
        let tag = self.parse_open_tag(open)?;
        let open_name = tag.call.head.original();

        let program = self.parse_program(tag.block_params.clone())?;
        let inverse = self.parse_inverse_section()?;
        let (close_path, close_strip, close_span) =
            self.parse_close_block(&open_name, tag.span)?;

        let (mut program, mut inverse, inverse_strip) = match inverse {
            Some(section) => (Some(program), Some(section.program), section.strip),
            None => (Some(program), None, StripFlags::default()),
        };
        if let Some(inverse) = inverse.as_mut() {
            apply_chain_close_strip(inverse, close_strip);
        }
        if inverted {
            std::mem::swap(&mut program, &mut inverse);
        }

        let call_loc = self.loc(tag.call.span);
        Ok(Statement::Block(BlockStatement {
            expr: tag.call.into_expression(call_loc),
            program,
            inverse,
            open_strip: tag.strip,
            inverse_strip,
            close_strip,
            close: Some(close_path),
            loc: self.loc(TextRange::new(open.start(), close_span.end())),
        }))
    }

    /// `{{else}} program`, or `{{else helper ..}} program` chained recursively.
    fn parse_inverse_section(&mut self) -> ParseResult<Option<InverseSection>> {
        let token = self.peek();
        match token.kind {
            TokenKind::Inverse => {
                self.advance();
                let strip = self.strip_flags(token, token);
                let program = self.parse_program(Vec::new())?;
                Ok(Some(InverseSection { strip, program }))
            }
            TokenKind::OpenInverseChain => {
                let open = self.advance();
                self.nested(open.span, |parser| parser.parse_inverse_chain(open))
                    .map(Some)
            }
            _ => Ok(None),
        }
    }

    /// `{{else helper ..}} program`, wrapped as a program holding one block.
    fn parse_inverse_chain(&mut self, open: Token) -> ParseResult<InverseSection> {
        let tag = self.parse_open_tag(open)?;
        let program = self.parse_program(tag.block_params.clone())?;
        let nested = self.parse_inverse_section()?;
        let (inverse, inverse_strip) = match nested {
            Some(section) => (Some(section.program), section.strip),
            None => (None, StripFlags::default()),
        };
        let end = self.prev().span.end();
        let call_loc = self.loc(tag.call.span);
        let block_loc = self.loc(TextRange::new(open.start(), end));
        let chained = BlockStatement {
            expr: tag.call.into_expression(call_loc),
            program: Some(program),
            inverse,
            open_strip: tag.strip,
            inverse_strip,
            close_strip: StripFlags::default(),
            close: None,
            loc: block_loc.clone(),
        };
        Ok(InverseSection {
            strip: tag.strip,
            program: Program {
                body: vec![Statement::Block(chained)],
                block_params: Vec::new(),
                chained: true,
                loc: block_loc,
            },
        })
    }

    /// `{{{{helper args}}}} raw text {{{{/helper}}}}`
    fn parse_raw_block(&mut self) -> ParseResult<Statement> {
        let open = self.advance();
        let call = self.parse_call()?;
        let close = self.consume(TokenKind::CloseRawBlock)?;
        let open_span = TextRange::new(open.start(), close.end());
        let open_name = call.head.original();

        let mut body = Vec::new();
        if self.check(TokenKind::Content) {
            let token = self.advance();
            let mut content = ContentStatement::new(self.text(token));
            content.loc = self.loc(token.span);
            body.push(Statement::Content(content));
        }
        let end = self.consume(TokenKind::EndRawBlock)?;
        let end_text = self.text(end);
        let close_name = end_text
            .trim_start_matches("{{{{/")
            .trim_end_matches("}}}}")
            .to_string();
        if close_name != open_name {
            let kind = ErrorKind::MismatchedBlock {
                open: open_name,
                close: close_name,
            };
            let related = self.location(open_span);
            return Err(Box::new(
                (*self.error(kind, end.span)).with_related(open_span, related, "raw block opened here"),
            ));
        }

        let mut close_path = PathExpression::new(vec![close_name]);
        close_path.loc = self.loc(end.span);
        let body_span = TextRange::new(close.end(), end.start());
        let call_loc = self.loc(call.span);
        Ok(Statement::Block(BlockStatement {
            expr: call.into_expression(call_loc),
            program: Some(Program {
                body,
                block_params: Vec::new(),
                chained: false,
                loc: self.loc(body_span),
            }),
            inverse: None,
            open_strip: StripFlags::default(),
            inverse_strip: StripFlags::default(),
            close_strip: StripFlags::default(),
            close: Some(close_path),
            loc: self.loc(TextRange::new(open.start(), end.end())),
        }))
    }

    /// `partial_name param* hash?`
    fn parse_partial_call(&mut self) -> ParseResult<(Expression, Vec<Expression>, Option<Hash>)> {
        let name = self.parse_param()?;
        let mut params = Vec::new();
        let params_start = self.peek().span;
        while self.at_partial_param() {
            params.push(self.parse_param()?);
        }
        if params.len() > 1 {
            let span = TextRange::new(params_start.start(), self.prev().span.end());
            return Err(self.error(
                ErrorKind::UnsupportedPartialArguments {
                    count: params.len(),
                },
                span,
            ));
        }
        let hash = self.parse_hash()?;
        Ok((name, params, hash))
    }

    fn at_partial_param(&self) -> bool {
        let token = self.peek();
        match token.kind {
            TokenKind::Id => self.peek_nth(1).kind != TokenKind::Equals,
            TokenKind::Data | TokenKind::OpenSexpr => true,
            kind => kind.is_literal(),
        }
    }

    fn parse_partial(&mut self) -> ParseResult<Statement> {
        let open = self.advance();
        let (name, params, hash) = self.parse_partial_call()?;
        let close = self.consume(TokenKind::Close)?;
        Ok(Statement::Partial(PartialStatement {
            name,
            params,
            hash,
            indent: String::new(),
            strip: self.strip_flags(open, close),
            loc: self.loc(TextRange::new(open.start(), close.end())),
        }))
    }

    fn parse_partial_block(&mut self) -> ParseResult<Statement> {
        let open = self.advance();
        self.nested(open.span, |parser| parser.parse_partial_block_rest(open))
    }

    fn parse_partial_block_rest(&mut self, open: Token) -> ParseResult<Statement> {
        let (name, params, hash) = self.parse_partial_call()?;
        let close = self.consume(TokenKind::Close)?;
        let open_span = TextRange::new(open.start(), close.end());
        let open_strip = self.strip_flags(open, close);
        let open_name = name.original();

        let program = self.parse_program(Vec::new())?;
        if matches!(self.peek().kind, TokenKind::Inverse | TokenKind::OpenInverseChain) {
            return Err(self.error(ErrorKind::UnexpectedInverse, self.peek().span));
        }
        let (_, close_strip, close_span) = self.parse_close_block(&open_name, open_span)?;

        Ok(Statement::PartialBlock(PartialBlockStatement {
            name,
            params,
            hash,
            program,
            open_strip,
            close_strip,
            loc: self.loc(TextRange::new(open.start(), close_span.end())),
        }))
    }
}

/// Every block of an `{{else if}}` chain closes with the outer `{{/if}}` tag.
fn apply_chain_close_strip(inverse: &mut Program, strip: StripFlags) {
    if !inverse.chained {
        return;
    }
    if let Some(Statement::Block(block)) = inverse.body.first_mut() {
        block.close_strip = strip;
        if let Some(nested) = block.inverse.as_mut() {
            apply_chain_close_strip(nested, strip);
        }
    }
}

/// Comment text without its delimiters and strip markers.
fn strip_comment(text: &str) -> &str {
    let text = text.strip_prefix("{{").unwrap_or(text);
    let text = text.strip_prefix('~').unwrap_or(text);
    let text = text.strip_prefix('!').unwrap_or(text);
    let text = text.strip_prefix("--").unwrap_or(text);
    let text = text.strip_suffix("}}").unwrap_or(text);
    let text = text.strip_suffix('~').unwrap_or(text);
    text.strip_suffix("--").unwrap_or(text)
}

#[cfg(test)]
mod tests {
    use super::strip_comment;

    #[test]
    fn test_strip_comment() {
        assert_eq!(strip_comment("{{! hi }}"), " hi ");
        assert_eq!(strip_comment("{{!-- a }} b --}}"), " a }} b ");
        assert_eq!(strip_comment("{{~!-- x --~}}"), " x ");
    }
}
