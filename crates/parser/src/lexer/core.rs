//! Main lexer implementation for template source.

use super::token::{LogosToken, Token, TokenKind};
use crate::ast::LineIndex;
use crate::error::{ErrorKind, ParseResult, error};
use logos::Logos;
use text_size::{TextRange, TextSize};

/// Lexer that splits a template into content and mustache tokens.
///
/// Text outside of mustaches is scanned by hand; tokens between `{{` and `}}`
/// are produced by [`LogosToken`] one at a time so the core can recognize the
/// closing delimiters and strip markers itself.
pub struct Lexer<'src> {
    source: &'src str,
    source_name: Option<&'src str>,
    line_index: LineIndex<'src>,
    pos: usize,
    tokens: Vec<Token>,
}

impl<'src> Lexer<'src> {
    /// Create a new lexer for the given source.
    pub fn new(source: &'src str) -> Self {
        Lexer {
            source,
            source_name: None,
            line_index: LineIndex::new(source),
            pos: 0,
            tokens: Vec::new(),
        }
    }

    /// Name reported in error locations.
    pub fn with_source_name(mut self, name: Option<&'src str>) -> Self {
        self.source_name = name;
        self
    }

    /// Get the source text.
    pub fn source(&self) -> &'src str {
        self.source
    }

    /// Tokenize the whole template. The returned vector always ends with `Eof`.
    pub fn tokenize(mut self) -> ParseResult<Vec<Token>> {
        while self.pos < self.source.len() {
            self.lex_content()?;
        }
        let end = self.offset(self.source.len());
        self.tokens
            .push(Token::new(TokenKind::Eof, TextRange::empty(end)));
        Ok(self.tokens)
    }

    fn offset(&self, pos: usize) -> TextSize {
        TextSize::from(pos as u32)
    }

    fn range(&self, start: usize, end: usize) -> TextRange {
        TextRange::new(self.offset(start), self.offset(end))
    }

    fn push(&mut self, kind: TokenKind, start: usize, end: usize) {
        let span = self.range(start, end);
        self.tokens.push(Token::new(kind, span));
    }

    fn fail<T>(&self, kind: ErrorKind, start: usize, end: usize) -> ParseResult<T> {
        let span = self.range(start, end);
        Err(error(
            kind,
            span,
            self.line_index.location(span, self.source_name),
        ))
    }

    /// Scan text up to the next mustache, handling `\{{` escapes.
    fn lex_content(&mut self) -> ParseResult<()> {
        let start = self.pos;
        let Some(found) = self.source[start..].find("{{") else {
            self.push(TokenKind::Content, start, self.source.len());
            self.pos = self.source.len();
            return Ok(());
        };
        let open = start + found;
        let bytes = self.source.as_bytes();
        let escaped = open > start && bytes[open - 1] == b'\\';
        let double_escaped = escaped && open > start + 1 && bytes[open - 2] == b'\\';

        if double_escaped {
            // `\\{{`: one literal backslash, then a live mustache
            self.push(TokenKind::Content, start, open - 1);
            self.pos = open;
            return self.lex_mustache();
        }

        if escaped {
            // `\{{`: the mustache is emitted verbatim as content
            if open - 1 > start {
                self.push(TokenKind::Content, start, open - 1);
            }
            let end = self.escaped_content_end(open);
            self.push(TokenKind::Content, open, end);
            self.pos = end;
            return Ok(());
        }

        if open > start {
            self.push(TokenKind::Content, start, open);
        }
        self.pos = open;
        self.lex_mustache()
    }

    /// End of the text emitted for an escaped mustache: everything up to the
    /// next `{{` (or its own escape backslashes).
    fn escaped_content_end(&self, open: usize) -> usize {
        let from = open + 2;
        match self.source[from..].find("{{") {
            Some(found) => {
                let next = from + found;
                let bytes = self.source.as_bytes();
                let mut end = next;
                while end > from && next - end < 2 && bytes[end - 1] == b'\\' {
                    end -= 1;
                }
                end
            }
            None => self.source.len(),
        }
    }

    /// Lex one mustache starting at `{{`.
    fn lex_mustache(&mut self) -> ParseResult<()> {
        let start = self.pos;
        let rest = &self.source[start..];

        if rest.starts_with("{{{{") {
            self.push(TokenKind::OpenRawBlock, start, start + 4);
            self.pos = start + 4;
            self.lex_inside(start, true)?;
            return self.lex_raw_content(start);
        }

        let mut cursor = start + 2;
        if self.source[cursor..].starts_with('~') {
            cursor += 1;
        }
        let after = &self.source[cursor..];

        let (kind, len) = if after.starts_with("#>") {
            (TokenKind::OpenPartialBlock, 2)
        } else if after.starts_with("#*") || after.starts_with('*') {
            return self.fail(ErrorKind::UnsupportedDecorator, start, cursor + 1);
        } else if after.starts_with('>') {
            (TokenKind::OpenPartial, 1)
        } else if after.starts_with('#') {
            (TokenKind::OpenBlock, 1)
        } else if after.starts_with('/') {
            (TokenKind::OpenEndBlock, 1)
        } else if after.starts_with('^') {
            if let Some(end) = self.standalone_inverse_end(cursor + 1) {
                self.push(TokenKind::Inverse, start, end);
                self.pos = end;
                return Ok(());
            }
            (TokenKind::OpenInverse, 1)
        } else if after.starts_with("!--") {
            return self.lex_long_comment(start, cursor + 3);
        } else if after.starts_with('!') {
            return self.lex_short_comment(start, cursor + 1);
        } else if after.starts_with('{') {
            (TokenKind::OpenUnescaped, 1)
        } else if after.starts_with('&') {
            (TokenKind::Open, 1)
        } else if let Some(else_end) = self.else_keyword_end(cursor) {
            if let Some(end) = self.standalone_inverse_end(else_end) {
                self.push(TokenKind::Inverse, start, end);
                self.pos = end;
                return Ok(());
            }
            if self.source[else_end..].starts_with(char::is_whitespace) {
                self.push(TokenKind::OpenInverseChain, start, else_end);
                self.pos = else_end;
                return self.lex_inside(start, false);
            }
            (TokenKind::Open, 0)
        } else {
            (TokenKind::Open, 0)
        };

        self.push(kind, start, cursor + len);
        self.pos = cursor + len;
        self.lex_inside(start, false)
    }

    /// Position right after `else` when the mustache body starts with it.
    fn else_keyword_end(&self, from: usize) -> Option<usize> {
        let trimmed = self.source[from..].trim_start();
        let keyword = from + (self.source.len() - from - trimmed.len());
        trimmed.starts_with("else").then_some(keyword + 4)
    }

    /// If only whitespace and an optional `~` remain before `}}`, the end of
    /// that `}}`.
    fn standalone_inverse_end(&self, from: usize) -> Option<usize> {
        let trimmed = self.source[from..].trim_start();
        let at = self.source.len() - trimmed.len();
        let close = if trimmed.starts_with("~}}") {
            3
        } else if trimmed.starts_with("}}") {
            2
        } else {
            return None;
        };
        Some(at + close)
    }

    fn lex_long_comment(&mut self, start: usize, body: usize) -> ParseResult<()> {
        let mut search = body;
        while let Some(found) = self.source[search..].find("}}") {
            let close = search + found;
            let before = &self.source[body..close];
            if before.ends_with("--") || before.ends_with("--~") {
                self.push(TokenKind::Comment, start, close + 2);
                self.pos = close + 2;
                return Ok(());
            }
            search = close + 1;
        }
        self.fail(ErrorKind::UnterminatedComment, start, self.source.len())
    }

    fn lex_short_comment(&mut self, start: usize, body: usize) -> ParseResult<()> {
        match self.source[body..].find("}}") {
            Some(found) => {
                let end = body + found + 2;
                self.push(TokenKind::Comment, start, end);
                self.pos = end;
                Ok(())
            }
            None => self.fail(ErrorKind::UnterminatedComment, start, self.source.len()),
        }
    }

    /// Lex the tokens between an opening delimiter and its close.
    fn lex_inside(&mut self, open: usize, raw: bool) -> ParseResult<()> {
        loop {
            let skipped = self.source[self.pos..].len() - self.source[self.pos..].trim_start().len();
            self.pos += skipped;
            let start = self.pos;
            let rest = &self.source[start..];

            if rest.is_empty() {
                return self.fail(ErrorKind::UnterminatedMustache, open, start);
            }
            if raw && rest.starts_with("}}}}") {
                self.push(TokenKind::CloseRawBlock, start, start + 4);
                self.pos = start + 4;
                return Ok(());
            }
            if rest.starts_with("}~}}") || rest.starts_with("}}}") {
                let len = if rest.starts_with("}~}}") { 4 } else { 3 };
                self.push(TokenKind::CloseUnescaped, start, start + len);
                self.pos = start + len;
                return Ok(());
            }
            if rest.starts_with("~}}") || rest.starts_with("}}") {
                let len = if rest.starts_with('~') { 3 } else { 2 };
                self.push(TokenKind::Close, start, start + len);
                self.pos = start + len;
                return Ok(());
            }
            if rest.starts_with('~') {
                return self.fail(ErrorKind::InvalidStripMarker, start, start + 1);
            }
            if rest.starts_with("{{") {
                return self.fail(ErrorKind::UnterminatedMustache, open, start);
            }

            let mut lexer = LogosToken::lexer(rest);
            let Some(result) = lexer.next() else {
                return self.fail(ErrorKind::UnterminatedMustache, open, start);
            };
            let span = lexer.span();
            let (tok_start, tok_end) = (start + span.start, start + span.end);
            let logos_token = match result {
                Ok(token) => token,
                Err(()) => {
                    let found = rest[span.start..].chars().next().unwrap_or(' ');
                    let kind = if found == '"' || found == '\'' {
                        ErrorKind::UnterminatedString
                    } else {
                        ErrorKind::InvalidCharacter { found }
                    };
                    return self.fail(kind, tok_start, tok_start + found.len_utf8());
                }
            };

            let kind = self.classify(logos_token, tok_end);
            self.push(kind, tok_start, tok_end);
            self.pos = tok_end;
        }
    }

    /// Map a logos token to the parser's token kind, applying lookahead.
    fn classify(&self, token: LogosToken, end: usize) -> TokenKind {
        let next = self.source[end..].chars().next();
        match token {
            LogosToken::OpenSexpr => TokenKind::OpenSexpr,
            LogosToken::CloseSexpr => TokenKind::CloseSexpr,
            LogosToken::Equals => TokenKind::Equals,
            LogosToken::Data => TokenKind::Data,
            LogosToken::DotDot | LogosToken::Ident | LogosToken::LiteralSegment => TokenKind::Id,
            LogosToken::Dot => {
                // `.` is `this` when it stands alone, a separator otherwise
                let alone = match next {
                    None => true,
                    Some(c) => c.is_whitespace() || "=~}/.)|".contains(c),
                };
                if alone {
                    TokenKind::Id
                } else {
                    TokenKind::Separator
                }
            }
            LogosToken::Slash => TokenKind::Separator,
            LogosToken::OpenBlockParams => TokenKind::OpenBlockParams,
            LogosToken::Pipe => TokenKind::CloseBlockParams,
            LogosToken::String => TokenKind::String,
            LogosToken::Number | LogosToken::Boolean | LogosToken::Undefined | LogosToken::Null => {
                let literal = match next {
                    None => true,
                    Some(c) => c.is_whitespace() || "~})".contains(c),
                };
                if !literal {
                    return TokenKind::Id;
                }
                match token {
                    LogosToken::Number => TokenKind::Number,
                    LogosToken::Boolean => TokenKind::Boolean,
                    LogosToken::Undefined => TokenKind::Undefined,
                    _ => TokenKind::Null,
                }
            }
        }
    }

    /// Scan a raw block body up to its matching `{{{{/name}}}}`.
    fn lex_raw_content(&mut self, open: usize) -> ParseResult<()> {
        let body = self.pos;
        let mut depth = 0usize;
        let mut search = body;
        while let Some(found) = self.source[search..].find("{{{{") {
            let at = search + found;
            let after = &self.source[at + 4..];
            if let Some(closing) = after.strip_prefix('/') {
                let name_len = closing
                    .find(|c: char| c.is_whitespace() || "}=/.".contains(c))
                    .unwrap_or(closing.len());
                let name_end = at + 5 + name_len;
                if name_len > 0 && self.source[name_end..].starts_with("}}}}") {
                    if depth == 0 {
                        if at > body {
                            self.push(TokenKind::Content, body, at);
                        }
                        self.push(TokenKind::EndRawBlock, at, name_end + 4);
                        self.pos = name_end + 4;
                        return Ok(());
                    }
                    depth -= 1;
                }
            } else {
                depth += 1;
            }
            search = at + 4;
        }
        let name = self.raw_block_name(open);
        self.fail(ErrorKind::UnterminatedRawBlock { name }, open, self.source.len())
    }

    fn raw_block_name(&self, open: usize) -> String {
        self.source[open + 4..]
            .trim_start()
            .split(|c: char| c.is_whitespace() || c == '}')
            .next()
            .unwrap_or_default()
            .to_string()
    }
}
