//! Token definition and types.

use logos::Logos;
use text_size::{TextRange, TextSize};

/// A positioned token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: TextRange,
}

impl Token {
    pub fn new(kind: TokenKind, span: TextRange) -> Self {
        Token { kind, span }
    }

    pub fn start(&self) -> TextSize {
        self.span.start()
    }

    pub fn end(&self) -> TextSize {
        self.span.end()
    }

    /// The token's source text.
    pub fn text<'src>(&self, source: &'src str) -> &'src str {
        &source[self.span]
    }
}

/// Lexical token kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum TokenKind {
    /// Literal template text
    Content,
    /// `{{! .. }}` or `{{!-- .. --}}`, delimiters included
    Comment,
    /// `{{` or `{{&`
    Open,
    /// `{{{`
    OpenUnescaped,
    /// `{{#`
    OpenBlock,
    /// `{{/`
    OpenEndBlock,
    /// `{{^`
    OpenInverse,
    /// `{{else` followed by a helper call
    OpenInverseChain,
    /// `{{^}}` or `{{else}}`, delimiters included
    Inverse,
    /// `{{>`
    OpenPartial,
    /// `{{#>`
    OpenPartialBlock,
    /// `{{{{`
    OpenRawBlock,
    /// `}}}}`
    CloseRawBlock,
    /// `{{{{/name}}}}`
    EndRawBlock,
    /// `}}`
    Close,
    /// `}}}`
    CloseUnescaped,
    /// `(`
    OpenSexpr,
    /// `)`
    CloseSexpr,
    /// `=`
    Equals,
    /// `@`
    Data,
    /// `.` or `/` between path segments
    Separator,
    /// Identifier, `.`, `..` or a `[literal]` segment
    Id,
    String,
    Number,
    Boolean,
    Undefined,
    Null,
    /// `as |`
    OpenBlockParams,
    /// `|`
    CloseBlockParams,
    Eof,
}

impl TokenKind {
    pub fn is_literal(self) -> bool {
        matches!(
            self,
            TokenKind::String
                | TokenKind::Number
                | TokenKind::Boolean
                | TokenKind::Undefined
                | TokenKind::Null
        )
    }

    /// Human-readable description used in error messages.
    pub fn describe(self) -> &'static str {
        match self {
            TokenKind::Content => "content",
            TokenKind::Comment => "comment",
            TokenKind::Open => "'{{'",
            TokenKind::OpenUnescaped => "'{{{'",
            TokenKind::OpenBlock => "'{{#'",
            TokenKind::OpenEndBlock => "'{{/'",
            TokenKind::OpenInverse => "'{{^'",
            TokenKind::OpenInverseChain => "'{{else'",
            TokenKind::Inverse => "'{{else}}'",
            TokenKind::OpenPartial => "'{{>'",
            TokenKind::OpenPartialBlock => "'{{#>'",
            TokenKind::OpenRawBlock => "'{{{{'",
            TokenKind::CloseRawBlock => "'}}}}'",
            TokenKind::EndRawBlock => "raw block end",
            TokenKind::Close => "'}}'",
            TokenKind::CloseUnescaped => "'}}}'",
            TokenKind::OpenSexpr => "'('",
            TokenKind::CloseSexpr => "')'",
            TokenKind::Equals => "'='",
            TokenKind::Data => "'@'",
            TokenKind::Separator => "separator",
            TokenKind::Id => "identifier",
            TokenKind::String => "string",
            TokenKind::Number => "number",
            TokenKind::Boolean => "boolean",
            TokenKind::Undefined => "'undefined'",
            TokenKind::Null => "'null'",
            TokenKind::OpenBlockParams => "'as |'",
            TokenKind::CloseBlockParams => "'|'",
            TokenKind::Eof => "end of template",
        }
    }
}

/// Tokens recognized inside a mustache, between its open and close delimiters.
///
/// Delimiters themselves are recognized by the lexer core, which also applies
/// the lookahead rules logos cannot express (literal vs identifier, `.` as a
/// segment vs a separator).
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\r\n\f]+")]
pub enum LogosToken {
    #[token("(")]
    OpenSexpr,

    #[token(")")]
    CloseSexpr,

    #[token("=")]
    Equals,

    #[token("@")]
    Data,

    #[token("..")]
    DotDot,

    #[token(".")]
    Dot,

    #[token("/")]
    Slash,

    #[regex(r"as[ \t\r\n]+\|")]
    OpenBlockParams,

    #[token("|")]
    Pipe,

    #[regex(r#""(\\"|[^"])*""#)]
    #[regex(r#"'(\\'|[^'])*'"#)]
    String,

    #[regex(r"-?[0-9]+(\.[0-9]+)?", priority = 3)]
    Number,

    #[token("true")]
    #[token("false")]
    Boolean,

    #[token("undefined")]
    Undefined,

    #[token("null")]
    Null,

    #[regex(r"\[(\\\]|[^\]])*\]")]
    LiteralSegment,

    #[regex(r##"[^ \t\r\n\f!"#%&'()*+,./;<=>@\[\\\]^`{|}~]+"##)]
    Ident,
}
