//! Core AST node definitions (Program and statements).

use super::expr::{Expression, Hash, PathExpression};
use super::location::SourceLocation;
use serde::{Deserialize, Serialize};

/// A sequence of statements: the template root, a block body or an inverse.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Program {
    pub body: Vec<Statement>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub block_params: Vec<String>,
    /// Set on an inverse that wraps a single `{{else if ..}}` block.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub chained: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loc: Option<SourceLocation>,
}

impl Program {
    pub fn new(body: Vec<Statement>) -> Self {
        Program {
            body,
            ..Program::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }
}

/// Statement types.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Statement {
    #[serde(rename = "MustacheStatement")]
    Mustache(MustacheStatement),
    #[serde(rename = "BlockStatement")]
    Block(BlockStatement),
    #[serde(rename = "PartialStatement")]
    Partial(PartialStatement),
    #[serde(rename = "PartialBlockStatement")]
    PartialBlock(PartialBlockStatement),
    #[serde(rename = "ContentStatement")]
    Content(ContentStatement),
    #[serde(rename = "CommentStatement")]
    Comment(CommentStatement),
}

impl Statement {
    pub fn loc(&self) -> Option<&SourceLocation> {
        match self {
            Statement::Mustache(s) => s.loc.as_ref(),
            Statement::Block(s) => s.loc.as_ref(),
            Statement::Partial(s) => s.loc.as_ref(),
            Statement::PartialBlock(s) => s.loc.as_ref(),
            Statement::Content(s) => s.loc.as_ref(),
            Statement::Comment(s) => s.loc.as_ref(),
        }
    }

    /// The node's type tag as it appears in the interchange format.
    pub fn type_name(&self) -> &'static str {
        match self {
            Statement::Mustache(_) => "MustacheStatement",
            Statement::Block(_) => "BlockStatement",
            Statement::Partial(_) => "PartialStatement",
            Statement::PartialBlock(_) => "PartialBlockStatement",
            Statement::Content(_) => "ContentStatement",
            Statement::Comment(_) => "CommentStatement",
        }
    }

    pub fn as_content(&self) -> Option<&ContentStatement> {
        match self {
            Statement::Content(content) => Some(content),
            _ => None,
        }
    }
}

/// Whitespace-strip intent recorded from `~` markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StripFlags {
    #[serde(default)]
    pub open: bool,
    #[serde(default)]
    pub close: bool,
}

impl StripFlags {
    pub fn new(open: bool, close: bool) -> Self {
        StripFlags { open, close }
    }
}

/// `{{expr}}`, `{{{expr}}}` or `{{&expr}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MustacheStatement {
    pub expr: Expression,
    pub escaped: bool,
    #[serde(default)]
    pub strip: StripFlags,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loc: Option<SourceLocation>,
}

/// `{{#expr}}..{{else}}..{{/expr}}` and the inverted `{{^expr}}` form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockStatement {
    pub expr: Expression,
    #[serde(default)]
    pub program: Option<Program>,
    #[serde(default)]
    pub inverse: Option<Program>,
    #[serde(default)]
    pub open_strip: StripFlags,
    #[serde(default)]
    pub inverse_strip: StripFlags,
    #[serde(default)]
    pub close_strip: StripFlags,
    /// Path named by the closing tag. Absent on chained `{{else ..}}` blocks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub close: Option<PathExpression>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loc: Option<SourceLocation>,
}

/// `{{> name context key=value}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartialStatement {
    pub name: Expression,
    #[serde(default)]
    pub params: Vec<Expression>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<Hash>,
    /// Indentation re-applied to every rendered line of a standalone partial.
    #[serde(default)]
    pub indent: String,
    #[serde(default)]
    pub strip: StripFlags,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loc: Option<SourceLocation>,
}

/// `{{#> name}}fallback{{/name}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartialBlockStatement {
    pub name: Expression,
    #[serde(default)]
    pub params: Vec<Expression>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<Hash>,
    pub program: Program,
    #[serde(default)]
    pub open_strip: StripFlags,
    #[serde(default)]
    pub close_strip: StripFlags,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loc: Option<SourceLocation>,
}

/// Literal template text.
///
/// `value` is what gets rendered; `original` keeps the source text so that
/// standalone detection is unaffected by earlier stripping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentStatement {
    pub value: String,
    pub original: String,
    #[serde(skip)]
    pub left_stripped: bool,
    #[serde(skip)]
    pub right_stripped: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loc: Option<SourceLocation>,
}

impl ContentStatement {
    pub fn new(text: impl Into<String>) -> Self {
        let value = text.into();
        ContentStatement {
            original: value.clone(),
            value,
            left_stripped: false,
            right_stripped: false,
            loc: None,
        }
    }
}

/// `{{! ..}}` or `{{!-- .. --}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentStatement {
    pub value: String,
    #[serde(default)]
    pub strip: StripFlags,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loc: Option<SourceLocation>,
}
