//! Expression AST nodes.

use super::location::SourceLocation;
use serde::{Deserialize, Serialize};

/// Expression types.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Expression {
    SubExpression(SubExpression),
    #[serde(rename = "PathExpression")]
    Path(PathExpression),
    #[serde(rename = "StringLiteral")]
    String(StringLiteral),
    #[serde(rename = "NumberLiteral")]
    Number(NumberLiteral),
    #[serde(rename = "BooleanLiteral")]
    Boolean(BooleanLiteral),
    #[serde(rename = "UndefinedLiteral")]
    Undefined(UndefinedLiteral),
    #[serde(rename = "NullLiteral")]
    Null(NullLiteral),
}

impl Expression {
    pub fn loc(&self) -> Option<&SourceLocation> {
        match self {
            Expression::SubExpression(e) => e.loc.as_ref(),
            Expression::Path(e) => e.loc.as_ref(),
            Expression::String(e) => e.loc.as_ref(),
            Expression::Number(e) => e.loc.as_ref(),
            Expression::Boolean(e) => e.loc.as_ref(),
            Expression::Undefined(e) => e.loc.as_ref(),
            Expression::Null(e) => e.loc.as_ref(),
        }
    }

    /// Source text of the expression head, used to match block open/close tags.
    pub fn original(&self) -> String {
        match self {
            Expression::SubExpression(e) => e.path.original.clone(),
            Expression::Path(e) => e.original.clone(),
            Expression::String(e) => e.original.clone(),
            Expression::Number(e) => e.original.clone(),
            Expression::Boolean(e) => e.original.clone(),
            Expression::Undefined(_) => "undefined".to_string(),
            Expression::Null(_) => "null".to_string(),
        }
    }

    pub fn is_literal(&self) -> bool {
        !matches!(self, Expression::SubExpression(_) | Expression::Path(_))
    }

    /// Reinterprets a literal in callee position as a single-part path, so that
    /// `{{"foo bar"}}` looks up the `foo bar` property.
    pub fn literal_to_path(self) -> Self {
        match self {
            Expression::SubExpression(_) | Expression::Path(_) => self,
            literal => {
                let loc = literal.loc().cloned();
                let original = literal.original();
                Expression::Path(PathExpression {
                    data: false,
                    depth: 0,
                    parts: vec![original.clone()],
                    original,
                    loc,
                })
            }
        }
    }
}

/// A parenthesized call `(helper arg key=value)`, or the call form of a
/// mustache/block that carries params.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubExpression {
    pub path: PathExpression,
    #[serde(default)]
    pub params: Vec<Expression>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<Hash>,
    /// `Some(true)` for explicit `(foo)` calls, which are indistinguishable from
    /// a plain `foo` reference once params are gone.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_helper: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loc: Option<SourceLocation>,
}

/// `foo.bar`, `../baz`, `this`, `@index`, `[literal segment]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PathExpression {
    #[serde(default)]
    pub data: bool,
    #[serde(default)]
    pub depth: u32,
    pub parts: Vec<String>,
    pub original: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loc: Option<SourceLocation>,
}

impl PathExpression {
    pub fn new(parts: Vec<String>) -> Self {
        let original = parts.join(".");
        PathExpression {
            data: false,
            depth: 0,
            parts,
            original,
            loc: None,
        }
    }

    /// True for paths explicitly anchored at the current context (`.`, `./x`, `this.x`).
    pub fn is_scoped(&self) -> bool {
        if self.original.starts_with('.') {
            return true;
        }
        match self.original.strip_prefix("this") {
            Some(rest) => !rest.starts_with(|c: char| c.is_alphanumeric() || c == '_'),
            None => false,
        }
    }

    /// A bare single identifier: the only path shape eligible for helper lookup.
    pub fn is_simple_id(&self) -> bool {
        self.parts.len() == 1 && self.depth == 0 && !self.data && !self.is_scoped()
    }

    pub fn head(&self) -> Option<&str> {
        self.parts.first().map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StringLiteral {
    pub value: String,
    pub original: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loc: Option<SourceLocation>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumberLiteral {
    pub value: f64,
    pub original: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loc: Option<SourceLocation>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BooleanLiteral {
    pub value: bool,
    pub original: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loc: Option<SourceLocation>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UndefinedLiteral {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loc: Option<SourceLocation>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NullLiteral {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loc: Option<SourceLocation>,
}

/// `key=value` arguments.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Hash {
    pub pairs: Vec<HashPair>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loc: Option<SourceLocation>,
}

impl Hash {
    pub fn get(&self, key: &str) -> Option<&Expression> {
        self.pairs.iter().find(|pair| pair.key == key).map(|pair| &pair.value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HashPair {
    pub key: String,
    pub value: Expression,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loc: Option<SourceLocation>,
}
