//! Instruction definitions
//!
//! A compiled program is a flat list of [`Instruction`]s. Values are described
//! by [`Operand`] trees which the runtime evaluates against the current scope;
//! where a value comes from is an [`Accessor`] chain produced by the backend.

use super::program::ProgramId;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use whisker_parser::SourceLocation;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Instruction {
    /// Literal template text.
    AppendContent(String),
    /// Evaluate and append, HTML-escaping unless the value is safe.
    Append { value: Operand, escape: bool },
    Block(Box<BlockCall>),
    Partial(Box<PartialCall>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Operand {
    Literal(Literal),
    /// Plain lookup; functions are passed through untouched.
    Lookup(Lookup),
    /// Lookup whose function values are invoked against the current context.
    Lambda(Lookup),
    /// A definite helper call.
    Call(Box<Call>),
    /// Helper if one is registered under the name, context value otherwise.
    Ambiguous(Box<Call>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Literal {
    String(String),
    Number(f64),
    Boolean(bool),
    Undefined,
    Null,
}

/// What kind of name a lookup step resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LookupKind {
    Context,
    Data,
    Helper,
    Partial,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Accessor {
    /// The context `depth` levels up the context stack.
    Context { depth: u32 },
    /// The data frame `depth` levels up.
    Data { depth: u32 },
    /// Block parameter `index` of the frame `depth` programs out.
    BlockParam { depth: usize, index: usize },
    /// The helper registry.
    Helpers,
    /// The partial registry.
    Partials,
    /// Nearest context on the stack holding a non-null `name`.
    Depthed { name: String },
    Member {
        base: Box<Accessor>,
        name: String,
        kind: LookupKind,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lookup {
    pub accessor: Accessor,
    /// Under strict mode, the final step must name an existing property.
    #[serde(default)]
    pub require_terminal: bool,
    pub original: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loc: Option<SourceLocation>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Call {
    pub name: String,
    /// Registry lookup, present for simple identifiers only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub helper: Option<Accessor>,
    /// Context fallback when no helper is registered.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Lookup>,
    #[serde(default)]
    pub params: Vec<Operand>,
    #[serde(default)]
    pub hash: IndexMap<String, Operand>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ids: Option<CallIds>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loc: Option<SourceLocation>,
}

/// Source paths of call arguments, kept when ids are tracked.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallIds {
    pub params: Vec<Option<String>>,
    pub hash: IndexMap<String, Option<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BlockKind {
    Helper(Call),
    Ambiguous(Call),
    /// A value section: truthiness picks the program or inverse, arrays
    /// iterate, anything else becomes the new context.
    Section(Operand),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockCall {
    pub kind: BlockKind,
    pub name: String,
    #[serde(default)]
    pub program: Option<ProgramId>,
    #[serde(default)]
    pub inverse: Option<ProgramId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loc: Option<SourceLocation>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PartialName {
    Static { name: String, accessor: Accessor },
    Dynamic(Operand),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartialCall {
    pub name: PartialName,
    pub context: Operand,
    #[serde(default)]
    pub hash: IndexMap<String, Operand>,
    /// Prefix applied to every line of the partial's output.
    #[serde(default)]
    pub indent: String,
    /// Body of a partial block, available as `@partial-block`.
    #[serde(default)]
    pub program: Option<ProgramId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loc: Option<SourceLocation>,
}
