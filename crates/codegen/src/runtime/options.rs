//! The options argument every helper receives

use super::executor::Executor;
use super::scope::Scope;
use super::value::{Object, Value};
use crate::bytecode::{ProgramId, TemplateSpec};
use crate::error::TemplateResult;
use indexmap::IndexMap;
use std::sync::Arc;
use whisker_parser::SourceLocation;

/// Data and block parameters for one rendering of a block body.
#[derive(Debug, Clone, Default)]
pub struct BlockArgs {
    /// Variables of a new `@data` frame; empty keeps the current frame.
    pub data: Object,
    pub block_params: Vec<Value>,
}

impl BlockArgs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_data(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.data.insert(name.into(), value.into());
        self
    }

    pub fn with_block_params(mut self, params: Vec<Value>) -> Self {
        self.block_params = params;
        self
    }
}

/// Call-site information for a helper: hash arguments, the current scope
/// and, for block helpers, the block body and its inverse.
pub struct HelperOptions<'a> {
    pub name: String,
    pub hash: IndexMap<String, Value>,
    /// Source paths of the positional params, when ids are tracked.
    pub ids: Option<Vec<Option<String>>>,
    pub hash_ids: Option<IndexMap<String, Option<String>>>,
    pub loc: Option<SourceLocation>,
    pub(crate) executor: &'a Executor<'a>,
    pub(crate) template: &'a Arc<TemplateSpec>,
    pub(crate) scope: Scope,
    pub(crate) program: Option<ProgramId>,
    pub(crate) inverse: Option<ProgramId>,
}

impl<'a> HelperOptions<'a> {
    pub(crate) fn bare(
        executor: &'a Executor<'a>,
        template: &'a Arc<TemplateSpec>,
        scope: &Scope,
        name: &str,
        loc: Option<SourceLocation>,
    ) -> Self {
        HelperOptions {
            name: name.to_string(),
            hash: IndexMap::new(),
            ids: None,
            hash_ids: None,
            loc,
            executor,
            template,
            scope: scope.clone(),
            program: None,
            inverse: None,
        }
    }

    /// The context the helper was called in.
    pub fn this(&self) -> &Value {
        self.scope.context()
    }

    /// The `@name` data variable.
    pub fn data(&self, name: &str) -> Value {
        self.scope.data.get(name).cloned().unwrap_or_default()
    }

    pub fn hash_value(&self, key: &str) -> &Value {
        self.hash.get(key).unwrap_or(Value::undefined())
    }

    pub fn is_block(&self) -> bool {
        self.program.is_some() || self.inverse.is_some()
    }

    pub fn has_inverse(&self) -> bool {
        self.inverse.is_some()
    }

    /// Block parameters declared by the block body.
    pub fn block_params(&self) -> usize {
        self.program
            .and_then(|id| self.template.program(id))
            .map_or(0, |chunk| chunk.block_params)
    }

    /// Render the block body against `context`. Empty for non-block calls.
    pub fn render(&self, context: &Value) -> TemplateResult<String> {
        self.render_with(context, BlockArgs::default())
    }

    pub fn render_with(&self, context: &Value, args: BlockArgs) -> TemplateResult<String> {
        self.executor
            .invoke_program(self.template, self.program, &self.scope, context.clone(), args)
    }

    /// Render the `{{else}}` section against `context`.
    pub fn inverse(&self, context: &Value) -> TemplateResult<String> {
        self.inverse_with(context, BlockArgs::default())
    }

    pub fn inverse_with(&self, context: &Value, args: BlockArgs) -> TemplateResult<String> {
        self.executor
            .invoke_program(self.template, self.inverse, &self.scope, context.clone(), args)
    }

    /// Same options with body and inverse exchanged.
    pub fn swapped(&self) -> HelperOptions<'a> {
        HelperOptions {
            name: self.name.clone(),
            hash: self.hash.clone(),
            ids: self.ids.clone(),
            hash_ids: self.hash_ids.clone(),
            loc: self.loc.clone(),
            executor: self.executor,
            template: self.template,
            scope: self.scope.clone(),
            program: self.inverse,
            inverse: self.program,
        }
    }
}
