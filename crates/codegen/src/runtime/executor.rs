//! Instruction interpreter

use super::buffer::{Capture, OutputBuffer};
use super::env::{Environment, Helper, Partial};
use super::escape::escape_html;
use super::options::{BlockArgs, HelperOptions};
use super::scope::{DataFrame, PartialBlock, Scope};
use super::value::Value;
use crate::backend::Backend;
use crate::bytecode::{
    Accessor, BlockCall, BlockKind, Call, Instruction, Literal, Lookup, Operand, PartialCall,
    PartialName, ProgramId, TemplateSpec,
};
use crate::error::{RuntimeError, TemplateError, TemplateResult};
use indexmap::IndexMap;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::Arc;

const PARTIAL_BLOCK: &str = "@partial-block";

/// What a call's name resolved to.
enum Callee {
    /// A registered helper.
    Helper(Helper),
    /// A function found in the context.
    Lambda(Helper),
    Value(Value),
}

/// Renders one template invocation. Partials compiled from source are
/// cached for the lifetime of the executor, one entry per name and
/// compile options.
pub(crate) struct Executor<'env> {
    env: &'env Environment,
    depth: Cell<usize>,
    partials: RefCell<HashMap<String, Vec<Arc<TemplateSpec>>>>,
}

struct DepthGuard<'a> {
    depth: &'a Cell<usize>,
}

impl Drop for DepthGuard<'_> {
    fn drop(&mut self) {
        self.depth.set(self.depth.get().saturating_sub(1));
    }
}

impl<'env> Executor<'env> {
    pub(crate) fn new(env: &'env Environment) -> Self {
        Executor {
            env,
            depth: Cell::new(0),
            partials: RefCell::new(HashMap::new()),
        }
    }

    pub(crate) fn render(
        &self,
        template: &Arc<TemplateSpec>,
        context: &Value,
        block_params: &[Value],
        out: &mut dyn OutputBuffer,
    ) -> TemplateResult<()> {
        let mut values = self.env.data().clone();
        values
            .entry("root".to_string())
            .or_insert_with(|| context.clone());
        let scope = Scope::new(context.clone(), DataFrame::root(values), block_params);

        let _guard = self.enter()?;
        self.run(template, template.main, &scope, out)
    }

    fn enter(&self) -> Result<DepthGuard<'_>, RuntimeError> {
        let depth = self.depth.get() + 1;
        let limit = self.env.limits.max_depth;
        if depth > limit {
            return Err(RuntimeError::DepthExceeded { limit });
        }
        self.depth.set(depth);
        Ok(DepthGuard { depth: &self.depth })
    }

    /// Render a sub-program into a string. A missing program renders empty.
    pub(crate) fn invoke_program(
        &self,
        template: &Arc<TemplateSpec>,
        program: Option<ProgramId>,
        parent: &Scope,
        context: Value,
        args: BlockArgs,
    ) -> TemplateResult<String> {
        let Some(program) = program else {
            return Ok(String::new());
        };
        let _guard = self.enter()?;

        let data = if args.data.is_empty() {
            parent.data.clone()
        } else {
            parent.data.child(args.data)
        };
        let scope = parent.enter(context, args.block_params, data);
        let mut out = Capture::new(template.buffer);
        self.run(template, program, &scope, &mut out)?;
        Ok(out.finish())
    }

    fn run(
        &self,
        template: &Arc<TemplateSpec>,
        program: ProgramId,
        scope: &Scope,
        out: &mut dyn OutputBuffer,
    ) -> TemplateResult<()> {
        let chunk = template
            .program(program)
            .ok_or(RuntimeError::InvalidProgram { id: program })?;

        for instruction in &chunk.instructions {
            match self.execute(template, instruction, scope, out) {
                Err(TemplateError::Runtime(error))
                    if !template.options.strict && error.is_recoverable() =>
                {
                    tracing::warn!(%error, "rendering empty substitution");
                }
                result => result?,
            }
        }
        Ok(())
    }

    fn execute(
        &self,
        template: &Arc<TemplateSpec>,
        instruction: &Instruction,
        scope: &Scope,
        out: &mut dyn OutputBuffer,
    ) -> TemplateResult<()> {
        match instruction {
            Instruction::AppendContent(text) => out.append(text, false)?,
            Instruction::Append { value, escape } => {
                let value = self.eval(template, value, scope)?;
                let text = value.to_string();
                if *escape && !value.is_safe() {
                    out.append(&escape_html(&text), true)?;
                } else {
                    out.append(&text, true)?;
                }
            }
            Instruction::Block(block) => {
                let text = self.block(template, block, scope)?;
                out.append(&text, true)?;
            }
            Instruction::Partial(partial) => {
                let text = self.partial(template, partial, scope)?;
                out.append(&text, true)?;
            }
        }
        Ok(())
    }

    // ===== Values =====

    fn eval(&self, template: &Arc<TemplateSpec>, operand: &Operand, scope: &Scope) -> TemplateResult<Value> {
        match operand {
            Operand::Literal(literal) => Ok(literal_value(literal)),
            Operand::Lookup(lookup) => Ok(self.lookup(template, lookup, scope)?),
            Operand::Lambda(lookup) => match self.lookup(template, lookup, scope)? {
                Value::Function(lambda) => {
                    let options =
                        HelperOptions::bare(self, template, scope, &lookup.original, lookup.loc.clone());
                    lambda.call(&[], &options)
                }
                value => Ok(value),
            },
            Operand::Call(call) => self.call(template, call, scope),
            Operand::Ambiguous(call) => match self.callee(template, call, scope)? {
                Callee::Helper(helper) | Callee::Lambda(helper) => {
                    let options = self.options(template, call, scope, None, None)?;
                    helper.call(&[], &options)
                }
                Callee::Value(value) => Ok(value),
            },
        }
    }

    fn eval_params(
        &self,
        template: &Arc<TemplateSpec>,
        params: &[Operand],
        scope: &Scope,
    ) -> TemplateResult<Vec<Value>> {
        params
            .iter()
            .map(|param| self.eval(template, param, scope))
            .collect()
    }

    fn callee(&self, template: &Arc<TemplateSpec>, call: &Call, scope: &Scope) -> TemplateResult<Callee> {
        if let Some(accessor) = &call.helper
            && let Value::Function(helper) = self.resolve_registry(template, accessor, scope)?
        {
            return Ok(Callee::Helper(helper));
        }
        match &call.value {
            Some(lookup) => match self.lookup(template, lookup, scope)? {
                Value::Function(lambda) => Ok(Callee::Lambda(lambda)),
                value => Ok(Callee::Value(value)),
            },
            None => Ok(Callee::Value(Value::Undefined)),
        }
    }

    fn resolve_registry(
        &self,
        template: &Arc<TemplateSpec>,
        accessor: &Accessor,
        scope: &Scope,
    ) -> Result<Value, RuntimeError> {
        let lookup = Lookup {
            accessor: accessor.clone(),
            require_terminal: false,
            original: String::new(),
            loc: None,
        };
        self.lookup(template, &lookup, scope)
    }

    fn call(&self, template: &Arc<TemplateSpec>, call: &Call, scope: &Scope) -> TemplateResult<Value> {
        match self.callee(template, call, scope)? {
            Callee::Helper(helper) | Callee::Lambda(helper) => {
                let params = self.eval_params(template, &call.params, scope)?;
                let options = self.options(template, call, scope, None, None)?;
                helper.call(&params, &options)
            }
            Callee::Value(value) if call.params.is_empty() && call.hash.is_empty() => Ok(value),
            Callee::Value(_) => Err(missing_helper(call)),
        }
    }

    fn options<'a>(
        &'a self,
        template: &'a Arc<TemplateSpec>,
        call: &Call,
        scope: &Scope,
        program: Option<ProgramId>,
        inverse: Option<ProgramId>,
    ) -> TemplateResult<HelperOptions<'a>> {
        let mut hash = IndexMap::with_capacity(call.hash.len());
        for (key, operand) in &call.hash {
            hash.insert(key.clone(), self.eval(template, operand, scope)?);
        }
        Ok(HelperOptions {
            name: call.name.clone(),
            hash,
            ids: call.ids.as_ref().map(|ids| ids.params.clone()),
            hash_ids: call.ids.as_ref().map(|ids| ids.hash.clone()),
            loc: call.loc.clone(),
            executor: self,
            template,
            scope: scope.clone(),
            program,
            inverse,
        })
    }

    fn lookup(&self, template: &TemplateSpec, lookup: &Lookup, scope: &Scope) -> Result<Value, RuntimeError> {
        self.resolve(template, &lookup.accessor, scope, lookup, true)
    }

    fn resolve(
        &self,
        template: &TemplateSpec,
        accessor: &Accessor,
        scope: &Scope,
        lookup: &Lookup,
        terminal: bool,
    ) -> Result<Value, RuntimeError> {
        match accessor {
            Accessor::Context { depth } => Ok(scope
                .contexts
                .get(*depth as usize)
                .cloned()
                .unwrap_or_default()),
            Accessor::BlockParam { depth, index } => Ok(scope.block_param(*depth, *index)),
            Accessor::Depthed { name } => Ok(scope
                .contexts
                .iter()
                .map(|context| context.get_property(name))
                .find(|value| !value.is_nullish())
                .unwrap_or_default()),
            Accessor::Data { .. } | Accessor::Helpers | Accessor::Partials => Ok(Value::Undefined),
            Accessor::Member { base, name, .. } => match base.as_ref() {
                Accessor::Helpers => Ok(self
                    .env
                    .helper(name)
                    .cloned()
                    .map(Value::Function)
                    .unwrap_or_default()),
                Accessor::Partials => Ok(Value::Undefined),
                Accessor::Data { depth } => {
                    let value = scope
                        .data
                        .ancestor(*depth)
                        .and_then(|frame| frame.get(name))
                        .cloned();
                    match value {
                        Some(value) => Ok(value),
                        None if terminal && lookup.require_terminal => {
                            Err(missing_property(name, lookup))
                        }
                        None => Ok(Value::Undefined),
                    }
                }
                base => {
                    let parent = self.resolve(template, base, scope, lookup, false)?;
                    member(template, &parent, name, terminal, lookup)
                }
            },
        }
    }

    // ===== Blocks =====

    fn block(&self, template: &Arc<TemplateSpec>, block: &BlockCall, scope: &Scope) -> TemplateResult<String> {
        match &block.kind {
            BlockKind::Helper(call) => match self.callee(template, call, scope)? {
                Callee::Helper(helper) | Callee::Lambda(helper) => {
                    let params = self.eval_params(template, &call.params, scope)?;
                    let options = self.options(template, call, scope, block.program, block.inverse)?;
                    Ok(helper.call(&params, &options)?.to_string())
                }
                Callee::Value(_) => Err(missing_helper(call)),
            },
            BlockKind::Ambiguous(call) => match self.callee(template, call, scope)? {
                Callee::Helper(helper) => {
                    let options = self.options(template, call, scope, block.program, block.inverse)?;
                    Ok(helper.call(&[], &options)?.to_string())
                }
                Callee::Lambda(lambda) => {
                    let options = self.options(template, call, scope, block.program, block.inverse)?;
                    let value = lambda.call(&[], &options)?;
                    self.section(template, block, scope, value)
                }
                Callee::Value(value) => self.section(template, block, scope, value),
            },
            BlockKind::Section(operand) => {
                let value = self.eval(template, operand, scope)?;
                self.section(template, block, scope, value)
            }
        }
    }

    /// A block over a plain value.
    fn section(
        &self,
        template: &Arc<TemplateSpec>,
        block: &BlockCall,
        scope: &Scope,
        value: Value,
    ) -> TemplateResult<String> {
        let this = scope.context().clone();
        match value {
            Value::Bool(true) => {
                self.invoke_program(template, block.program, scope, this, BlockArgs::default())
            }
            Value::Bool(false) | Value::Undefined | Value::Null => {
                self.invoke_program(template, block.inverse, scope, this, BlockArgs::default())
            }
            Value::Array(items) if items.is_empty() => {
                self.invoke_program(template, block.inverse, scope, this, BlockArgs::default())
            }
            Value::Array(items) => {
                let last = items.len() - 1;
                let mut out = String::new();
                for (index, item) in items.iter().enumerate() {
                    let args = BlockArgs::new()
                        .with_data("key", index)
                        .with_data("index", index)
                        .with_data("first", index == 0)
                        .with_data("last", index == last)
                        .with_block_params(vec![item.clone(), Value::from(index)]);
                    out.push_str(&self.invoke_program(
                        template,
                        block.program,
                        scope,
                        item.clone(),
                        args,
                    )?);
                }
                Ok(out)
            }
            other => self.invoke_program(template, block.program, scope, other, BlockArgs::default()),
        }
    }

    // ===== Partials =====

    fn partial(
        &self,
        template: &Arc<TemplateSpec>,
        call: &PartialCall,
        scope: &Scope,
    ) -> TemplateResult<String> {
        let name = self.partial_name(template, call, scope)?;
        let mut context = self.eval(template, &call.context, scope)?;
        if !call.hash.is_empty() {
            let mut merged = context.as_object().cloned().unwrap_or_default();
            for (key, operand) in &call.hash {
                merged.insert(key.clone(), self.eval(template, operand, scope)?);
            }
            context = Value::from(merged);
        }
        tracing::trace!(partial = %name, "invoking partial");

        // `@partial-block` names the block active at this call site, so it
        // is resolved before this call installs its own.
        let output = if name == PARTIAL_BLOCK {
            let Some(block) = scope.data.partial_block().cloned() else {
                return Err(RuntimeError::MissingPartial { name }.into());
            };
            self.render_partial_block(&block, scope, context)?
        } else {
            match self.resolve_partial(template, &name)? {
                Some(spec) => {
                    let data = match call.program {
                        Some(program) => scope.data.with_partial_block(Some(Rc::new(PartialBlock {
                            template: template.clone(),
                            program,
                            scope: scope.clone(),
                        }))),
                        None => scope.data.clone(),
                    };
                    let _guard = self.enter()?;
                    let inner = scope.for_partial(context, data);
                    let mut out = Capture::new(spec.buffer);
                    self.run(&spec, spec.main, &inner, &mut out)?;
                    out.finish()
                }
                None if call.program.is_some() => self.invoke_program(
                    template,
                    call.program,
                    scope,
                    context,
                    BlockArgs::default(),
                )?,
                None => return Err(RuntimeError::MissingPartial { name }.into()),
            }
        };

        Ok(indent_lines(output, &call.indent))
    }

    fn partial_name(
        &self,
        template: &Arc<TemplateSpec>,
        call: &PartialCall,
        scope: &Scope,
    ) -> TemplateResult<String> {
        match &call.name {
            PartialName::Static { name, accessor } => match accessor {
                Accessor::Member { base, name, .. } if **base == Accessor::Partials => {
                    Ok(name.clone())
                }
                Accessor::Partials => Ok(name.clone()),
                other => {
                    let value = self.resolve_registry(template, other, scope)?;
                    Ok(value.as_str().map_or_else(|| name.clone(), str::to_string))
                }
            },
            PartialName::Dynamic(operand) => Ok(self.eval(template, operand, scope)?.to_string()),
        }
    }

    /// Find a registered partial, compiling source partials with the
    /// calling template's options.
    fn resolve_partial(
        &self,
        template: &TemplateSpec,
        name: &str,
    ) -> TemplateResult<Option<Arc<TemplateSpec>>> {
        match self.env.partial(name) {
            None => Ok(None),
            Some(Partial::Compiled(artifact)) => {
                artifact.check()?;
                Ok(Some(artifact.shared_spec().clone()))
            }
            Some(Partial::Source(source)) => {
                let options = &template.options;
                let cached = self.partials.borrow().get(name).and_then(|variants| {
                    variants
                        .iter()
                        .find(|spec| spec.options == *options)
                        .cloned()
                });
                if let Some(spec) = cached {
                    return Ok(Some(spec));
                }
                let program = whisker_parser::parse(source, &options.parse_options(Some(name)))?;
                let spec = crate::compiler::precompile(&program, options, Backend::default())?;
                tracing::debug!(partial = name, "compiled partial from source");
                let spec = Arc::new(spec);
                self.partials
                    .borrow_mut()
                    .entry(name.to_string())
                    .or_default()
                    .push(spec.clone());
                Ok(Some(spec))
            }
        }
    }

    /// Render the body of a partial block from inside the partial. The body
    /// sees the scope of its call site; nested `@partial-block` references
    /// reach the block that was active there.
    fn render_partial_block(
        &self,
        block: &PartialBlock,
        scope: &Scope,
        context: Value,
    ) -> TemplateResult<String> {
        let _guard = self.enter()?;
        let data = scope
            .data
            .with_partial_block(block.scope.data.partial_block().cloned());
        let inner = block.scope.enter(context, Vec::new(), data);
        let mut out = Capture::new(block.template.buffer);
        self.run(&block.template, block.program, &inner, &mut out)?;
        Ok(out.finish())
    }
}

/// One member step, honoring strict and assume-objects traversal.
fn member(
    template: &TemplateSpec,
    parent: &Value,
    name: &str,
    terminal: bool,
    lookup: &Lookup,
) -> Result<Value, RuntimeError> {
    let options = &template.options;
    if parent.is_nullish() {
        if options.strict || options.assume_objects {
            return Err(missing_property(name, lookup));
        }
        return Ok(Value::Undefined);
    }
    if terminal && lookup.require_terminal && !parent.has_property(name) {
        return Err(missing_property(name, lookup));
    }
    Ok(parent.get_property(name))
}

fn missing_property(name: &str, lookup: &Lookup) -> RuntimeError {
    RuntimeError::MissingProperty {
        name: name.to_string(),
        path: lookup.original.clone(),
        loc: lookup.loc.clone(),
    }
}

fn missing_helper(call: &Call) -> TemplateError {
    RuntimeError::MissingHelper {
        name: call.name.clone(),
        loc: call.loc.clone(),
    }
    .into()
}

fn literal_value(literal: &Literal) -> Value {
    match literal {
        Literal::String(s) => Value::String(s.clone()),
        Literal::Number(n) => Value::Float(*n),
        Literal::Boolean(b) => Value::Bool(*b),
        Literal::Undefined => Value::Undefined,
        Literal::Null => Value::Null,
    }
}

/// Prefix every line with `indent`, leaving a trailing empty line bare.
fn indent_lines(text: String, indent: &str) -> String {
    if indent.is_empty() {
        return text;
    }
    let lines: Vec<&str> = text.split('\n').collect();
    let mut out = String::with_capacity(text.len() + indent.len() * lines.len());
    for (i, line) in lines.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        if line.is_empty() && i + 1 == lines.len() {
            break;
        }
        out.push_str(indent);
        out.push_str(line);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indent_lines() {
        assert_eq!(indent_lines("a\nb\n".into(), "  "), "  a\n  b\n");
        assert_eq!(indent_lines("a\n\nb".into(), "> "), "> a\n> \n> b");
        assert_eq!(indent_lines(String::new(), "  "), "");
        assert_eq!(indent_lines("x".into(), ""), "x");
    }

    #[test]
    fn test_literal_values() {
        assert_eq!(literal_value(&Literal::Number(2.0)).to_string(), "2");
        assert!(literal_value(&Literal::Undefined).is_undefined());
    }
}
