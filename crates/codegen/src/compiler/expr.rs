//! Expression compilation to operands

use crate::bytecode::{Accessor, Call, CallIds, Features, Literal, Lookup, LookupKind, Operand};
use crate::compiler::context::CompilationContext;
use crate::error::{CompileError, CompileResult};
use crate::options::Arity;
use indexmap::IndexMap;
use std::borrow::Cow;
use whisker_parser::{Expression, Hash, PathExpression, SourceLocation};

/// How a call form is resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// Always a helper call.
    Helper,
    /// Helper if registered at runtime, context value otherwise.
    Ambiguous,
    /// Plain value lookup; arguments are ignored.
    Simple,
}

/// The head, params and hash of a mustache, block or sub-expression.
pub struct CallForm<'p> {
    pub path: Cow<'p, PathExpression>,
    pub params: &'p [Expression],
    pub hash: Option<&'p Hash>,
    pub is_helper: bool,
    pub loc: Option<&'p SourceLocation>,
}

impl<'p> CallForm<'p> {
    /// Split an expression into a call form. A literal head is read as a
    /// single-segment path.
    pub fn from_expression(expr: &'p Expression) -> Self {
        match expr {
            Expression::SubExpression(sexpr) => CallForm {
                path: Cow::Borrowed(&sexpr.path),
                params: &sexpr.params,
                hash: sexpr.hash.as_ref(),
                is_helper: sexpr.is_helper == Some(true),
                loc: sexpr.loc.as_ref(),
            },
            Expression::Path(path) => CallForm {
                path: Cow::Borrowed(path),
                params: &[],
                hash: None,
                is_helper: false,
                loc: path.loc.as_ref(),
            },
            literal => {
                let path = match literal.clone().literal_to_path() {
                    Expression::Path(path) => path,
                    _ => PathExpression::new(vec![literal.original()]),
                };
                CallForm {
                    path: Cow::Owned(path),
                    params: &[],
                    hash: None,
                    is_helper: false,
                    loc: literal.loc(),
                }
            }
        }
    }

    fn has_arguments(&self) -> bool {
        !self.params.is_empty() || self.hash.is_some_and(|hash| !hash.pairs.is_empty())
    }
}

pub struct ExprCompiler;

impl ExprCompiler {
    pub fn classify(ctx: &CompilationContext, form: &CallForm) -> Classification {
        let simple = form.path.is_simple_id();
        let block_param = simple
            && form
                .path
                .head()
                .is_some_and(|name| ctx.block_param_index(name).is_some());

        let mut helper = !block_param && (form.is_helper || form.has_arguments());
        let mut eligible = !block_param && (helper || simple);

        if eligible && !helper {
            let name = form.path.head().unwrap_or_default();
            if ctx.options.known_helpers.contains(name) {
                helper = true;
            } else if ctx.options.known_helpers_only {
                eligible = false;
            }
        }

        if helper {
            Classification::Helper
        } else if eligible {
            Classification::Ambiguous
        } else {
            Classification::Simple
        }
    }

    /// Operand for the value of a mustache statement.
    pub fn compile_statement_value(
        ctx: &mut CompilationContext,
        expr: &Expression,
    ) -> CompileResult<Operand> {
        let form = CallForm::from_expression(expr);
        let strict = ctx.options.strict;
        match Self::classify(ctx, &form) {
            Classification::Helper => Ok(Operand::Call(Box::new(Self::compile_helper_call(
                ctx, &form,
            )?))),
            Classification::Ambiguous => Ok(Operand::Ambiguous(Box::new(
                Self::compile_ambiguous_call(ctx, &form)?,
            ))),
            Classification::Simple => Ok(Operand::Lambda(Self::compile_path(
                ctx,
                &form.path,
                strict,
            )?)),
        }
    }

    /// Operand for a param, hash value or partial argument.
    pub fn compile_param(ctx: &mut CompilationContext, expr: &Expression) -> CompileResult<Operand> {
        match expr {
            Expression::String(s) => Ok(Operand::Literal(Literal::String(s.value.clone()))),
            Expression::Number(n) => Ok(Operand::Literal(Literal::Number(n.value))),
            Expression::Boolean(b) => Ok(Operand::Literal(Literal::Boolean(b.value))),
            Expression::Undefined(_) => Ok(Operand::Literal(Literal::Undefined)),
            Expression::Null(_) => Ok(Operand::Literal(Literal::Null)),
            Expression::Path(path) => Ok(Operand::Lookup(Self::compile_path(ctx, path, false)?)),
            Expression::SubExpression(_) => {
                let form = CallForm::from_expression(expr);
                match Self::classify(ctx, &form) {
                    Classification::Helper => Ok(Operand::Call(Box::new(
                        Self::compile_helper_call(ctx, &form)?,
                    ))),
                    Classification::Ambiguous => Ok(Operand::Ambiguous(Box::new(
                        Self::compile_ambiguous_call(ctx, &form)?,
                    ))),
                    Classification::Simple => {
                        Ok(Operand::Lookup(Self::compile_path(ctx, &form.path, false)?))
                    }
                }
            }
        }
    }

    pub fn compile_hash(
        ctx: &mut CompilationContext,
        hash: Option<&Hash>,
    ) -> CompileResult<IndexMap<String, Operand>> {
        let mut operands = IndexMap::new();
        if let Some(hash) = hash {
            for pair in &hash.pairs {
                operands.insert(pair.key.clone(), Self::compile_param(ctx, &pair.value)?);
            }
        }
        Ok(operands)
    }

    /// A definite helper call. Known helpers are called directly; other
    /// names fall back to a callable context value.
    pub fn compile_helper_call(ctx: &mut CompilationContext, form: &CallForm) -> CompileResult<Call> {
        let simple = form.path.is_simple_id();
        let head = form.path.head().unwrap_or_default().to_string();
        let known = if simple {
            ctx.options.known_helpers.get(&head)
        } else {
            None
        };

        match known {
            Some(Arity::Exactly(expected)) if expected != form.params.len() => {
                return Err(CompileError::HelperArity {
                    name: head,
                    expected,
                    found: form.params.len(),
                    loc: form.loc.cloned(),
                });
            }
            None if ctx.options.known_helpers_only => {
                return Err(CompileError::UnknownHelper {
                    name: form.path.original.clone(),
                    loc: form.loc.cloned(),
                });
            }
            _ => {}
        }

        let helper =
            simple.then(|| (ctx.backend.name_lookup)(Accessor::Helpers, &head, LookupKind::Helper));
        let value = match known {
            Some(_) => None,
            None => Some(Self::compile_path(ctx, &form.path, false)?),
        };

        let mut params = Vec::with_capacity(form.params.len());
        for param in form.params {
            params.push(Self::compile_param(ctx, param)?);
        }
        let hash = Self::compile_hash(ctx, form.hash)?;
        let ids = ctx.options.track_ids.then(|| Self::call_ids(form));

        Ok(Call {
            name: form.path.original.clone(),
            helper,
            value,
            params,
            hash,
            ids,
            loc: form.loc.cloned(),
        })
    }

    /// A simple identifier without arguments: helper or value, decided at
    /// runtime.
    pub fn compile_ambiguous_call(
        ctx: &mut CompilationContext,
        form: &CallForm,
    ) -> CompileResult<Call> {
        let head = form.path.head().unwrap_or_default();
        let helper = (ctx.backend.name_lookup)(Accessor::Helpers, head, LookupKind::Helper);
        let strict = ctx.options.strict;
        let value = Self::compile_path(ctx, &form.path, strict)?;
        Ok(Call {
            name: form.path.original.clone(),
            helper: Some(helper),
            value: Some(value),
            params: Vec::new(),
            hash: IndexMap::new(),
            ids: None,
            loc: form.loc.cloned(),
        })
    }

    /// Resolve a path to an accessor chain: block parameter, data frame,
    /// compat stack search or context.
    pub fn compile_path(
        ctx: &mut CompilationContext,
        path: &PathExpression,
        require_terminal: bool,
    ) -> CompileResult<Lookup> {
        if ctx.options.strict && path.parts.iter().any(String::is_empty) {
            return Err(CompileError::EmptySegment {
                path: path.original.clone(),
                loc: path.loc.clone(),
            });
        }

        let name_lookup = ctx.backend.name_lookup;
        let scoped = path.is_scoped();
        let block_param = match path.head() {
            Some(head) if !path.data && !scoped && path.depth == 0 => ctx.block_param_index(head),
            _ => None,
        };

        if path.depth > 0 {
            ctx.features.insert(Features::DEPTHS);
        }

        let (mut accessor, rest, kind) = if let Some((depth, index)) = block_param {
            ctx.features.insert(Features::BLOCK_PARAMS);
            (Accessor::BlockParam { depth, index }, &path.parts[1..], LookupKind::Context)
        } else if path.data {
            ctx.features.insert(Features::DATA);
            (
                Accessor::Data { depth: path.depth },
                &path.parts[..],
                LookupKind::Data,
            )
        } else if ctx.options.compat && !scoped && path.depth == 0 && !path.parts.is_empty() {
            ctx.features.insert(Features::COMPAT);
            (
                (ctx.backend.depthed_lookup)(&path.parts[0]),
                &path.parts[1..],
                LookupKind::Context,
            )
        } else {
            (
                Accessor::Context { depth: path.depth },
                &path.parts[..],
                LookupKind::Context,
            )
        };

        for part in rest {
            accessor = name_lookup(accessor, part, kind);
        }

        Ok(Lookup {
            accessor,
            require_terminal: require_terminal && !path.parts.is_empty(),
            original: path.original.clone(),
            loc: path.loc.clone(),
        })
    }

    fn call_ids(form: &CallForm) -> CallIds {
        let params = form.params.iter().map(param_id).collect();
        let hash = form
            .hash
            .map(|hash| {
                hash.pairs
                    .iter()
                    .map(|pair| (pair.key.clone(), param_id(&pair.value)))
                    .collect()
            })
            .unwrap_or_default();
        CallIds { params, hash }
    }
}

/// Source path of a param, relative to the current context.
fn param_id(expr: &Expression) -> Option<String> {
    let Expression::Path(path) = expr else {
        return None;
    };
    let original = path.original.as_str();
    let relative = if original == "this" || original == "." {
        ""
    } else if let Some(rest) = original.strip_prefix("this.").or_else(|| original.strip_prefix("this/")) {
        rest
    } else {
        original.strip_prefix("./").unwrap_or(original)
    };
    Some(relative.to_string())
}
