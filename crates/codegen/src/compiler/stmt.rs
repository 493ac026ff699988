//! Statement compilation to instructions

use super::compile_program;
use crate::bytecode::{
    Accessor, BlockCall, BlockKind, Features, Instruction, Literal, Lookup, LookupKind, Operand,
    PartialCall, PartialName, ProgramId,
};
use crate::compiler::context::CompilationContext;
use crate::compiler::expr::{CallForm, Classification, ExprCompiler};
use crate::compiler::validate;
use crate::error::CompileResult;
use whisker_parser::{
    BlockStatement, Expression, Hash, MustacheStatement, PartialBlockStatement, PartialStatement,
    SourceLocation, Statement,
};

pub struct StmtCompiler;

impl StmtCompiler {
    pub fn compile(
        ctx: &mut CompilationContext,
        stmt: &Statement,
        out: &mut Vec<Instruction>,
    ) -> CompileResult<()> {
        match stmt {
            Statement::Content(content) => {
                if !content.value.is_empty() {
                    Self::emit(ctx, out, Instruction::AppendContent(content.value.clone()), false);
                }
                Ok(())
            }
            Statement::Comment(_) => Ok(()),
            Statement::Mustache(mustache) => Self::compile_mustache(ctx, mustache, out),
            Statement::Block(block) => Self::compile_block(ctx, block, out),
            Statement::Partial(partial) => Self::compile_partial(ctx, partial, out),
            Statement::PartialBlock(partial) => Self::compile_partial_block(ctx, partial, out),
        }
    }

    fn emit(
        ctx: &CompilationContext,
        out: &mut Vec<Instruction>,
        instruction: Instruction,
        explicit: bool,
    ) {
        (ctx.backend.append_to_buffer)(out, instruction, explicit);
    }

    fn compile_mustache(
        ctx: &mut CompilationContext,
        mustache: &MustacheStatement,
        out: &mut Vec<Instruction>,
    ) -> CompileResult<()> {
        let value = ExprCompiler::compile_statement_value(ctx, &mustache.expr)?;
        let escape = mustache.escaped && !ctx.options.no_escape;
        Self::emit(ctx, out, Instruction::Append { value, escape }, true);
        Ok(())
    }

    fn compile_block(
        ctx: &mut CompilationContext,
        block: &BlockStatement,
        out: &mut Vec<Instruction>,
    ) -> CompileResult<()> {
        validate::check_block(block)?;

        let form = CallForm::from_expression(&block.expr);
        let strict = ctx.options.strict;
        let kind = match ExprCompiler::classify(ctx, &form) {
            Classification::Helper => BlockKind::Helper(ExprCompiler::compile_helper_call(ctx, &form)?),
            Classification::Ambiguous => {
                BlockKind::Ambiguous(ExprCompiler::compile_ambiguous_call(ctx, &form)?)
            }
            Classification::Simple => BlockKind::Section(Operand::Lambda(
                ExprCompiler::compile_path(ctx, &form.path, strict)?,
            )),
        };

        let program = block
            .program
            .as_ref()
            .map(|program| compile_program(ctx, program))
            .transpose()?;
        let inverse = block
            .inverse
            .as_ref()
            .map(|inverse| compile_program(ctx, inverse))
            .transpose()?;

        let call = BlockCall {
            kind,
            name: form.path.original.clone(),
            program,
            inverse,
            loc: block.loc.clone(),
        };
        Self::emit(ctx, out, Instruction::Block(Box::new(call)), true);
        Ok(())
    }

    fn compile_partial(
        ctx: &mut CompilationContext,
        partial: &PartialStatement,
        out: &mut Vec<Instruction>,
    ) -> CompileResult<()> {
        let parts = PartialParts {
            name: &partial.name,
            params: &partial.params,
            hash: partial.hash.as_ref(),
            loc: partial.loc.as_ref(),
        };
        Self::compile_partial_call(ctx, parts, &partial.indent, None, out)
    }

    fn compile_partial_block(
        ctx: &mut CompilationContext,
        partial: &PartialBlockStatement,
        out: &mut Vec<Instruction>,
    ) -> CompileResult<()> {
        let program = compile_program(ctx, &partial.program)?;
        let parts = PartialParts {
            name: &partial.name,
            params: &partial.params,
            hash: partial.hash.as_ref(),
            loc: partial.loc.as_ref(),
        };
        Self::compile_partial_call(ctx, parts, "", Some(program), out)
    }

    fn compile_partial_call(
        ctx: &mut CompilationContext,
        parts: PartialParts,
        indent: &str,
        program: Option<ProgramId>,
        out: &mut Vec<Instruction>,
    ) -> CompileResult<()> {
        validate::check_partial_params(parts.params.len(), parts.loc)?;
        ctx.features.insert(Features::PARTIALS);

        let name = match parts.name {
            Expression::SubExpression(_) => {
                PartialName::Dynamic(ExprCompiler::compile_param(ctx, parts.name)?)
            }
            Expression::Path(path) => Self::static_partial(ctx, &path.original),
            Expression::String(s) => Self::static_partial(ctx, &s.value),
            literal => Self::static_partial(ctx, &literal.original()),
        };

        let context = match parts.params.first() {
            Some(param) => ExprCompiler::compile_param(ctx, param)?,
            None if ctx.options.explicit_partial_context => Operand::Literal(Literal::Undefined),
            None => Operand::Lookup(Lookup {
                accessor: Accessor::Context { depth: 0 },
                require_terminal: false,
                original: "this".to_string(),
                loc: None,
            }),
        };
        let hash = ExprCompiler::compile_hash(ctx, parts.hash)?;

        let mut indent = indent.to_string();
        if ctx.options.prevent_indent && !indent.is_empty() {
            Self::emit(ctx, out, Instruction::AppendContent(std::mem::take(&mut indent)), false);
        }

        let call = PartialCall {
            name,
            context,
            hash,
            indent,
            program,
            loc: parts.loc.cloned(),
        };
        Self::emit(ctx, out, Instruction::Partial(Box::new(call)), true);
        Ok(())
    }

    fn static_partial(ctx: &CompilationContext, name: &str) -> PartialName {
        PartialName::Static {
            name: name.to_string(),
            accessor: (ctx.backend.name_lookup)(Accessor::Partials, name, LookupKind::Partial),
        }
    }
}

struct PartialParts<'p> {
    name: &'p Expression,
    params: &'p [Expression],
    hash: Option<&'p Hash>,
    loc: Option<&'p SourceLocation>,
}
