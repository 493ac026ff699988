//! Compiler orchestration
//!
//! Walks a parsed [`Program`] and emits one [`ProgramChunk`] per program,
//! the main body first.

pub mod context;
pub mod expr;
pub mod stmt;
pub mod validate;

use crate::artifact::Artifact;
use crate::backend::Backend;
use crate::bytecode::{Features, ProgramChunk, ProgramId, TemplateSpec};
use crate::error::CompileResult;
use crate::options::CompileOptions;
use context::CompilationContext;
use stmt::StmtCompiler;
use whisker_parser::Program;

/// Compile a tree with the default backend.
pub fn compile(program: &Program, options: &CompileOptions) -> CompileResult<Artifact> {
    compile_with_backend(program, options, Backend::default())
}

pub fn compile_with_backend(
    program: &Program,
    options: &CompileOptions,
    backend: Backend,
) -> CompileResult<Artifact> {
    precompile(program, options, backend).map(Artifact::new)
}

/// Compile a tree to its serializable spec without wrapping it for rendering.
pub fn precompile(
    program: &Program,
    options: &CompileOptions,
    backend: Backend,
) -> CompileResult<TemplateSpec> {
    let mut ctx = CompilationContext::new(options, backend);
    let main = compile_program(&mut ctx, program)?;

    let mut compiler = (backend.compiler_info)();
    compiler.features.insert(ctx.features);
    tracing::debug!(
        programs = ctx.programs.len(),
        features = ctx.features.bits(),
        "compiled template"
    );

    Ok(TemplateSpec {
        compiler,
        main,
        programs: ctx.programs,
        options: options.clone(),
        buffer: (backend.initialize_buffer)(),
    })
}

/// Compile one program into its reserved chunk. Block parameter names are
/// in scope for the program's own statements only.
pub(crate) fn compile_program(
    ctx: &mut CompilationContext,
    program: &Program,
) -> CompileResult<ProgramId> {
    let id = ctx.reserve_program();
    if !program.block_params.is_empty() {
        ctx.features.insert(Features::BLOCK_PARAMS);
    }

    ctx.block_params.push(program.block_params.clone());
    let mut instructions = Vec::new();
    let result = program
        .body
        .iter()
        .try_for_each(|stmt| StmtCompiler::compile(ctx, stmt, &mut instructions));
    ctx.block_params.pop();
    result?;

    tracing::trace!(program = id, instructions = instructions.len(), "compiled program");
    ctx.programs[id] = ProgramChunk {
        instructions,
        block_params: program.block_params.len(),
    };
    Ok(id)
}
