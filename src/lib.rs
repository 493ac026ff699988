//! # Whisker
//!
//! Mustache-style templates with handlebars extensions: helpers, block
//! parameters, partials and `@data` variables.
//!
//! This crate ties the two halves together. [`whisker_parser`] turns source
//! into a syntax tree; [`whisker_codegen`] compiles the tree and renders it.
//! Most callers only need the functions below.
//!
//! ```
//! use whisker::{CompileOptions, Environment, Value};
//!
//! let template = whisker::compile("{{#each items}}<{{.}}>{{/each}}", &CompileOptions::default())?;
//! let context = Value::from(serde_json::json!({"items": ["a", "b"]}));
//! let out = template.render(&context, &Environment::with_builtins())?;
//! assert_eq!(out, "<a><b>");
//! # Ok::<(), whisker::Error>(())
//! ```

pub use whisker_codegen as codegen;
pub use whisker_parser as parser;

pub use whisker_codegen::{
    Arity, Artifact, Backend, BlockArgs, CompileError, CompileOptions, CompilerInfo, Environment,
    Features, Helper, HelperOptions, HelperResult, KnownHelpers, Object, OutputBuffer, Partial,
    RuntimeError, RuntimeLimits, TemplateSpec, Value,
};
pub use whisker_parser::{ParseError, ParseOptions, Printer, Program, Transform, Visitor};

/// Every error between template source and rendered output.
pub type Error = whisker_codegen::TemplateError;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Parse `source` with the parse-level settings in `options`.
pub fn parse(source: &str, options: &CompileOptions) -> Result<Program> {
    Ok(whisker_parser::parse(source, &options.parse_options(None))?)
}

/// Parse and compile a template.
pub fn compile(source: &str, options: &CompileOptions) -> Result<Artifact> {
    compile_with_backend(source, options, Backend::default())
}

pub fn compile_with_backend(
    source: &str,
    options: &CompileOptions,
    backend: Backend,
) -> Result<Artifact> {
    let program = parse(source, options)?;
    Ok(whisker_codegen::compile_with_backend(&program, options, backend)?)
}

/// Parse and compile a template to its serializable form.
pub fn precompile(source: &str, options: &CompileOptions) -> Result<TemplateSpec> {
    let program = parse(source, options)?;
    Ok(whisker_codegen::precompile(
        &program,
        options,
        Backend::default(),
    )?)
}

/// Compile and render a template once with default options.
pub fn render(source: &str, context: &Value, env: &Environment) -> Result<String> {
    let template = compile(source, &CompileOptions::default())?;
    tracing::debug!(bytes = source.len(), "rendering one-off template");
    template.render(context, env)
}
