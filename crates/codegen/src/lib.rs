//! # Whisker Code Generation
//!
//! This crate compiles parsed whisker templates into an instruction form
//! and renders them.
//!
//! ## Architecture
//!
//! The pipeline:
//! 1. **Input**: a [`Program`](whisker_parser::Program) from the parser, after whitespace control
//! 2. **Classification**: each mustache and block becomes a helper call, an
//!    ambiguous call or a plain value lookup
//! 3. **Compilation**: statements → [`Instruction`]s, one chunk per program,
//!    with lookups and buffers shaped by a [`Backend`]
//! 4. **Output**: a serializable [`TemplateSpec`] wrapped in an [`Artifact`]
//! 5. **Runtime**: the artifact renders against a context [`Value`] and an
//!    [`Environment`] of helpers and partials
//!
//! ## Usage
//!
//! ```
//! use whisker_codegen::{CompileOptions, Environment, Value, compile};
//! use whisker_parser::{ParseOptions, parse};
//!
//! let program = parse("Hello {{name}}!", &ParseOptions::default()).unwrap();
//! let artifact = compile(&program, &CompileOptions::default()).unwrap();
//! let context = Value::from(serde_json::json!({"name": "<world>"}));
//! let out = artifact.render(&context, &Environment::with_builtins()).unwrap();
//! assert_eq!(out, "Hello &lt;world&gt;!");
//! ```

pub mod artifact;
pub mod backend;
pub mod bytecode;
pub mod compiler;
pub mod error;
pub mod options;
pub mod runtime;

pub use artifact::Artifact;
pub use backend::Backend;
pub use bytecode::{CompilerInfo, Features, Instruction, TemplateSpec};
pub use compiler::{compile, compile_with_backend, precompile};
pub use error::{CompileError, CompileResult, RuntimeError, TemplateError, TemplateResult};
pub use options::{Arity, CompileOptions, KnownHelpers};
pub use runtime::{
    BlockArgs, Environment, Helper, HelperOptions, HelperResult, Object, OutputBuffer, Partial,
    RuntimeLimits, Value,
};
