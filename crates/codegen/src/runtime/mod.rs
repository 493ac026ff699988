//! Template runtime
//!
//! Executes a compiled [`TemplateSpec`](crate::bytecode::TemplateSpec)
//! against a context [`Value`] and an [`Environment`] of helpers and
//! partials.

pub mod buffer;
mod builtins;
pub mod env;
pub mod escape;
pub(crate) mod executor;
pub mod options;
pub(crate) mod scope;
pub mod value;

pub use buffer::{FragmentBuffer, OutputBuffer, StringBuffer, WriterBuffer};
pub use env::{Environment, Helper, HelperResult, Partial, RuntimeLimits};
pub use escape::escape_html;
pub use options::{BlockArgs, HelperOptions};
pub use value::{Object, Value};
