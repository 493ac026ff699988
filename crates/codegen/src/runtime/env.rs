//! Helpers, partials and global data available while rendering

use super::builtins;
use super::options::HelperOptions;
use super::value::{Object, Value};
use crate::artifact::Artifact;
use crate::error::TemplateError;
use indexmap::IndexMap;
use std::fmt;
use std::sync::Arc;

pub type HelperResult = Result<Value, TemplateError>;

type HelperFn = dyn Fn(&[Value], &HelperOptions<'_>) -> HelperResult + Send + Sync;

/// A callable helper. Also the representation of function values inside
/// a context.
#[derive(Clone)]
pub struct Helper(Arc<HelperFn>);

impl Helper {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&[Value], &HelperOptions<'_>) -> HelperResult + Send + Sync + 'static,
    {
        Helper(Arc::new(f))
    }

    pub fn call(&self, params: &[Value], options: &HelperOptions<'_>) -> HelperResult {
        (self.0)(params, options)
    }

    pub fn ptr_eq(&self, other: &Helper) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Helper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Helper(..)")
    }
}

/// A registered partial: compiled ahead of time, or source compiled on
/// first use with the calling template's options.
#[derive(Debug, Clone)]
pub enum Partial {
    Compiled(Artifact),
    Source(String),
}

impl From<Artifact> for Partial {
    fn from(artifact: Artifact) -> Self {
        Partial::Compiled(artifact)
    }
}

impl From<&str> for Partial {
    fn from(source: &str) -> Self {
        Partial::Source(source.to_string())
    }
}

impl From<String> for Partial {
    fn from(source: String) -> Self {
        Partial::Source(source)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuntimeLimits {
    /// Nested program and partial invocations allowed before rendering fails.
    pub max_depth: usize,
}

impl Default for RuntimeLimits {
    fn default() -> Self {
        RuntimeLimits { max_depth: 64 }
    }
}

/// Everything a render resolves by name.
#[derive(Debug, Clone, Default)]
pub struct Environment {
    helpers: IndexMap<String, Helper>,
    partials: IndexMap<String, Partial>,
    data: Object,
    pub limits: RuntimeLimits,
}

impl Environment {
    /// An environment with no helpers at all.
    pub fn new() -> Self {
        Self::default()
    }

    /// An environment with `if`, `unless`, `with`, `each`, `lookup` and `log`.
    pub fn with_builtins() -> Self {
        let mut env = Self::new();
        builtins::register(&mut env);
        env
    }

    pub fn register_helper<F>(&mut self, name: impl Into<String>, f: F) -> &mut Self
    where
        F: Fn(&[Value], &HelperOptions<'_>) -> HelperResult + Send + Sync + 'static,
    {
        self.helpers.insert(name.into(), Helper::new(f));
        self
    }

    pub fn unregister_helper(&mut self, name: &str) -> Option<Helper> {
        self.helpers.shift_remove(name)
    }

    pub fn register_partial(&mut self, name: impl Into<String>, partial: impl Into<Partial>) -> &mut Self {
        self.partials.insert(name.into(), partial.into());
        self
    }

    pub fn unregister_partial(&mut self, name: &str) -> Option<Partial> {
        self.partials.shift_remove(name)
    }

    /// Set a root `@data` variable.
    pub fn set_data(&mut self, name: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.data.insert(name.into(), value.into());
        self
    }

    pub fn with_limits(mut self, limits: RuntimeLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn helper(&self, name: &str) -> Option<&Helper> {
        self.helpers.get(name)
    }

    pub fn partial(&self, name: &str) -> Option<&Partial> {
        self.partials.get(name)
    }

    pub fn data(&self) -> &Object {
        &self.data
    }
}
