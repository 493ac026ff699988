//! Compiled, renderable templates

use crate::bytecode::{COMPILER_REVISION, CompilerInfo, TemplateSpec};
use crate::error::{RuntimeError, TemplateResult};
use crate::options::CompileOptions;
use crate::runtime::buffer::{Capture, OutputBuffer};
use crate::runtime::executor::Executor;
use crate::runtime::{Environment, Value};
use std::sync::Arc;

/// A compiled template. Cheap to clone and safe to share between threads;
/// every render gets its own scope.
#[derive(Debug, Clone)]
pub struct Artifact {
    spec: Arc<TemplateSpec>,
}

impl Artifact {
    pub(crate) fn new(spec: TemplateSpec) -> Self {
        Artifact {
            spec: Arc::new(spec),
        }
    }

    /// Wrap a precompiled spec, rejecting one built for another compiler
    /// revision or relying on unknown features.
    pub fn from_spec(spec: TemplateSpec) -> Result<Self, RuntimeError> {
        let artifact = Artifact::new(spec);
        artifact.check()?;
        Ok(artifact)
    }

    pub fn from_json(json: &str) -> TemplateResult<Self> {
        let spec = TemplateSpec::from_json(json).map_err(RuntimeError::from)?;
        Ok(Artifact::from_spec(spec)?)
    }

    pub(crate) fn check(&self) -> Result<(), RuntimeError> {
        let info = &self.spec.compiler;
        if info.revision != COMPILER_REVISION {
            return Err(RuntimeError::VersionMismatch {
                expected: COMPILER_REVISION,
                found: info.revision,
            });
        }
        let unsupported = info.features.unsupported();
        if unsupported.bits() != 0 {
            return Err(RuntimeError::UnsupportedFeatures {
                bits: unsupported.bits(),
            });
        }
        Ok(())
    }

    pub fn spec(&self) -> &TemplateSpec {
        &self.spec
    }

    pub(crate) fn shared_spec(&self) -> &Arc<TemplateSpec> {
        &self.spec
    }

    pub fn compiler_info(&self) -> &CompilerInfo {
        &self.spec.compiler
    }

    pub fn options(&self) -> &CompileOptions {
        &self.spec.options
    }

    pub fn render(&self, context: &Value, env: &Environment) -> TemplateResult<String> {
        self.invoke(context, env, None)
    }

    /// Render with values for the main program's block parameters.
    pub fn invoke(
        &self,
        context: &Value,
        env: &Environment,
        block_params: Option<&[Value]>,
    ) -> TemplateResult<String> {
        let mut out = Capture::new(self.spec.buffer);
        self.render_params(context, env, block_params.unwrap_or_default(), &mut out)?;
        Ok(out.finish())
    }

    /// Stream output into `out` as it is produced.
    pub fn render_to(
        &self,
        context: &Value,
        env: &Environment,
        out: &mut dyn OutputBuffer,
    ) -> TemplateResult<()> {
        self.render_params(context, env, &[], out)
    }

    fn render_params(
        &self,
        context: &Value,
        env: &Environment,
        block_params: &[Value],
        out: &mut dyn OutputBuffer,
    ) -> TemplateResult<()> {
        self.check()?;
        tracing::debug!(
            programs = self.spec.programs.len(),
            "rendering template"
        );
        Executor::new(env).render(&self.spec, context, block_params, out)
    }
}
