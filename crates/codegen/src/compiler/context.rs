//! Compilation context holding state while programs are emitted

use crate::backend::Backend;
use crate::bytecode::{Features, ProgramChunk, ProgramId};
use crate::options::CompileOptions;

pub struct CompilationContext<'a> {
    pub options: &'a CompileOptions,
    pub backend: Backend,
    pub programs: Vec<ProgramChunk>,
    /// Block parameter names of every enclosing program, innermost last.
    pub block_params: Vec<Vec<String>>,
    pub features: Features,
}

impl<'a> CompilationContext<'a> {
    pub fn new(options: &'a CompileOptions, backend: Backend) -> Self {
        Self {
            options,
            backend,
            programs: Vec::new(),
            block_params: Vec::new(),
            features: Features::NONE,
        }
    }

    /// `(depth, index)` of the innermost block parameter called `name`.
    /// Depth counts programs outward from the current one.
    pub fn block_param_index(&self, name: &str) -> Option<(usize, usize)> {
        self.block_params
            .iter()
            .rev()
            .enumerate()
            .find_map(|(depth, names)| {
                names
                    .iter()
                    .position(|param| param == name)
                    .map(|index| (depth, index))
            })
    }

    /// Claim an id for a program whose body is compiled later.
    pub fn reserve_program(&mut self) -> ProgramId {
        self.programs.push(ProgramChunk::default());
        self.programs.len() - 1
    }
}
