//! Compiled template form
//! Re-exports the instruction set and the serializable template spec

pub mod instruction;
pub mod module;
pub mod program;

pub use instruction::{
    Accessor, BlockCall, BlockKind, Call, CallIds, Instruction, Literal, Lookup, LookupKind,
    Operand, PartialCall, PartialName,
};
pub use module::{BufferKind, COMPILER_REVISION, CompilerInfo, Features, TemplateSpec};
pub use program::{ProgramChunk, ProgramId};
