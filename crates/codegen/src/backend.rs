//! Code generation hooks.
//!
//! The compiler never builds accessors or buffers on its own; it asks a
//! [`Backend`]. The default backend produces plain member chains and merges
//! adjacent content. A custom backend can redirect lookups or change how
//! output is accumulated:
//!
//! ```
//! use whisker_codegen::backend::{self, Backend};
//! use whisker_codegen::bytecode::{Accessor, LookupKind};
//!
//! fn prefixed(parent: Accessor, name: &str, kind: LookupKind) -> Accessor {
//!     match kind {
//!         LookupKind::Partial => backend::name_lookup(parent, &format!("themes/{name}"), kind),
//!         _ => backend::name_lookup(parent, name, kind),
//!     }
//! }
//!
//! let backend = Backend { name_lookup: prefixed, ..Backend::default() };
//! # let _ = backend;
//! ```

use crate::bytecode::{Accessor, BufferKind, CompilerInfo, Instruction, LookupKind};
use std::fmt;

/// Hooks consulted by the compiler while emitting instructions.
#[derive(Clone, Copy)]
pub struct Backend {
    /// One lookup step from `parent` to its member `name`.
    pub name_lookup: fn(Accessor, &str, LookupKind) -> Accessor,
    /// The compat-mode lookup searching the whole context stack.
    pub depthed_lookup: fn(&str) -> Accessor,
    pub initialize_buffer: fn() -> BufferKind,
    /// Push an instruction. `explicit` is false for literal content only.
    pub append_to_buffer: fn(&mut Vec<Instruction>, Instruction, bool),
    pub compiler_info: fn() -> CompilerInfo,
}

impl Default for Backend {
    fn default() -> Self {
        Backend {
            name_lookup,
            depthed_lookup,
            initialize_buffer,
            append_to_buffer,
            compiler_info,
        }
    }
}

impl fmt::Debug for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Backend")
            .field("compiler_info", &(self.compiler_info)())
            .field("buffer", &(self.initialize_buffer)())
            .finish_non_exhaustive()
    }
}

pub fn name_lookup(parent: Accessor, name: &str, kind: LookupKind) -> Accessor {
    Accessor::Member {
        base: Box::new(parent),
        name: name.to_string(),
        kind,
    }
}

pub fn depthed_lookup(name: &str) -> Accessor {
    Accessor::Depthed {
        name: name.to_string(),
    }
}

pub fn initialize_buffer() -> BufferKind {
    BufferKind::String
}

/// Push `instruction`, folding literal content into a preceding
/// [`Instruction::AppendContent`].
pub fn append_to_buffer(instructions: &mut Vec<Instruction>, instruction: Instruction, explicit: bool) {
    if !explicit
        && let Instruction::AppendContent(text) = &instruction
        && let Some(Instruction::AppendContent(previous)) = instructions.last_mut()
    {
        previous.push_str(text);
        return;
    }
    instructions.push(instruction);
}

pub fn compiler_info() -> CompilerInfo {
    CompilerInfo::default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_merges() {
        let mut instructions = Vec::new();
        append_to_buffer(&mut instructions, Instruction::AppendContent("a".into()), false);
        append_to_buffer(&mut instructions, Instruction::AppendContent("b".into()), false);
        assert_eq!(instructions, vec![Instruction::AppendContent("ab".into())]);
    }

    #[test]
    fn test_explicit_does_not_merge() {
        let mut instructions = vec![Instruction::AppendContent("a".into())];
        append_to_buffer(&mut instructions, Instruction::AppendContent("b".into()), true);
        assert_eq!(instructions.len(), 2);
    }
}
