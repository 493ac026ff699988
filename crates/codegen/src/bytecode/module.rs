//! Template spec: the serializable unit handed from compiler to runtime

use super::program::{ProgramChunk, ProgramId};
use crate::options::CompileOptions;
use serde::{Deserialize, Serialize};
use std::ops::BitOr;

/// Revision of the instruction format. The runtime refuses any other.
pub const COMPILER_REVISION: u32 = 8;

/// Runtime capabilities a compiled template relies on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Features(u32);

impl Features {
    pub const NONE: Features = Features(0);
    pub const DATA: Features = Features(1);
    pub const BLOCK_PARAMS: Features = Features(1 << 1);
    pub const DEPTHS: Features = Features(1 << 2);
    pub const PARTIALS: Features = Features(1 << 3);
    pub const COMPAT: Features = Features(1 << 4);
    pub const SUPPORTED: Features = Features(0b1_1111);

    pub fn from_bits(bits: u32) -> Self {
        Features(bits)
    }

    pub fn bits(self) -> u32 {
        self.0
    }

    pub fn contains(self, other: Features) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn insert(&mut self, other: Features) {
        self.0 |= other.0;
    }

    /// Bits this runtime does not know how to honor.
    pub fn unsupported(self) -> Features {
        Features(self.0 & !Self::SUPPORTED.0)
    }
}

impl BitOr for Features {
    type Output = Features;

    fn bitor(self, rhs: Features) -> Features {
        Features(self.0 | rhs.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompilerInfo {
    pub revision: u32,
    pub version: String,
    #[serde(default)]
    pub features: Features,
}

impl Default for CompilerInfo {
    fn default() -> Self {
        CompilerInfo {
            revision: COMPILER_REVISION,
            version: env!("CARGO_PKG_VERSION").to_string(),
            features: Features::NONE,
        }
    }
}

/// How rendered output is accumulated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BufferKind {
    /// One growing string.
    #[default]
    String,
    /// A list of fragments joined at the end.
    Fragments,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateSpec {
    pub compiler: CompilerInfo,
    pub main: ProgramId,
    pub programs: Vec<ProgramChunk>,
    pub options: CompileOptions,
    #[serde(default)]
    pub buffer: BufferKind,
}

impl TemplateSpec {
    pub fn program(&self, id: ProgramId) -> Option<&ProgramChunk> {
        self.programs.get(id)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_bits() {
        let features = Features::DATA | Features::PARTIALS;
        assert!(features.contains(Features::DATA));
        assert!(!features.contains(Features::DEPTHS));
        assert_eq!(features.unsupported(), Features::NONE);
        assert_eq!(Features::from_bits(1 << 9).unsupported().bits(), 1 << 9);
    }
}
