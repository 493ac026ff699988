use super::instruction::Instruction;
use serde::{Deserialize, Serialize};

/// Index of a program within its template spec.
pub type ProgramId = usize;

/// One compiled program: the main body, a block body or an inverse.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgramChunk {
    pub instructions: Vec<Instruction>,
    /// Number of block parameters the program declares.
    #[serde(default)]
    pub block_params: usize,
}
