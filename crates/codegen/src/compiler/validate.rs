//! Structural checks for trees the parser did not produce.
//!
//! Parsed templates always pass; hand-built or deserialized trees may not.

use crate::error::{CompileError, CompileResult};
use whisker_parser::{BlockStatement, SourceLocation, Statement};

pub fn check_block(block: &BlockStatement) -> CompileResult<()> {
    let name = block.expr.original();

    if let Some(close) = &block.close
        && close.original != name
    {
        return Err(CompileError::MismatchedBlock {
            open: name,
            close: close.original.clone(),
            loc: close.loc.clone().or_else(|| block.loc.clone()),
        });
    }

    if block.program.is_none() && block.inverse.is_none() {
        return Err(CompileError::EmptyBlock {
            name,
            loc: block.loc.clone(),
        });
    }

    if let Some(inverse) = &block.inverse
        && inverse.chained
        && !matches!(inverse.body.as_slice(), [Statement::Block(_)])
    {
        return Err(CompileError::InvalidChain {
            name,
            loc: inverse.loc.clone().or_else(|| block.loc.clone()),
        });
    }

    Ok(())
}

pub fn check_partial_params(count: usize, loc: Option<&SourceLocation>) -> CompileResult<()> {
    if count > 1 {
        return Err(CompileError::PartialArguments {
            count,
            loc: loc.cloned(),
        });
    }
    Ok(())
}
