//! Compile and render error types

use thiserror::Error;
use whisker_parser::{ParseError, SourceLocation};

/// Raised while turning a tree into an artifact.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CompileError {
    #[error("{name} expects {expected} parameter(s), got {found}")]
    HelperArity {
        name: String,
        expected: usize,
        found: usize,
        loc: Option<SourceLocation>,
    },

    #[error("You specified knownHelpersOnly, but used the unknown helper {name}")]
    UnknownHelper {
        name: String,
        loc: Option<SourceLocation>,
    },

    #[error("Invalid path: {path} contains an empty segment")]
    EmptySegment {
        path: String,
        loc: Option<SourceLocation>,
    },

    #[error("{open} doesn't match {close}")]
    MismatchedBlock {
        open: String,
        close: String,
        loc: Option<SourceLocation>,
    },

    #[error("block {name} has neither a program nor an inverse")]
    EmptyBlock {
        name: String,
        loc: Option<SourceLocation>,
    },

    #[error("chained inverse of {name} must hold exactly one block")]
    InvalidChain {
        name: String,
        loc: Option<SourceLocation>,
    },

    #[error("Unsupported number of partial arguments: {count}")]
    PartialArguments {
        count: usize,
        loc: Option<SourceLocation>,
    },
}

impl CompileError {
    /// Where in the template the error was raised, if locations were tracked.
    pub fn loc(&self) -> Option<&SourceLocation> {
        match self {
            CompileError::HelperArity { loc, .. }
            | CompileError::UnknownHelper { loc, .. }
            | CompileError::EmptySegment { loc, .. }
            | CompileError::MismatchedBlock { loc, .. }
            | CompileError::EmptyBlock { loc, .. }
            | CompileError::InvalidChain { loc, .. }
            | CompileError::PartialArguments { loc, .. } => loc.as_ref(),
        }
    }
}

pub type CompileResult<T> = Result<T, CompileError>;

/// Raised while rendering an artifact.
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("\"{name}\" not defined in {path}")]
    MissingProperty {
        name: String,
        path: String,
        loc: Option<SourceLocation>,
    },

    #[error("Missing helper: \"{name}\"")]
    MissingHelper {
        name: String,
        loc: Option<SourceLocation>,
    },

    #[error("The partial {name} could not be found")]
    MissingPartial { name: String },

    #[error("Exceeded the maximum nesting depth of {limit}")]
    DepthExceeded { limit: usize },

    #[error(
        "Template was precompiled with compiler revision {found}, the runtime expects {expected}"
    )]
    VersionMismatch { expected: u32, found: u32 },

    #[error("Template requires unsupported features (bits {bits:#x})")]
    UnsupportedFeatures { bits: u32 },

    #[error("Template references missing program {id}")]
    InvalidProgram { id: usize },

    #[error("Invalid template spec: {0}")]
    InvalidSpec(#[from] serde_json::Error),

    #[error("{name}: {message}")]
    Helper { name: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl RuntimeError {
    /// An error raised from inside a helper.
    pub fn helper(name: impl Into<String>, message: impl Into<String>) -> Self {
        RuntimeError::Helper {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Errors a non-strict render replaces with an empty substitution.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            RuntimeError::MissingHelper { .. } | RuntimeError::MissingPartial { .. }
        )
    }
}

/// Any error a template can produce between source text and output.
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error(transparent)]
    Syntax(#[from] Box<ParseError>),

    #[error(transparent)]
    Compile(#[from] CompileError),

    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}

impl From<std::io::Error> for TemplateError {
    fn from(error: std::io::Error) -> Self {
        TemplateError::Runtime(RuntimeError::Io(error))
    }
}

pub type TemplateResult<T> = Result<T, TemplateError>;
