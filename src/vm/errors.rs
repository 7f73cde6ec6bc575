// Copyright (c) The exprus Authors.
// Licensed under the MIT License.

use thiserror::Error;

/// Errors surfaced while lowering an expression tree into a program.
///
/// Compilation is deterministic: retrying with identical inputs reproduces
/// the identical failure. No partial program is ever returned.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompileError {
    /// A call references a name absent from the symbol table.
    #[error("unresolved symbol: {symbol}")]
    UnresolvedSymbol { symbol: String },

    /// A regular-expression operator carries a pattern that does not
    /// compile.
    #[error("invalid pattern `{pattern}`: {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// An expression node the compiler cannot lower. The closed expression
    /// enum makes this unreachable from the exhaustive dispatch; the variant
    /// is the defensive fatal path for version-mismatched trees and is a
    /// programming error, never a user input error.
    #[error("internal error: cannot compile expression: {detail}")]
    UnsupportedExpression { detail: String },
}

/// Errors surfaced while executing a compiled program.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum VmError {
    /// An aggregate instruction was reached during plain row evaluation,
    /// which has no accumulator state to read or write.
    #[error("cannot evaluate aggregate expression without an instance")]
    AggregateWithoutInstance,

    /// The instance's scratch buffer was not sized for this program.
    #[error("scratch buffer size mismatch: expected {expected} bytes, got {actual}")]
    ScratchSizeMismatch { expected: usize, actual: usize },

    #[error("input column {index} out of bounds for row of width {width}")]
    InputColumnOutOfBounds { index: usize, width: usize },

    /// A pure or aggregate function reported an error.
    #[error("function error: {detail}")]
    Function { detail: String },

    /// A structurally impossible instruction graph was encountered.
    #[error("internal error: {detail}")]
    Internal { detail: String },
}

impl VmError {
    pub(crate) fn function(err: anyhow::Error) -> Self {
        VmError::Function {
            detail: err.to_string(),
        }
    }
}
