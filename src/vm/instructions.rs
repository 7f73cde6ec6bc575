// Copyright (c) The exprus Authors.
// Licensed under the MIT License.

use crate::symbols::{AggregateFcn, PureFcn};
use crate::vm::arena::{InstrId, LikeId, PatternId, StaticStorage, ValueId};

/// One node of a compiled instruction graph.
///
/// Children are encoded as a first-child/next-sibling chain, so every
/// instruction is a fixed-size record regardless of arity: walking the k-th
/// argument costs k pointer chases, which call arities keep small.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Instruction {
    pub kind: InstrKind,
    /// Declared arity; meaningful for calls and conditionals.
    pub argn: usize,
    /// First child, `None` for the leaf kinds (literal, input).
    pub child: Option<InstrId>,
    /// Next sibling in the parent's argument list, `None` for the last.
    pub next: Option<InstrId>,
}

/// Operation tag plus per-kind payload.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InstrKind {
    /// Push a constant from the program's storage.
    Literal(ValueId),
    /// Read the n-th column of the input row.
    Input(usize),
    /// Invoke a stateless scalar function over the evaluated children.
    CallPure(PureFcn),
    /// Fold the evaluated children into accumulator state at a fixed byte
    /// offset inside the evaluation context's scratch buffer.
    CallAggregate { offset: usize, fcn: AggregateFcn },
    /// Three children: condition, then-branch, else-branch.
    If,
    /// Match the single child against a pre-compiled regular expression.
    Regex(PatternId),
    /// Match the single child against a pre-compiled LIKE pattern.
    Like(LikeId),
}

impl Instruction {
    /// Detailed display string resolving payload handles against the owning
    /// storage; used by program listings.
    pub fn display_with_storage(&self, storage: &StaticStorage) -> String {
        match self.kind {
            InstrKind::Literal(vid) => format!("LITERAL {}", storage.value(vid).to_sql()),
            InstrKind::Input(idx) => format!("INPUT {idx}"),
            InstrKind::CallPure(_) => format!("CALL_PURE n={}", self.argn),
            InstrKind::CallAggregate { offset, .. } => {
                format!("CALL_AGGREGATE offset={offset} n={}", self.argn)
            }
            InstrKind::If => "IF".to_string(),
            InstrKind::Regex(pid) => format!("REGEX /{}/", storage.regex(pid).as_str()),
            InstrKind::Like(lid) => {
                format!("LIKE '{}'", storage.like_pattern(lid).pattern())
            }
        }
    }
}
