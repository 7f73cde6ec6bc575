// Copyright (c) The exprus Authors.
// Licensed under the MIT License.

use crate::value::Value;
use crate::vm::instructions::Instruction;
use crate::vm::like::LikePattern;

use regex::Regex;

/// Handle to an instruction in a program's storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstrId(u32);

/// Handle to a constant value in a program's storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValueId(u32);

/// Handle to a compiled regular expression in a program's storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatternId(u32);

/// Handle to a compiled LIKE matcher in a program's storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LikeId(u32);

/// Append-only storage owning everything compiled for one program:
/// instruction records, constant values and compiled pattern objects.
///
/// Allocation returns a stable handle; nothing is ever released
/// individually. Handles are only meaningful against the storage that
/// issued them: instructions belong to exactly one storage, and the
/// whole pool is dropped with the owning program.
#[derive(Debug, Default)]
pub struct StaticStorage {
    instructions: Vec<Instruction>,
    values: Vec<Value>,
    regexes: Vec<Regex>,
    like_patterns: Vec<LikePattern>,
}

impl StaticStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alloc_instruction(&mut self, ins: Instruction) -> InstrId {
        let id = InstrId(self.instructions.len() as u32);
        self.instructions.push(ins);
        id
    }

    pub fn alloc_value(&mut self, v: Value) -> ValueId {
        let id = ValueId(self.values.len() as u32);
        self.values.push(v);
        id
    }

    pub fn alloc_regex(&mut self, re: Regex) -> PatternId {
        let id = PatternId(self.regexes.len() as u32);
        self.regexes.push(re);
        id
    }

    pub fn alloc_like_pattern(&mut self, p: LikePattern) -> LikeId {
        let id = LikeId(self.like_patterns.len() as u32);
        self.like_patterns.push(p);
        id
    }

    pub fn instruction(&self, id: InstrId) -> &Instruction {
        &self.instructions[id.0 as usize]
    }

    pub(crate) fn instruction_mut(&mut self, id: InstrId) -> &mut Instruction {
        &mut self.instructions[id.0 as usize]
    }

    pub fn value(&self, id: ValueId) -> &Value {
        &self.values[id.0 as usize]
    }

    pub fn regex(&self, id: PatternId) -> &Regex {
        &self.regexes[id.0 as usize]
    }

    pub fn like_pattern(&self, id: LikeId) -> &LikePattern {
        &self.like_patterns[id.0 as usize]
    }

    /// Every instruction in the pool, in allocation (pre-order) order.
    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    /// Iterate the sibling chain starting at an instruction's first child.
    pub fn children(&self, of: InstrId) -> Children<'_> {
        Children {
            storage: self,
            cur: self.instruction(of).child,
        }
    }
}

pub struct Children<'a> {
    storage: &'a StaticStorage,
    cur: Option<InstrId>,
}

impl Iterator for Children<'_> {
    type Item = InstrId;

    fn next(&mut self) -> Option<InstrId> {
        let id = self.cur?;
        self.cur = self.storage.instruction(id).next;
        Some(id)
    }
}
