// Copyright (c) The exprus Authors.
// Licensed under the MIT License.

use crate::vm::arena::{InstrId, StaticStorage};
use crate::vm::instructions::Instruction;

use core::fmt::Write;

/// A compiled, immutable, repeatedly executable expression.
///
/// Bundles the entry instruction, the storage owning every instruction,
/// constant and compiled pattern, and the number of scratch bytes one
/// evaluation context needs for aggregate accumulator state.
///
/// Programs are safe to read from any number of threads; all per-evaluation
/// mutable state lives in the executor-owned scratch buffers.
#[derive(Debug)]
pub struct Program {
    entry: InstrId,
    storage: StaticStorage,
    dynamic_storage_size: usize,
}

impl Program {
    pub(crate) fn new(entry: InstrId, storage: StaticStorage, dynamic_storage_size: usize) -> Self {
        Self {
            entry,
            storage,
            dynamic_storage_size,
        }
    }

    pub fn entry(&self) -> InstrId {
        self.entry
    }

    pub fn storage(&self) -> &StaticStorage {
        &self.storage
    }

    /// Bytes of zero-initialized scratch space each evaluation context must
    /// provide. The program itself never allocates or touches that buffer.
    pub fn dynamic_storage_size(&self) -> usize {
        self.dynamic_storage_size
    }

    pub fn instruction(&self, id: InstrId) -> &Instruction {
        self.storage.instruction(id)
    }

    /// Human-readable listing of the instruction tree, one node per line,
    /// children indented under their parent.
    pub fn listing(&self) -> String {
        let mut out = String::new();
        self.write_listing(&mut out, self.entry, 0);
        out
    }

    fn write_listing(&self, out: &mut String, id: InstrId, depth: usize) {
        let ins = self.storage.instruction(id);
        for _ in 0..depth {
            out.push_str("  ");
        }
        let _ = writeln!(out, "{}", ins.display_with_storage(&self.storage));
        for child in self.storage.children(id) {
            self.write_listing(out, child, depth + 1);
        }
    }
}
