// Copyright (c) The exprus Authors.
// Licensed under the MIT License.

use crate::value::Value;
use crate::vm::CompileError;

use std::collections::HashMap;
use std::sync::Arc;

/// A pure (stateless) scalar function. Receives the evaluated argument
/// values for one row and produces one value.
pub type PureFcn = fn(&[Value]) -> anyhow::Result<Value>;

/// Descriptor for an aggregate function.
///
/// All accumulator state lives in a caller-provided byte region of exactly
/// `scratch_size` bytes; the function never keeps state anywhere else. A
/// zero-filled region must be a valid empty accumulator, since evaluation
/// contexts hand out zero-initialized buffers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AggregateFcn {
    /// Bytes of accumulator state reserved per call site.
    pub scratch_size: usize,
    /// Fold one row's argument values into the accumulator.
    pub accumulate: fn(&mut [u8], &[Value]) -> anyhow::Result<()>,
    /// Read the current aggregate result out of the accumulator.
    pub get: fn(&[u8]) -> anyhow::Result<Value>,
    /// Return the accumulator to its empty state.
    pub reset: fn(&mut [u8]),
    /// Fold another accumulator of the same function into this one.
    /// Upstream servers merge partial aggregates this way.
    pub merge: fn(&mut [u8], &[u8]) -> anyhow::Result<()>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FnKind {
    Pure,
    Aggregate,
}

/// The callable behind a symbol.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FcnDescriptor {
    Pure(PureFcn),
    Aggregate(AggregateFcn),
}

/// A resolved function symbol. Immutable once looked up; valid for the
/// duration of one compilation.
#[derive(Debug, Clone)]
pub struct Symbol {
    name: Arc<str>,
    fcn: FcnDescriptor,
}

impl Symbol {
    pub fn new(name: impl Into<Arc<str>>, fcn: FcnDescriptor) -> Self {
        Self {
            name: name.into(),
            fcn,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> FnKind {
        match self.fcn {
            FcnDescriptor::Pure(_) => FnKind::Pure,
            FcnDescriptor::Aggregate(_) => FnKind::Aggregate,
        }
    }

    pub fn fcn(&self) -> FcnDescriptor {
        self.fcn
    }

    /// Bytes of per-context accumulator state this symbol needs; zero for
    /// pure functions.
    pub fn scratch_size(&self) -> usize {
        match self.fcn {
            FcnDescriptor::Pure(_) => 0,
            FcnDescriptor::Aggregate(f) => f.scratch_size,
        }
    }
}

/// Registry resolving function names to symbols during compilation.
///
/// Names are case-insensitive, SQL style: `SUM`, `Sum` and `sum` resolve to
/// the same symbol. The table is built once and then only read; `Default`
/// yields a copy of the builtin registry.
#[derive(Debug, Clone)]
pub struct SymbolTable {
    symbols: HashMap<String, Symbol>,
}

impl SymbolTable {
    /// A table with no symbols at all.
    pub fn empty() -> Self {
        Self {
            symbols: HashMap::new(),
        }
    }

    pub fn register(&mut self, name: &str, fcn: FcnDescriptor) {
        let key = name.to_ascii_lowercase();
        self.symbols.insert(key.clone(), Symbol::new(key, fcn));
    }

    pub fn register_pure(&mut self, name: &str, fcn: PureFcn) {
        self.register(name, FcnDescriptor::Pure(fcn));
    }

    pub fn register_aggregate(&mut self, name: &str, fcn: AggregateFcn) {
        self.register(name, FcnDescriptor::Aggregate(fcn));
    }

    pub fn lookup(&self, name: &str) -> Result<&Symbol, CompileError> {
        self.symbols
            .get(&name.to_ascii_lowercase())
            .ok_or_else(|| CompileError::UnresolvedSymbol {
                symbol: name.to_string(),
            })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.symbols.contains_key(&name.to_ascii_lowercase())
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        crate::builtins::BUILTINS.clone()
    }
}
