// Copyright (c) The exprus Authors.
// Licensed under the MIT License.

// Use README.md as crate documentation.
#![doc = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/README.md"))]

mod ast;
pub mod builtins;
mod symbols;
mod value;
pub mod vm;

pub use ast::{Expr, Ref};
pub use symbols::{AggregateFcn, FcnDescriptor, FnKind, PureFcn, Symbol, SymbolTable};
pub use value::Value;
pub use vm::{
    compile, CompileError, Instance, InstrId, InstrKind, Instruction, LikePattern, Program,
    StaticStorage, Vm, VmError,
};
