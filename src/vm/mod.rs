// Copyright (c) The exprus Authors.
// Licensed under the MIT License.

// The expression virtual machine: a compiler that lowers value-expression
// trees into fixed-size instruction records inside per-program storage, and
// an interpreter that walks the compiled graph once per row or group.

mod arena;
mod compiler;
mod errors;
mod instructions;
mod like;
mod machine;
mod program;

pub use arena::{Children, InstrId, LikeId, PatternId, StaticStorage, ValueId};
pub use compiler::compile;
pub use errors::{CompileError, VmError};
pub use instructions::{InstrKind, Instruction};
pub use like::LikePattern;
pub use machine::{Instance, Vm};
pub use program::Program;
