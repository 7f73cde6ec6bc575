// Copyright (c) The exprus Authors.
// Licensed under the MIT License.

use crate::ast::Expr;
use crate::symbols::{FcnDescriptor, SymbolTable};
use crate::value::Value;
use crate::vm::arena::{InstrId, StaticStorage};
use crate::vm::errors::CompileError;
use crate::vm::instructions::{InstrKind, Instruction};
use crate::vm::like::LikePattern;
use crate::vm::program::Program;

use regex::Regex;

/// Lower a value-expression tree into an executable [`Program`].
///
/// One pre-order recursive traversal: constants and compiled patterns are
/// interned into fresh storage, aggregate call sites are assigned strictly
/// increasing, non-overlapping scratch offsets in visit order, and the
/// storage is moved into the returned program. Compilation is a pure
/// function of the tree and the symbol table; identical inputs produce
/// structurally identical programs.
pub fn compile(expr: &Expr, symbol_table: &SymbolTable) -> Result<Program, CompileError> {
    let mut static_storage = StaticStorage::new();
    let mut dynamic_storage_size = 0;

    let entry = compile_value_expression(
        expr,
        &mut dynamic_storage_size,
        &mut static_storage,
        symbol_table,
    )?;

    Ok(Program::new(entry, static_storage, dynamic_storage_size))
}

fn compile_value_expression(
    node: &Expr,
    dynamic_storage_size: &mut usize,
    static_storage: &mut StaticStorage,
    symbol_table: &SymbolTable,
) -> Result<InstrId, CompileError> {
    match node {
        Expr::Literal(value) => Ok(compile_literal(value, static_storage)),
        Expr::ColumnReference { column_index, .. } => {
            Ok(compile_column_reference(*column_index, static_storage))
        }
        Expr::Call { symbol, args } => compile_call(
            symbol,
            args,
            dynamic_storage_size,
            static_storage,
            symbol_table,
        ),
        Expr::If {
            condition,
            then_expr,
            else_expr,
        } => compile_if(
            [condition, then_expr, else_expr],
            dynamic_storage_size,
            static_storage,
            symbol_table,
        ),
        Expr::Regex { pattern, subject } => compile_regex(
            pattern,
            subject,
            dynamic_storage_size,
            static_storage,
            symbol_table,
        ),
        Expr::Like { pattern, subject } => compile_like(
            pattern,
            subject,
            dynamic_storage_size,
            static_storage,
            symbol_table,
        ),
    }
}

fn compile_literal(value: &Value, static_storage: &mut StaticStorage) -> InstrId {
    let arg0 = static_storage.alloc_value(value.clone());
    static_storage.alloc_instruction(Instruction {
        kind: InstrKind::Literal(arg0),
        argn: 0,
        child: None,
        next: None,
    })
}

/// A reference to a column the schema could not resolve evaluates to NULL;
/// missing columns are not a compile error and never become input reads.
fn compile_column_reference(
    column_index: Option<usize>,
    static_storage: &mut StaticStorage,
) -> InstrId {
    match column_index {
        None => compile_literal(&Value::Null, static_storage),
        Some(idx) => static_storage.alloc_instruction(Instruction {
            kind: InstrKind::Input(idx),
            argn: 0,
            child: None,
            next: None,
        }),
    }
}

fn compile_call(
    symbol: &str,
    args: &[crate::ast::Ref<Expr>],
    dynamic_storage_size: &mut usize,
    static_storage: &mut StaticStorage,
    symbol_table: &SymbolTable,
) -> Result<InstrId, CompileError> {
    let symbol = symbol_table.lookup(symbol)?;

    let kind = match symbol.fcn() {
        FcnDescriptor::Pure(fcn) => InstrKind::CallPure(fcn),
        FcnDescriptor::Aggregate(fcn) => {
            // Reserve this call site's accumulator region before descending
            // into the arguments, so offsets are assigned in pre-order and
            // never overlap.
            let offset = *dynamic_storage_size;
            *dynamic_storage_size += fcn.scratch_size;
            InstrKind::CallAggregate { offset, fcn }
        }
    };

    let op = static_storage.alloc_instruction(Instruction {
        kind,
        argn: args.len(),
        child: None,
        next: None,
    });

    let mut tail = None;
    for arg in args {
        let next = compile_value_expression(arg, dynamic_storage_size, static_storage, symbol_table)?;
        append_child(static_storage, op, &mut tail, next);
    }

    Ok(op)
}

fn compile_if(
    branches: [&crate::ast::Ref<Expr>; 3],
    dynamic_storage_size: &mut usize,
    static_storage: &mut StaticStorage,
    symbol_table: &SymbolTable,
) -> Result<InstrId, CompileError> {
    let op = static_storage.alloc_instruction(Instruction {
        kind: InstrKind::If,
        argn: branches.len(),
        child: None,
        next: None,
    });

    let mut tail = None;
    for branch in branches {
        let next =
            compile_value_expression(branch, dynamic_storage_size, static_storage, symbol_table)?;
        append_child(static_storage, op, &mut tail, next);
    }

    Ok(op)
}

fn compile_regex(
    pattern: &str,
    subject: &Expr,
    dynamic_storage_size: &mut usize,
    static_storage: &mut StaticStorage,
    symbol_table: &SymbolTable,
) -> Result<InstrId, CompileError> {
    let re = Regex::new(pattern).map_err(|err| CompileError::InvalidPattern {
        pattern: pattern.to_string(),
        reason: err.to_string(),
    })?;
    let arg0 = static_storage.alloc_regex(re);

    let op = static_storage.alloc_instruction(Instruction {
        kind: InstrKind::Regex(arg0),
        argn: 1,
        child: None,
        next: None,
    });

    let subject =
        compile_value_expression(subject, dynamic_storage_size, static_storage, symbol_table)?;
    static_storage.instruction_mut(op).child = Some(subject);

    Ok(op)
}

fn compile_like(
    pattern: &str,
    subject: &Expr,
    dynamic_storage_size: &mut usize,
    static_storage: &mut StaticStorage,
    symbol_table: &SymbolTable,
) -> Result<InstrId, CompileError> {
    // The pattern object is built once here; evaluation only ever matches.
    let arg0 = static_storage.alloc_like_pattern(LikePattern::new(pattern));

    let op = static_storage.alloc_instruction(Instruction {
        kind: InstrKind::Like(arg0),
        argn: 1,
        child: None,
        next: None,
    });

    let subject =
        compile_value_expression(subject, dynamic_storage_size, static_storage, symbol_table)?;
    static_storage.instruction_mut(op).child = Some(subject);

    Ok(op)
}

/// Attach `child` to the end of `parent`'s argument list, keeping a tail
/// cursor so each append is O(1) and argument order is preserved.
fn append_child(
    static_storage: &mut StaticStorage,
    parent: InstrId,
    tail: &mut Option<InstrId>,
    child: InstrId,
) {
    match *tail {
        None => static_storage.instruction_mut(parent).child = Some(child),
        Some(prev) => static_storage.instruction_mut(prev).next = Some(child),
    }
    *tail = Some(child);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Expr;

    #[test]
    fn literal_compiles_to_leaf_instruction() {
        let symbols = SymbolTable::default();
        let program = compile(&Expr::literal(42), &symbols).unwrap();
        let entry = program.instruction(program.entry());
        match entry.kind {
            InstrKind::Literal(vid) => {
                assert_eq!(program.storage().value(vid), &Value::Integer(42));
            }
            ref other => panic!("expected literal instruction, got {other:?}"),
        }
        assert_eq!(entry.child, None);
        assert_eq!(entry.next, None);
        assert_eq!(program.dynamic_storage_size(), 0);
    }

    #[test]
    fn argument_order_is_preserved_in_the_child_chain() {
        let symbols = SymbolTable::default();
        let expr = Expr::call(
            "concat",
            vec![Expr::literal("a"), Expr::literal("b"), Expr::literal("c")],
        );
        let program = compile(&expr, &symbols).unwrap();

        let texts: Vec<String> = program
            .storage()
            .children(program.entry())
            .map(|id| match program.instruction(id).kind {
                InstrKind::Literal(vid) => program.storage().value(vid).to_string(),
                ref other => panic!("expected literal child, got {other:?}"),
            })
            .collect();
        assert_eq!(texts, vec!["a", "b", "c"]);
        assert_eq!(program.instruction(program.entry()).argn, 3);
    }

    #[test]
    fn invalid_regex_pattern_fails_compilation() {
        let symbols = SymbolTable::default();
        let expr = Expr::regex("(unclosed", Expr::literal("x"));
        match compile(&expr, &symbols) {
            Err(CompileError::InvalidPattern { pattern, .. }) => {
                assert_eq!(pattern, "(unclosed");
            }
            other => panic!("expected InvalidPattern, got {other:?}"),
        }
    }
}
