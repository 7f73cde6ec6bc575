// Copyright (c) The exprus Authors.
// Licensed under the MIT License.

use crate::builtins::utils::ensure_args_count;
use crate::symbols::SymbolTable;
use crate::value::Value;

use core::cmp::Ordering;

use anyhow::Result;

pub fn register(m: &mut SymbolTable) {
    m.register_pure("eq", eq);
    m.register_pure("neq", neq);
    m.register_pure("lt", lt);
    m.register_pure("lte", lte);
    m.register_pure("gt", gt);
    m.register_pure("gte", gte);
    m.register_pure("and", and);
    m.register_pure("or", or);
    m.register_pure("not", not);
    m.register_pure("coalesce", coalesce);
    m.register_pure("if_null", if_null);
}

fn eq(args: &[Value]) -> Result<Value> {
    ensure_args_count("eq", args, 2)?;
    if args[0].is_null() || args[1].is_null() {
        return Ok(Value::Null);
    }
    Ok(Value::Bool(args[0] == args[1]))
}

fn neq(args: &[Value]) -> Result<Value> {
    ensure_args_count("neq", args, 2)?;
    if args[0].is_null() || args[1].is_null() {
        return Ok(Value::Null);
    }
    Ok(Value::Bool(args[0] != args[1]))
}

// Comparisons involving NULL yield NULL, as do comparisons between values
// that have no ordering (e.g. a string against an integer).
fn ordering_op(fcn: &str, args: &[Value], pred: fn(Ordering) -> bool) -> Result<Value> {
    ensure_args_count(fcn, args, 2)?;
    if args[0].is_null() || args[1].is_null() {
        return Ok(Value::Null);
    }
    match args[0].partial_cmp(&args[1]) {
        Some(ord) => Ok(Value::Bool(pred(ord))),
        None => Ok(Value::Null),
    }
}

fn lt(args: &[Value]) -> Result<Value> {
    ordering_op("lt", args, |ord| ord == Ordering::Less)
}

fn lte(args: &[Value]) -> Result<Value> {
    ordering_op("lte", args, |ord| ord != Ordering::Greater)
}

fn gt(args: &[Value]) -> Result<Value> {
    ordering_op("gt", args, |ord| ord == Ordering::Greater)
}

fn gte(args: &[Value]) -> Result<Value> {
    ordering_op("gte", args, |ord| ord != Ordering::Less)
}

// Three-valued logic: FALSE AND NULL is FALSE, TRUE AND NULL is NULL.
fn and(args: &[Value]) -> Result<Value> {
    ensure_args_count("and", args, 2)?;
    let a = &args[0];
    let b = &args[1];
    if (!a.is_null() && !a.is_true()) || (!b.is_null() && !b.is_true()) {
        return Ok(Value::Bool(false));
    }
    if a.is_null() || b.is_null() {
        return Ok(Value::Null);
    }
    Ok(Value::Bool(true))
}

fn or(args: &[Value]) -> Result<Value> {
    ensure_args_count("or", args, 2)?;
    let a = &args[0];
    let b = &args[1];
    if a.is_true() || b.is_true() {
        return Ok(Value::Bool(true));
    }
    if a.is_null() || b.is_null() {
        return Ok(Value::Null);
    }
    Ok(Value::Bool(false))
}

fn not(args: &[Value]) -> Result<Value> {
    ensure_args_count("not", args, 1)?;
    if args[0].is_null() {
        return Ok(Value::Null);
    }
    Ok(Value::Bool(!args[0].is_true()))
}

/// First non-NULL argument; NULL when every argument is NULL. Variadic.
fn coalesce(args: &[Value]) -> Result<Value> {
    for v in args {
        if !v.is_null() {
            return Ok(v.clone());
        }
    }
    Ok(Value::Null)
}

fn if_null(args: &[Value]) -> Result<Value> {
    ensure_args_count("if_null", args, 2)?;
    if args[0].is_null() {
        return Ok(args[1].clone());
    }
    Ok(args[0].clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comparisons_follow_sql_null_rules() {
        assert_eq!(eq(&[Value::Integer(1), Value::Integer(1)]).unwrap(), Value::Bool(true));
        assert_eq!(eq(&[Value::Null, Value::Integer(1)]).unwrap(), Value::Null);
        assert_eq!(lt(&[Value::Integer(1), Value::Float(1.5)]).unwrap(), Value::Bool(true));
        assert_eq!(lt(&[Value::from("a"), Value::Integer(1)]).unwrap(), Value::Null);
    }

    #[test]
    fn three_valued_logic() {
        assert_eq!(and(&[Value::Bool(false), Value::Null]).unwrap(), Value::Bool(false));
        assert_eq!(and(&[Value::Bool(true), Value::Null]).unwrap(), Value::Null);
        assert_eq!(or(&[Value::Bool(true), Value::Null]).unwrap(), Value::Bool(true));
        assert_eq!(or(&[Value::Bool(false), Value::Null]).unwrap(), Value::Null);
        assert_eq!(not(&[Value::Null]).unwrap(), Value::Null);
    }

    #[test]
    fn coalesce_picks_first_non_null() {
        assert_eq!(
            coalesce(&[Value::Null, Value::Integer(2), Value::Integer(3)]).unwrap(),
            Value::Integer(2)
        );
        assert_eq!(coalesce(&[Value::Null, Value::Null]).unwrap(), Value::Null);
        assert_eq!(coalesce(&[]).unwrap(), Value::Null);
    }
}
