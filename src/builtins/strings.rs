// Copyright (c) The exprus Authors.
// Licensed under the MIT License.

use crate::builtins::utils::{ensure_args_count, ensure_string};
use crate::symbols::SymbolTable;
use crate::value::Value;

use anyhow::{bail, Result};

pub fn register(m: &mut SymbolTable) {
    m.register_pure("upper", upper);
    m.register_pure("lower", lower);
    m.register_pure("ltrim", ltrim);
    m.register_pure("rtrim", rtrim);
    m.register_pure("length", length);
    m.register_pure("substr", substr);
    m.register_pure("startswith", startswith);
    m.register_pure("endswith", endswith);
    m.register_pure("concat", concat);
}

fn string_unop(fcn: &str, args: &[Value], op: fn(&str) -> String) -> Result<Value> {
    ensure_args_count(fcn, args, 1)?;
    if args[0].is_null() {
        return Ok(Value::Null);
    }
    let s = ensure_string(fcn, &args[0])?;
    Ok(Value::from(op(s)))
}

fn upper(args: &[Value]) -> Result<Value> {
    string_unop("upper", args, str::to_uppercase)
}

fn lower(args: &[Value]) -> Result<Value> {
    string_unop("lower", args, str::to_lowercase)
}

fn ltrim(args: &[Value]) -> Result<Value> {
    string_unop("ltrim", args, |s| s.trim_start().to_string())
}

fn rtrim(args: &[Value]) -> Result<Value> {
    string_unop("rtrim", args, |s| s.trim_end().to_string())
}

fn length(args: &[Value]) -> Result<Value> {
    ensure_args_count("length", args, 1)?;
    if args[0].is_null() {
        return Ok(Value::Null);
    }
    let s = ensure_string("length", &args[0])?;
    Ok(Value::Integer(s.chars().count() as i64))
}

/// `substr(string, start[, length])` with 1-based start, in characters.
fn substr(args: &[Value]) -> Result<Value> {
    if args.len() != 2 && args.len() != 3 {
        bail!("`substr` expects 2 or 3 arguments, got {}", args.len());
    }
    if args[0].is_null() || args[1].is_null() {
        return Ok(Value::Null);
    }
    let s = ensure_string("substr", &args[0])?;
    let start = match args[1].as_integer() {
        Some(i) => i,
        None => bail!("`substr` expects an integer start, got `{}`", args[1]),
    };
    let skip = start.max(1) as usize - 1;
    let take = match args.get(2) {
        None => usize::MAX,
        Some(v) if v.is_null() => return Ok(Value::Null),
        Some(v) => match v.as_integer() {
            Some(n) if n >= 0 => n as usize,
            Some(_) => 0,
            None => bail!("`substr` expects an integer length, got `{v}`"),
        },
    };
    Ok(Value::from(
        s.chars().skip(skip).take(take).collect::<String>(),
    ))
}

fn string_pair_pred(fcn: &str, args: &[Value], pred: fn(&str, &str) -> bool) -> Result<Value> {
    ensure_args_count(fcn, args, 2)?;
    if args[0].is_null() || args[1].is_null() {
        return Ok(Value::Null);
    }
    let a = ensure_string(fcn, &args[0])?;
    let b = ensure_string(fcn, &args[1])?;
    Ok(Value::Bool(pred(a, b)))
}

fn startswith(args: &[Value]) -> Result<Value> {
    string_pair_pred("startswith", args, |s, p| s.starts_with(p))
}

fn endswith(args: &[Value]) -> Result<Value> {
    string_pair_pred("endswith", args, |s, p| s.ends_with(p))
}

/// Concatenate all arguments; non-strings render as their display text.
/// Any NULL argument makes the result NULL. Variadic.
fn concat(args: &[Value]) -> Result<Value> {
    let mut out = String::new();
    for v in args {
        if v.is_null() {
            return Ok(Value::Null);
        }
        out.push_str(&v.to_string());
    }
    Ok(Value::from(out))
}
