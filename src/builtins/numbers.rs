// Copyright (c) The exprus Authors.
// Licensed under the MIT License.

use crate::builtins::utils::{ensure_args_count, ensure_numeric};
use crate::symbols::SymbolTable;
use crate::value::Value;

use anyhow::{anyhow, bail, Result};

pub fn register(m: &mut SymbolTable) {
    m.register_pure("add", add);
    m.register_pure("sub", sub);
    m.register_pure("mul", mul);
    m.register_pure("div", div);
    m.register_pure("mod", modulo);
    m.register_pure("neg", neg);
    m.register_pure("abs", abs);
    m.register_pure("round", round);
    m.register_pure("floor", floor);
    m.register_pure("ceil", ceil);
}

// Integer pairs stay integer; any float operand widens the result to float.
// NULL operands yield NULL.
fn numeric_binop(
    fcn: &str,
    a: &Value,
    b: &Value,
    int_op: fn(i64, i64) -> Option<i64>,
    float_op: fn(f64, f64) -> f64,
) -> Result<Value> {
    if a.is_null() || b.is_null() {
        return Ok(Value::Null);
    }
    match (a, b) {
        (Value::Integer(x), Value::Integer(y)) => int_op(*x, *y)
            .map(Value::Integer)
            .ok_or_else(|| anyhow!("integer overflow in `{fcn}`")),
        _ => {
            let x = ensure_numeric(fcn, a)?;
            let y = ensure_numeric(fcn, b)?;
            Ok(Value::Float(float_op(x, y)))
        }
    }
}

fn add(args: &[Value]) -> Result<Value> {
    ensure_args_count("add", args, 2)?;
    numeric_binop("add", &args[0], &args[1], i64::checked_add, |x, y| x + y)
}

fn sub(args: &[Value]) -> Result<Value> {
    ensure_args_count("sub", args, 2)?;
    numeric_binop("sub", &args[0], &args[1], i64::checked_sub, |x, y| x - y)
}

fn mul(args: &[Value]) -> Result<Value> {
    ensure_args_count("mul", args, 2)?;
    numeric_binop("mul", &args[0], &args[1], i64::checked_mul, |x, y| x * y)
}

/// Numeric division; always yields a float. Division by zero yields NULL.
fn div(args: &[Value]) -> Result<Value> {
    ensure_args_count("div", args, 2)?;
    if args[0].is_null() || args[1].is_null() {
        return Ok(Value::Null);
    }
    let x = ensure_numeric("div", &args[0])?;
    let y = ensure_numeric("div", &args[1])?;
    if y == 0.0 {
        return Ok(Value::Null);
    }
    Ok(Value::Float(x / y))
}

fn modulo(args: &[Value]) -> Result<Value> {
    ensure_args_count("mod", args, 2)?;
    if args[0].is_null() || args[1].is_null() {
        return Ok(Value::Null);
    }
    match (&args[0], &args[1]) {
        (Value::Integer(_), Value::Integer(0)) => Ok(Value::Null),
        (Value::Integer(x), Value::Integer(y)) => Ok(Value::Integer(x % y)),
        (a, b) => {
            let x = ensure_numeric("mod", a)?;
            let y = ensure_numeric("mod", b)?;
            if y == 0.0 {
                return Ok(Value::Null);
            }
            Ok(Value::Float(x % y))
        }
    }
}

fn neg(args: &[Value]) -> Result<Value> {
    ensure_args_count("neg", args, 1)?;
    match &args[0] {
        Value::Null => Ok(Value::Null),
        Value::Integer(i) => i
            .checked_neg()
            .map(Value::Integer)
            .ok_or_else(|| anyhow!("integer overflow in `neg`")),
        Value::Float(f) => Ok(Value::Float(-f)),
        v => bail!("`neg` expects a numeric argument, got `{v}`"),
    }
}

fn abs(args: &[Value]) -> Result<Value> {
    ensure_args_count("abs", args, 1)?;
    match &args[0] {
        Value::Null => Ok(Value::Null),
        Value::Integer(i) => i
            .checked_abs()
            .map(Value::Integer)
            .ok_or_else(|| anyhow!("integer overflow in `abs`")),
        Value::Float(f) => Ok(Value::Float(f.abs())),
        v => bail!("`abs` expects a numeric argument, got `{v}`"),
    }
}

// round/floor/ceil pass integers through untouched.
fn float_unop(fcn: &str, args: &[Value], op: fn(f64) -> f64) -> Result<Value> {
    ensure_args_count(fcn, args, 1)?;
    match &args[0] {
        Value::Null => Ok(Value::Null),
        Value::Integer(i) => Ok(Value::Integer(*i)),
        Value::Float(f) => Ok(Value::Float(op(*f))),
        v => bail!("`{fcn}` expects a numeric argument, got `{v}`"),
    }
}

fn round(args: &[Value]) -> Result<Value> {
    float_unop("round", args, f64::round)
}

fn floor(args: &[Value]) -> Result<Value> {
    float_unop("floor", args, f64::floor)
}

fn ceil(args: &[Value]) -> Result<Value> {
    float_unop("ceil", args, f64::ceil)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_arithmetic_stays_integer() {
        assert_eq!(add(&[Value::Integer(2), Value::Integer(3)]).unwrap(), Value::Integer(5));
        assert_eq!(mul(&[Value::Integer(4), Value::Integer(5)]).unwrap(), Value::Integer(20));
    }

    #[test]
    fn float_operand_widens() {
        assert_eq!(
            add(&[Value::Integer(2), Value::Float(0.5)]).unwrap(),
            Value::Float(2.5)
        );
    }

    #[test]
    fn null_propagates() {
        assert_eq!(add(&[Value::Null, Value::Integer(1)]).unwrap(), Value::Null);
        assert_eq!(neg(&[Value::Null]).unwrap(), Value::Null);
    }

    #[test]
    fn division_by_zero_is_null() {
        assert_eq!(div(&[Value::Integer(1), Value::Integer(0)]).unwrap(), Value::Null);
        assert_eq!(modulo(&[Value::Integer(1), Value::Integer(0)]).unwrap(), Value::Null);
    }

    #[test]
    fn overflow_is_an_error() {
        assert!(add(&[Value::Integer(i64::MAX), Value::Integer(1)]).is_err());
        assert!(neg(&[Value::Integer(i64::MIN)]).is_err());
    }

    #[test]
    fn non_numeric_argument_is_an_error() {
        assert!(add(&[Value::from("a"), Value::Integer(1)]).is_err());
    }
}
