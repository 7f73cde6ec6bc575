// Copyright (c) The exprus Authors.
// Licensed under the MIT License.

use crate::value::Value;

use anyhow::{bail, Result};

pub fn ensure_args_count(fcn: &str, args: &[Value], expected: usize) -> Result<()> {
    if args.len() != expected {
        if expected == 1 {
            bail!("`{fcn}` expects 1 argument, got {}", args.len());
        }
        bail!("`{fcn}` expects {expected} arguments, got {}", args.len());
    }
    Ok(())
}

pub fn ensure_numeric(fcn: &str, v: &Value) -> Result<f64> {
    match v {
        Value::Integer(i) => Ok(*i as f64),
        Value::Float(f) => Ok(*f),
        _ => bail!("`{fcn}` expects a numeric argument, got `{v}`"),
    }
}

pub fn ensure_string<'a>(fcn: &str, v: &'a Value) -> Result<&'a str> {
    match v {
        Value::String(s) => Ok(s.as_ref()),
        _ => bail!("`{fcn}` expects a string argument, got `{v}`"),
    }
}
