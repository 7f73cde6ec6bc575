// Copyright (c) The exprus Authors.
// Licensed under the MIT License.

//! Builtin aggregate functions.
//!
//! Accumulator state lives entirely inside the caller-provided byte region;
//! every layout is chosen so that an all-zero region is the empty state.
//! Regions use little-endian fixed-size encodings, which keeps partial
//! aggregates mergeable across servers regardless of host byte order.

use crate::symbols::{AggregateFcn, SymbolTable};
use crate::value::Value;

use anyhow::{bail, Result};

pub fn register(m: &mut SymbolTable) {
    m.register_aggregate("count", COUNT);
    m.register_aggregate("sum", SUM);
    m.register_aggregate("min", MIN);
    m.register_aggregate("max", MAX);
    m.register_aggregate("mean", MEAN);
    m.register_aggregate("avg", MEAN);
}

fn read_u64(region: &[u8], at: usize) -> u64 {
    let mut buf = [0u8; 8];
    buf.copy_from_slice(&region[at..at + 8]);
    u64::from_le_bytes(buf)
}

fn write_u64(region: &mut [u8], at: usize, v: u64) {
    region[at..at + 8].copy_from_slice(&v.to_le_bytes());
}

fn read_i64(region: &[u8], at: usize) -> i64 {
    let mut buf = [0u8; 8];
    buf.copy_from_slice(&region[at..at + 8]);
    i64::from_le_bytes(buf)
}

fn write_i64(region: &mut [u8], at: usize, v: i64) {
    region[at..at + 8].copy_from_slice(&v.to_le_bytes());
}

fn read_f64(region: &[u8], at: usize) -> f64 {
    f64::from_le_bytes(read_u64(region, at).to_le_bytes())
}

fn write_f64(region: &mut [u8], at: usize, v: f64) {
    region[at..at + 8].copy_from_slice(&v.to_le_bytes());
}

// ---------------------------------------------------------------------------
// count. layout: [0..8) u64 row count
// ---------------------------------------------------------------------------

pub const COUNT: AggregateFcn = AggregateFcn {
    scratch_size: 8,
    accumulate: count_accumulate,
    get: count_get,
    reset: zero_reset,
    merge: count_merge,
};

/// `count(x)` skips NULL inputs; `count()` counts every row.
fn count_accumulate(region: &mut [u8], args: &[Value]) -> Result<()> {
    if let Some(v) = args.first() {
        if v.is_null() {
            return Ok(());
        }
    }
    write_u64(region, 0, read_u64(region, 0).wrapping_add(1));
    Ok(())
}

fn count_get(region: &[u8]) -> Result<Value> {
    Ok(Value::Integer(read_u64(region, 0) as i64))
}

fn count_merge(dst: &mut [u8], src: &[u8]) -> Result<()> {
    write_u64(dst, 0, read_u64(dst, 0).wrapping_add(read_u64(src, 0)));
    Ok(())
}

fn zero_reset(region: &mut [u8]) {
    region.fill(0);
}

// ---------------------------------------------------------------------------
// sum. layout: [0] tag (0 empty, 1 integer, 2 float),
//               [8..16) i64 integer sum, [16..24) f64 float sum
//
// Sums stay integer until the first float input, then widen permanently.
// ---------------------------------------------------------------------------

const TAG_EMPTY: u8 = 0;
const TAG_INT: u8 = 1;
const TAG_FLOAT: u8 = 2;

pub const SUM: AggregateFcn = AggregateFcn {
    scratch_size: 24,
    accumulate: sum_accumulate,
    get: sum_get,
    reset: zero_reset,
    merge: sum_merge,
};

fn sum_add_integer(region: &mut [u8], i: i64) {
    match region[0] {
        TAG_FLOAT => write_f64(region, 16, read_f64(region, 16) + i as f64),
        _ => {
            write_i64(region, 8, read_i64(region, 8).wrapping_add(i));
            region[0] = TAG_INT;
        }
    }
}

fn sum_add_float(region: &mut [u8], f: f64) {
    match region[0] {
        TAG_INT => {
            // widen the running integer sum
            write_f64(region, 16, read_i64(region, 8) as f64 + f);
        }
        _ => write_f64(region, 16, read_f64(region, 16) + f),
    }
    region[0] = TAG_FLOAT;
}

fn sum_accumulate(region: &mut [u8], args: &[Value]) -> Result<()> {
    let v = match args.first() {
        None => bail!("`sum` expects 1 argument, got 0"),
        Some(v) => v,
    };
    match v {
        Value::Null => Ok(()),
        Value::Integer(i) => {
            sum_add_integer(region, *i);
            Ok(())
        }
        Value::Float(f) => {
            sum_add_float(region, *f);
            Ok(())
        }
        v => bail!("`sum` expects a numeric argument, got `{v}`"),
    }
}

/// The sum over an empty group is NULL.
fn sum_get(region: &[u8]) -> Result<Value> {
    match region[0] {
        TAG_EMPTY => Ok(Value::Null),
        TAG_INT => Ok(Value::Integer(read_i64(region, 8))),
        TAG_FLOAT => Ok(Value::Float(read_f64(region, 16))),
        tag => bail!("corrupt `sum` accumulator state (tag {tag})"),
    }
}

fn sum_merge(dst: &mut [u8], src: &[u8]) -> Result<()> {
    match src[0] {
        TAG_EMPTY => Ok(()),
        TAG_INT => {
            sum_add_integer(dst, read_i64(src, 8));
            Ok(())
        }
        TAG_FLOAT => {
            sum_add_float(dst, read_f64(src, 16));
            Ok(())
        }
        tag => bail!("corrupt `sum` accumulator state (tag {tag})"),
    }
}

// ---------------------------------------------------------------------------
// min / max. layout: [0] tag (0 empty, 1 integer, 2 float),
//                     [8..16) value bits (i64 or f64 per tag)
// ---------------------------------------------------------------------------

pub const MIN: AggregateFcn = AggregateFcn {
    scratch_size: 16,
    accumulate: min_accumulate,
    get: minmax_get,
    reset: zero_reset,
    merge: min_merge,
};

pub const MAX: AggregateFcn = AggregateFcn {
    scratch_size: 16,
    accumulate: max_accumulate,
    get: minmax_get,
    reset: zero_reset,
    merge: max_merge,
};

fn minmax_load(region: &[u8]) -> Result<Option<Value>> {
    match region[0] {
        TAG_EMPTY => Ok(None),
        TAG_INT => Ok(Some(Value::Integer(read_i64(region, 8)))),
        TAG_FLOAT => Ok(Some(Value::Float(read_f64(region, 8)))),
        tag => bail!("corrupt min/max accumulator state (tag {tag})"),
    }
}

fn minmax_store(region: &mut [u8], v: &Value) -> Result<()> {
    match v {
        Value::Integer(i) => {
            region[0] = TAG_INT;
            write_i64(region, 8, *i);
            Ok(())
        }
        Value::Float(f) => {
            region[0] = TAG_FLOAT;
            write_f64(region, 8, *f);
            Ok(())
        }
        v => bail!("min/max expects a numeric argument, got `{v}`"),
    }
}

fn minmax_fold(region: &mut [u8], v: &Value, keep_new: fn(&Value, &Value) -> bool) -> Result<()> {
    if v.is_null() {
        return Ok(());
    }
    if !matches!(v, Value::Integer(_) | Value::Float(_)) {
        bail!("min/max expects a numeric argument, got `{v}`");
    }
    match minmax_load(region)? {
        None => minmax_store(region, v),
        Some(cur) if keep_new(v, &cur) => minmax_store(region, v),
        Some(_) => Ok(()),
    }
}

fn keep_smaller(new: &Value, cur: &Value) -> bool {
    matches!(new.partial_cmp(cur), Some(core::cmp::Ordering::Less))
}

fn keep_larger(new: &Value, cur: &Value) -> bool {
    matches!(new.partial_cmp(cur), Some(core::cmp::Ordering::Greater))
}

fn minmax_arg<'a>(fcn: &str, args: &'a [Value]) -> Result<&'a Value> {
    match args.first() {
        None => bail!("`{fcn}` expects 1 argument, got 0"),
        Some(v) => Ok(v),
    }
}

fn min_accumulate(region: &mut [u8], args: &[Value]) -> Result<()> {
    minmax_fold(region, minmax_arg("min", args)?, keep_smaller)
}

fn max_accumulate(region: &mut [u8], args: &[Value]) -> Result<()> {
    minmax_fold(region, minmax_arg("max", args)?, keep_larger)
}

/// NULL over an empty group, otherwise the extreme value seen so far.
fn minmax_get(region: &[u8]) -> Result<Value> {
    Ok(minmax_load(region)?.unwrap_or(Value::Null))
}

fn min_merge(dst: &mut [u8], src: &[u8]) -> Result<()> {
    match minmax_load(src)? {
        None => Ok(()),
        Some(v) => minmax_fold(dst, &v, keep_smaller),
    }
}

fn max_merge(dst: &mut [u8], src: &[u8]) -> Result<()> {
    match minmax_load(src)? {
        None => Ok(()),
        Some(v) => minmax_fold(dst, &v, keep_larger),
    }
}

// ---------------------------------------------------------------------------
// mean. layout: [0..8) f64 sum, [8..16) u64 count
// ---------------------------------------------------------------------------

pub const MEAN: AggregateFcn = AggregateFcn {
    scratch_size: 16,
    accumulate: mean_accumulate,
    get: mean_get,
    reset: zero_reset,
    merge: mean_merge,
};

fn mean_accumulate(region: &mut [u8], args: &[Value]) -> Result<()> {
    let v = match args.first() {
        None => bail!("`mean` expects 1 argument, got 0"),
        Some(v) => v,
    };
    if v.is_null() {
        return Ok(());
    }
    let x = match v.as_float() {
        Some(x) => x,
        None => bail!("`mean` expects a numeric argument, got `{v}`"),
    };
    write_f64(region, 0, read_f64(region, 0) + x);
    write_u64(region, 8, read_u64(region, 8).wrapping_add(1));
    Ok(())
}

fn mean_get(region: &[u8]) -> Result<Value> {
    let count = read_u64(region, 8);
    if count == 0 {
        return Ok(Value::Null);
    }
    Ok(Value::Float(read_f64(region, 0) / count as f64))
}

fn mean_merge(dst: &mut [u8], src: &[u8]) -> Result<()> {
    write_f64(dst, 0, read_f64(dst, 0) + read_f64(src, 0));
    write_u64(dst, 8, read_u64(dst, 8).wrapping_add(read_u64(src, 8)));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fresh(fcn: &AggregateFcn) -> Vec<u8> {
        vec![0; fcn.scratch_size]
    }

    #[test]
    fn count_skips_nulls_but_counts_bare_rows() {
        let mut s = fresh(&COUNT);
        (COUNT.accumulate)(&mut s, &[Value::Integer(1)]).unwrap();
        (COUNT.accumulate)(&mut s, &[Value::Null]).unwrap();
        (COUNT.accumulate)(&mut s, &[]).unwrap();
        assert_eq!((COUNT.get)(&s).unwrap(), Value::Integer(2));
    }

    #[test]
    fn sum_stays_integer_until_a_float_arrives() {
        let mut s = fresh(&SUM);
        assert_eq!((SUM.get)(&s).unwrap(), Value::Null);
        (SUM.accumulate)(&mut s, &[Value::Integer(2)]).unwrap();
        (SUM.accumulate)(&mut s, &[Value::Integer(3)]).unwrap();
        assert_eq!((SUM.get)(&s).unwrap(), Value::Integer(5));
        (SUM.accumulate)(&mut s, &[Value::Float(0.5)]).unwrap();
        assert_eq!((SUM.get)(&s).unwrap(), Value::Float(5.5));
        (SUM.accumulate)(&mut s, &[Value::Integer(1)]).unwrap();
        assert_eq!((SUM.get)(&s).unwrap(), Value::Float(6.5));
    }

    #[test]
    fn sum_merge_combines_partials() {
        let mut a = fresh(&SUM);
        let mut b = fresh(&SUM);
        (SUM.accumulate)(&mut a, &[Value::Integer(2)]).unwrap();
        (SUM.accumulate)(&mut b, &[Value::Float(1.5)]).unwrap();
        (SUM.merge)(&mut a, &b).unwrap();
        assert_eq!((SUM.get)(&a).unwrap(), Value::Float(3.5));
    }

    #[test]
    fn min_max_compare_across_numeric_types() {
        let mut lo = fresh(&MIN);
        let mut hi = fresh(&MAX);
        for v in [Value::Integer(3), Value::Float(1.5), Value::Null, Value::Integer(7)] {
            (MIN.accumulate)(&mut lo, &[v.clone()]).unwrap();
            (MAX.accumulate)(&mut hi, &[v]).unwrap();
        }
        assert_eq!((MIN.get)(&lo).unwrap(), Value::Float(1.5));
        assert_eq!((MAX.get)(&hi).unwrap(), Value::Integer(7));
    }

    #[test]
    fn mean_over_empty_group_is_null() {
        let s = fresh(&MEAN);
        assert_eq!((MEAN.get)(&s).unwrap(), Value::Null);
    }

    #[test]
    fn mean_averages_and_merges() {
        let mut a = fresh(&MEAN);
        let mut b = fresh(&MEAN);
        (MEAN.accumulate)(&mut a, &[Value::Integer(1)]).unwrap();
        (MEAN.accumulate)(&mut a, &[Value::Integer(2)]).unwrap();
        (MEAN.accumulate)(&mut b, &[Value::Integer(6)]).unwrap();
        (MEAN.merge)(&mut a, &b).unwrap();
        assert_eq!((MEAN.get)(&a).unwrap(), Value::Float(3.0));
    }

    #[test]
    fn reset_returns_to_empty_state() {
        let mut s = fresh(&SUM);
        (SUM.accumulate)(&mut s, &[Value::Integer(9)]).unwrap();
        (SUM.reset)(&mut s);
        assert_eq!((SUM.get)(&s).unwrap(), Value::Null);
    }

    #[test]
    fn non_numeric_input_is_an_error() {
        let mut s = fresh(&SUM);
        assert!((SUM.accumulate)(&mut s, &[Value::from("x")]).is_err());
    }
}
