//! Builtin functions available to every scope

use std::collections::HashMap;

use super::exception::Exception;
use super::ops::{binary, checked_len, compare};
use super::value::{Num, Value};
use crate::lang::{BinOp, CmpOp};

type Builtin = fn(&[Value]) -> Result<Value, Exception>;

const BUILTINS: &[(&str, Builtin)] = &[
    ("print", print),
    ("len", len),
    ("abs", abs),
    ("min", min),
    ("max", max),
    ("sum", sum),
    ("str", str),
    ("int", int),
    ("float", float),
    ("bool", bool),
    ("range", range),
    ("round", round),
];

/// Table of builtin callables keyed by name
#[must_use]
pub fn table() -> HashMap<&'static str, Value> {
    BUILTINS
        .iter()
        .map(|&(name, func)| (name, Value::native(name, func)))
        .collect()
}

fn arity(name: &str, args: &[Value], min: usize, max: usize) -> Result<(), Exception> {
    if (min..=max).contains(&args.len()) {
        return Ok(());
    }
    let expected = if min == max {
        format!("exactly {min}")
    } else {
        format!("from {min} to {max}")
    };
    Err(Exception::type_error(format!(
        "{name}() takes {expected} argument(s) ({} given)",
        args.len()
    )))
}

fn print(args: &[Value]) -> Result<Value, Exception> {
    let line: Vec<String> = args.iter().map(ToString::to_string).collect();
    println!("{}", line.join(" "));
    Ok(Value::None)
}

fn len(args: &[Value]) -> Result<Value, Exception> {
    arity("len", args, 1, 1)?;
    let n = match &args[0] {
        Value::Str(s) => s.chars().count(),
        Value::List(items) => items.borrow().len(),
        Value::Tuple(items) => items.len(),
        other => {
            return Err(Exception::type_error(format!(
                "object of type '{}' has no len()",
                other.type_name()
            )))
        }
    };
    i64::try_from(n)
        .map(Value::Int)
        .map_err(|_| Exception::Overflow("length out of range".into()))
}

fn abs(args: &[Value]) -> Result<Value, Exception> {
    arity("abs", args, 1, 1)?;
    match args[0].as_num() {
        Some(Num::Int(i)) => i
            .checked_abs()
            .map(Value::Int)
            .ok_or_else(|| Exception::Overflow("integer result out of range".into())),
        Some(Num::Float(x)) => Ok(Value::Float(x.abs())),
        None => Err(Exception::type_error(format!(
            "bad operand type for abs(): '{}'",
            args[0].type_name()
        ))),
    }
}

fn candidates(name: &str, args: &[Value]) -> Result<Vec<Value>, Exception> {
    let items = match args {
        [] => {
            return Err(Exception::type_error(format!(
                "{name} expected at least 1 argument, got 0"
            )))
        }
        [iterable] => iterable.iter_values()?,
        many => many.to_vec(),
    };
    if items.is_empty() {
        return Err(Exception::value_error(format!(
            "{name}() arg is an empty sequence"
        )));
    }
    Ok(items)
}

fn extreme(name: &str, args: &[Value], replace_when: CmpOp) -> Result<Value, Exception> {
    let mut items = candidates(name, args)?.into_iter();
    let mut best = items.next().unwrap_or(Value::None);
    for item in items {
        if compare(replace_when, &item, &best)? {
            best = item;
        }
    }
    Ok(best)
}

fn min(args: &[Value]) -> Result<Value, Exception> {
    extreme("min", args, CmpOp::Lt)
}

fn max(args: &[Value]) -> Result<Value, Exception> {
    extreme("max", args, CmpOp::Gt)
}

fn sum(args: &[Value]) -> Result<Value, Exception> {
    arity("sum", args, 1, 2)?;
    let start = args.get(1).cloned().unwrap_or(Value::Int(0));
    args[0]
        .iter_values()?
        .iter()
        .try_fold(start, |acc, item| binary(BinOp::Add, &acc, item))
}

fn str(args: &[Value]) -> Result<Value, Exception> {
    arity("str", args, 0, 1)?;
    Ok(Value::str(args.first().map(ToString::to_string).unwrap_or_default()))
}

#[allow(clippy::cast_possible_truncation)]
fn int(args: &[Value]) -> Result<Value, Exception> {
    arity("int", args, 0, 1)?;
    let Some(value) = args.first() else {
        return Ok(Value::Int(0));
    };
    match value {
        Value::Str(s) => s.trim().parse::<i64>().map(Value::Int).map_err(|_| {
            Exception::value_error(format!(
                "invalid literal for int() with base 10: {}",
                value.repr()
            ))
        }),
        other => match other.as_num() {
            Some(Num::Int(i)) => Ok(Value::Int(i)),
            Some(Num::Float(x)) if x.is_finite() => Ok(Value::Int(x.trunc() as i64)),
            Some(Num::Float(_)) => Err(Exception::Overflow(
                "cannot convert float infinity or nan to integer".into(),
            )),
            None => Err(Exception::type_error(format!(
                "int() argument must be a string or a number, not '{}'",
                other.type_name()
            ))),
        },
    }
}

fn float(args: &[Value]) -> Result<Value, Exception> {
    arity("float", args, 0, 1)?;
    let Some(value) = args.first() else {
        return Ok(Value::Float(0.0));
    };
    match value {
        Value::Str(s) => s.trim().parse::<f64>().map(Value::Float).map_err(|_| {
            Exception::value_error(format!(
                "could not convert string to float: {}",
                value.repr()
            ))
        }),
        other => other
            .as_num()
            .map(|n| Value::Float(n.as_f64()))
            .ok_or_else(|| {
                Exception::type_error(format!(
                    "float() argument must be a string or a number, not '{}'",
                    other.type_name()
                ))
            }),
    }
}

fn bool(args: &[Value]) -> Result<Value, Exception> {
    arity("bool", args, 0, 1)?;
    Ok(Value::Bool(args.first().is_some_and(Value::is_truthy)))
}

fn range(args: &[Value]) -> Result<Value, Exception> {
    arity("range", args, 1, 3)?;
    let mut bounds = Vec::with_capacity(args.len());
    for arg in args {
        bounds.push(arg.as_index().ok_or_else(|| {
            Exception::type_error(format!(
                "'{}' object cannot be interpreted as an integer",
                arg.type_name()
            ))
        })?);
    }
    let (start, stop, step) = match *bounds.as_slice() {
        [] => (0, 0, 1),
        [stop] => (0, stop, 1),
        [start, stop] => (start, stop, 1),
        [start, stop, step, ..] => (start, stop, step),
    };
    if step == 0 {
        return Err(Exception::value_error("range() arg 3 must not be zero"));
    }
    let (start, stop, step) = (i128::from(start), i128::from(stop), i128::from(step));
    let span = if step > 0 { stop - start } else { start - stop };
    let count = if span > 0 {
        (span + step.abs() - 1) / step.abs()
    } else {
        0
    };
    let count = usize::try_from(count).unwrap_or(usize::MAX);
    checked_len(count, 1)?;
    let mut items = Vec::with_capacity(count);
    let mut current = start;
    for _ in 0..count {
        items.push(Value::Int(
            i64::try_from(current)
                .map_err(|_| Exception::Overflow("range() item out of range".into()))?,
        ));
        current += step;
    }
    Ok(Value::list(items))
}

/// Round half to even, as the language does
fn round_half_even(x: f64) -> f64 {
    let rounded = x.round();
    if (x - x.trunc()).abs() == 0.5 {
        2.0 * (x / 2.0).round()
    } else {
        rounded
    }
}

#[allow(clippy::cast_possible_truncation)]
fn round(args: &[Value]) -> Result<Value, Exception> {
    arity("round", args, 1, 2)?;
    let Some(number) = args[0].as_num() else {
        return Err(Exception::type_error(format!(
            "type {} doesn't define __round__ method",
            args[0].type_name()
        )));
    };
    let digits = match args.get(1) {
        None | Some(Value::None) => None,
        Some(d) => Some(d.as_index().ok_or_else(|| {
            Exception::type_error(format!(
                "'{}' object cannot be interpreted as an integer",
                d.type_name()
            ))
        })?),
    };
    match (number, digits) {
        (Num::Int(i), _) => Ok(Value::Int(i)),
        (Num::Float(x), None) if !x.is_finite() => Err(Exception::Overflow(
            "cannot convert float infinity or nan to integer".into(),
        )),
        (Num::Float(x), None) => Ok(Value::Int(round_half_even(x) as i64)),
        (Num::Float(x), Some(d)) => {
            let scale = 10f64.powi(i32::try_from(d.clamp(-308, 308)).unwrap_or(0));
            Ok(Value::Float(round_half_even(x * scale) / scale))
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn call(name: &str, args: &[Value]) -> Result<Value, Exception> {
        let table = table();
        let Value::Native(native) = &table[name] else {
            panic!("{name} is not native");
        };
        native.invoke(args)
    }

    #[test]
    fn test_table_has_every_builtin() {
        let table = table();
        for name in [
            "print", "len", "abs", "min", "max", "sum", "str", "int", "float", "bool", "range",
            "round",
        ] {
            assert!(table.contains_key(name), "missing {name}");
        }
    }

    #[test]
    fn test_len_and_sum() {
        let list = Value::list(vec![Value::Int(1), Value::Int(2), Value::Float(0.5)]);
        assert_eq!(call("len", &[list.clone()]).unwrap(), Value::Int(3));
        assert_eq!(call("sum", &[list]).unwrap(), Value::Float(3.5));
        assert!(call("len", &[Value::Int(1)]).is_err());
    }

    #[test]
    fn test_min_max_over_args_and_iterables() {
        let args = [Value::Int(3), Value::Int(1), Value::Int(2)];
        assert_eq!(call("min", &args).unwrap(), Value::Int(1));
        assert_eq!(call("max", &args).unwrap(), Value::Int(3));
        let err = call("max", &[Value::list(vec![])]).unwrap_err();
        assert_eq!(err.kind(), "ValueError");
    }

    #[test]
    fn test_conversions() {
        assert_eq!(call("int", &[Value::str(" 42 ")]).unwrap(), Value::Int(42));
        assert_eq!(call("int", &[Value::Float(-2.7)]).unwrap(), Value::Int(-2));
        assert_eq!(call("float", &[Value::str("0.3")]).unwrap(), Value::Float(0.3));
        assert_eq!(call("str", &[Value::Float(0.5)]).unwrap(), Value::str("0.5"));
        assert_eq!(call("bool", &[Value::str("")]).unwrap(), Value::Bool(false));
        assert_eq!(call("int", &[Value::str("x")]).unwrap_err().kind(), "ValueError");
    }

    #[test]
    fn test_range_forms() {
        let r = call("range", &[Value::Int(3)]).unwrap();
        assert_eq!(r.to_string(), "[0, 1, 2]");
        let r = call("range", &[Value::Int(5), Value::Int(0), Value::Int(-2)]).unwrap();
        assert_eq!(r.to_string(), "[5, 3, 1]");
        assert!(call("range", &[Value::Int(0), Value::Int(1), Value::Int(0)]).is_err());
        let r = call("range", &[Value::Int(0), Value::Int(10), Value::Int(4)]).unwrap();
        assert_eq!(r.to_string(), "[0, 4, 8]");
        let r = call("range", &[Value::Int(i64::MAX - 1), Value::Int(i64::MAX)]).unwrap();
        assert_eq!(r.to_string(), format!("[{}]", i64::MAX - 1));
        assert_eq!(call("range", &[Value::Int(3), Value::Int(1)]).unwrap().to_string(), "[]");
    }

    #[test]
    fn test_huge_range_raises_memory_error() {
        let err = call("range", &[Value::Int(1_000_000_000_000)]).unwrap_err();
        assert_eq!(err.kind(), "MemoryError");
        let err = call("range", &[Value::Int(i64::MIN), Value::Int(i64::MAX)]).unwrap_err();
        assert_eq!(err.kind(), "MemoryError");
    }

    #[test]
    fn test_round_half_to_even() {
        assert_eq!(call("round", &[Value::Float(2.5)]).unwrap(), Value::Int(2));
        assert_eq!(call("round", &[Value::Float(3.5)]).unwrap(), Value::Int(4));
        assert_eq!(
            call("round", &[Value::Float(0.125), Value::Int(2)]).unwrap(),
            Value::Float(0.12)
        );
    }
}
