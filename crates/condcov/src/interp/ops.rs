//! Operator semantics

use std::cmp::Ordering;

use super::exception::Exception;
use super::value::{Num, Value};
use crate::lang::{BinOp, CmpOp, UnaryOp};

/// Largest string (in bytes) or sequence a single operation may build
pub const MAX_SEQUENCE_LEN: usize = 1 << 24;

fn overflow() -> Exception {
    Exception::Overflow("integer result out of range".into())
}

fn unsupported(op: &str, left: &Value, right: &Value) -> Exception {
    Exception::type_error(format!(
        "unsupported operand type(s) for {op}: '{}' and '{}'",
        left.type_name(),
        right.type_name()
    ))
}

/// Apply a unary operator
pub fn unary(op: UnaryOp, operand: &Value) -> Result<Value, Exception> {
    match (op, operand.as_num()) {
        (UnaryOp::Not, _) => Ok(Value::Bool(!operand.is_truthy())),
        (UnaryOp::Neg, Some(Num::Int(i))) => i.checked_neg().map(Value::Int).ok_or_else(overflow),
        (UnaryOp::Neg, Some(Num::Float(x))) => Ok(Value::Float(-x)),
        (UnaryOp::Pos, Some(Num::Int(i))) => Ok(Value::Int(i)),
        (UnaryOp::Pos, Some(Num::Float(x))) => Ok(Value::Float(x)),
        (UnaryOp::Neg | UnaryOp::Pos, None) => Err(Exception::type_error(format!(
            "bad operand type for unary {}: '{}'",
            if op == UnaryOp::Neg { "-" } else { "+" },
            operand.type_name()
        ))),
    }
}

/// Apply a binary arithmetic operator
pub fn binary(op: BinOp, left: &Value, right: &Value) -> Result<Value, Exception> {
    if let (Some(a), Some(b)) = (left.as_num(), right.as_num()) {
        return arithmetic(op, a, b);
    }
    match (op, left, right) {
        (BinOp::Add, Value::Str(a), Value::Str(b)) => Ok(Value::str(format!("{a}{b}"))),
        (BinOp::Add, Value::List(a), Value::List(b)) => {
            let mut items = a.borrow().clone();
            items.extend(b.borrow().iter().cloned());
            Ok(Value::list(items))
        }
        (BinOp::Add, Value::Tuple(a), Value::Tuple(b)) => {
            Ok(Value::tuple(a.iter().chain(b.iter()).cloned().collect()))
        }
        (BinOp::Mul, seq, count) | (BinOp::Mul, count, seq)
            if count.as_index().is_some() && !matches!(seq, Value::Int(_) | Value::Bool(_)) =>
        {
            repeat(seq, count.as_index().unwrap_or(0))?
                .ok_or_else(|| unsupported(op.symbol(), left, right))
        }
        _ => Err(unsupported(op.symbol(), left, right)),
    }
}

fn repeat(seq: &Value, count: i64) -> Result<Option<Value>, Exception> {
    let n = usize::try_from(count).unwrap_or(0);
    let value = match seq {
        Value::Str(s) => {
            checked_len(s.len(), n)?;
            Value::str(s.repeat(n))
        }
        Value::List(items) => Value::list(repeat_items(&items.borrow(), n)?),
        Value::Tuple(items) => Value::tuple(repeat_items(items, n)?),
        _ => return Ok(None),
    };
    Ok(Some(value))
}

fn repeat_items(items: &[Value], times: usize) -> Result<Vec<Value>, Exception> {
    if checked_len(items.len(), times)? == 0 {
        return Ok(Vec::new());
    }
    Ok(std::iter::repeat(items).take(times).flatten().cloned().collect())
}

/// Length of `len` repeated `times`, refused past [`MAX_SEQUENCE_LEN`]
pub fn checked_len(len: usize, times: usize) -> Result<usize, Exception> {
    len.checked_mul(times)
        .filter(|&total| total <= MAX_SEQUENCE_LEN)
        .ok_or_else(|| {
            Exception::Memory(format!(
                "sequence of {len} x {times} items exceeds the limit of {MAX_SEQUENCE_LEN}"
            ))
        })
}

fn arithmetic(op: BinOp, a: Num, b: Num) -> Result<Value, Exception> {
    if let (Num::Int(a), Num::Int(b)) = (a, b) {
        return int_arithmetic(op, a, b);
    }
    let (x, y) = (a.as_f64(), b.as_f64());
    let value = match op {
        BinOp::Add => x + y,
        BinOp::Sub => x - y,
        BinOp::Mul => x * y,
        BinOp::Div => {
            if y == 0.0 {
                return Err(Exception::ZeroDivision("float division by zero".into()));
            }
            x / y
        }
        BinOp::FloorDiv => {
            if y == 0.0 {
                return Err(Exception::ZeroDivision(
                    "float floor division by zero".into(),
                ));
            }
            (x / y).floor()
        }
        BinOp::Mod => {
            if y == 0.0 {
                return Err(Exception::ZeroDivision("float modulo".into()));
            }
            float_mod(x, y)
        }
        BinOp::Pow => {
            if x == 0.0 && y < 0.0 {
                return Err(Exception::ZeroDivision(
                    "0.0 cannot be raised to a negative power".into(),
                ));
            }
            x.powf(y)
        }
    };
    Ok(Value::Float(value))
}

#[allow(clippy::cast_precision_loss)]
fn int_arithmetic(op: BinOp, a: i64, b: i64) -> Result<Value, Exception> {
    let value = match op {
        BinOp::Add => a.checked_add(b),
        BinOp::Sub => a.checked_sub(b),
        BinOp::Mul => a.checked_mul(b),
        BinOp::Div => {
            if b == 0 {
                return Err(Exception::ZeroDivision("division by zero".into()));
            }
            return Ok(Value::Float(a as f64 / b as f64));
        }
        BinOp::FloorDiv => {
            if b == 0 {
                return Err(Exception::ZeroDivision(
                    "integer division or modulo by zero".into(),
                ));
            }
            a.checked_div(b).map(|q| {
                if a % b != 0 && ((a < 0) != (b < 0)) {
                    q - 1
                } else {
                    q
                }
            })
        }
        BinOp::Mod => {
            if b == 0 {
                return Err(Exception::ZeroDivision(
                    "integer division or modulo by zero".into(),
                ));
            }
            a.checked_rem(b)
                .map(|r| if r != 0 && ((r < 0) != (b < 0)) { r + b } else { r })
        }
        BinOp::Pow => {
            if b < 0 {
                return arithmetic(op, Num::Float(a as f64), Num::Int(b));
            }
            u32::try_from(b).ok().and_then(|exp| a.checked_pow(exp))
        }
    };
    value.map(Value::Int).ok_or_else(overflow)
}

fn float_mod(x: f64, y: f64) -> f64 {
    let r = x % y;
    if r != 0.0 && ((r < 0.0) != (y < 0.0)) {
        r + y
    } else {
        r
    }
}

/// Evaluate one link of a comparison chain
pub fn compare(op: CmpOp, left: &Value, right: &Value) -> Result<bool, Exception> {
    let ordered = |accept: fn(Ordering) -> bool| {
        left.py_cmp(right).map(accept).ok_or_else(|| {
            Exception::type_error(format!(
                "'{}' not supported between instances of '{}' and '{}'",
                op.symbol(),
                left.type_name(),
                right.type_name()
            ))
        })
    };
    match op {
        CmpOp::Eq => Ok(left.py_eq(right)),
        CmpOp::NotEq => Ok(!left.py_eq(right)),
        CmpOp::Lt => ordered(Ordering::is_lt),
        CmpOp::LtE => ordered(Ordering::is_le),
        CmpOp::Gt => ordered(Ordering::is_gt),
        CmpOp::GtE => ordered(Ordering::is_ge),
        CmpOp::In => contains(right, left),
        CmpOp::NotIn => contains(right, left).map(|found| !found),
        CmpOp::Is => Ok(left.is_same(right)),
        CmpOp::IsNot => Ok(!left.is_same(right)),
    }
}

fn contains(container: &Value, item: &Value) -> Result<bool, Exception> {
    match (container, item) {
        (Value::Str(haystack), Value::Str(needle)) => Ok(haystack.contains(needle.as_ref())),
        (Value::Str(_), other) => Err(Exception::type_error(format!(
            "'in <string>' requires string as left operand, not {}",
            other.type_name()
        ))),
        (Value::List(items), _) => Ok(items.borrow().iter().any(|v| v.py_eq(item))),
        (Value::Tuple(items), _) => Ok(items.iter().any(|v| v.py_eq(item))),
        (other, _) => Err(Exception::type_error(format!(
            "argument of type '{}' is not iterable",
            other.type_name()
        ))),
    }
}

/// Resolve a possibly negative index against a sequence length
pub fn normalize_index(index: i64, len: usize) -> Option<usize> {
    let len = i64::try_from(len).ok()?;
    let resolved = if index < 0 { index + len } else { index };
    if (0..len).contains(&resolved) {
        usize::try_from(resolved).ok()
    } else {
        None
    }
}

/// `value[index]`
pub fn subscript(value: &Value, index: &Value) -> Result<Value, Exception> {
    let Some(i) = index.as_index() else {
        return Err(Exception::type_error(format!(
            "{} indices must be integers, not {}",
            value.type_name(),
            index.type_name()
        )));
    };
    let out_of_range = |kind: &str| Exception::Index(format!("{kind} index out of range"));
    match value {
        Value::List(items) => {
            let items = items.borrow();
            normalize_index(i, items.len())
                .map(|i| items[i].clone())
                .ok_or_else(|| out_of_range("list"))
        }
        Value::Tuple(items) => normalize_index(i, items.len())
            .map(|i| items[i].clone())
            .ok_or_else(|| out_of_range("tuple")),
        Value::Str(s) => {
            let chars: Vec<char> = s.chars().collect();
            normalize_index(i, chars.len())
                .map(|i| Value::str(chars[i].to_string()))
                .ok_or_else(|| out_of_range("string"))
        }
        other => Err(Exception::type_error(format!(
            "'{}' object is not subscriptable",
            other.type_name()
        ))),
    }
}
