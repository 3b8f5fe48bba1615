//! Binary operator semantics.

use std::cmp::Ordering;

use lumen_ast::BinaryOp;

use crate::value::Value;

/// Apply `op` to two evaluated operands.
///
/// `&&` and `||` are included for completeness; the evaluator handles them
/// itself so the right operand is only evaluated when needed.
pub fn apply(op: BinaryOp, left: Value, right: Value) -> Value {
    match op {
        BinaryOp::Add => add(left, right),
        BinaryOp::Sub => Value::Number(numeric(&left) - numeric(&right)),
        BinaryOp::Mul => Value::Number(numeric(&left) * numeric(&right)),
        BinaryOp::Div => Value::Number(divide(numeric(&left), numeric(&right))),
        BinaryOp::Mod => Value::Number(remainder(numeric(&left), numeric(&right))),
        BinaryOp::Eq => Value::Bool(left.strict_equals(&right)),
        BinaryOp::Neq => Value::Bool(!left.strict_equals(&right)),
        BinaryOp::Lt => compare(&left, &right, Ordering::is_lt),
        BinaryOp::Lte => compare(&left, &right, Ordering::is_le),
        BinaryOp::Gt => compare(&left, &right, Ordering::is_gt),
        BinaryOp::Gte => compare(&left, &right, Ordering::is_ge),
        BinaryOp::And => {
            if left.is_truthy() {
                right
            } else {
                left
            }
        }
        BinaryOp::Or => {
            if left.is_truthy() {
                left
            } else {
                right
            }
        }
    }
}

fn add(left: Value, right: Value) -> Value {
    match (&left, &right) {
        (Value::Number(a), Value::Number(b)) => Value::Number(a + b),
        _ => Value::String(format!("{left}{right}")),
    }
}

/// Arithmetic operand: numbers pass through, anything else is 0.
fn numeric(value: &Value) -> f64 {
    value.as_number().unwrap_or(0.0)
}

fn divide(a: f64, b: f64) -> f64 {
    if b == 0.0 {
        if a == 0.0 || a.is_nan() {
            f64::NAN
        } else if a > 0.0 {
            f64::INFINITY
        } else {
            f64::NEG_INFINITY
        }
    } else {
        a / b
    }
}

fn remainder(a: f64, b: f64) -> f64 {
    if b == 0.0 {
        f64::NAN
    } else {
        a % b
    }
}

fn compare(left: &Value, right: &Value, test: fn(Ordering) -> bool) -> Value {
    let ordering = match (left, right) {
        (Value::Number(a), Value::Number(b)) => a.partial_cmp(b),
        // Strings order by UTF-16 code unit.
        _ => Some(
            left.to_string()
                .encode_utf16()
                .cmp(right.to_string().encode_utf16()),
        ),
    };
    // NaN compares false against everything.
    Value::Bool(ordering.is_some_and(test))
}
