//! Built-in method implementations, one module per receiver kind.
//!
//! Callers have already checked the method name against the allowlists in
//! `lumen_ast::builtins`; every function here still answers `undefined` for
//! a name it does not implement.

pub mod array;
pub mod date;
pub mod math;
pub mod string;

use crate::value::Value;

/// Longest string a built-in may produce, in characters.
pub(crate) const MAX_STRING_LENGTH: usize = (1 << 29) - 24;

/// Argument `i`, or `undefined` when absent.
pub(crate) fn arg(args: &[Value], i: usize) -> Value {
    args.get(i).cloned().unwrap_or_default()
}

/// `ToIntegerOrInfinity`: `NaN` becomes 0, everything else truncates.
pub(crate) fn to_integer(value: &Value) -> f64 {
    let n = value.to_number();
    if n.is_nan() {
        0.0
    } else {
        n.trunc()
    }
}

/// Resolve a possibly negative index the way `at` does. Out of range is `None`.
pub(crate) fn relative_index(position: f64, len: usize) -> Option<usize> {
    let len = len as f64;
    let resolved = if position < 0.0 { len + position } else { position };
    if resolved < 0.0 || resolved >= len {
        None
    } else {
        Some(resolved as usize)
    }
}

/// Clamp a possibly negative bound into `0..=len` the way `slice` does.
pub(crate) fn clamp_index(position: f64, len: usize) -> usize {
    let len_f = len as f64;
    if position < 0.0 {
        (len_f + position).max(0.0) as usize
    } else {
        position.min(len_f) as usize
    }
}

/// Optional integer argument: `undefined` falls back to `default`.
pub(crate) fn integer_or(args: &[Value], i: usize, default: f64) -> f64 {
    match args.get(i) {
        None | Some(Value::Undefined) => default,
        Some(v) => to_integer(v),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_relative_index() {
        assert_eq!(relative_index(0.0, 3), Some(0));
        assert_eq!(relative_index(-1.0, 3), Some(2));
        assert_eq!(relative_index(3.0, 3), None);
        assert_eq!(relative_index(-4.0, 3), None);
    }

    #[test]
    fn test_clamp_index() {
        assert_eq!(clamp_index(-2.0, 5), 3);
        assert_eq!(clamp_index(-10.0, 5), 0);
        assert_eq!(clamp_index(10.0, 5), 5);
        assert_eq!(clamp_index(f64::INFINITY, 5), 5);
    }

    #[test]
    fn test_to_integer() {
        assert_eq!(to_integer(&Value::from(2.9)), 2.0);
        assert_eq!(to_integer(&Value::from(-2.9)), -2.0);
        assert_eq!(to_integer(&Value::from("x")), 0.0);
        assert_eq!(integer_or(&[Value::Undefined], 0, 7.0), 7.0);
    }
}
