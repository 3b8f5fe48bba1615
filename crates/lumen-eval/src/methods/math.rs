//! `Math` static methods.

use crate::value::Value;

pub fn call(method: &str, args: &[Value]) -> Value {
    let x = args.first().map_or(f64::NAN, Value::to_number);
    let y = args.get(1).map_or(f64::NAN, Value::to_number);
    let result = match method {
        "abs" => x.abs(),
        "ceil" => x.ceil(),
        "floor" => x.floor(),
        "max" => fold(args, f64::NEG_INFINITY, f64::max),
        "min" => fold(args, f64::INFINITY, f64::min),
        "pow" => x.powf(y),
        "round" => round(x),
        "sign" => {
            if x.is_nan() || x == 0.0 {
                x
            } else {
                x.signum()
            }
        }
        "sqrt" => x.sqrt(),
        "trunc" => x.trunc(),
        _ => return Value::Undefined,
    };
    Value::Number(result)
}

fn fold(args: &[Value], init: f64, pick: fn(f64, f64) -> f64) -> f64 {
    args.iter().map(Value::to_number).fold(init, |acc, n| {
        if acc.is_nan() || n.is_nan() {
            f64::NAN
        } else {
            pick(acc, n)
        }
    })
}

/// Halves round towards positive infinity.
fn round(x: f64) -> f64 {
    let r = x.round();
    if r - x == -0.5 {
        r + 1.0
    } else {
        r
    }
}
