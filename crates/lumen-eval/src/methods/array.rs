//! Array methods.
//!
//! Callback methods (`every`, `filter`, `find`, `findIndex`, `map`, `some`)
//! take a lambda or a function value as their first argument. Without a
//! callable first argument they evaluate to `undefined`.

use crate::call::CallArg;
use crate::host::HostAdapter;
use crate::methods::{clamp_index, integer_or, relative_index, to_integer};
use crate::value::Value;

pub fn call(items: &[Value], method: &str, args: &[CallArg<'_, '_>], env: &dyn HostAdapter) -> Value {
    let values: Vec<Value> = args.iter().map(CallArg::to_value).collect();
    let len = items.len();

    match method {
        "every" | "filter" | "find" | "findIndex" | "map" | "some" => {
            let Some(callback) = args.first().filter(|a| a.is_callable()) else {
                tracing::trace!(method, "array method without a callback");
                return Value::Undefined;
            };
            let mut results = items
                .iter()
                .enumerate()
                .map(|(i, item)| (item, callback.call_back(env, item, i)));
            match method {
                "every" => Value::Bool(results.all(|(_, r)| r.is_truthy())),
                "some" => Value::Bool(results.any(|(_, r)| r.is_truthy())),
                "filter" => Value::Array(
                    results
                        .filter(|(_, r)| r.is_truthy())
                        .map(|(item, _)| item.clone())
                        .collect(),
                ),
                "find" => results
                    .find(|(_, r)| r.is_truthy())
                    .map(|(item, _)| item.clone())
                    .unwrap_or_default(),
                "findIndex" => Value::Number(
                    results
                        .position(|(_, r)| r.is_truthy())
                        .map_or(-1.0, |i| i as f64),
                ),
                _ => Value::Array(results.map(|(_, r)| r).collect()),
            }
        }
        "at" => relative_index(integer_or(&values, 0, 0.0), len)
            .map(|i| items[i].clone())
            .unwrap_or_default(),
        "concat" => {
            let mut out = items.to_vec();
            for value in values {
                match value {
                    Value::Array(more) => out.extend(more),
                    other => out.push(other),
                }
            }
            Value::Array(out)
        }
        "flat" => {
            let depth = integer_or(&values, 0, 1.0);
            let mut out = Vec::new();
            flatten(items, depth, &mut out);
            Value::Array(out)
        }
        "includes" => {
            let search = values.first().cloned().unwrap_or_default();
            let from = clamp_index(integer_or(&values, 1, 0.0), len);
            Value::Bool(items[from..].iter().any(|v| v.same_value_zero(&search)))
        }
        "indexOf" => {
            let search = values.first().cloned().unwrap_or_default();
            let from = clamp_index(integer_or(&values, 1, 0.0), len);
            let found = items[from..]
                .iter()
                .position(|v| v.strict_equals(&search))
                .map(|i| i + from);
            Value::Number(found.map_or(-1.0, |i| i as f64))
        }
        "lastIndexOf" => {
            let search = values.first().cloned().unwrap_or_default();
            let from = match values.get(1) {
                None => len as f64 - 1.0,
                Some(v) => {
                    let n = to_integer(v);
                    if n < 0.0 {
                        len as f64 + n
                    } else {
                        n.min(len as f64 - 1.0)
                    }
                }
            };
            if from < 0.0 {
                return Value::Number(-1.0);
            }
            let found = items[..=from as usize]
                .iter()
                .rposition(|v| v.strict_equals(&search));
            Value::Number(found.map_or(-1.0, |i| i as f64))
        }
        "join" => {
            let separator = match values.first() {
                None | Some(Value::Undefined) => ",".to_string(),
                Some(v) => v.to_string(),
            };
            let parts: Vec<String> = items
                .iter()
                .map(|v| if v.is_nullish() { String::new() } else { v.to_string() })
                .collect();
            Value::String(parts.join(&separator))
        }
        "reverse" => Value::Array(items.iter().rev().cloned().collect()),
        "slice" => {
            let start = clamp_index(integer_or(&values, 0, 0.0), len);
            let end = clamp_index(integer_or(&values, 1, len as f64), len);
            Value::Array(items[start..end.max(start)].to_vec())
        }
        _ => Value::Undefined,
    }
}

fn flatten(items: &[Value], depth: f64, out: &mut Vec<Value>) {
    for item in items {
        match item {
            Value::Array(inner) if depth >= 1.0 => flatten(inner, depth - 1.0, out),
            other => out.push(other.clone()),
        }
    }
}
