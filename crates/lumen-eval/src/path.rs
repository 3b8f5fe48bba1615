//! Property traversal.
//!
//! Every property read in the evaluator goes through [`get_property`], which
//! refuses forbidden keys before looking at the target at all.

use lumen_ast::builtins::is_forbidden_key;

use crate::value::Value;

/// Read one property. Forbidden keys, missing keys and non-object targets
/// all yield `undefined`.
pub fn get_property(target: &Value, key: &str) -> Value {
    if is_forbidden_key(key) {
        tracing::trace!(key, "blocked forbidden property");
        return Value::Undefined;
    }
    match target {
        Value::Object(map) => map.get(key).cloned().unwrap_or_default(),
        Value::Array(items) => {
            if key == "length" {
                Value::Number(items.len() as f64)
            } else {
                parse_index(key)
                    .and_then(|i| items.get(i))
                    .cloned()
                    .unwrap_or_default()
            }
        }
        Value::String(s) => {
            if key == "length" {
                Value::Number(s.chars().count() as f64)
            } else {
                parse_index(key)
                    .and_then(|i| s.chars().nth(i))
                    .map(|c| Value::String(c.to_string()))
                    .unwrap_or_default()
            }
        }
        _ => Value::Undefined,
    }
}

/// Walk a dotted path. `null`/`undefined` at any step yields `undefined`.
pub fn get_path(target: Value, path: &str) -> Value {
    walk(target, segments(path))
}

pub fn walk<'a>(target: Value, segments: impl IntoIterator<Item = &'a str>) -> Value {
    walk_with_parent(target, segments).1
}

/// Like [`walk`], also returning the object the final value was read from.
pub fn walk_with_parent<'a>(
    target: Value,
    segments: impl IntoIterator<Item = &'a str>,
) -> (Option<Value>, Value) {
    let mut parent = None;
    let mut current = target;
    for segment in segments {
        if current.is_nullish() {
            return (None, Value::Undefined);
        }
        let next = get_property(&current, segment);
        parent = Some(current);
        current = next;
    }
    (parent, current)
}

/// Non-empty `.`-separated segments of a path.
pub fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('.').filter(|s| !s.is_empty())
}

fn parse_index(key: &str) -> Option<usize> {
    if key.is_empty() || !key.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    key.parse().ok()
}
