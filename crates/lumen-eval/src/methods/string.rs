//! String methods. Positions count Unicode scalar values.

use crate::methods::{
    arg, clamp_index, integer_or, relative_index, to_integer, MAX_STRING_LENGTH,
};
use crate::value::Value;

pub fn call(s: &str, method: &str, args: &[Value]) -> Value {
    let chars: Vec<char> = s.chars().collect();
    let len = chars.len();
    let text = |i: usize| arg(args, i).to_string();

    match method {
        "at" => relative_index(integer_or(args, 0, 0.0), len)
            .map(|i| Value::String(chars[i].to_string()))
            .unwrap_or_default(),
        "charAt" => {
            let i = integer_or(args, 0, 0.0);
            let c = (i >= 0.0 && i < len as f64).then(|| chars[i as usize].to_string());
            Value::String(c.unwrap_or_default())
        }
        "concat" => {
            let mut out = s.to_string();
            for a in args {
                out.push_str(&a.to_string());
            }
            Value::String(out)
        }
        "endsWith" => {
            let end = clamp_index(integer_or(args, 1, len as f64).max(0.0), len);
            let needle: Vec<char> = text(0).chars().collect();
            Value::Bool(chars[..end].ends_with(&needle))
        }
        "startsWith" => {
            let start = clamp_index(integer_or(args, 1, 0.0).max(0.0), len);
            let needle: Vec<char> = text(0).chars().collect();
            Value::Bool(chars[start..].starts_with(&needle))
        }
        "includes" => {
            let from = clamp_index(integer_or(args, 1, 0.0).max(0.0), len);
            let needle: Vec<char> = text(0).chars().collect();
            Value::Bool(find(&chars, &needle, from).is_some())
        }
        "indexOf" => {
            let from = clamp_index(integer_or(args, 1, 0.0).max(0.0), len);
            let needle: Vec<char> = text(0).chars().collect();
            position(find(&chars, &needle, from))
        }
        "lastIndexOf" => {
            let from = match args.get(1).map(Value::to_number) {
                Some(n) if !n.is_nan() => clamp_index(n.trunc().max(0.0), len),
                _ => len,
            };
            let needle: Vec<char> = text(0).chars().collect();
            position(rfind(&chars, &needle, from))
        }
        "padEnd" | "padStart" => {
            let target = to_integer(&arg(args, 0));
            let fill = match args.get(1) {
                None | Some(Value::Undefined) => " ".to_string(),
                Some(v) => v.to_string(),
            };
            if target <= len as f64 || fill.is_empty() {
                return Value::String(s.to_string());
            }
            if target > MAX_STRING_LENGTH as f64 {
                tracing::trace!(target, "pad length too large");
                return Value::Undefined;
            }
            let padding: String = fill.chars().cycle().take(target as usize - len).collect();
            if method == "padEnd" {
                Value::String(format!("{s}{padding}"))
            } else {
                Value::String(format!("{padding}{s}"))
            }
        }
        "repeat" => {
            let count = to_integer(&arg(args, 0));
            if count < 0.0 || count.is_infinite() {
                tracing::trace!(count, "invalid repeat count");
                return Value::Undefined;
            }
            let total = (count as usize).checked_mul(len);
            if !total.is_some_and(|total| total <= MAX_STRING_LENGTH) {
                tracing::trace!(count, "repeated string too long");
                return Value::Undefined;
            }
            Value::String(s.repeat(count as usize))
        }
        "replace" => Value::String(s.replacen(&text(0), &text(1), 1)),
        "replaceAll" => {
            let pattern = text(0);
            let replacement = text(1);
            if pattern.is_empty() {
                // Insert between every character, including both ends.
                let mut out = replacement.clone();
                for c in &chars {
                    out.push(*c);
                    out.push_str(&replacement);
                }
                Value::String(out)
            } else {
                Value::String(s.replace(&pattern, &replacement))
            }
        }
        "slice" => {
            let start = clamp_index(integer_or(args, 0, 0.0), len);
            let end = clamp_index(integer_or(args, 1, len as f64), len);
            Value::String(substring(&chars, start, end.max(start)))
        }
        "substring" => {
            let bound = |i: usize, default: f64| {
                integer_or(args, i, default).clamp(0.0, len as f64) as usize
            };
            let (a, b) = (bound(0, 0.0), bound(1, len as f64));
            Value::String(substring(&chars, a.min(b), a.max(b)))
        }
        "split" => split(s, args),
        "toLowerCase" => Value::String(s.to_lowercase()),
        "toUpperCase" => Value::String(s.to_uppercase()),
        "trim" => Value::String(s.trim().to_string()),
        "trimEnd" => Value::String(s.trim_end().to_string()),
        "trimStart" => Value::String(s.trim_start().to_string()),
        _ => Value::Undefined,
    }
}

fn split(s: &str, args: &[Value]) -> Value {
    let limit = match args.get(1) {
        None | Some(Value::Undefined) => usize::MAX,
        Some(v) => to_integer(v).max(0.0) as usize,
    };
    let parts: Vec<Value> = match args.first() {
        None | Some(Value::Undefined) => vec![Value::from(s)],
        Some(separator) => {
            let separator = separator.to_string();
            if separator.is_empty() {
                s.chars().map(|c| Value::String(c.to_string())).collect()
            } else {
                s.split(separator.as_str()).map(Value::from).collect()
            }
        }
    };
    Value::Array(parts.into_iter().take(limit).collect())
}

fn substring(chars: &[char], start: usize, end: usize) -> String {
    chars[start..end].iter().collect()
}

fn position(found: Option<usize>) -> Value {
    Value::Number(found.map_or(-1.0, |i| i as f64))
}

fn find(haystack: &[char], needle: &[char], from: usize) -> Option<usize> {
    if needle.len() > haystack.len() {
        return None;
    }
    (from..=haystack.len() - needle.len()).find(|&i| haystack[i..].starts_with(needle))
}

fn rfind(haystack: &[char], needle: &[char], from: usize) -> Option<usize> {
    if needle.len() > haystack.len() {
        return None;
    }
    let last = from.min(haystack.len() - needle.len());
    (0..=last).rev().find(|&i| haystack[i..].starts_with(needle))
}
