//! Global function table: the callees of `call` nodes whose target is `null`.

use std::collections::HashMap;
use std::sync::OnceLock;

use crate::value::Value;

/// A global function. Arguments arrive already evaluated.
pub type GlobalFn = fn(&[Value]) -> Value;

/// Name → function lookup for target-less calls.
#[derive(Debug, Clone, Default)]
pub struct GlobalFunctions {
    table: HashMap<String, GlobalFn>,
}

impl GlobalFunctions {
    /// An empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// The shared table of standard conversions.
    pub fn standard() -> &'static GlobalFunctions {
        static STANDARD: OnceLock<GlobalFunctions> = OnceLock::new();
        STANDARD.get_or_init(GlobalFunctions::with_standard)
    }

    /// A fresh table pre-filled with the standard conversions, ready for
    /// host additions.
    pub fn with_standard() -> Self {
        let mut functions = Self::new();
        functions.register("String", |args| Value::String(arg(args, 0).to_string()));
        functions.register("Number", |args| match args.first() {
            Some(v) => Value::Number(v.to_number()),
            None => Value::Number(0.0),
        });
        functions.register("Boolean", |args| Value::Bool(arg(args, 0).is_truthy()));
        functions.register("parseInt", |args| {
            let radix = args.get(1).map(Value::to_number);
            Value::Number(parse_int(&arg(args, 0).to_string(), radix))
        });
        functions.register("parseFloat", |args| {
            Value::Number(parse_float(&arg(args, 0).to_string()))
        });
        functions.register("isNaN", |args| Value::Bool(arg(args, 0).to_number().is_nan()));
        functions.register("isFinite", |args| {
            Value::Bool(arg(args, 0).to_number().is_finite())
        });
        functions
    }

    pub fn register(&mut self, name: &str, function: GlobalFn) -> &mut Self {
        self.table.insert(name.to_string(), function);
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.table.contains_key(name)
    }

    /// Call `name`. Unknown names evaluate to `undefined`.
    pub fn call(&self, name: &str, args: &[Value]) -> Value {
        match self.table.get(name) {
            Some(function) => function(args),
            None => {
                tracing::trace!(name, "unknown global function");
                Value::Undefined
            }
        }
    }
}

fn arg(args: &[Value], i: usize) -> Value {
    args.get(i).cloned().unwrap_or_default()
}

fn parse_int(input: &str, radix: Option<f64>) -> f64 {
    let mut s = input.trim_start();
    let negative = s.starts_with('-');
    if let Some(rest) = s.strip_prefix('-').or_else(|| s.strip_prefix('+')) {
        s = rest;
    }

    let explicit = radix.filter(|r| r.is_finite() && r.trunc() != 0.0);
    let mut radix = explicit.map_or(10, |r| r.trunc() as u32);
    if !(2..=36).contains(&radix) {
        return f64::NAN;
    }
    if explicit.is_none() || radix == 16 {
        if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
            s = hex;
            radix = 16;
        }
    }

    let mut result: Option<f64> = None;
    for c in s.chars() {
        let Some(digit) = c.to_digit(radix) else {
            break;
        };
        result = Some(result.unwrap_or(0.0) * f64::from(radix) + f64::from(digit));
    }
    match result {
        Some(n) if negative => -n,
        Some(n) => n,
        None => f64::NAN,
    }
}

fn parse_float(input: &str) -> f64 {
    let s = input.trim_start();
    for literal in ["Infinity", "+Infinity"] {
        if s.starts_with(literal) {
            return f64::INFINITY;
        }
    }
    if s.starts_with("-Infinity") {
        return f64::NEG_INFINITY;
    }

    // Longest prefix that parses as a float.
    let end = s
        .char_indices()
        .map(|(i, c)| i + c.len_utf8())
        .filter(|&end| {
            let candidate = &s[..end];
            !candidate.ends_with(['e', 'E', '+', '-'])
                && !candidate.contains(|c: char| c.is_ascii_alphabetic() && c != 'e' && c != 'E')
                && candidate.parse::<f64>().is_ok()
        })
        .last();
    match end {
        Some(end) => s[..end].parse().unwrap_or(f64::NAN),
        None => f64::NAN,
    }
}
