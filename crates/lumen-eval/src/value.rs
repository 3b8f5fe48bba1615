//! Runtime values.
//!
//! A small JavaScript-flavoured value model: the evaluator produces these,
//! the host adapter consumes and returns them, and they convert to and from
//! `serde_json::Value` at the edges.

use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;
use serde_json::Value as Json;

use crate::methods::date;

/// Insertion-ordered object properties.
pub type Object = IndexMap<String, Value>;

/// A runtime value.
#[derive(Debug, Clone, Default)]
pub enum Value {
    #[default]
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Array(Vec<Value>),
    Object(Object),
    Function(Function),
    /// The `Math` namespace object.
    Math,
    /// The `Date` constructor.
    DateConstructor,
    /// A `Date` instance, in milliseconds since the Unix epoch (UTC).
    Date(f64),
}

type NativeFn = dyn Fn(&Value, &[Value]) -> Value;

/// A host-provided function, optionally bound to a receiver.
#[derive(Clone)]
pub struct Function {
    name: Rc<str>,
    native: Rc<NativeFn>,
    receiver: Option<Rc<Value>>,
}

impl Function {
    /// Wrap a native closure. The closure receives `this` and the arguments.
    pub fn new(name: &str, native: impl Fn(&Value, &[Value]) -> Value + 'static) -> Self {
        Self {
            name: name.into(),
            native: Rc::new(native),
            receiver: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// A copy of this function whose `this` is `receiver`.
    pub fn bind(&self, receiver: Value) -> Function {
        Function {
            name: self.name.clone(),
            native: self.native.clone(),
            receiver: Some(Rc::new(receiver)),
        }
    }

    pub fn invoke(&self, args: &[Value]) -> Value {
        match self.receiver.as_deref() {
            Some(this) => (self.native)(this, args),
            None => (self.native)(&Value::Undefined, args),
        }
    }

    /// Identity comparison: same underlying native function.
    pub fn same(&self, other: &Function) -> bool {
        std::ptr::addr_eq(Rc::as_ptr(&self.native), Rc::as_ptr(&other.native))
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Function({})", self.name)
    }
}

impl Value {
    /// `typeof` of this value.
    pub fn type_of(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Function(_) | Value::DateConstructor => "function",
            Value::Null | Value::Array(_) | Value::Object(_) | Value::Math | Value::Date(_) => {
                "object"
            }
        }
    }

    pub fn is_nullish(&self) -> bool {
        matches!(self, Value::Undefined | Value::Null)
    }

    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Undefined | Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::String(s) => !s.is_empty(),
            _ => true,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Numeric coercion (`Number(value)`).
    pub fn to_number(&self) -> f64 {
        match self {
            Value::Undefined => f64::NAN,
            Value::Null => 0.0,
            Value::Bool(b) => f64::from(u8::from(*b)),
            Value::Number(n) => *n,
            Value::String(s) => string_to_number(s),
            Value::Date(ms) => *ms,
            Value::Array(items) => match items.as_slice() {
                [] => 0.0,
                [single] => string_to_number(&single.to_string()),
                _ => f64::NAN,
            },
            _ => f64::NAN,
        }
    }

    /// Strict equality (`===`) with structural comparison of arrays and objects.
    pub fn strict_equals(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) | (Value::Null, Value::Null) => true,
            (Value::Math, Value::Math) | (Value::DateConstructor, Value::DateConstructor) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Date(a), Value::Date(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.strict_equals(y))
            }
            (Value::Object(a), Value::Object(b)) => {
                a.len() == b.len()
                    && a
                        .iter()
                        .all(|(k, v)| b.get(k).is_some_and(|w| v.strict_equals(w)))
            }
            (Value::Function(a), Value::Function(b)) => a.same(b),
            _ => false,
        }
    }

    /// `SameValueZero`: strict equality where `NaN` equals itself.
    pub fn same_value_zero(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) if a.is_nan() && b.is_nan() => true,
            _ => self.strict_equals(other),
        }
    }

    /// Convert to JSON. Values with no JSON form become `null`.
    pub fn to_json(&self) -> Json {
        match self {
            Value::Bool(b) => Json::Bool(*b),
            Value::Number(n) => number_to_json(*n),
            Value::String(s) => Json::String(s.clone()),
            Value::Array(items) => Json::Array(items.iter().map(Value::to_json).collect()),
            Value::Object(map) => Json::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
            Value::Date(ms) => date::to_iso_string(*ms).map_or(Json::Null, Json::String),
            Value::Undefined
            | Value::Null
            | Value::Function(_)
            | Value::Math
            | Value::DateConstructor => Json::Null,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.strict_equals(other)
    }
}

/// String coercion (`String(value)`).
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => f.write_str("undefined"),
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Number(n) => f.write_str(&format_number(*n)),
            Value::String(s) => f.write_str(s),
            Value::Array(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    if !item.is_nullish() {
                        write!(f, "{item}")?;
                    }
                }
                Ok(())
            }
            Value::Object(_) => f.write_str("[object Object]"),
            Value::Function(func) => write!(f, "function {}() {{ [native code] }}", func.name()),
            Value::Math => f.write_str("[object Math]"),
            Value::DateConstructor => f.write_str("function Date() { [native code] }"),
            Value::Date(ms) => match date::to_iso_string(*ms) {
                Some(iso) => f.write_str(&iso),
                None => f.write_str("Invalid Date"),
            },
        }
    }
}

/// Format a number the way JavaScript prints it: integers without `.0`, and
/// exponent notation below `1e-6` or from `1e21` up.
pub fn format_number(n: f64) -> String {
    let abs = n.abs();
    if n.is_nan() {
        "NaN".into()
    } else if n.is_infinite() {
        String::from(if n > 0.0 { "Infinity" } else { "-Infinity" })
    } else if abs >= 1e21 || (abs != 0.0 && abs < 1e-6) {
        let formatted = format!("{n:e}");
        match formatted.split_once('e') {
            Some((mantissa, exponent)) if !exponent.starts_with('-') => {
                format!("{mantissa}e+{exponent}")
            }
            _ => formatted,
        }
    } else if n.fract() == 0.0 && abs < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

fn number_to_json(n: f64) -> Json {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        Json::from(n as i64)
    } else {
        serde_json::Number::from_f64(n).map_or(Json::Null, Json::Number)
    }
}

fn string_to_number(s: &str) -> f64 {
    let trimmed = s.trim();
    match trimmed {
        "" => 0.0,
        "Infinity" | "+Infinity" => f64::INFINITY,
        "-Infinity" => f64::NEG_INFINITY,
        _ if trimmed.chars().any(|c| c.is_ascii_alphabetic() && c != 'e' && c != 'E') => {
            f64::NAN
        }
        _ => trimmed.parse().unwrap_or(f64::NAN),
    }
}

impl From<&Json> for Value {
    fn from(json: &Json) -> Self {
        match json {
            Json::Null => Value::Null,
            Json::Bool(b) => Value::Bool(*b),
            Json::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
            Json::String(s) => Value::String(s.clone()),
            Json::Array(items) => Value::Array(items.iter().map(Value::from).collect()),
            Json::Object(map) => Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), Value::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<Json> for Value {
    fn from(json: Json) -> Self {
        Value::from(&json)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(f64::from(n))
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.into())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(items)
    }
}
