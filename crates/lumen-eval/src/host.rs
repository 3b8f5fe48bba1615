//! Host adapter: the environment hooks supplied by the server or client
//! renderer. Every method has a default so a host only overrides what it
//! actually provides.

use crate::value::{Function, Value};

/// Environment-specific hooks consulted during evaluation.
pub trait HostAdapter {
    /// Fallback for a `var` head that is not a local.
    fn resolve_global(&self, name: &str) -> Value {
        standard_global(name)
    }

    /// Element reference lookup for `ref` expressions.
    fn resolve_ref(&self, _name: &str) -> Value {
        Value::Undefined
    }

    /// Form validity lookup for `validity` expressions.
    fn resolve_validity(&self, _reference: &str, _property: Option<&str>) -> Value {
        Value::Undefined
    }

    /// Bind a function reached through a property path to its parent object.
    fn bind_function(&self, function: &Function, receiver: Value) -> Value {
        Value::Function(function.bind(receiver))
    }

    /// Invoke a function value (`fn.call(...)`, function callbacks).
    fn call_function(&self, function: &Function, args: &[Value]) -> Value {
        function.invoke(args)
    }
}

/// Host with no environment of its own.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultHost;

impl HostAdapter for DefaultHost {}

/// Globals every host exposes.
pub fn standard_global(name: &str) -> Value {
    match name {
        "Math" => Value::Math,
        "Date" => Value::DateConstructor,
        _ => Value::Undefined,
    }
}
