//! The tree-walking evaluator.
//!
//! [`evaluate`] is total: every expression produces a value, and anything
//! unsupported along the way (unknown names, disallowed methods, forbidden
//! properties, lambdas outside a call) produces `undefined`.

use lumen_ast::builtins::is_forbidden_key;
use lumen_ast::{BinaryOp, Expression, RouteSource};

use crate::call::eval_call;
use crate::context::EvalContext;
use crate::operators;
use crate::path::{get_path, get_property, segments, walk_with_parent};
use crate::style;
use crate::value::{format_number, Object, Value};

/// Evaluate `expr` against `ctx`.
pub fn evaluate(expr: &Expression, ctx: &EvalContext<'_>) -> Value {
    match expr {
        Expression::Lit { value } => Value::from(value),

        Expression::State { name, path } => {
            if is_forbidden_key(name) {
                return Value::Undefined;
            }
            with_path(ctx.state().get(name), path.as_deref())
        }

        Expression::Local { name } => ctx.locals().get(name).cloned().unwrap_or_default(),

        Expression::Var { name, path } => eval_var(name, path.as_deref(), ctx),

        Expression::Bin { op, left, right } => {
            let left = evaluate(left, ctx);
            match op {
                BinaryOp::And if !left.is_truthy() => left,
                BinaryOp::Or if left.is_truthy() => left,
                BinaryOp::And | BinaryOp::Or => evaluate(right, ctx),
                _ => operators::apply(*op, left, evaluate(right, ctx)),
            }
        }

        Expression::Not { operand } => Value::Bool(!evaluate(operand, ctx).is_truthy()),

        Expression::Cond {
            condition,
            then,
            otherwise,
        } => {
            if evaluate(condition, ctx).is_truthy() {
                evaluate(then, ctx)
            } else {
                evaluate(otherwise, ctx)
            }
        }

        Expression::Get { base, path } => get_path(evaluate(base, ctx), path),

        Expression::Index { base, key } => {
            let base = evaluate(base, ctx);
            let key = match evaluate(key, ctx) {
                Value::Number(n) => format_number(n),
                other => other.to_string(),
            };
            get_property(&base, &key)
        }

        Expression::Route { name, source } => {
            let Some(route) = ctx.route() else {
                return Value::Undefined;
            };
            let found = match source {
                RouteSource::Param => route.params.get(name),
                RouteSource::Query => route.query.get(name),
                RouteSource::Path => Some(&route.path),
            };
            found.map_or(Value::Undefined, |v| Value::String(v.clone()))
        }

        Expression::Import { name, path } | Expression::Data { name, path } => {
            match ctx.import(name) {
                Some(value) => with_path(value.clone(), path.as_deref()),
                None => Value::Undefined,
            }
        }

        Expression::Ref { name } => ctx.env().resolve_ref(name),

        // Component params are substituted before evaluation reaches here.
        Expression::Param { .. } => Value::Undefined,

        Expression::Style { name, variants } => Value::String(style::resolve(name, variants, ctx)),

        Expression::Concat { items } => {
            let mut out = String::new();
            for item in items {
                let value = evaluate(item, ctx);
                if !value.is_nullish() {
                    out.push_str(&value.to_string());
                }
            }
            Value::String(out)
        }

        Expression::Validity {
            reference,
            property,
        } => ctx.env().resolve_validity(reference, property.as_deref()),

        Expression::Call {
            target,
            method,
            args,
        } => eval_call(target.as_deref(), method, args, ctx),

        Expression::Lambda(_) => {
            tracing::trace!("lambda outside of a call argument");
            Value::Undefined
        }

        Expression::Array { elements } => {
            Value::Array(elements.iter().map(|e| evaluate(e, ctx)).collect())
        }

        Expression::Obj { props } => {
            let mut object = Object::new();
            for (key, value) in props {
                if is_forbidden_key(key) {
                    tracing::trace!(key, "dropped forbidden object key");
                    continue;
                }
                object.insert(key.clone(), evaluate(value, ctx));
            }
            Value::Object(object)
        }
    }
}

fn with_path(value: Value, path: Option<&str>) -> Value {
    match path {
        Some(path) => get_path(value, path),
        None => value,
    }
}

/// `var`: head from locals or the host, then the rest of the dotted path.
/// A function reached through a path comes back bound to its parent.
fn eval_var(name: &str, path: Option<&str>, ctx: &EvalContext<'_>) -> Value {
    let mut parts = segments(name).chain(path.into_iter().flat_map(segments));
    let Some(head) = parts.next() else {
        return Value::Undefined;
    };
    if is_forbidden_key(head) {
        return Value::Undefined;
    }

    let root = match ctx.locals().get(head) {
        Some(value) => value.clone(),
        None => ctx.env().resolve_global(head),
    };
    let rest: Vec<&str> = parts.collect();
    if rest.is_empty() {
        return root;
    }

    match walk_with_parent(root, rest) {
        (Some(parent), Value::Function(function)) => ctx.env().bind_function(&function, parent),
        (_, value) => value,
    }
}
