//! `call` dispatch and lambda closures.

use lumen_ast::builtins::{
    is_array_method, is_date_instance_method, is_date_static_method, is_math_method,
    is_string_method,
};
use lumen_ast::{Expression, Lambda};

use crate::context::EvalContext;
use crate::evaluator::evaluate;
use crate::host::HostAdapter;
use crate::methods::{array, date, math, string};
use crate::value::Value;

/// A lambda paired with the context it was defined in.
///
/// Every invocation evaluates the body in a fresh child context, so
/// invocations never observe each other's bindings.
#[derive(Clone)]
pub struct Closure<'a, 'h> {
    lambda: &'a Lambda,
    ctx: EvalContext<'h>,
}

impl<'a, 'h> Closure<'a, 'h> {
    pub fn new(lambda: &'a Lambda, ctx: &EvalContext<'h>) -> Self {
        Self {
            lambda,
            ctx: ctx.clone(),
        }
    }

    pub fn invoke(&self, item: Value, index: usize) -> Value {
        let mut bindings = vec![(self.lambda.param.clone(), item)];
        if let Some(name) = &self.lambda.index {
            bindings.push((name.clone(), Value::Number(index as f64)));
        }
        let scope = self.ctx.extend(bindings);
        evaluate(&self.lambda.body, &scope)
    }
}

/// A method argument: evaluated eagerly, or a lambda left for the callee.
#[derive(Clone)]
pub enum CallArg<'a, 'h> {
    Value(Value),
    Lambda(Closure<'a, 'h>),
}

impl CallArg<'_, '_> {
    /// The argument as a plain value. Lambdas have none.
    pub fn to_value(&self) -> Value {
        match self {
            CallArg::Value(value) => value.clone(),
            CallArg::Lambda(_) => Value::Undefined,
        }
    }

    pub fn is_callable(&self) -> bool {
        matches!(self, CallArg::Lambda(_) | CallArg::Value(Value::Function(_)))
    }

    /// Invoke as a per-element callback with `(item, index)`.
    pub fn call_back(&self, env: &dyn HostAdapter, item: &Value, index: usize) -> Value {
        match self {
            CallArg::Lambda(closure) => closure.invoke(item.clone(), index),
            CallArg::Value(Value::Function(function)) => {
                env.call_function(function, &[item.clone(), Value::Number(index as f64)])
            }
            CallArg::Value(_) => Value::Undefined,
        }
    }
}

/// Evaluate a `call` node.
pub fn eval_call(
    target: Option<&Expression>,
    method: &str,
    args: &[Expression],
    ctx: &EvalContext<'_>,
) -> Value {
    let Some(target) = target else {
        let values: Vec<Value> = args.iter().map(|arg| evaluate(arg, ctx)).collect();
        return ctx.functions().call(method, &values);
    };

    let receiver = evaluate(target, ctx);
    let args: Vec<CallArg> = args
        .iter()
        .map(|arg| match arg {
            Expression::Lambda(lambda) => CallArg::Lambda(Closure::new(lambda, ctx)),
            other => CallArg::Value(evaluate(other, ctx)),
        })
        .collect();
    let values = || args.iter().map(CallArg::to_value).collect::<Vec<_>>();

    match &receiver {
        Value::Array(items) if is_array_method(method) => {
            array::call(items, method, &args, ctx.env())
        }
        Value::String(s) if is_string_method(method) => string::call(s, method, &values()),
        Value::Math if is_math_method(method) => math::call(method, &values()),
        Value::DateConstructor if is_date_static_method(method) => {
            date::call_static(method, &values())
        }
        Value::Date(ms) if is_date_instance_method(method) => date::call_instance(*ms, method),
        Value::Function(function) if method == "call" => {
            ctx.env().call_function(function, &values())
        }
        _ => {
            tracing::trace!(method, target = receiver.type_of(), "method not allowed");
            Value::Undefined
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::DefaultHost;
    use crate::value::Function;
    use indexmap::IndexMap;
    use lumen_ast::BinaryOp;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn eval_with(expr: &Expression, state: &IndexMap<String, Value>, env: &dyn HostAdapter) -> Value {
        evaluate(expr, &EvalContext::new(state, env))
    }

    fn eval(expr: &Expression) -> Value {
        eval_with(expr, &IndexMap::new(), &DefaultHost)
    }

    fn items_state() -> IndexMap<String, Value> {
        let mut state = IndexMap::new();
        state.insert("items".to_string(), Value::from(json!([-1, 2, -3, 4])));
        state
    }

    fn positives() -> Expression {
        Expression::call(
            Expression::state("items"),
            "filter",
            vec![Expression::lambda(
                "x",
                Expression::bin(BinaryOp::Gt, Expression::var("x"), Expression::lit(0)),
            )],
        )
    }

    // =========================================================================
    // Lambdas
    // =========================================================================

    #[test]
    fn test_filter_then_map() {
        let state = items_state();
        assert_eq!(
            eval_with(&positives(), &state, &DefaultHost),
            Value::from(json!([2, 4]))
        );

        let doubled = Expression::call(
            positives(),
            "map",
            vec![Expression::lambda(
                "y",
                Expression::bin(BinaryOp::Mul, Expression::var("y"), Expression::lit(2)),
            )],
        );
        assert_eq!(
            eval_with(&doubled, &state, &DefaultHost),
            Value::from(json!([4, 8]))
        );
    }

    #[test]
    fn test_lambda_index_binding() {
        let state = items_state();
        let expr = Expression::call(
            Expression::state("items"),
            "map",
            vec![Expression::lambda_indexed(
                "x",
                "i",
                Expression::var("i"),
            )],
        );
        assert_eq!(
            eval_with(&expr, &state, &DefaultHost),
            Value::from(json!([0, 1, 2, 3]))
        );
    }

    #[test]
    fn test_nested_lambda_sees_outer_binding() {
        let mut state = IndexMap::new();
        state.insert(
            "groups".to_string(),
            Value::from(json!([
                { "min": 2, "values": [1, 2, 3] },
                { "min": 0, "values": [1] }
            ])),
        );
        let expr = Expression::call(
            Expression::state("groups"),
            "map",
            vec![Expression::lambda(
                "item",
                Expression::call(
                    Expression::var_path("item", "values"),
                    "filter",
                    vec![Expression::lambda(
                        "v",
                        Expression::bin(
                            BinaryOp::Gt,
                            Expression::var("v"),
                            Expression::var("item.min"),
                        ),
                    )],
                ),
            )],
        );
        assert_eq!(
            eval_with(&expr, &state, &DefaultHost),
            Value::from(json!([[3], [1]]))
        );
    }

    #[test]
    fn test_invocations_do_not_leak() {
        let closure_body = Expression::var("x");
        let lambda = Lambda {
            param: "x".into(),
            index: None,
            body: Box::new(closure_body),
        };
        let state = IndexMap::new();
        let ctx = EvalContext::new(&state, &DefaultHost);
        let closure = Closure::new(&lambda, &ctx);
        assert_eq!(closure.invoke(Value::from(1), 0), Value::from(1));
        assert_eq!(closure.invoke(Value::from(2), 1), Value::from(2));
        assert!(!ctx.locals().contains("x"));
    }

    // =========================================================================
    // Dispatch
    // =========================================================================

    #[test]
    fn test_string_and_math_dispatch() {
        assert_eq!(
            eval(&Expression::call(Expression::lit("abc"), "toUpperCase", vec![])),
            Value::from("ABC")
        );
        assert_eq!(
            eval(&Expression::call(
                Expression::var("Math"),
                "max",
                vec![Expression::lit(1), Expression::lit(7)]
            )),
            Value::from(7)
        );
    }

    #[test]
    fn test_date_dispatch() {
        let parsed = Expression::call(
            Expression::var("Date"),
            "parse",
            vec![Expression::lit("1970-01-02")],
        );
        assert_eq!(eval(&parsed), Value::from(86_400_000));
    }

    #[test]
    fn test_disallowed_methods_are_undefined() {
        // Not in the allowlist, even though a real string has it.
        assert_eq!(
            eval(&Expression::call(Expression::lit("abc"), "normalize", vec![])),
            Value::Undefined
        );
        assert_eq!(
            eval(&Expression::call(Expression::var("Math"), "random", vec![])),
            Value::Undefined
        );
        assert_eq!(
            eval(&Expression::call(Expression::lit(5), "toFixed", vec![])),
            Value::Undefined
        );
        // A string method on an array is not dispatched.
        assert_eq!(
            eval(&Expression::call(
                Expression::array(vec![]),
                "toUpperCase",
                vec![]
            )),
            Value::Undefined
        );
    }

    #[test]
    fn test_global_function_call() {
        assert_eq!(
            eval(&Expression::call_global(
                "parseInt",
                vec![Expression::lit("42")]
            )),
            Value::from(42)
        );
        assert_eq!(
            eval(&Expression::call_global("alert", vec![])),
            Value::Undefined
        );
    }

    struct Greeter;

    impl HostAdapter for Greeter {
        fn resolve_global(&self, name: &str) -> Value {
            match name {
                "greet" => Value::Function(Function::new("greet", |_, args| {
                    Value::String(format!("hi {}", args.first().cloned().unwrap_or_default()))
                })),
                _ => crate::host::standard_global(name),
            }
        }
    }

    #[test]
    fn test_function_call_through_host() {
        let state = IndexMap::new();
        let expr = Expression::call(
            Expression::var("greet"),
            "call",
            vec![Expression::lit("ada")],
        );
        assert_eq!(eval_with(&expr, &state, &Greeter), Value::from("hi ada"));

        let apply = Expression::call(Expression::var("greet"), "apply", vec![]);
        assert_eq!(eval_with(&apply, &state, &Greeter), Value::Undefined);
    }
}
