//! Semantic analyzer.
//!
//! Walks a [`Program`] against a [`SymbolEnvironment`] and reports every
//! reference that cannot resolve. Traversal is pre-order and left-to-right:
//! `actions`, then `view`, then `components`; within a node its own
//! expression fields come before its structural children.
//!
//! Lambda arguments get a scope frame that is pushed right before the body is
//! analyzed and popped right after, so chained calls never see each other's
//! parameters while nested lambdas see every enclosing one.

use std::collections::HashSet;

use lumen_ast::builtins::{is_builtin_global, is_forbidden_key};
use lumen_ast::{
    ActionStep, Expression, Lambda, Program, PropValue, RouteSource, ViewNode,
};

use crate::error::{ErrorCode, SemanticError};
use crate::pointer::Pointer;
use crate::scope::{Origin, ScopeError, SymbolEnvironment};

/// Analyzer settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AnalyzerConfig {
    /// Stop collecting after this many errors. `None` collects all.
    pub max_errors: Option<usize>,
}

impl AnalyzerConfig {
    /// Report only the first error in traversal order.
    pub fn first_error() -> Self {
        Self {
            max_errors: Some(1),
        }
    }
}

/// Analyze a program, collecting every error.
pub fn analyze(program: &Program) -> Result<(), Vec<SemanticError>> {
    analyze_with(program, AnalyzerConfig::default())
}

/// Analyze a program with explicit settings.
pub fn analyze_with(program: &Program, config: AnalyzerConfig) -> Result<(), Vec<SemanticError>> {
    let _span = tracing::debug_span!(
        "analyze",
        state = program.state.len(),
        actions = program.actions.len(),
        components = program.components.len()
    )
    .entered();

    let mut analyzer = Analyzer::new(program, config);
    analyzer.run();

    tracing::debug!(errors = analyzer.errors.len(), "analysis finished");
    if analyzer.errors.is_empty() {
        Ok(())
    } else {
        Err(analyzer.errors)
    }
}

struct Analyzer<'p> {
    program: &'p Program,
    max_errors: Option<usize>,
    env: SymbolEnvironment,
    path: Pointer,
    errors: Vec<SemanticError>,
    refs: HashSet<&'p str>,
    route_params: Option<Vec<&'p str>>,
}

impl<'p> Analyzer<'p> {
    fn new(program: &'p Program, config: AnalyzerConfig) -> Self {
        let mut env = SymbolEnvironment::new();
        env.declare_state(program.state_names());

        let mut refs = HashSet::new();
        collect_refs(&program.view, &mut refs);
        for component in program.components.values() {
            collect_refs(&component.view, &mut refs);
        }

        Self {
            program,
            max_errors: config.max_errors.map(|m| m.max(1)),
            env,
            path: Pointer::new(),
            errors: Vec::new(),
            refs,
            route_params: program.route.as_ref().map(|r| r.param_names()),
        }
    }

    fn run(&mut self) {
        let program = self.program;

        self.at("actions", |a| {
            for (i, action) in program.actions.iter().enumerate() {
                a.at(i, |a| {
                    a.scoped(
                        vec![("event", Origin::ActionInput), ("payload", Origin::ActionInput)],
                        |a| a.at("steps", |a| a.visit_steps(&action.steps)),
                    )
                });
            }
        });

        self.at("view", |a| a.visit_view(&program.view));

        self.at("components", |a| {
            for (name, component) in &program.components {
                a.at(name, |a| {
                    let params = component
                        .params
                        .keys()
                        .map(|p| (p.as_str(), Origin::ComponentParam))
                        .collect();
                    a.scoped(params, |a| a.at("view", |a| a.visit_view(&component.view)));
                });
            }
        });
    }

    // =========================================================================
    // Bookkeeping
    // =========================================================================

    fn is_full(&self) -> bool {
        self.max_errors.is_some_and(|max| self.errors.len() >= max)
    }

    fn report(&mut self, code: ErrorCode, message: String) {
        if self.is_full() {
            return;
        }
        let path = self.path.render();
        tracing::debug!(%code, %path, "{message}");
        self.errors.push(SemanticError {
            code,
            message,
            path,
        });
    }

    /// Run `f` with `segment` appended to the current path.
    fn at<R>(&mut self, segment: impl ToString, f: impl FnOnce(&mut Self) -> R) -> R {
        self.path.push(segment);
        let result = f(self);
        self.path.pop();
        result
    }

    /// Run `f` inside a new scope frame. A frame that binds a name twice is
    /// reported and its subtree skipped.
    fn scoped(&mut self, bindings: Vec<(&str, Origin)>, f: impl FnOnce(&mut Self)) {
        match self.env.push_scope(bindings) {
            Ok(()) => {
                f(self);
                self.env.pop_scope();
            }
            Err(ScopeError::DuplicateBinding { name }) => {
                self.report(
                    ErrorCode::DuplicateBinding,
                    format!("'{name}' is bound twice in the same scope"),
                );
            }
        }
    }

    fn check_path(&mut self, path: Option<&str>) {
        let Some(path) = path else { return };
        if let Some(key) = path.split('.').find(|seg| is_forbidden_key(seg)) {
            self.report(
                ErrorCode::ForbiddenKey,
                format!("Forbidden property '{key}' in path '{path}'"),
            );
        }
    }

    fn check_state_target(&mut self, target: &str) {
        if !self.env.is_state(target) {
            self.report(
                ErrorCode::UndefinedState,
                format!("Undefined state '{target}'"),
            );
        }
    }

    // =========================================================================
    // Actions
    // =========================================================================

    fn visit_steps(&mut self, steps: &'p [ActionStep]) {
        for (i, step) in steps.iter().enumerate() {
            self.at(i, |a| a.visit_step(step));
        }
    }

    fn visit_step(&mut self, step: &'p ActionStep) {
        match step {
            ActionStep::Set { target, value } => {
                self.at("target", |a| a.check_state_target(target));
                self.at("value", |a| a.visit_expr(value));
            }
            ActionStep::Update {
                target,
                value,
                index,
                ..
            } => {
                self.at("target", |a| a.check_state_target(target));
                if let Some(value) = value {
                    self.at("value", |a| a.visit_expr(value));
                }
                if let Some(index) = index {
                    self.at("index", |a| a.visit_expr(index));
                }
            }
            ActionStep::Fetch {
                url,
                body,
                result,
                on_success,
                on_error,
                ..
            } => {
                self.at("url", |a| a.visit_expr(url));
                if let Some(body) = body {
                    self.at("body", |a| a.visit_expr(body));
                }
                let result = result.as_deref().unwrap_or("result");
                self.at("onSuccess", |a| {
                    a.scoped(vec![(result, Origin::ActionInput)], |a| {
                        a.visit_steps(on_success)
                    })
                });
                self.at("onError", |a| {
                    a.scoped(vec![("error", Origin::ActionInput)], |a| {
                        a.visit_steps(on_error)
                    })
                });
            }
            ActionStep::Navigate { url } => {
                self.at("url", |a| a.visit_expr(url));
            }
            ActionStep::If {
                condition,
                then,
                otherwise,
            } => {
                self.at("condition", |a| a.visit_expr(condition));
                self.at("then", |a| a.visit_steps(then));
                self.at("else", |a| a.visit_steps(otherwise));
            }
        }
    }

    // =========================================================================
    // View
    // =========================================================================

    fn visit_view(&mut self, node: &'p ViewNode) {
        if self.is_full() {
            return;
        }
        match node {
            ViewNode::Element {
                props, children, ..
            } => {
                self.at("props", |a| {
                    for (name, prop) in props {
                        a.at(name, |a| a.visit_prop(prop));
                    }
                });
                self.visit_children(children);
            }
            ViewNode::Text { value } => {
                self.at("value", |a| a.visit_expr(value));
            }
            ViewNode::If {
                condition,
                then,
                otherwise,
            } => {
                self.at("condition", |a| a.visit_expr(condition));
                self.at("then", |a| a.visit_view(then));
                if let Some(otherwise) = otherwise {
                    self.at("else", |a| a.visit_view(otherwise));
                }
            }
            ViewNode::Each {
                items,
                binding,
                index,
                key,
                body,
            } => {
                self.at("items", |a| a.visit_expr(items));
                let mut bindings = vec![(binding.as_str(), Origin::EachItem)];
                if let Some(index) = index {
                    bindings.push((index.as_str(), Origin::EachIndex));
                }
                self.scoped(bindings, |a| {
                    if let Some(key) = key {
                        a.at("key", |a| a.visit_expr(key));
                    }
                    a.at("body", |a| a.visit_view(body));
                });
            }
            ViewNode::Component {
                name,
                props,
                children,
            } => {
                if !self.program.components.contains_key(name) {
                    self.at("name", |a| {
                        a.report(
                            ErrorCode::UndefinedComponent,
                            format!("Undefined component '{name}'"),
                        )
                    });
                }
                self.at("props", |a| {
                    for (prop, value) in props {
                        a.at(prop, |a| a.visit_expr(value));
                    }
                });
                self.visit_children(children);
            }
            ViewNode::Slot { .. } => {}
        }
    }

    fn visit_children(&mut self, children: &'p [ViewNode]) {
        self.at("children", |a| {
            for (i, child) in children.iter().enumerate() {
                a.at(i, |a| a.visit_view(child));
            }
        });
    }

    fn visit_prop(&mut self, prop: &'p PropValue) {
        match prop {
            PropValue::Event(handler) => {
                if self.program.action(&handler.action).is_none() {
                    self.at("action", |a| {
                        a.report(
                            ErrorCode::UndefinedAction,
                            format!("Undefined action '{}'", handler.action),
                        )
                    });
                }
                if let Some(payload) = &handler.payload {
                    self.at("payload", |a| a.visit_expr(payload));
                }
            }
            PropValue::Expr(expr) => self.visit_expr(expr),
        }
    }

    // =========================================================================
    // Expressions
    // =========================================================================

    fn visit_expr(&mut self, expr: &'p Expression) {
        if self.is_full() {
            return;
        }
        let program = self.program;
        match expr {
            Expression::Lit { .. } | Expression::Local { .. } => {}

            Expression::State { name, path } => {
                if !self.env.is_state(name) {
                    self.report(ErrorCode::UndefinedState, format!("Undefined state '{name}'"));
                }
                self.check_path(path.as_deref());
            }

            Expression::Var { name, path } => {
                let head = name.split('.').next().unwrap_or(name);
                let visible = self.env.resolve(head).is_some_and(Origin::is_lexical)
                    || is_builtin_global(head);
                if !visible {
                    self.report(
                        ErrorCode::VarUndefined,
                        format!("Undefined variable '{head}'"),
                    );
                }
                self.check_path(Some(name.as_str()));
                self.check_path(path.as_deref());
            }

            Expression::Bin { left, right, .. } => {
                self.at("left", |a| a.visit_expr(left));
                self.at("right", |a| a.visit_expr(right));
            }

            Expression::Not { operand } => {
                self.at("operand", |a| a.visit_expr(operand));
            }

            Expression::Cond {
                condition,
                then,
                otherwise,
            } => {
                self.at("if", |a| a.visit_expr(condition));
                self.at("then", |a| a.visit_expr(then));
                self.at("else", |a| a.visit_expr(otherwise));
            }

            Expression::Get { base, path } => {
                self.at("base", |a| a.visit_expr(base));
                self.check_path(Some(path.as_str()));
            }

            Expression::Index { base, key } => {
                self.at("base", |a| a.visit_expr(base));
                self.at("key", |a| {
                    if let Expression::Lit { value } = key.as_ref() {
                        if let Some(k) = value.as_str().filter(|k| is_forbidden_key(k)) {
                            a.report(
                                ErrorCode::ForbiddenKey,
                                format!("Forbidden property '{k}' used as index key"),
                            );
                        }
                    }
                    a.visit_expr(key)
                });
            }

            Expression::Route { name, source } => {
                let declared = self.route_params.as_ref();
                if *source == RouteSource::Param
                    && declared.is_some_and(|params| !params.contains(&name.as_str()))
                {
                    self.report(
                        ErrorCode::UndefinedRouteParam,
                        format!("Route does not declare parameter '{name}'"),
                    );
                }
            }

            Expression::Import { name, path } => {
                if !program.imports.contains_key(name) {
                    self.report(
                        ErrorCode::UndefinedImport,
                        format!("Undefined import '{name}'"),
                    );
                }
                self.check_path(path.as_deref());
            }

            Expression::Data { name, path } => {
                if !program.data.contains_key(name) {
                    self.report(
                        ErrorCode::UndefinedData,
                        format!("Undefined data source '{name}'"),
                    );
                }
                self.check_path(path.as_deref());
            }

            Expression::Ref { name } => self.check_ref(name),

            Expression::Validity { reference, .. } => self.check_ref(reference),

            Expression::Param { name, path } => {
                if !self.env.has_binding(name, Origin::ComponentParam) {
                    self.report(
                        ErrorCode::UndefinedParam,
                        format!("Undefined component parameter '{name}'"),
                    );
                }
                self.check_path(path.as_deref());
            }

            Expression::Style { name, variants } => {
                if !program.styles.contains_key(name) {
                    self.report(ErrorCode::UndefinedStyle, format!("Undefined style '{name}'"));
                }
                self.at("variants", |a| {
                    for (variant, value) in variants {
                        a.at(variant, |a| a.visit_expr(value));
                    }
                });
            }

            Expression::Concat { items } => {
                self.at("items", |a| {
                    for (i, item) in items.iter().enumerate() {
                        a.at(i, |a| a.visit_expr(item));
                    }
                });
            }

            Expression::Call { target, args, .. } => {
                if let Some(target) = target {
                    self.at("target", |a| a.visit_expr(target));
                }
                let has_target = target.is_some();
                self.at("args", |a| {
                    for (i, arg) in args.iter().enumerate() {
                        a.at(i, |a| match arg {
                            Expression::Lambda(lambda) if has_target => a.visit_lambda(lambda),
                            _ => a.visit_expr(arg),
                        });
                    }
                });
            }

            Expression::Lambda(_) => {
                self.report(
                    ErrorCode::InvalidLambdaPosition,
                    "Lambda is only allowed as an argument of a method call".into(),
                );
            }

            Expression::Array { elements } => {
                self.at("elements", |a| {
                    for (i, element) in elements.iter().enumerate() {
                        a.at(i, |a| a.visit_expr(element));
                    }
                });
            }

            Expression::Obj { props } => {
                self.at("props", |a| {
                    for (name, value) in props {
                        a.at(name, |a| a.visit_expr(value));
                    }
                });
            }
        }
    }

    fn visit_lambda(&mut self, lambda: &'p Lambda) {
        let mut bindings = vec![(lambda.param.as_str(), Origin::LambdaParam)];
        if let Some(index) = &lambda.index {
            bindings.push((index.as_str(), Origin::LambdaIndex));
        }
        self.scoped(bindings, |a| a.at("body", |a| a.visit_expr(&lambda.body)));
    }

    fn check_ref(&mut self, name: &str) {
        if !self.refs.contains(name) {
            self.report(ErrorCode::UndefinedRef, format!("Undefined ref '{name}'"));
        }
    }
}

fn collect_refs<'p>(node: &'p ViewNode, refs: &mut HashSet<&'p str>) {
    match node {
        ViewNode::Element {
            reference,
            children,
            ..
        } => {
            if let Some(name) = reference {
                refs.insert(name);
            }
            for child in children {
                collect_refs(child, refs);
            }
        }
        ViewNode::If {
            then, otherwise, ..
        } => {
            collect_refs(then, refs);
            if let Some(otherwise) = otherwise {
                collect_refs(otherwise, refs);
            }
        }
        ViewNode::Each { body, .. } => collect_refs(body, refs),
        ViewNode::Component { children, .. } => {
            for child in children {
                collect_refs(child, refs);
            }
        }
        ViewNode::Text { .. } | ViewNode::Slot { .. } => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumen_ast::{BinaryOp, StateField, ValueType};
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value as Json};

    fn program(state: &[&str], rest: Json) -> Program {
        let mut program: Program = serde_json::from_value(rest).unwrap();
        for name in state {
            program.state.insert(
                name.to_string(),
                StateField {
                    ty: ValueType::Any,
                    initial: Json::Null,
                },
            );
        }
        program
    }

    fn text_program(state: &[&str], value: Expression) -> Program {
        program(state, json!({ "view": { "kind": "text", "value": value } }))
    }

    fn first_error(program: &Program) -> SemanticError {
        analyze(program).unwrap_err().remove(0)
    }

    // =========================================================================
    // State references
    // =========================================================================

    #[test]
    fn test_declared_state_ok() {
        let p = text_program(&["count"], Expression::state("count"));
        assert_eq!(analyze(&p), Ok(()));
    }

    #[test]
    fn test_undefined_state() {
        let p = text_program(&["count"], Expression::state("total"));
        let err = first_error(&p);
        assert_eq!(err.code, ErrorCode::UndefinedState);
        assert_eq!(err.path, "/view/value");
        assert!(err.message.contains("total"));
    }

    #[test]
    fn test_error_path_through_call_targets() {
        let expr = Expression::call(
            Expression::call(Expression::state("unknownState"), "filter", vec![]),
            "map",
            vec![],
        );
        let err = first_error(&text_program(&[], expr));
        assert_eq!(err.code, ErrorCode::UndefinedState);
        assert_eq!(err.path, "/view/value/target/target");
    }

    #[test]
    fn test_state_name_is_not_a_var() {
        let p = text_program(&["count"], Expression::var("count"));
        assert_eq!(first_error(&p).code, ErrorCode::VarUndefined);
    }

    // =========================================================================
    // Lambda scopes
    // =========================================================================

    #[test]
    fn test_lambda_param_visible_in_body() {
        let expr = Expression::call(
            Expression::state("items"),
            "filter",
            vec![Expression::lambda(
                "x",
                Expression::bin(BinaryOp::Gt, Expression::var("x"), Expression::lit(0)),
            )],
        );
        assert_eq!(analyze(&text_program(&["items"], expr)), Ok(()));
    }

    #[test]
    fn test_chained_lambdas_are_isolated() {
        // items.map(x => x).filter(y => x)
        let expr = Expression::call(
            Expression::call(
                Expression::state("items"),
                "map",
                vec![Expression::lambda("x", Expression::var("x"))],
            ),
            "filter",
            vec![Expression::lambda("y", Expression::var("x"))],
        );
        let err = first_error(&text_program(&["items"], expr));
        assert_eq!(err.code, ErrorCode::VarUndefined);
        assert_eq!(err.path, "/view/value/args/0/body");
    }

    #[test]
    fn test_nested_lambdas_inherit() {
        // items.map(item => item.values.filter(v => v > item.min))
        let expr = Expression::call(
            Expression::state("items"),
            "map",
            vec![Expression::lambda(
                "item",
                Expression::call(
                    Expression::var("item.values"),
                    "filter",
                    vec![Expression::lambda(
                        "v",
                        Expression::bin(
                            BinaryOp::Gt,
                            Expression::var("v"),
                            Expression::var_path("item", "min"),
                        ),
                    )],
                ),
            )],
        );
        assert_eq!(analyze(&text_program(&["items"], expr)), Ok(()));
    }

    #[test]
    fn test_lambda_param_not_visible_in_sibling_argument() {
        let expr = Expression::call(
            Expression::state("items"),
            "slice",
            vec![
                Expression::lambda("x", Expression::var("x")),
                Expression::var("x"),
            ],
        );
        let err = first_error(&text_program(&["items"], expr));
        assert_eq!(err.code, ErrorCode::VarUndefined);
        assert_eq!(err.path, "/view/value/args/1");
    }

    #[test]
    fn test_lambda_index_binding() {
        let expr = Expression::call(
            Expression::state("items"),
            "map",
            vec![Expression::lambda_indexed("x", "i", Expression::var("i"))],
        );
        assert_eq!(analyze(&text_program(&["items"], expr)), Ok(()));
    }

    #[test]
    fn test_lambda_duplicate_binding() {
        let expr = Expression::call(
            Expression::state("items"),
            "map",
            vec![Expression::lambda_indexed("x", "x", Expression::var("x"))],
        );
        let err = first_error(&text_program(&["items"], expr));
        assert_eq!(err.code, ErrorCode::DuplicateBinding);
        assert_eq!(err.path, "/view/value/args/0");
    }

    #[test]
    fn test_lambda_outside_call() {
        let expr = Expression::array(vec![Expression::lambda("x", Expression::var("x"))]);
        let err = first_error(&text_program(&[], expr));
        assert_eq!(err.code, ErrorCode::InvalidLambdaPosition);
        assert_eq!(err.path, "/view/value/elements/0");
    }

    #[test]
    fn test_lambda_in_global_call_rejected() {
        let expr =
            Expression::call_global("parseInt", vec![Expression::lambda("x", Expression::lit(1))]);
        assert_eq!(
            first_error(&text_program(&[], expr)).code,
            ErrorCode::InvalidLambdaPosition
        );
    }

    #[test]
    fn test_builtin_globals_resolve() {
        let expr = Expression::call(
            Expression::var("Math"),
            "max",
            vec![Expression::lit(1), Expression::lit(2)],
        );
        assert_eq!(analyze(&text_program(&[], expr)), Ok(()));
    }

    // =========================================================================
    // View nodes
    // =========================================================================

    #[test]
    fn test_each_binding_scoped_to_body() {
        let p = program(
            &["todos"],
            json!({
                "view": { "kind": "element", "tag": "ul", "children": [
                    { "kind": "each", "items": { "expr": "state", "name": "todos" },
                      "as": "todo", "index": "i",
                      "key": { "expr": "var", "name": "todo.id" },
                      "body": { "kind": "text", "value": { "expr": "var", "name": "i" } } },
                    { "kind": "text", "value": { "expr": "var", "name": "todo" } }
                ]}
            }),
        );
        let errors = analyze(&p).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].code, ErrorCode::VarUndefined);
        assert_eq!(errors[0].path, "/view/children/1/value");
    }

    #[test]
    fn test_each_duplicate_binding() {
        let p = program(
            &["todos"],
            json!({
                "view": { "kind": "each", "items": { "expr": "state", "name": "todos" },
                          "as": "t", "index": "t", "body": { "kind": "slot" } }
            }),
        );
        let err = first_error(&p);
        assert_eq!(err.code, ErrorCode::DuplicateBinding);
        assert_eq!(err.path, "/view");
    }

    #[test]
    fn test_if_branches_are_visited() {
        let p = program(
            &["ok"],
            json!({
                "view": { "kind": "if", "condition": { "expr": "state", "name": "ok" },
                          "then": { "kind": "slot" },
                          "else": { "kind": "text", "value": { "expr": "state", "name": "nope" } } }
            }),
        );
        assert_eq!(first_error(&p).path, "/view/else/value");
    }

    #[test]
    fn test_undefined_action() {
        let p = program(
            &[],
            json!({
                "actions": [{ "name": "save", "steps": [] }],
                "view": { "kind": "element", "tag": "button", "props": {
                    "onClick": { "event": "click", "action": "submit" } } }
            }),
        );
        let err = first_error(&p);
        assert_eq!(err.code, ErrorCode::UndefinedAction);
        assert_eq!(err.path, "/view/props/onClick/action");
    }

    #[test]
    fn test_undefined_component() {
        let p = program(&[], json!({ "view": { "kind": "component", "name": "Card" } }));
        let err = first_error(&p);
        assert_eq!(err.code, ErrorCode::UndefinedComponent);
        assert_eq!(err.path, "/view/name");
    }

    #[test]
    fn test_refs_and_validity() {
        let p = program(
            &[],
            json!({
                "view": { "kind": "element", "tag": "form", "children": [
                    { "kind": "element", "tag": "input", "ref": "email" },
                    { "kind": "text", "value": { "expr": "validity", "ref": "email" } },
                    { "kind": "text", "value": { "expr": "ref", "name": "password" } }
                ]}
            }),
        );
        let errors = analyze(&p).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].code, ErrorCode::UndefinedRef);
        assert_eq!(errors[0].path, "/view/children/2/value");
    }

    // =========================================================================
    // Components
    // =========================================================================

    #[test]
    fn test_component_params() {
        let p = program(
            &[],
            json!({
                "view": { "kind": "component", "name": "Card",
                          "props": { "title": { "expr": "lit", "value": "Hi" } } },
                "components": { "Card": {
                    "params": { "title": { "type": "string" } },
                    "view": { "kind": "element", "tag": "div", "children": [
                        { "kind": "text", "value": { "expr": "param", "name": "title" } },
                        { "kind": "text", "value": { "expr": "param", "name": "subtitle" } }
                    ]}
                }}
            }),
        );
        let errors = analyze(&p).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].code, ErrorCode::UndefinedParam);
        assert_eq!(errors[0].path, "/components/Card/view/children/1/value");
    }

    #[test]
    fn test_param_outside_component() {
        let p = text_program(&[], Expression::param("title"));
        assert_eq!(first_error(&p).code, ErrorCode::UndefinedParam);
    }

    // =========================================================================
    // Actions
    // =========================================================================

    #[test]
    fn test_action_target_must_be_state() {
        let p = program(
            &["count"],
            json!({
                "actions": [{ "name": "reset", "steps": [
                    { "do": "set", "target": "count", "value": { "expr": "lit", "value": 0 } },
                    { "do": "set", "target": "total", "value": { "expr": "lit", "value": 0 } }
                ]}],
                "view": { "kind": "slot" }
            }),
        );
        let err = first_error(&p);
        assert_eq!(err.code, ErrorCode::UndefinedState);
        assert_eq!(err.path, "/actions/0/steps/1/target");
    }

    #[test]
    fn test_action_inputs_and_fetch_result() {
        let p = program(
            &["rows", "query", "failure"],
            json!({
                "actions": [{ "name": "search", "steps": [
                    { "do": "set", "target": "query",
                      "value": { "expr": "var", "name": "event", "path": "target.value" } },
                    { "do": "fetch", "url": { "expr": "state", "name": "query" }, "result": "res",
                      "onSuccess": [{ "do": "set", "target": "rows", "value": { "expr": "var", "name": "res" } }],
                      "onError": [{ "do": "set", "target": "failure", "value": { "expr": "var", "name": "error" } }] }
                ]}],
                "view": { "kind": "slot" }
            }),
        );
        assert_eq!(analyze(&p), Ok(()));
    }

    #[test]
    fn test_fetch_result_not_visible_in_on_error() {
        let p = program(
            &["rows"],
            json!({
                "actions": [{ "name": "load", "steps": [
                    { "do": "fetch", "url": { "expr": "lit", "value": "/api" },
                      "onError": [{ "do": "set", "target": "rows", "value": { "expr": "var", "name": "result" } }] }
                ]}],
                "view": { "kind": "slot" }
            }),
        );
        let err = first_error(&p);
        assert_eq!(err.code, ErrorCode::VarUndefined);
        assert_eq!(err.path, "/actions/0/steps/0/onError/0/value");
    }

    // =========================================================================
    // Other references
    // =========================================================================

    #[test]
    fn test_style_import_data_route() {
        let p = program(
            &[],
            json!({
                "route": { "path": "/users/:id" },
                "styles": { "button": { "base": "btn" } },
                "imports": { "nav": [] },
                "data": { "posts": [] },
                "view": { "kind": "element", "tag": "div", "props": {
                    "a": { "expr": "style", "name": "button" },
                    "b": { "expr": "import", "name": "nav" },
                    "c": { "expr": "data", "name": "posts" },
                    "d": { "expr": "route", "name": "id" },
                    "e": { "expr": "route", "name": "tab", "source": "query" }
                }}
            }),
        );
        assert_eq!(analyze(&p), Ok(()));
    }

    #[test]
    fn test_undefined_style_import_data_route() {
        let p = program(
            &[],
            json!({
                "route": { "path": "/users/:id" },
                "view": { "kind": "element", "tag": "div", "props": {
                    "a": { "expr": "style", "name": "card" },
                    "b": { "expr": "import", "name": "nav" },
                    "c": { "expr": "data", "name": "posts" },
                    "d": { "expr": "route", "name": "slug" }
                }}
            }),
        );
        let codes: Vec<ErrorCode> = analyze(&p).unwrap_err().iter().map(|e| e.code).collect();
        assert_eq!(
            codes,
            vec![
                ErrorCode::UndefinedStyle,
                ErrorCode::UndefinedImport,
                ErrorCode::UndefinedData,
                ErrorCode::UndefinedRouteParam,
            ]
        );
    }

    #[test]
    fn test_forbidden_key_in_path() {
        let expr = Expression::get(Expression::state("user"), "profile.__proto__");
        let err = first_error(&text_program(&["user"], expr));
        assert_eq!(err.code, ErrorCode::ForbiddenKey);
        assert_eq!(err.path, "/view/value");
    }

    #[test]
    fn test_forbidden_index_key() {
        let expr = Expression::index(Expression::state("user"), Expression::lit("constructor"));
        let err = first_error(&text_program(&["user"], expr));
        assert_eq!(err.code, ErrorCode::ForbiddenKey);
        assert_eq!(err.path, "/view/value/key");
    }

    // =========================================================================
    // Error collection
    // =========================================================================

    #[test]
    fn test_errors_in_preorder() {
        let expr = Expression::bin(
            BinaryOp::Add,
            Expression::state("a"),
            Expression::cond(Expression::var("b"), Expression::state("c"), Expression::lit(1)),
        );
        let errors = analyze(&text_program(&[], expr)).unwrap_err();
        let paths: Vec<&str> = errors.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(
            paths,
            vec!["/view/value/left", "/view/value/right/if", "/view/value/right/then"]
        );
    }

    #[test]
    fn test_first_error_config() {
        let expr = Expression::concat(vec![Expression::state("a"), Expression::state("b")]);
        let errors =
            analyze_with(&text_program(&[], expr), AnalyzerConfig::first_error()).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].path, "/view/value/items/0");
    }

    #[test]
    fn test_actions_before_view_before_components() {
        let p = program(
            &[],
            json!({
                "actions": [{ "name": "a", "steps": [
                    { "do": "navigate", "url": { "expr": "state", "name": "x" } }] }],
                "view": { "kind": "text", "value": { "expr": "state", "name": "y" } },
                "components": { "C": { "view": { "kind": "text", "value": { "expr": "state", "name": "z" } } } }
            }),
        );
        let paths: Vec<String> = analyze(&p).unwrap_err().into_iter().map(|e| e.path).collect();
        assert_eq!(
            paths,
            vec!["/actions/0/steps/0/url", "/view/value", "/components/C/view/value"]
        );
    }
}
