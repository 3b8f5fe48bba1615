//! Evaluation context: everything an expression can observe at runtime.

use std::collections::HashMap;

use indexmap::IndexMap;
use lumen_ast::StylePreset;

use crate::functions::GlobalFunctions;
use crate::host::HostAdapter;
use crate::locals::Locals;
use crate::value::Value;

/// Read access to the reactive store.
pub trait StateReader {
    fn get(&self, name: &str) -> Value;
}

impl StateReader for IndexMap<String, Value> {
    fn get(&self, name: &str) -> Value {
        IndexMap::get(self, name).cloned().unwrap_or_default()
    }
}

impl StateReader for HashMap<String, Value> {
    fn get(&self, name: &str) -> Value {
        HashMap::get(self, name).cloned().unwrap_or_default()
    }
}

/// The matched route for the current render.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RouteContext {
    pub path: String,
    pub params: IndexMap<String, String>,
    pub query: IndexMap<String, String>,
}

impl RouteContext {
    pub fn new(path: &str) -> Self {
        Self {
            path: path.to_string(),
            ..Self::default()
        }
    }

    pub fn with_param(mut self, name: &str, value: &str) -> Self {
        self.params.insert(name.to_string(), value.to_string());
        self
    }

    pub fn with_query(mut self, name: &str, value: &str) -> Self {
        self.query.insert(name.to_string(), value.to_string());
        self
    }
}

/// Runtime context for one evaluation.
///
/// Cheap to clone: it only borrows the host-owned parts and shares the
/// locals chain. [`EvalContext::extend`] is the only way to add bindings and
/// always yields a new context.
#[derive(Clone)]
pub struct EvalContext<'h> {
    state: &'h dyn StateReader,
    env: &'h dyn HostAdapter,
    functions: &'h GlobalFunctions,
    locals: Locals,
    route: Option<&'h RouteContext>,
    imports: Option<&'h IndexMap<String, Value>>,
    styles: Option<&'h IndexMap<String, StylePreset>>,
}

impl<'h> EvalContext<'h> {
    pub fn new(state: &'h dyn StateReader, env: &'h dyn HostAdapter) -> Self {
        Self {
            state,
            env,
            functions: GlobalFunctions::standard(),
            locals: Locals::new(),
            route: None,
            imports: None,
            styles: None,
        }
    }

    pub fn with_functions(mut self, functions: &'h GlobalFunctions) -> Self {
        self.functions = functions;
        self
    }

    pub fn with_locals(mut self, locals: Locals) -> Self {
        self.locals = locals;
        self
    }

    pub fn with_route(mut self, route: &'h RouteContext) -> Self {
        self.route = Some(route);
        self
    }

    pub fn with_imports(mut self, imports: &'h IndexMap<String, Value>) -> Self {
        self.imports = Some(imports);
        self
    }

    pub fn with_styles(mut self, styles: &'h IndexMap<String, StylePreset>) -> Self {
        self.styles = Some(styles);
        self
    }

    /// A child context whose locals are these plus `bindings`.
    pub fn extend<I>(&self, bindings: I) -> EvalContext<'h>
    where
        I: IntoIterator<Item = (String, Value)>,
    {
        EvalContext {
            locals: self.locals.extend(bindings),
            ..self.clone()
        }
    }

    pub fn state(&self) -> &'h dyn StateReader {
        self.state
    }

    pub fn env(&self) -> &'h dyn HostAdapter {
        self.env
    }

    pub fn functions(&self) -> &'h GlobalFunctions {
        self.functions
    }

    pub fn locals(&self) -> &Locals {
        &self.locals
    }

    pub fn route(&self) -> Option<&'h RouteContext> {
        self.route
    }

    pub fn import(&self, name: &str) -> Option<&'h Value> {
        self.imports.and_then(|imports| imports.get(name))
    }

    pub fn style(&self, name: &str) -> Option<&'h StylePreset> {
        self.styles.and_then(|styles| styles.get(name))
    }
}
