//! Abstract Syntax Tree for Lumen programs.
//!
//! Contains both program-level nodes (state declarations, actions, views,
//! components) and the expression grammar embedded in them. Every type is a
//! direct mirror of the Program JSON format; field renames keep the JSON keys
//! stable where they collide with Rust keywords.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value as Json;

// ---------------------------------------------------------------------------
// Program-level AST
// ---------------------------------------------------------------------------

/// A complete Lumen program (one page).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Program {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub route: Option<RouteDef>,

    #[serde(default)]
    pub state: IndexMap<String, StateField>,

    #[serde(default)]
    pub actions: Vec<ActionDef>,

    pub view: ViewNode,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub components: IndexMap<String, ComponentDef>,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub styles: IndexMap<String, StylePreset>,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub imports: IndexMap<String, Json>,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub data: IndexMap<String, Json>,
}

impl Program {
    /// Declared state field names, in declaration order.
    pub fn state_names(&self) -> impl Iterator<Item = &str> {
        self.state.keys().map(String::as_str)
    }

    pub fn action(&self, name: &str) -> Option<&ActionDef> {
        self.actions.iter().find(|a| a.name == name)
    }
}

/// The route a page is mounted at, e.g. `/users/:id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteDef {
    pub path: String,
}

impl RouteDef {
    /// Parameter names declared by `:name` segments of the path.
    pub fn param_names(&self) -> Vec<&str> {
        self.path
            .split('/')
            .filter_map(|seg| seg.strip_prefix(':'))
            .map(|name| name.trim_end_matches('?'))
            .filter(|name| !name.is_empty())
            .collect()
    }
}

/// A declared state field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateField {
    #[serde(rename = "type")]
    pub ty: ValueType,
    #[serde(default)]
    pub initial: Json,
}

/// Declared type of a state field or component parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    Number,
    String,
    Boolean,
    List,
    Object,
    Any,
}

/// A named action: an ordered list of steps run in response to an event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionDef {
    pub name: String,
    #[serde(default)]
    pub steps: Vec<ActionStep>,
}

/// A single action step, tagged by `do`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "do", rename_all = "camelCase")]
pub enum ActionStep {
    /// Replace a state field's value.
    Set { target: String, value: Expression },

    /// Apply an in-place operation to a state field.
    Update {
        target: String,
        operation: UpdateOperation,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        value: Option<Expression>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        index: Option<Expression>,
    },

    /// Issue an HTTP request and run follow-up steps.
    Fetch {
        url: Expression,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        method: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        body: Option<Expression>,
        /// Name the response is bound to inside `onSuccess` (defaults to `result`).
        #[serde(default, skip_serializing_if = "Option::is_none")]
        result: Option<String>,
        #[serde(default, rename = "onSuccess", skip_serializing_if = "Vec::is_empty")]
        on_success: Vec<ActionStep>,
        #[serde(default, rename = "onError", skip_serializing_if = "Vec::is_empty")]
        on_error: Vec<ActionStep>,
    },

    /// Client-side navigation.
    Navigate { url: Expression },

    /// Conditional steps.
    If {
        condition: Expression,
        #[serde(default)]
        then: Vec<ActionStep>,
        #[serde(default, rename = "else", skip_serializing_if = "Vec::is_empty")]
        otherwise: Vec<ActionStep>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum UpdateOperation {
    Increment,
    Decrement,
    Push,
    Pop,
    Remove,
    Toggle,
    Merge,
    ReplaceAt,
}

/// A node in the view tree, tagged by `kind`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ViewNode {
    /// An HTML element.
    Element {
        tag: String,
        #[serde(default)]
        props: IndexMap<String, PropValue>,
        #[serde(default)]
        children: Vec<ViewNode>,
        #[serde(default, rename = "ref", skip_serializing_if = "Option::is_none")]
        reference: Option<String>,
    },

    /// A text node rendering an expression.
    Text { value: Expression },

    /// Conditional rendering.
    If {
        condition: Expression,
        then: Box<ViewNode>,
        #[serde(default, rename = "else", skip_serializing_if = "Option::is_none")]
        otherwise: Option<Box<ViewNode>>,
    },

    /// List rendering. `as` names the item binding inside `key` and `body`.
    Each {
        items: Expression,
        #[serde(rename = "as")]
        binding: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        index: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        key: Option<Expression>,
        body: Box<ViewNode>,
    },

    /// A component instance.
    Component {
        name: String,
        #[serde(default)]
        props: IndexMap<String, Expression>,
        #[serde(default)]
        children: Vec<ViewNode>,
    },

    /// Slot placeholder inside a component view.
    Slot {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
    },
}

/// An element prop: either an event handler or a bound expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropValue {
    Event(EventHandler),
    Expr(Expression),
}

/// `{ event: "click", action: "increment", payload? }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventHandler {
    pub event: String,
    pub action: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Expression>,
}

/// A component definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentDef {
    #[serde(default)]
    pub params: IndexMap<String, ParamDef>,
    pub view: ViewNode,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamDef {
    #[serde(rename = "type")]
    pub ty: ValueType,
    #[serde(default = "default_required")]
    pub required: bool,
}

fn default_required() -> bool {
    true
}

/// A style preset: base classes plus per-variant class strings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StylePreset {
    #[serde(default)]
    pub base: String,
    /// variant name → (variant value → class string), in declaration order.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub variants: IndexMap<String, IndexMap<String, String>>,
    #[serde(
        default,
        rename = "defaultVariants",
        skip_serializing_if = "IndexMap::is_empty"
    )]
    pub default_variants: IndexMap<String, String>,
}

// ---------------------------------------------------------------------------
// Expression-level AST
// ---------------------------------------------------------------------------

/// Expression variants, tagged by `expr`.
///
/// This is the one vocabulary shared by the analyzer and the evaluator;
/// adding a variant forces both to handle it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "expr", rename_all = "camelCase")]
pub enum Expression {
    /// Literal JSON value: `42`, `"hi"`, `[1, 2]`
    Lit { value: Json },

    /// Declared state field, optionally followed by a dotted path.
    State {
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        path: Option<String>,
    },

    /// Compiler-injected local.
    Local { name: String },

    /// Lexical binding (lambda / each) or host global. `name` may be dotted.
    Var {
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        path: Option<String>,
    },

    /// Binary operation: `a + b`, `count > 0`
    Bin {
        op: BinaryOp,
        left: Box<Expression>,
        right: Box<Expression>,
    },

    /// Boolean negation.
    Not { operand: Box<Expression> },

    /// Ternary: `if ? then : else`
    Cond {
        #[serde(rename = "if")]
        condition: Box<Expression>,
        then: Box<Expression>,
        #[serde(rename = "else")]
        otherwise: Box<Expression>,
    },

    /// Static property chain: `base.a.b`
    Get { base: Box<Expression>, path: String },

    /// Dynamic access: `base[key]`
    Index {
        base: Box<Expression>,
        key: Box<Expression>,
    },

    /// Route parameter, query value or current path.
    Route {
        name: String,
        #[serde(default)]
        source: RouteSource,
    },

    Import {
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        path: Option<String>,
    },

    Data {
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        path: Option<String>,
    },

    /// Host element reference.
    Ref { name: String },

    /// Component parameter. Unresolved at evaluation time.
    Param {
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        path: Option<String>,
    },

    /// Style preset resolved to a class string.
    Style {
        name: String,
        #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
        variants: IndexMap<String, Expression>,
    },

    /// String join of all items.
    Concat { items: Vec<Expression> },

    /// Form validity query against an element ref.
    Validity {
        #[serde(rename = "ref")]
        reference: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        property: Option<String>,
    },

    /// Method call. A `null` target calls the global function table.
    Call {
        #[serde(default)]
        target: Option<Box<Expression>>,
        method: String,
        #[serde(default)]
        args: Vec<Expression>,
    },

    /// Anonymous function; only meaningful as a `call` argument.
    Lambda(Lambda),

    Array { elements: Vec<Expression> },

    Obj { props: IndexMap<String, Expression> },
}

/// `param => body` or `(param, index) => body`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lambda {
    pub param: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<String>,
    pub body: Box<Expression>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RouteSource {
    #[default]
    Param,
    Query,
    Path,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryOp {
    #[serde(rename = "+")]
    Add,
    #[serde(rename = "-")]
    Sub,
    #[serde(rename = "*")]
    Mul,
    #[serde(rename = "/")]
    Div,
    #[serde(rename = "%")]
    Mod,
    #[serde(rename = "==")]
    Eq,
    #[serde(rename = "!=")]
    Neq,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = "<=")]
    Lte,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = ">=")]
    Gte,
    #[serde(rename = "&&")]
    And,
    #[serde(rename = "||")]
    Or,
}

impl BinaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
            BinaryOp::Eq => "==",
            BinaryOp::Neq => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Lte => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Gte => ">=",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
        }
    }
}

impl std::fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.symbol())
    }
}

impl Expression {
    /// The `expr` tag of this node.
    pub fn kind(&self) -> &'static str {
        match self {
            Expression::Lit { .. } => "lit",
            Expression::State { .. } => "state",
            Expression::Local { .. } => "local",
            Expression::Var { .. } => "var",
            Expression::Bin { .. } => "bin",
            Expression::Not { .. } => "not",
            Expression::Cond { .. } => "cond",
            Expression::Get { .. } => "get",
            Expression::Index { .. } => "index",
            Expression::Route { .. } => "route",
            Expression::Import { .. } => "import",
            Expression::Data { .. } => "data",
            Expression::Ref { .. } => "ref",
            Expression::Param { .. } => "param",
            Expression::Style { .. } => "style",
            Expression::Concat { .. } => "concat",
            Expression::Validity { .. } => "validity",
            Expression::Call { .. } => "call",
            Expression::Lambda(_) => "lambda",
            Expression::Array { .. } => "array",
            Expression::Obj { .. } => "obj",
        }
    }

    // Constructors, mostly for tests and tooling that build trees by hand.

    pub fn lit(value: impl Into<Json>) -> Self {
        Expression::Lit {
            value: value.into(),
        }
    }

    pub fn state(name: &str) -> Self {
        Expression::State {
            name: name.into(),
            path: None,
        }
    }

    pub fn state_path(name: &str, path: &str) -> Self {
        Expression::State {
            name: name.into(),
            path: Some(path.into()),
        }
    }

    pub fn local(name: &str) -> Self {
        Expression::Local { name: name.into() }
    }

    pub fn var(name: &str) -> Self {
        Expression::Var {
            name: name.into(),
            path: None,
        }
    }

    pub fn var_path(name: &str, path: &str) -> Self {
        Expression::Var {
            name: name.into(),
            path: Some(path.into()),
        }
    }

    pub fn bin(op: BinaryOp, left: Expression, right: Expression) -> Self {
        Expression::Bin {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn not(operand: Expression) -> Self {
        Expression::Not {
            operand: Box::new(operand),
        }
    }

    pub fn cond(condition: Expression, then: Expression, otherwise: Expression) -> Self {
        Expression::Cond {
            condition: Box::new(condition),
            then: Box::new(then),
            otherwise: Box::new(otherwise),
        }
    }

    pub fn get(base: Expression, path: &str) -> Self {
        Expression::Get {
            base: Box::new(base),
            path: path.into(),
        }
    }

    pub fn index(base: Expression, key: Expression) -> Self {
        Expression::Index {
            base: Box::new(base),
            key: Box::new(key),
        }
    }

    pub fn route(name: &str, source: RouteSource) -> Self {
        Expression::Route {
            name: name.into(),
            source,
        }
    }

    pub fn param(name: &str) -> Self {
        Expression::Param {
            name: name.into(),
            path: None,
        }
    }

    pub fn style(name: &str, variants: Vec<(&str, Expression)>) -> Self {
        Expression::Style {
            name: name.into(),
            variants: variants
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
        }
    }

    pub fn concat(items: Vec<Expression>) -> Self {
        Expression::Concat { items }
    }

    pub fn call(target: Expression, method: &str, args: Vec<Expression>) -> Self {
        Expression::Call {
            target: Some(Box::new(target)),
            method: method.into(),
            args,
        }
    }

    pub fn call_global(method: &str, args: Vec<Expression>) -> Self {
        Expression::Call {
            target: None,
            method: method.into(),
            args,
        }
    }

    pub fn lambda(param: &str, body: Expression) -> Self {
        Expression::Lambda(Lambda {
            param: param.into(),
            index: None,
            body: Box::new(body),
        })
    }

    pub fn lambda_indexed(param: &str, index: &str, body: Expression) -> Self {
        Expression::Lambda(Lambda {
            param: param.into(),
            index: Some(index.into()),
            body: Box::new(body),
        })
    }

    pub fn array(elements: Vec<Expression>) -> Self {
        Expression::Array { elements }
    }

    pub fn obj(props: Vec<(&str, Expression)>) -> Self {
        Expression::Obj {
            props: props
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
        }
    }
}
