//! Lumen AST
//!
//! The JSON-shaped data model of a Lumen page program: state declarations,
//! actions, the view tree, components, style presets, and the expression
//! grammar shared by the analyzer and the evaluator.
//!
//! Programs are produced upstream as JSON; [`loader`] turns that JSON into
//! typed trees. The [`builtins`] tables define which methods and property
//! names the engine will ever touch.

pub mod ast;
pub mod builtins;
pub mod loader;

pub use ast::{
    ActionDef, ActionStep, BinaryOp, ComponentDef, EventHandler, Expression, Lambda, ParamDef,
    Program, PropValue, RouteDef, RouteSource, StateField, StylePreset, UpdateOperation,
    ValueType, ViewNode,
};
pub use loader::{parse_expression, parse_program};

/// Loader error with position information.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("Parse error at line {line}, column {column}: {message}")]
pub struct ParseError {
    pub message: String,
    pub line: usize,
    pub column: usize,
}
