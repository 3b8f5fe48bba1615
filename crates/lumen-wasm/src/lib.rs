//! WASM bindings for the Lumen expression engine.
//!
//! Exposes `analyze()`, `evaluate()` and `version()` to JavaScript via
//! wasm-bindgen. Inputs are JSON strings; results are plain JS objects.

use indexmap::IndexMap;
use lumen_analyzer::SemanticError;
use lumen_ast::ParseError;
use lumen_eval::{DefaultHost, ProgramTables};
use serde::Serialize;
use serde_json::Value as Json;
use wasm_bindgen::prelude::*;

/// Result of analyzing one program.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub ok: bool,
    pub errors: Vec<SemanticError>,
}

/// Analyze a program given as JSON.
///
/// Returns `{ ok: boolean, errors: [{ code, message, path }] }`.
/// Throws a JS error if the JSON does not describe a program.
#[wasm_bindgen]
pub fn analyze(program_json: &str) -> Result<JsValue, JsError> {
    let report = analyze_report(program_json).map_err(|e| JsError::new(&e.to_string()))?;

    let js_obj = js_sys::Object::new();
    js_sys::Reflect::set(&js_obj, &"ok".into(), &report.ok.into())
        .map_err(|_| JsError::new("Failed to set ok property"))?;
    js_sys::Reflect::set(&js_obj, &"errors".into(), &to_js(&report.errors)?)
        .map_err(|_| JsError::new("Failed to set errors property"))?;

    Ok(js_obj.into())
}

/// Evaluate one expression.
///
/// `state_json` is an object of state values. When `program_json` is given,
/// its initial state, styles, imports and data are available too, with
/// `state_json` overriding the initial values.
#[wasm_bindgen]
pub fn evaluate(
    expr_json: &str,
    state_json: Option<String>,
    program_json: Option<String>,
) -> Result<JsValue, JsError> {
    let value = evaluate_json(expr_json, state_json.as_deref(), program_json.as_deref())
        .map_err(|e| JsError::new(&e.to_string()))?;
    to_js(&value)
}

/// Get the engine version.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

pub fn analyze_report(program_json: &str) -> Result<AnalysisReport, ParseError> {
    let program = lumen_ast::parse_program(program_json)?;
    Ok(match lumen_analyzer::analyze(&program) {
        Ok(()) => AnalysisReport {
            ok: true,
            errors: Vec::new(),
        },
        Err(errors) => AnalysisReport { ok: false, errors },
    })
}

pub fn evaluate_json(
    expr_json: &str,
    state_json: Option<&str>,
    program_json: Option<&str>,
) -> Result<Json, ParseError> {
    let expr = lumen_ast::parse_expression(expr_json)?;
    let mut tables = match program_json {
        Some(json) => ProgramTables::from_program(&lumen_ast::parse_program(json)?),
        None => ProgramTables::default(),
    };
    if let Some(json) = state_json {
        let state: IndexMap<String, Json> = serde_json::from_str(json)?;
        tables.overlay_state(&state);
    }
    let ctx = tables.context(&DefaultHost);
    Ok(lumen_eval::evaluate(&expr, &ctx).to_json())
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsError> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| JsError::new(&e.to_string()))
}
