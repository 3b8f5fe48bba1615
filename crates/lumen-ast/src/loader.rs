//! JSON loader for Lumen programs.
//!
//! Programs arrive already parsed into the JSON shape of [`crate::ast`];
//! loading is a typed deserialization that rejects unknown node tags and
//! unknown operator symbols with a positioned [`ParseError`].

use crate::ast::{Expression, Program};
use crate::ParseError;

/// Load a program from its JSON source.
pub fn parse_program(source: &str) -> Result<Program, ParseError> {
    serde_json::from_str(source).map_err(ParseError::from)
}

/// Load a single expression from its JSON source.
pub fn parse_expression(source: &str) -> Result<Expression, ParseError> {
    serde_json::from_str(source).map_err(ParseError::from)
}

impl From<serde_json::Error> for ParseError {
    fn from(e: serde_json::Error) -> Self {
        // serde_json appends " at line L column C" to Display; keep the bare message.
        let full = e.to_string();
        let message = match full.rfind(" at line ") {
            Some(pos) => full[..pos].to_string(),
            None => full,
        };
        ParseError {
            message,
            line: e.line(),
            column: e.column(),
        }
    }
}
