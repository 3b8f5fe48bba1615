//! Semantic error values.
//!
//! Analysis failures are data: each error carries a stable code, a message,
//! and the JSON pointer of the offending node.

use serde::Serialize;
use std::fmt;

/// Stable error codes reported by the analyzer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    UndefinedState,
    VarUndefined,
    UndefinedAction,
    UndefinedComponent,
    UndefinedParam,
    UndefinedStyle,
    UndefinedImport,
    UndefinedData,
    UndefinedRef,
    UndefinedRouteParam,
    ForbiddenKey,
    InvalidLambdaPosition,
    DuplicateBinding,
}

impl ErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::UndefinedState => "UNDEFINED_STATE",
            ErrorCode::VarUndefined => "VAR_UNDEFINED",
            ErrorCode::UndefinedAction => "UNDEFINED_ACTION",
            ErrorCode::UndefinedComponent => "UNDEFINED_COMPONENT",
            ErrorCode::UndefinedParam => "UNDEFINED_PARAM",
            ErrorCode::UndefinedStyle => "UNDEFINED_STYLE",
            ErrorCode::UndefinedImport => "UNDEFINED_IMPORT",
            ErrorCode::UndefinedData => "UNDEFINED_DATA",
            ErrorCode::UndefinedRef => "UNDEFINED_REF",
            ErrorCode::UndefinedRouteParam => "UNDEFINED_ROUTE_PARAM",
            ErrorCode::ForbiddenKey => "FORBIDDEN_KEY",
            ErrorCode::InvalidLambdaPosition => "INVALID_LAMBDA_POSITION",
            ErrorCode::DuplicateBinding => "DUPLICATE_BINDING",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A semantic error located by JSON pointer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SemanticError {
    pub code: ErrorCode,
    pub message: String,
    pub path: String,
}

impl fmt::Display for SemanticError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} at {}", self.code, self.message, self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_code_serializes_like_display() {
        for code in [
            ErrorCode::UndefinedState,
            ErrorCode::VarUndefined,
            ErrorCode::UndefinedRouteParam,
            ErrorCode::InvalidLambdaPosition,
        ] {
            let json = serde_json::to_value(code).unwrap();
            assert_eq!(json, serde_json::Value::String(code.to_string()));
        }
    }

    #[test]
    fn test_error_display() {
        let err = SemanticError {
            code: ErrorCode::UndefinedState,
            message: "Undefined state 'count'".into(),
            path: "/view/value".into(),
        };
        assert_eq!(
            err.to_string(),
            "UNDEFINED_STATE: Undefined state 'count' at /view/value"
        );
    }
}
