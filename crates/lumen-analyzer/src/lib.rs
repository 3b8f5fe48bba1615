//! Lumen Analyzer
//!
//! Static scope checking for Lumen programs. Every expression embedded in a
//! program's actions, view and components is checked against the declared
//! state and the lexical scopes open at that point, before anything runs.
//!
//! ```text
//! Program → analyze() → Ok(()) | Err(Vec<SemanticError { code, message, path }>)
//! ```

pub mod analyzer;
pub mod error;
pub mod pointer;
pub mod scope;

pub use analyzer::{analyze, analyze_with, AnalyzerConfig};
pub use error::{ErrorCode, SemanticError};
pub use scope::{Origin, ScopeError, ScopeFrame, SymbolEnvironment};
