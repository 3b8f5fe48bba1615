//! Lumen Evaluator
//!
//! Executes analyzed Lumen expressions against a runtime context: the
//! reactive state, lexical locals, route/import/style tables, and a
//! [`HostAdapter`] for environment-specific lookups.
//!
//! Evaluation never fails. Unknown names, disallowed methods and forbidden
//! properties all evaluate to [`Value::Undefined`], so one bad expression
//! renders as a blank value instead of aborting the page.

pub mod call;
pub mod context;
pub mod evaluator;
pub mod functions;
pub mod host;
pub mod locals;
pub mod methods;
pub mod operators;
pub mod path;
pub mod style;
pub mod tables;
pub mod value;

pub use call::{CallArg, Closure};
pub use context::{EvalContext, RouteContext, StateReader};
pub use evaluator::evaluate;
pub use functions::{GlobalFn, GlobalFunctions};
pub use host::{DefaultHost, HostAdapter};
pub use locals::Locals;
pub use style::evaluate_style;
pub use tables::ProgramTables;
pub use value::{Function, Object, Value};
