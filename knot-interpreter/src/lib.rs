//! Knot interpreter
//!
//! Evaluates Knot programs parsed by `knot-parser`. Top-level names are late
//! bound: a function that mentions a global looks it up each time it runs.
//! The prelude's `fix` ties recursion through arguments instead, and values
//! of any kind can be dumped to and loaded from JSON snapshots.

#![allow(clippy::result_large_err)]

pub mod config;
pub mod context;
pub mod error;
pub mod evaluator;
pub mod intrinsics;
pub mod prelude;
pub mod session;
pub mod snapshot;
pub mod value;

#[cfg(test)]
#[path = "tests/mod.rs"]
mod tests;

pub use config::{DEFAULT_MAX_CALL_DEPTH, InterpreterConfig};
pub use context::{CallFrame, ContextError, InterpreterContext};
pub use error::{EvaluationError, Result};
pub use evaluator::ExpressionEvaluator;
pub use intrinsics::Intrinsic;
pub use session::{InterpreterSession, SessionError};
pub use snapshot::{
    MAX_SNAPSHOT_DEPTH, SNAPSHOT_FORMAT, SNAPSHOT_VERSION, SnapshotError, ValueSnapshot,
};
pub use value::{Closure, Value};

/// Evaluate source text in a fresh default session
///
/// Mainly useful for tests and one-off evaluation.
pub fn evaluate_from_string(source: &str) -> std::result::Result<Value, SessionError> {
    let mut session = InterpreterSession::new()?;
    session.evaluate(source)
}
