//! Knot source evaluated at the start of every session

use crate::context::InterpreterContext;
use crate::evaluator::ExpressionEvaluator;
use crate::session::SessionError;
use tracing::debug;

/// Prelude source text
pub const PRELUDE_SOURCE: &str = include_str!("prelude.knot");

/// Names the prelude binds
pub const PRELUDE_NAMES: &[&str] = &["fix"];

/// Source name given to prelude code in diagnostics
pub const PRELUDE_ORIGIN: &str = "<prelude>";

/// Bind the prelude into `context`
pub fn load(context: &mut InterpreterContext) -> Result<(), SessionError> {
    let program =
        knot_parser::parse_program_with_source(PRELUDE_SOURCE, Some(PRELUDE_ORIGIN.to_string()))?;
    context.set_origin(program.source_file.as_deref());
    let evaluator = ExpressionEvaluator::new();
    for statement in &program.statements {
        evaluator.execute(context, statement)?;
    }
    debug!(names = ?PRELUDE_NAMES, "prelude loaded");
    Ok(())
}
