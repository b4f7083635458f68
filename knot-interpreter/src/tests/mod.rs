//! Interpreter tests: source text in, values and errors out.

use crate::{InterpreterConfig, InterpreterSession, SessionError, Value};

mod test_snapshots;

/// Session that captures `print` output
fn session() -> InterpreterSession {
    session_with(InterpreterConfig::default())
}

fn session_with(config: InterpreterConfig) -> InterpreterSession {
    InterpreterSession::with_config(config.with_captured_output(true)).unwrap()
}

fn eval(session: &mut InterpreterSession, source: &str) -> Value {
    match session.evaluate(source) {
        Ok(value) => value,
        Err(error) => panic!("evaluating {source:?} failed: {error:?}"),
    }
}

fn eval_error(session: &mut InterpreterSession, source: &str) -> crate::EvaluationError {
    match session.evaluate(source) {
        Err(SessionError::Evaluation(error)) => error,
        Err(SessionError::Parse(error)) => panic!("{source:?} did not parse: {error:?}"),
        Ok(value) => panic!("{source:?} should have failed, got {value}"),
    }
}

const FIB: &str = "let fib = fn(n) -> if n < 2 { 1 } else { fib(n - 1) + fib(n - 2) };";

const FIX_FIB: &str =
    "let fib = fix(fn(fib, n) -> if n < 2 { 1 } else { fib(n - 1) + fib(n - 2) });";
