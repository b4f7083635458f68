//! Interpreter session
//!
//! A session owns the global namespace, the configuration and the output
//! sink. Source text goes in, values come out; state persists between calls
//! so a REPL or a sequence of scripts can build on earlier definitions.

use crate::config::InterpreterConfig;
use crate::context::InterpreterContext;
use crate::error::{EvaluationError, Result};
use crate::evaluator::ExpressionEvaluator;
use crate::prelude;
use crate::value::Value;
use knot_parser::{ParseError, Program};
use miette::Diagnostic;
use thiserror::Error;
use tracing::debug;

/// Errors from running source text through a session
#[derive(Debug, Error, Diagnostic)]
pub enum SessionError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Evaluation(#[from] EvaluationError),
}

/// Interpreter session for evaluating Knot programs
#[derive(Debug)]
pub struct InterpreterSession {
    evaluator: ExpressionEvaluator,
    context: InterpreterContext,
    config: InterpreterConfig,
}

impl InterpreterSession {
    /// Create a session with the default configuration
    pub fn new() -> std::result::Result<Self, SessionError> {
        Self::with_config(InterpreterConfig::default())
    }

    pub fn with_config(config: InterpreterConfig) -> std::result::Result<Self, SessionError> {
        let mut session = Self {
            evaluator: ExpressionEvaluator::new(),
            context: InterpreterContext::new(&config),
            config,
        };
        if session.config.load_prelude {
            prelude::load(&mut session.context)?;
        }
        Ok(session)
    }

    /// Run source text and return the value of its last statement
    pub fn evaluate(&mut self, source: &str) -> std::result::Result<Value, SessionError> {
        let values = self.run_program(source)?;
        Ok(values.into_iter().last().unwrap_or(Value::Unit))
    }

    /// Run source text and return one value per top-level statement
    pub fn run_program(&mut self, source: &str) -> std::result::Result<Vec<Value>, SessionError> {
        self.run_program_with_source(source, None)
    }

    pub fn run_program_with_source(
        &mut self,
        source: &str,
        source_file: Option<String>,
    ) -> std::result::Result<Vec<Value>, SessionError> {
        let program = knot_parser::parse_program_with_source(source, source_file)?;
        Ok(self.execute_program(&program)?)
    }

    /// Execute an already parsed program.
    ///
    /// Statements run in order and the first failure stops the program;
    /// bindings made by earlier statements stay in place.
    pub fn execute_program(&mut self, program: &Program) -> Result<Vec<Value>> {
        debug!(
            source = program.source_file.as_deref().unwrap_or("<input>"),
            statements = program.statements.len(),
            "executing program"
        );
        self.context.set_origin(program.source_file.as_deref());
        let mut values = Vec::with_capacity(program.statements.len());
        for statement in &program.statements {
            match self.evaluator.execute(&mut self.context, statement) {
                Ok(value) => values.push(value),
                Err(error) => {
                    self.context.unwind();
                    return Err(error);
                }
            }
        }
        Ok(values)
    }

    /// Call a function value from the host
    pub fn call(&mut self, callee: &Value, arguments: Vec<Value>) -> Result<Value> {
        let result = self.evaluator.call(&mut self.context, callee, arguments);
        if result.is_err() {
            self.context.unwind();
        }
        result
    }

    /// Look a global up by name right now and call it
    pub fn call_global(&mut self, name: &str, arguments: Vec<Value>) -> Result<Value> {
        let callee = self
            .lookup_global(name)
            .cloned()
            .ok_or_else(|| EvaluationError::name_not_found(name))?;
        self.call(&callee, arguments)
    }

    pub fn define_global(&mut self, name: &str, value: Value) {
        self.context.define_global(name, value.named(name));
    }

    pub fn remove_global(&mut self, name: &str) -> Option<Value> {
        self.context.remove_global(name)
    }

    pub fn lookup_global(&self, name: &str) -> Option<&Value> {
        self.context.lookup_global(name)
    }

    pub fn global_names(&self) -> Vec<String> {
        self.context.global_names()
    }

    /// Take the lines printed since the last call (captured output only)
    pub fn take_output(&mut self) -> Vec<String> {
        self.context.take_output()
    }

    /// Drop every global and bind the prelude again
    pub fn reset(&mut self) -> std::result::Result<(), SessionError> {
        self.context.clear_globals();
        self.context.unwind();
        if self.config.load_prelude {
            prelude::load(&mut self.context)?;
        }
        Ok(())
    }

    pub fn config(&self) -> &InterpreterConfig {
        &self.config
    }

    pub fn context(&self) -> &InterpreterContext {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut InterpreterContext {
        &mut self.context
    }
}
