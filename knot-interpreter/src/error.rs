//! Runtime error types for the Knot interpreter.
//!
//! Every error is a miette diagnostic. Spans are optional because values
//! can fail outside of any expression (for example when a host calls a
//! closure directly); the evaluator fills them in on the way out.

use crate::context::ContextError;
use crate::snapshot::SnapshotError;
use knot_parser::{Span, span_to_source_span};
use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

/// Errors that can occur while evaluating Knot code
#[derive(Error, Diagnostic, Debug)]
pub enum EvaluationError {
    #[error("Name '{name}' is not defined")]
    #[diagnostic(
        code(knot::runtime::name_not_found),
        help("Names are looked up when the code runs; bind it with `let {name} = ...;` first")
    )]
    NameNotFound {
        name: String,
        #[label("not defined")]
        span: Option<SourceSpan>,
        origin: Option<String>,
    },

    #[error("Wrong arity: {function} expects {expected} arguments, got {found}")]
    #[diagnostic(
        code(knot::runtime::wrong_arity),
        help("Check the function's parameter list for the correct number of arguments")
    )]
    WrongArity {
        function: String,
        expected: String,
        found: usize,
        #[label("wrong number of arguments")]
        span: Option<SourceSpan>,
        origin: Option<String>,
    },

    #[error("Type mismatch: expected {expected}, found {found}")]
    #[diagnostic(
        code(knot::runtime::type_mismatch),
        help("Check that the value has the expected type")
    )]
    TypeMismatch {
        expected: String,
        found: String,
        #[label("type mismatch here")]
        span: Option<SourceSpan>,
        origin: Option<String>,
    },

    #[error("Invalid operation: {operation} cannot be applied to [{operand_types}]")]
    #[diagnostic(
        code(knot::runtime::invalid_operation),
        help("Check that the operation is supported for these types")
    )]
    InvalidOperation {
        operation: String,
        operand_types: String,
        #[label("invalid operation")]
        span: Option<SourceSpan>,
        origin: Option<String>,
    },

    #[error("Value of type {type_name} is not callable")]
    #[diagnostic(
        code(knot::runtime::not_callable),
        help("Only functions and intrinsics can be called")
    )]
    NotCallable {
        type_name: String,
        #[label("called here")]
        span: Option<SourceSpan>,
        origin: Option<String>,
    },

    #[error("Division by zero")]
    #[diagnostic(
        code(knot::runtime::division_by_zero),
        help("Ensure the divisor is not zero before division")
    )]
    DivisionByZero {
        #[label("division by zero here")]
        span: Option<SourceSpan>,
        origin: Option<String>,
    },

    #[error("Integer overflow in {operation}")]
    #[diagnostic(
        code(knot::runtime::integer_overflow),
        help("Integers are signed 64-bit values")
    )]
    IntegerOverflow {
        operation: String,
        #[label("overflows here")]
        span: Option<SourceSpan>,
        origin: Option<String>,
    },

    #[error("{message}")]
    #[diagnostic(code(knot::runtime::raised))]
    Raised {
        message: String,
        #[label("raised here")]
        span: Option<SourceSpan>,
        origin: Option<String>,
    },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Context(#[from] ContextError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Snapshot(#[from] SnapshotError),
}

impl EvaluationError {
    pub fn name_not_found(name: &str) -> Self {
        Self::NameNotFound {
            name: name.to_string(),
            span: None,
            origin: None,
        }
    }

    pub fn wrong_arity(function: &str, expected: impl Into<String>, found: usize) -> Self {
        Self::WrongArity {
            function: function.to_string(),
            expected: expected.into(),
            found,
            span: None,
            origin: None,
        }
    }

    pub fn type_mismatch(expected: &str, found: &str) -> Self {
        Self::TypeMismatch {
            expected: expected.to_string(),
            found: found.to_string(),
            span: None,
            origin: None,
        }
    }

    pub fn invalid_operation(operation: &str, operand_types: &[&str]) -> Self {
        Self::InvalidOperation {
            operation: operation.to_string(),
            operand_types: operand_types.join(", "),
            span: None,
            origin: None,
        }
    }

    pub fn not_callable(type_name: &str) -> Self {
        Self::NotCallable {
            type_name: type_name.to_string(),
            span: None,
            origin: None,
        }
    }

    pub fn division_by_zero() -> Self {
        Self::DivisionByZero {
            span: None,
            origin: None,
        }
    }

    pub fn integer_overflow(operation: &str) -> Self {
        Self::IntegerOverflow {
            operation: operation.to_string(),
            span: None,
            origin: None,
        }
    }

    pub fn raised(message: String) -> Self {
        Self::Raised {
            message,
            span: None,
            origin: None,
        }
    }

    /// Attach a source location unless the error already carries one.
    ///
    /// Errors keep the innermost location they were given, so an error
    /// raised deep inside a recursive call still points at the failing
    /// expression rather than at the outermost call. `source_name` names
    /// the source text the location belongs to.
    pub fn located(mut self, location: Span, source_name: Option<&str>) -> Self {
        if let Some((span, origin)) = self.location_mut() {
            if span.is_none() {
                *span = Some(span_to_source_span(location));
                *origin = source_name.map(str::to_string);
            }
        }
        self
    }

    /// The source location of the error, if one was recorded
    pub fn span(&self) -> Option<SourceSpan> {
        match self {
            Self::NameNotFound { span, .. }
            | Self::WrongArity { span, .. }
            | Self::TypeMismatch { span, .. }
            | Self::InvalidOperation { span, .. }
            | Self::NotCallable { span, .. }
            | Self::DivisionByZero { span, .. }
            | Self::IntegerOverflow { span, .. }
            | Self::Raised { span, .. } => *span,
            Self::Context(_) | Self::Snapshot(_) => None,
        }
    }

    /// Name of the source text that [`span`](Self::span) points into
    /// (`None` for unnamed input)
    pub fn origin(&self) -> Option<&str> {
        match self {
            Self::NameNotFound { origin, .. }
            | Self::WrongArity { origin, .. }
            | Self::TypeMismatch { origin, .. }
            | Self::InvalidOperation { origin, .. }
            | Self::NotCallable { origin, .. }
            | Self::DivisionByZero { origin, .. }
            | Self::IntegerOverflow { origin, .. }
            | Self::Raised { origin, .. } => origin.as_deref(),
            Self::Context(_) | Self::Snapshot(_) => None,
        }
    }

    fn location_mut(&mut self) -> Option<(&mut Option<SourceSpan>, &mut Option<String>)> {
        match self {
            Self::NameNotFound { span, origin, .. }
            | Self::WrongArity { span, origin, .. }
            | Self::TypeMismatch { span, origin, .. }
            | Self::InvalidOperation { span, origin, .. }
            | Self::NotCallable { span, origin, .. }
            | Self::DivisionByZero { span, origin }
            | Self::IntegerOverflow { span, origin, .. }
            | Self::Raised { span, origin, .. } => Some((span, origin)),
            Self::Context(_) | Self::Snapshot(_) => None,
        }
    }
}

/// Type alias for interpreter results
pub type Result<T> = std::result::Result<T, EvaluationError>;
