//! Expression evaluator for the Knot AST
//!
//! Evaluation is strict and left to right. Identifiers are resolved at the
//! moment they are evaluated: first in the current call frame, then among the
//! globals, then among the intrinsics. Nothing about a global is remembered
//! by a closure, so renaming or deleting a global changes what any function
//! that mentions it does on its next call.

use crate::context::{CallFrame, InterpreterContext};
use crate::error::{EvaluationError, Result};
use crate::intrinsics::{Intrinsic, resolve_global};
use crate::value::{Closure, Value};
use knot_parser::{
    Argument, BinaryOperation, BinaryOperator, Expression, ExpressionKind, ForLoop,
    IfExpression, Span, Statement, StatementKind, UnaryOperation, UnaryOperator,
};
use std::cmp::Ordering;
use std::rc::Rc;
use tracing::trace;

/// Expression evaluator that takes parser AST nodes and produces values
#[derive(Debug, Default, Clone, Copy)]
pub struct ExpressionEvaluator;

impl ExpressionEvaluator {
    pub fn new() -> Self {
        Self
    }

    /// Execute a top-level statement and return its value
    pub fn execute(&self, context: &mut InterpreterContext, statement: &Statement) -> Result<Value> {
        match &statement.kind {
            StatementKind::Let(binding) => {
                let value = self
                    .evaluate(context, &binding.value)?
                    .named(&binding.name.name);
                context.define_global(binding.name.name.clone(), value);
                Ok(Value::Unit)
            }
            StatementKind::Del(identifier) => match context.remove_global(&identifier.name) {
                Some(_) => Ok(Value::Unit),
                None => Err(locate(
                    context,
                    EvaluationError::name_not_found(&identifier.name),
                    identifier.span,
                )),
            },
            StatementKind::For(for_loop) => self.execute_for(context, for_loop),
            StatementKind::Expression(expression) => self.evaluate(context, expression),
        }
    }

    fn execute_for(&self, context: &mut InterpreterContext, for_loop: &ForLoop) -> Result<Value> {
        let start = self
            .evaluate(context, &for_loop.start)?
            .as_integer()
            .map_err(|e| locate(context, e, for_loop.start.span))?;
        let end = self
            .evaluate(context, &for_loop.end)?
            .as_integer()
            .map_err(|e| locate(context, e, for_loop.end.span))?;

        for i in start..end {
            context.define_global(for_loop.variable.name.clone(), Value::Integer(i));
            self.evaluate(context, &for_loop.body)?;
        }
        Ok(Value::Unit)
    }

    /// Evaluate an expression in the given context
    pub fn evaluate(&self, context: &mut InterpreterContext, expression: &Expression) -> Result<Value> {
        self.evaluate_kind(context, expression)
            .map_err(|e| locate(context, e, expression.span))
    }

    fn evaluate_kind(&self, context: &mut InterpreterContext, expression: &Expression) -> Result<Value> {
        match &expression.kind {
            ExpressionKind::Integer(value) => Ok(Value::integer(*value)),
            ExpressionKind::Boolean(value) => Ok(Value::boolean(*value)),
            ExpressionKind::String(value) => Ok(Value::string(value.clone())),
            ExpressionKind::Unit => Ok(Value::Unit),
            ExpressionKind::Identifier(identifier) => {
                self.resolve_identifier(context, &identifier.name)
            }
            ExpressionKind::Function(function) => {
                let closure = Closure::new(Rc::clone(function), context.current_locals())
                    .with_origin(context.current_origin().cloned());
                Ok(Value::Closure(Rc::new(closure)))
            }
            ExpressionKind::Call(call) => {
                let callee = self.evaluate(context, &call.callee)?;
                let arguments = self.evaluate_arguments(context, &call.arguments)?;
                self.call(context, &callee, arguments)
            }
            ExpressionKind::If(if_expression) => self.evaluate_if(context, if_expression),
            ExpressionKind::BinaryOp(operation) => self.evaluate_binary(context, operation),
            ExpressionKind::UnaryOp(operation) => self.evaluate_unary(context, operation),
            ExpressionKind::Parenthesized(inner) => self.evaluate(context, inner),
        }
    }

    fn resolve_identifier(&self, context: &InterpreterContext, name: &str) -> Result<Value> {
        match context.lookup_local(name) {
            Some(value) => Ok(value.clone()),
            None => resolve_global(context, name),
        }
    }

    fn evaluate_arguments(
        &self,
        context: &mut InterpreterContext,
        arguments: &[Argument],
    ) -> Result<Vec<Value>> {
        let mut values = Vec::with_capacity(arguments.len());
        for argument in arguments {
            match argument {
                Argument::Positional(expression) => values.push(self.evaluate(context, expression)?),
                Argument::Spread(expression) => match self.evaluate(context, expression)? {
                    Value::Tuple(items) => values.extend(items),
                    other => {
                        let error = EvaluationError::type_mismatch("Tuple", other.type_name());
                        return Err(locate(context, error, expression.span));
                    }
                },
            }
        }
        Ok(values)
    }

    /// Call any callable value with evaluated arguments
    pub fn call(
        &self,
        context: &mut InterpreterContext,
        callee: &Value,
        arguments: Vec<Value>,
    ) -> Result<Value> {
        match callee {
            Value::Closure(closure) => self.call_closure(context, closure, arguments),
            Value::Intrinsic(intrinsic) => self.call_intrinsic(context, *intrinsic, arguments),
            other => Err(EvaluationError::not_callable(other.type_name())),
        }
    }

    fn call_intrinsic(
        &self,
        context: &mut InterpreterContext,
        intrinsic: Intrinsic,
        arguments: Vec<Value>,
    ) -> Result<Value> {
        intrinsic.invoke(context, arguments)
    }

    fn call_closure(
        &self,
        context: &mut InterpreterContext,
        closure: &Closure,
        arguments: Vec<Value>,
    ) -> Result<Value> {
        let function = &closure.function;
        let arity = function.arity();
        let arity_ok = if function.is_variadic() {
            arguments.len() >= arity
        } else {
            arguments.len() == arity
        };
        if !arity_ok {
            return Err(EvaluationError::wrong_arity(
                closure.display_name(),
                closure.arity_description(),
                arguments.len(),
            ));
        }

        let mut locals = closure.captured.clone();
        let mut arguments = arguments.into_iter();
        for parameter in &function.parameters {
            if let Some(value) = arguments.next() {
                locals.insert(parameter.name.clone(), value);
            }
        }
        if let Some(rest) = &function.rest {
            locals.insert(rest.name.clone(), Value::Tuple(arguments.collect()));
        }

        let frame =
            CallFrame::new(closure.display_name(), locals).with_origin(closure.origin.clone());
        context.push_call_frame(frame)?;
        trace!(
            function = closure.display_name(),
            depth = context.call_stack_depth(),
            "call"
        );
        let result = self.evaluate(context, &function.body);
        context.pop_call_frame()?;
        result
    }

    fn evaluate_if(&self, context: &mut InterpreterContext, if_expression: &IfExpression) -> Result<Value> {
        let condition = self.evaluate(context, &if_expression.condition)?;
        let condition = condition
            .as_boolean()
            .map_err(|e| locate(context, e, if_expression.condition.span))?;
        if condition {
            self.evaluate(context, &if_expression.then_branch)
        } else {
            self.evaluate(context, &if_expression.else_branch)
        }
    }

    fn evaluate_binary(
        &self,
        context: &mut InterpreterContext,
        operation: &BinaryOperation,
    ) -> Result<Value> {
        if matches!(
            operation.operator,
            BinaryOperator::LogicalAnd | BinaryOperator::LogicalOr
        ) {
            return self.evaluate_logical(context, operation);
        }

        let left = self.evaluate(context, &operation.left)?;
        let right = self.evaluate(context, &operation.right)?;
        let symbol = operation.operator.symbol();
        match operation.operator {
            BinaryOperator::Add => left.add(&right),
            BinaryOperator::Subtract => left.subtract(&right),
            BinaryOperator::Multiply => left.multiply(&right),
            BinaryOperator::Divide => left.divide(&right),
            BinaryOperator::Modulo => left.modulo(&right),
            BinaryOperator::Equal => Ok(Value::Boolean(left.equals(&right))),
            BinaryOperator::NotEqual => Ok(Value::Boolean(!left.equals(&right))),
            BinaryOperator::Less => Ok(Value::Boolean(left.compare(&right, symbol)? == Ordering::Less)),
            BinaryOperator::LessEqual => {
                Ok(Value::Boolean(left.compare(&right, symbol)? != Ordering::Greater))
            }
            BinaryOperator::Greater => {
                Ok(Value::Boolean(left.compare(&right, symbol)? == Ordering::Greater))
            }
            BinaryOperator::GreaterEqual => {
                Ok(Value::Boolean(left.compare(&right, symbol)? != Ordering::Less))
            }
            BinaryOperator::LogicalAnd => Ok(Value::Boolean(left.as_boolean()? && right.as_boolean()?)),
            BinaryOperator::LogicalOr => Ok(Value::Boolean(left.as_boolean()? || right.as_boolean()?)),
        }
    }

    /// `&&` and `||` only evaluate the right operand when it decides the result
    fn evaluate_logical(
        &self,
        context: &mut InterpreterContext,
        operation: &BinaryOperation,
    ) -> Result<Value> {
        let left = self
            .evaluate(context, &operation.left)?
            .as_boolean()
            .map_err(|e| locate(context, e, operation.left.span))?;
        let short_circuit = match operation.operator {
            BinaryOperator::LogicalAnd => !left,
            _ => left,
        };
        if short_circuit {
            return Ok(Value::Boolean(left));
        }
        let right = self
            .evaluate(context, &operation.right)?
            .as_boolean()
            .map_err(|e| locate(context, e, operation.right.span))?;
        Ok(Value::Boolean(right))
    }

    fn evaluate_unary(&self, context: &mut InterpreterContext, operation: &UnaryOperation) -> Result<Value> {
        let operand = self.evaluate(context, &operation.operand)?;
        match operation.operator {
            UnaryOperator::Negate => operand.negate(),
            UnaryOperator::Not => operand.not(),
        }
    }
}

/// Attach `span` to `error`, naming the source of the code running now
fn locate(context: &InterpreterContext, error: EvaluationError, span: Span) -> EvaluationError {
    error.located(span, context.current_origin().map(|origin| &**origin))
}
