use crate::{parse_expression, ExpressionKind, FunctionLiteral, ParseError};
use pretty_assertions::assert_eq;
use std::rc::Rc;

fn function(source: &str) -> Rc<FunctionLiteral> {
    match parse_expression(source).unwrap().kind {
        ExpressionKind::Function(function) => function,
        other => panic!("Expected function literal, got {other:?}"),
    }
}

fn names(function: &FunctionLiteral) -> Vec<&str> {
    function.parameters.iter().map(|p| p.name.as_str()).collect()
}

#[test]
fn test_self_aware_function() {
    let fib = function("fn(self, n) -> if n < 2 { 1 } else { self(n - 1) + self(n - 2) }");

    assert_eq!(names(&fib), vec!["self", "n"]);
    assert_eq!(fib.arity(), 2);
    assert!(!fib.is_variadic());
    assert!(matches!(fib.body.kind, ExpressionKind::If(_)));
}

#[test]
fn test_function_without_parameters() {
    let thunk = function("fn() -> 42");
    assert!(thunk.parameters.is_empty());
    assert_eq!(thunk.body.kind, ExpressionKind::Integer(42));
}

#[test]
fn test_rest_parameter_only() {
    let tied = function("fn(...args) -> base(self(self), ...args)");
    assert_eq!(tied.arity(), 0);
    assert_eq!(tied.rest.as_ref().map(|r| r.name.as_str()), Some("args"));
}

#[test]
fn test_positional_and_rest_parameters() {
    let f = function("fn(first, ...others) -> first");
    assert_eq!(names(&f), vec!["first"]);
    assert_eq!(f.rest.as_ref().map(|r| r.name.as_str()), Some("others"));
    assert!(f.is_variadic());
}

#[test]
fn test_body_extends_to_the_end() {
    let f = function("fn(x) -> x + 1");
    assert!(matches!(f.body.kind, ExpressionKind::BinaryOp(_)));
}

#[test]
fn test_nested_fixed_point_definition() {
    let fix = function("fn(base) -> (fn(g) -> g(g))(fn(self) -> fn(...args) -> base(self(self), ...args))");

    assert_eq!(names(&fix), vec!["base"]);
    match &fix.body.kind {
        ExpressionKind::Call(call) => {
            assert!(matches!(call.callee.kind, ExpressionKind::Parenthesized(_)));
            assert_eq!(call.arguments.len(), 1);
        }
        other => panic!("Expected self-application call, got {other:?}"),
    }
}

#[test]
fn test_duplicate_parameter_rejected() {
    match parse_expression("fn(n, n) -> n") {
        Err(ParseError::DuplicateParameter { name, .. }) => assert_eq!(name, "n"),
        other => panic!("Expected duplicate parameter error, got {other:?}"),
    }
}

#[test]
fn test_duplicate_rest_parameter_rejected() {
    assert!(matches!(
        parse_expression("fn(args, ...args) -> args"),
        Err(ParseError::DuplicateParameter { .. })
    ));
}
