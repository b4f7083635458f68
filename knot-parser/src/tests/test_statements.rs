use crate::{parse_program, parse_program_with_source, ExpressionKind, StatementKind};
use pretty_assertions::assert_eq;

#[test]
fn test_let_binding() {
    let program = parse_program("let answer = 42;").unwrap();
    assert_eq!(program.statements.len(), 1);

    match &program.statements[0].kind {
        StatementKind::Let(binding) => {
            assert_eq!(binding.name.name, "answer");
            assert_eq!(binding.value.kind, ExpressionKind::Integer(42));
        }
        other => panic!("Expected let binding, got {other:?}"),
    }
}

#[test]
fn test_del_statement() {
    let program = parse_program("del fib;").unwrap();
    match &program.statements[0].kind {
        StatementKind::Del(name) => assert_eq!(name.name, "fib"),
        other => panic!("Expected del statement, got {other:?}"),
    }
}

#[test]
fn test_for_statement() {
    let program = parse_program("for n in 0..9 { print(fib(n)) }").unwrap();
    match &program.statements[0].kind {
        StatementKind::For(for_loop) => {
            assert_eq!(for_loop.variable.name, "n");
            assert_eq!(for_loop.start.kind, ExpressionKind::Integer(0));
            assert_eq!(for_loop.end.kind, ExpressionKind::Integer(9));
            assert!(matches!(for_loop.body.kind, ExpressionKind::Call(_)));
        }
        other => panic!("Expected for loop, got {other:?}"),
    }
}

#[test]
fn test_trailing_expression_without_semicolon() {
    let program = parse_program("let x = 1;\nx + 1").unwrap();
    assert_eq!(program.statements.len(), 2);
    assert!(matches!(program.statements[1].kind, StatementKind::Expression(_)));
}

#[test]
fn test_renaming_script() {
    let source = r#"
        # late-bound recursion through the global name
        let fib = fn(n) -> if n == 0 || n == 1 { 1 } else { fib(n - 1) + fib(n - 2) };
        let foo = fib;
        del fib;
        foo(5);
    "#;

    let program = parse_program(source).unwrap();
    let kinds: Vec<&str> = program
        .statements
        .iter()
        .map(|statement| match statement.kind {
            StatementKind::Let(_) => "let",
            StatementKind::Del(_) => "del",
            StatementKind::For(_) => "for",
            StatementKind::Expression(_) => "expression",
        })
        .collect();

    assert_eq!(kinds, vec!["let", "let", "del", "expression"]);
}

#[test]
fn test_empty_program() {
    let program = parse_program("  # nothing here\n").unwrap();
    assert!(program.statements.is_empty());
}

#[test]
fn test_source_file_is_recorded() {
    let program = parse_program_with_source("1;", Some("fib.knot".to_string())).unwrap();
    assert_eq!(program.source_file.as_deref(), Some("fib.knot"));
}

#[test]
fn test_keyword_cannot_be_bound() {
    assert!(parse_program("let fn = 1;").is_err());
    assert!(parse_program("let del = 1;").is_err());
}
