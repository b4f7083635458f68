use super::{FIB, FIX_FIB, eval, eval_error, session, session_with};
use crate::snapshot::{
    self, MAX_SNAPSHOT_DEPTH, SNAPSHOT_FORMAT, SNAPSHOT_VERSION, SnapshotError, ValueSnapshot,
};
use crate::{EvaluationError, InterpreterConfig, SessionError, Value};
use pretty_assertions::assert_eq;
use std::fs;
use std::path::Path;

fn knot_path(path: &Path) -> String {
    format!("\"{}\"", path.display())
}

#[test]
fn test_tied_function_survives_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fib.json");

    let mut first = session();
    eval(&mut first, FIX_FIB);
    eval(&mut first, &format!("dump(fib, {});", knot_path(&path)));

    // A fresh session that has never seen fix or fib
    let mut second = session_with(InterpreterConfig::default().with_prelude(false));
    eval(&mut second, &format!("let f = load({});", knot_path(&path)));

    let values: Vec<Value> = (0..7)
        .map(|n| eval(&mut second, &format!("f({n})")))
        .collect();
    assert_eq!(values, [1, 1, 2, 3, 5, 8, 13].map(Value::Integer).to_vec());
    assert_eq!(second.global_names(), ["f"]);
}

#[test]
fn test_named_recursion_needs_its_name_after_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("plain.json");

    let mut first = session();
    eval(&mut first, FIB);
    eval(&mut first, &format!("dump(fib, {});", knot_path(&path)));

    let mut second = session();
    eval(&mut second, &format!("let f = load({});", knot_path(&path)));
    assert_eq!(eval(&mut second, "f(1)"), Value::Integer(1));
    match eval_error(&mut second, "f(5)") {
        EvaluationError::NameNotFound { name, .. } => assert_eq!(name, "fib"),
        other => panic!("Expected NameNotFound, got {other:?}"),
    }

    eval(&mut second, "let fib = f;");
    assert_eq!(eval(&mut second, "f(5)"), Value::Integer(8));
}

#[test]
fn test_captured_locals_are_saved() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("adder.json");

    let mut first = session();
    eval(&mut first, "let adder = fn(n) -> fn(x) -> x + n;");
    eval(&mut first, &format!("dump(adder(40), {});", knot_path(&path)));

    let loaded = snapshot::load(&path).unwrap();
    let mut second = session();
    assert_eq!(second.call(&loaded, vec![Value::Integer(2)]).unwrap(), Value::Integer(42));
}

#[test]
fn test_snapshot_envelope() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("value.json");
    snapshot::save(&Value::Integer(7), &path).unwrap();

    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(json["format"], SNAPSHOT_FORMAT);
    assert_eq!(json["version"], SNAPSHOT_VERSION);
    assert_eq!(snapshot::load(&path).unwrap(), Value::Integer(7));
}

#[test]
fn test_rejects_foreign_format() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("foreign.json");
    fs::write(&path, r#"{"format": "pickle", "version": 1, "value": "Unit"}"#).unwrap();

    match snapshot::load(&path) {
        Err(SnapshotError::UnsupportedFormat { found }) => assert_eq!(found, "pickle"),
        other => panic!("Expected UnsupportedFormat, got {other:?}"),
    }
}

#[test]
fn test_rejects_future_version() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.json");
    let mut envelope = ValueSnapshot::new(Value::Unit);
    envelope.version = 2;
    fs::write(&path, envelope.to_json().unwrap()).unwrap();

    match snapshot::load(&path) {
        Err(SnapshotError::UnsupportedVersion { found }) => assert_eq!(found, 2),
        other => panic!("Expected UnsupportedVersion, got {other:?}"),
    }
}

#[test]
fn test_malformed_and_missing_files() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.json");
    fs::write(&path, "not json").unwrap();

    assert!(matches!(
        snapshot::load(&path),
        Err(SnapshotError::Decode { .. })
    ));
    assert!(matches!(
        snapshot::load(dir.path().join("absent.json")),
        Err(SnapshotError::Read { .. })
    ));
}

#[test]
fn test_load_errors_surface_in_programs() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.json");

    let mut session = session();
    assert!(matches!(
        eval_error(&mut session, &format!("load({})", knot_path(&path))),
        EvaluationError::Snapshot(SnapshotError::Read { .. })
    ));
}

#[test]
fn test_deeply_nested_body_survives_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sum.json");
    let body = vec!["n"; 60].join(" + ");

    let mut first = session();
    eval(&mut first, &format!("let sum = fix(fn(self, n) -> {body});"));
    assert_eq!(eval(&mut first, "sum(1)"), Value::Integer(60));
    eval(&mut first, &format!("dump(sum, {});", knot_path(&path)));

    let mut second = session_with(InterpreterConfig::default().with_prelude(false));
    eval(&mut second, &format!("let f = load({});", knot_path(&path)));
    assert_eq!(eval(&mut second, "f(1)"), Value::Integer(60));
    assert_eq!(eval(&mut second, "f(2)"), Value::Integer(120));
}

#[test]
fn test_too_deep_value_is_rejected_before_writing() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("deep.json");

    // Each tuple adds two levels: `{"Tuple": [...]}`
    let mut value = Value::Unit;
    for _ in 0..=MAX_SNAPSHOT_DEPTH / 2 {
        value = Value::Tuple(vec![value]);
    }

    match snapshot::save(&value, &path) {
        Err(SnapshotError::TooDeep { depth, max }) => {
            assert!(depth > max);
            assert_eq!(max, MAX_SNAPSHOT_DEPTH);
        }
        other => panic!("Expected TooDeep, got {other:?}"),
    }
    assert!(!path.exists());
}

#[test]
fn test_too_deep_file_is_rejected_before_decoding() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("hostile.json");
    let levels = MAX_SNAPSHOT_DEPTH * 4;
    let json = format!(
        r#"{{"format": "knot-value", "version": 1, "value": {}{}}}"#,
        "[".repeat(levels),
        "]".repeat(levels)
    );
    fs::write(&path, json).unwrap();

    assert!(matches!(
        snapshot::load(&path),
        Err(SnapshotError::TooDeep { .. })
    ));
}

#[test]
fn test_brackets_inside_strings_do_not_count_as_nesting() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("brackets.json");
    let text = format!("{}\"{}", "[{".repeat(MAX_SNAPSHOT_DEPTH), "]}".repeat(3));
    let value = Value::string(text.clone());

    snapshot::save(&value, &path).unwrap();
    assert_eq!(snapshot::load(&path).unwrap(), Value::string(text));
}

#[test]
fn test_loaded_function_keeps_its_origin() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("halve.json");

    let mut first = session();
    first
        .run_program_with_source(
            &format!("let halve = fn(n) -> 100 / n; dump(halve, {});", knot_path(&path)),
            Some("lib.knot".to_string()),
        )
        .unwrap();

    let mut second = session();
    eval(&mut second, &format!("let halve = load({});", knot_path(&path)));
    match second.run_program_with_source("halve(0);", Some("main.knot".to_string())) {
        Err(SessionError::Evaluation(error)) => {
            assert!(matches!(error, EvaluationError::DivisionByZero { .. }));
            assert_eq!(error.origin(), Some("lib.knot"));
        }
        other => panic!("Expected DivisionByZero, got {other:?}"),
    }
}
