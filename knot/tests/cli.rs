//! End-to-end runs of the `knot` binary over the demo scripts.

use pretty_assertions::assert_eq;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

fn demo(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../demos")
        .join(name)
}

fn knot(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_knot"))
        .current_dir(dir)
        .env_remove("KNOT_LOG")
        .args(args)
        .output()
        .unwrap()
}

fn run_demo(dir: &Path, name: &str) -> Output {
    let path = demo(name);
    knot(dir, &["run", path.to_str().unwrap()])
}

fn stdout_lines(output: &Output) -> Vec<String> {
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(str::to_string)
        .collect()
}

fn fib_lines(count: usize) -> Vec<String> {
    [1, 1, 2, 3, 5, 8, 13, 21, 34]
        .iter()
        .take(count)
        .map(|n| n.to_string())
        .collect()
}

#[test]
fn test_fix_demo_survives_deletion() {
    let dir = tempfile::tempdir().unwrap();
    let output = run_demo(dir.path(), "fix.knot");
    assert!(output.status.success(), "{output:?}");

    let mut expected = fib_lines(9);
    expected.push("===".to_string());
    expected.extend(fib_lines(9));
    expected.push("===".to_string());
    assert_eq!(stdout_lines(&output), expected);
}

#[test]
fn test_globals_demo_fails_after_deletion() {
    let dir = tempfile::tempdir().unwrap();
    let output = run_demo(dir.path(), "globals.knot");
    assert!(!output.status.success());

    let mut expected = fib_lines(7);
    expected.push("===".to_string());
    expected.extend(fib_lines(2));
    assert_eq!(stdout_lines(&output), expected);

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("'fib' is not defined"), "{stderr}");
}

#[test]
fn test_plain_snapshot_needs_its_name() {
    let dir = tempfile::tempdir().unwrap();
    assert!(run_demo(dir.path(), "dump.knot").status.success());
    assert!(dir.path().join("fib.json").exists());

    let output = run_demo(dir.path(), "load.knot");
    assert!(!output.status.success());
    let mut expected = fib_lines(7);
    expected.push("===".to_string());
    expected.extend(fib_lines(2));
    assert_eq!(stdout_lines(&output), expected);

    let output = run_demo(dir.path(), "load_rebound.knot");
    assert!(output.status.success(), "{output:?}");
    assert_eq!(stdout_lines(&output), fib_lines(7));
}

#[test]
fn test_tied_snapshot_needs_no_name() {
    let dir = tempfile::tempdir().unwrap();
    assert!(run_demo(dir.path(), "dump_fix.knot").status.success());

    let output = run_demo(dir.path(), "load_fix.knot");
    assert!(output.status.success(), "{output:?}");

    let mut expected = fib_lines(7);
    expected.push("===".to_string());
    expected.extend(fib_lines(7));
    assert_eq!(stdout_lines(&output), expected);
}

#[test]
fn test_files_share_one_session() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("define.knot"), "let double = fn(x) -> x * 2;").unwrap();
    std::fs::write(dir.path().join("use.knot"), "print(double(21));").unwrap();

    let output = knot(dir.path(), &["run", "define.knot", "use.knot"]);
    assert!(output.status.success(), "{output:?}");
    assert_eq!(stdout_lines(&output), ["42"]);
}

#[test]
fn test_run_from_stdin() {
    let dir = tempfile::tempdir().unwrap();
    let mut child = Command::new(env!("CARGO_BIN_EXE_knot"))
        .current_dir(dir.path())
        .args(["run", "-"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .unwrap();
    child
        .stdin
        .take()
        .unwrap()
        .write_all(b"print(fix(fn(self, n) -> if n == 0 { 1 } else { n * self(n - 1) })(5));")
        .unwrap();

    let output = child.wait_with_output().unwrap();
    assert!(output.status.success());
    assert_eq!(stdout_lines(&output), ["120"]);
}

#[test]
fn test_no_prelude_flag() {
    let dir = tempfile::tempdir().unwrap();
    let output = run_demo_with(dir.path(), "fix.knot", &["--no-prelude"]);
    assert!(!output.status.success());
    assert!(stdout_lines(&output).is_empty());
}

#[test]
fn test_max_depth_flag() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("deep.knot"),
        "let down = fn(n) -> if n == 0 { 0 } else { down(n - 1) };\nprint(down(40));",
    )
    .unwrap();

    assert!(knot(dir.path(), &["run", "deep.knot"]).status.success());

    let output = knot(dir.path(), &["--max-depth", "10", "run", "deep.knot"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("max depth: 10"), "{stderr}");
}

#[test]
fn test_native_fib_command() {
    let dir = tempfile::tempdir().unwrap();
    let output = knot(dir.path(), &["fib", "7"]);
    assert!(output.status.success());
    assert_eq!(
        stdout_lines(&output),
        [
            "fib(0) = 1",
            "fib(1) = 1",
            "fib(2) = 2",
            "fib(3) = 3",
            "fib(4) = 5",
            "fib(5) = 8",
            "fib(6) = 13"
        ]
    );
}

fn run_demo_with(dir: &Path, name: &str, flags: &[&str]) -> Output {
    let path = demo(name);
    let mut args: Vec<&str> = flags.to_vec();
    args.push("run");
    args.push(path.to_str().unwrap());
    knot(dir, &args)
}
