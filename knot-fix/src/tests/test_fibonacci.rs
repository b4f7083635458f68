use crate::{Fix, fix};
use pretty_assertions::assert_eq;

fn fib_base(fib: &dyn Fn(u64) -> u64, n: u64) -> u64 {
    if n == 0 || n == 1 {
        1
    } else {
        fib(n - 1) + fib(n - 2)
    }
}

fn direct_fib(n: u64) -> u64 {
    if n == 0 || n == 1 {
        1
    } else {
        direct_fib(n - 1) + direct_fib(n - 2)
    }
}

#[test]
fn test_fibonacci_sequence() {
    let fib = fix(fib_base);

    let values: Vec<u64> = (0..=6).map(|n| fib.call(n)).collect();
    assert_eq!(values, vec![1, 1, 2, 3, 5, 8, 13]);
}

#[test]
fn test_matches_direct_recursion() {
    let fib = fix(fib_base);

    for n in 0..20 {
        assert_eq!(fib.call(n), direct_fib(n), "fib({n})");
    }
}

#[test]
fn test_closure_base() {
    let fact = fix(|fact: &dyn Fn(u64) -> u64, n: u64| if n == 0 { 1 } else { n * fact(n - 1) });

    assert_eq!(fact.call(0), 1);
    assert_eq!(fact.call(5), 120);
    assert_eq!(fact.call(10), 3_628_800);
}

#[test]
fn test_tuple_payload() {
    let gcd = Fix::new(|gcd: &dyn Fn((u64, u64)) -> u64, (a, b): (u64, u64)| {
        if b == 0 { a } else { gcd((b, a % b)) }
    });

    assert_eq!(gcd.call((48, 18)), 6);
    assert_eq!(gcd.call((17, 5)), 1);
    assert_eq!(gcd.call((0, 9)), 9);
}

#[test]
fn test_ackermann() {
    let ack = fix(|ack: &dyn Fn((u64, u64)) -> u64, (m, n): (u64, u64)| match (m, n) {
        (0, n) => n + 1,
        (m, 0) => ack((m - 1, 1)),
        (m, n) => ack((m - 1, ack((m, n - 1)))),
    });

    assert_eq!(ack.call((2, 3)), 9);
    assert_eq!(ack.call((3, 3)), 61);
}

#[test]
fn test_errors_pass_through_unchanged() {
    #[derive(Debug, Clone, PartialEq)]
    enum FibError {
        Negative(i64),
    }

    let fib = fix(|fib: &dyn Fn(i64) -> Result<i64, FibError>, n: i64| -> Result<i64, FibError> {
        if n < 0 {
            return Err(FibError::Negative(n));
        }
        if n < 2 {
            Ok(1)
        } else {
            Ok(fib(n - 1)? + fib(n - 2)?)
        }
    });

    assert_eq!(fib.call(6), Ok(13));
    assert_eq!(fib.call(-3), Err(FibError::Negative(-3)));
}

#[test]
fn test_error_raised_deep_in_recursion() {
    // Fails once the countdown reaches a multiple of seven.
    let countdown = fix(|countdown: &dyn Fn(u32) -> Result<u32, String>, n: u32| -> Result<u32, String> {
        if n == 0 {
            Ok(0)
        } else if n % 7 == 0 {
            Err(format!("refused at {n}"))
        } else {
            countdown(n - 1).map(|steps| steps + 1)
        }
    });

    assert_eq!(countdown.call(6), Ok(6));
    assert_eq!(countdown.call(10), Err("refused at 7".to_string()));
}
