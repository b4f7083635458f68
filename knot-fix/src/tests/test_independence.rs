use crate::{Fix, Tied, fix};
use pretty_assertions::assert_eq;
use std::thread;

fn fib_base(fib: &dyn Fn(u64) -> u64, n: u64) -> u64 {
    if n < 2 { 1 } else { fib(n - 1) + fib(n - 2) }
}

fn build() -> Fix<u64, u64> {
    let fib = fix(fib_base);
    let foo = fib.clone();
    drop(fib);
    foo
}

#[test]
fn test_survives_its_defining_scope() {
    let foo = build();

    let values: Vec<u64> = (0..9).map(|n| foo.call(n)).collect();
    assert_eq!(values, vec![1, 1, 2, 3, 5, 8, 13, 21, 34]);
}

#[test]
fn test_passed_as_plain_closure() {
    fn table(f: &dyn Fn(u64) -> u64, upto: u64) -> Vec<u64> {
        (0..upto).map(f).collect()
    }

    let fib = fix(fib_base);
    assert_eq!(table(fib.as_fn(), 7), vec![1, 1, 2, 3, 5, 8, 13]);

    let owned: Tied<u64, u64> = fib.into_fn();
    assert_eq!(table(&*owned, 7), vec![1, 1, 2, 3, 5, 8, 13]);
}

#[test]
fn test_stored_without_a_name() {
    let table: Vec<Fix<u64, u64>> = vec![
        fix(fib_base),
        fix(|fact: &dyn Fn(u64) -> u64, n: u64| if n == 0 { 1 } else { n * fact(n - 1) }),
    ];

    assert_eq!(table[0].call(6), 13);
    assert_eq!(table[1].call(6), 720);
}

#[test]
fn test_concurrent_invocation() {
    let fib = fix(fib_base);

    let results: Vec<u64> = thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|n| {
                let fib = fib.clone();
                scope.spawn(move || fib.call(n + 10))
            })
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().expect("worker panicked"))
            .collect()
    });

    let expected: Vec<u64> = (0..8).map(|n| fib.call(n + 10)).collect();
    assert_eq!(results, expected);
}

#[test]
fn test_moved_to_another_thread() {
    let foo = build();
    let worker = thread::spawn(move || foo.call(12));
    assert_eq!(worker.join().expect("worker panicked"), 233);
}
