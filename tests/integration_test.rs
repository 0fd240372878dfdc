#![cfg(feature = "dynamic")]
//! End-to-end scenario across every engine.

use kindred::prelude::*;
use rstest::{fixture, rstest};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;

struct Predicate {
    unit: Unit<(i32, i32), bool>,
    calls: Arc<AtomicUsize>,
}

/// `p(x, y) = (x == 5) && (y == 10)`, instrumented with a call counter.
#[fixture]
fn predicate() -> Predicate {
    let calls = Arc::new(AtomicUsize::new(0));
    let calls_clone = Arc::clone(&calls);
    let unit = Unit::binary(move |x: i32, y: i32| {
        calls_clone.fetch_add(1, Ordering::SeqCst);
        x == 5 && y == 10
    });
    Predicate { unit, calls }
}

#[rstest]
fn test_negate_flips_the_match(predicate: Predicate) {
    assert!(!predicate.unit.negate().apply(5, 10));
    assert!(predicate.unit.negate().apply(5, 11));
}

#[rstest]
fn test_and_with_constant_true_keeps_the_match(predicate: Predicate) {
    let combined = predicate.unit.and(&Unit::constant(true));

    assert!(combined.apply(5, 10));
    assert!(!combined.apply(4, 10));
}

#[rstest]
fn test_memoized_predicate_runs_once_for_eight_callers(predicate: Predicate) {
    const CALLERS: usize = 8;

    let memoized = predicate.unit.memoize();
    let barrier = Arc::new(Barrier::new(CALLERS));

    let handles: Vec<_> = (0..CALLERS)
        .map(|_| {
            let memoized = memoized.clone();
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                memoized.apply(5, 10)
            })
        })
        .collect();

    for handle in handles {
        assert!(handle.join().unwrap());
    }
    assert_eq!(predicate.calls.load(Ordering::SeqCst), 1);
}

#[rstest]
fn test_typed_and_dynamic_layers_agree(predicate: Predicate) {
    let erased = DynUnit::from_unit(&predicate.unit).negate().unwrap();

    for (x, y) in [(5, 10), (5, 11), (0, 0)] {
        assert_eq!(
            erased.invoke(&[Value::Int32(x), Value::Int32(y)]),
            Ok(Value::Bool(predicate.unit.negate().apply(x, y)))
        );
    }
}

#[rstest]
fn test_partial_then_memoize_then_compose(predicate: Predicate) {
    let wants_ten = predicate.unit.fix_prefix((5,)).memoize();
    let from_text = wants_ten.compose(Unit::unary(|text: String| text.parse::<i32>().unwrap_or(-1)));

    assert!(from_text.apply(String::from("10")));
    assert!(from_text.apply(String::from("10")));
    assert!(!from_text.apply(String::from("ten")));
    assert_eq!(predicate.calls.load(Ordering::SeqCst), 2);
}
