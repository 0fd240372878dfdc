#![cfg(feature = "memo")]
//! Tests for memoized units.

use kindred::kind::{Identity, Ref};
use kindred::memo::{MemoCache, MemoizedUnit, memoize};
use kindred::unit::Unit;
use rstest::{fixture, rstest};
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new("kindred=trace"))
        .with_test_writer()
        .try_init();
}

struct Counted<A, R> {
    unit: Unit<A, R>,
    calls: Arc<AtomicUsize>,
}

impl<A, R> Counted<A, R> {
    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[fixture]
fn lookup() -> Counted<(i32, Option<String>), String> {
    init_tracing();
    let calls = Arc::new(AtomicUsize::new(0));
    let calls_clone = Arc::clone(&calls);
    let unit = Unit::binary(move |id: i32, name: Option<String>| {
        calls_clone.fetch_add(1, Ordering::SeqCst);
        format!("{id}:{}", name.unwrap_or_else(|| String::from("<null>")))
    });
    Counted { unit, calls }
}

// =============================================================================
// At-Most-Once Evaluation
// =============================================================================

#[rstest]
fn test_equal_inputs_evaluate_once(lookup: Counted<(i32, Option<String>), String>) {
    let memoized = lookup.unit.memoize();

    let first = memoized.apply(1, Some(String::from("ada")));
    let second = memoized.apply(1, Some(String::from("ada")));

    assert_eq!(first, "1:ada");
    assert_eq!(first, second);
    assert_eq!(lookup.calls(), 1);
}

#[rstest]
fn test_distinct_inputs_get_distinct_entries(lookup: Counted<(i32, Option<String>), String>) {
    let memoized = lookup.unit.to_memoized();

    assert_eq!(memoized.invoke((1, Some(String::from("a")))), "1:a");
    assert_eq!(memoized.invoke((2, Some(String::from("a")))), "2:a");
    assert_eq!(memoized.invoke((1, Some(String::from("b")))), "1:b");
    assert_eq!(memoized.invoke((1, Some(String::from("a")))), "1:a");

    assert_eq!(lookup.calls(), 3);
    assert_eq!(memoized.cached_len(), 3);
}

#[rstest]
fn test_null_inputs_share_one_entry(lookup: Counted<(i32, Option<String>), String>) {
    let memoized = memoize(&lookup.unit);

    assert_eq!(memoized.invoke((0, None)), "0:<null>");
    assert_eq!(memoized.invoke((0, None)), "0:<null>");
    assert_eq!(memoized.invoke((0, Some(String::new()))), "0:");

    assert_eq!(lookup.calls(), 2);
    assert!(memoized.is_cached(&(0, None)));
}

#[rstest]
fn test_none_result_is_a_cached_value() {
    let calls = Arc::new(AtomicUsize::new(0));
    let calls_clone = Arc::clone(&calls);
    let find = Unit::unary(move |_: i32| -> Option<String> {
        calls_clone.fetch_add(1, Ordering::SeqCst);
        None
    })
    .memoize();

    assert_eq!(find.apply(1), None);
    assert_eq!(find.apply(1), None);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[rstest]
fn test_nan_inputs_share_one_entry() {
    let calls = Arc::new(AtomicUsize::new(0));
    let calls_clone = Arc::clone(&calls);
    let classify = Unit::unary(move |x: f64| {
        calls_clone.fetch_add(1, Ordering::SeqCst);
        x.is_nan()
    })
    .memoize();

    assert!(classify.apply(f64::NAN));
    assert!(classify.apply(-f64::NAN));
    assert!(!classify.apply(0.0));
    assert!(!classify.apply(-0.0));
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[rstest]
fn test_identity_inputs_key_by_allocation() {
    let calls = Arc::new(AtomicUsize::new(0));
    let calls_clone = Arc::clone(&calls);
    let size = Unit::unary(move |data: Identity<Vec<u8>>| {
        calls_clone.fetch_add(1, Ordering::SeqCst);
        data.len()
    })
    .memoize();

    let shared = Identity::new(vec![0; 4]);
    let twin = Identity::new(vec![0; 4]);

    size.apply(shared.clone());
    size.apply(shared);
    size.apply(twin);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[rstest]
fn test_identity_inputs_never_hit_a_freed_allocation() {
    let read = Unit::unary(|cell: Identity<u64>| *cell).memoize();

    let wrong = (0..1000_u64)
        .filter(|&n| read.apply(Identity::new(n)) != n)
        .count();

    assert_eq!(wrong, 0);
}

#[rstest]
fn test_ref_inputs_key_structurally() {
    let calls = Arc::new(AtomicUsize::new(0));
    let calls_clone = Arc::clone(&calls);
    let total = Unit::unary(move |numbers: Ref<Vec<i32>>| {
        calls_clone.fetch_add(1, Ordering::SeqCst);
        numbers.0.iter().sum::<i32>()
    })
    .memoize();

    assert_eq!(total.apply(Ref(vec![1, 2])), 3);
    assert_eq!(total.apply(Ref(vec![1, 2])), 3);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

// =============================================================================
// Idempotence
// =============================================================================

#[rstest]
fn test_memoize_is_idempotent(lookup: Counted<(i32, Option<String>), String>) {
    let once = lookup.unit.memoize();
    let twice = once.memoize();
    let handle = MemoizedUnit::from_unit(&twice).unwrap();

    once.apply(5, None);
    twice.apply(5, None);
    handle.invoke((5, None));

    assert_eq!(lookup.calls(), 1);
    assert_eq!(handle.cached_len(), 1);
    assert_eq!(handle.memoize().cached_len(), 1);
}

#[rstest]
fn test_memoized_unit_composes_like_any_unit(lookup: Counted<(i32, Option<String>), String>) {
    let length = lookup.unit.memoize().map(|text| text.len());

    assert_eq!(length.apply(10, None), 9);
    assert_eq!(length.apply(10, None), 9);
    assert_eq!(lookup.calls(), 1);
}

// =============================================================================
// Failures Are Not Cached
// =============================================================================

#[rstest]
fn test_panics_do_not_poison_the_entry() {
    init_tracing();
    let attempts = Arc::new(AtomicUsize::new(0));
    let attempts_clone = Arc::clone(&attempts);
    let flaky = Unit::unary(move |x: i32| {
        assert!(attempts_clone.fetch_add(1, Ordering::SeqCst) != 0, "first attempt fails");
        x * 3
    })
    .to_memoized();

    let outcome = catch_unwind(AssertUnwindSafe(|| flaky.invoke((2,))));
    assert!(outcome.is_err());
    assert!(!flaky.is_cached(&(2,)));

    assert_eq!(flaky.invoke((2,)), 6);
    assert_eq!(flaky.invoke((2,)), 6);
    assert_eq!(attempts.load(Ordering::SeqCst), 2);
}

#[rstest]
fn test_memoize_ok_retries_errors() {
    let attempts = Arc::new(AtomicUsize::new(0));
    let attempts_clone = Arc::clone(&attempts);
    let fetch = Unit::unary(move |key: String| {
        if attempts_clone.fetch_add(1, Ordering::SeqCst) < 2 {
            Err(format!("{key} unavailable"))
        } else {
            Ok(key.len())
        }
    })
    .memoize_ok();

    assert_eq!(fetch.apply(String::from("abc")), Err(String::from("abc unavailable")));
    assert_eq!(fetch.apply(String::from("abc")), Err(String::from("abc unavailable")));
    assert_eq!(fetch.apply(String::from("abc")), Ok(3));
    assert_eq!(fetch.apply(String::from("abc")), Ok(3));
    assert_eq!(attempts.load(Ordering::SeqCst), 3);
}

#[rstest]
fn test_plain_memoize_caches_err_values() {
    let attempts = Arc::new(AtomicUsize::new(0));
    let attempts_clone = Arc::clone(&attempts);
    let fetch = Unit::unary(move |_: i32| -> Result<i32, String> {
        attempts_clone.fetch_add(1, Ordering::SeqCst);
        Err(String::from("permanent"))
    })
    .memoize();

    assert!(fetch.apply(1).is_err());
    assert!(fetch.apply(1).is_err());
    assert_eq!(attempts.load(Ordering::SeqCst), 1);
}

// =============================================================================
// Configuration
// =============================================================================

#[rstest]
fn test_with_capacity_behaves_like_new(lookup: Counted<(i32, Option<String>), String>) {
    let memoized = MemoizedUnit::with_capacity(&lookup.unit, 64);

    memoized.invoke((1, None));
    memoized.invoke((1, None));
    assert_eq!(lookup.calls(), 1);
    assert_eq!(memoized.cached(&(1, None)), Some(String::from("1:<null>")));
}

#[rstest]
fn test_cache_accepts_a_custom_hasher() {
    let cache: MemoCache<u64, u64, std::collections::hash_map::RandomState> =
        MemoCache::with_capacity_and_hasher(8, std::collections::hash_map::RandomState::new());

    assert_eq!(cache.get_or_compute(2, || 4), 4);
    assert_eq!(cache.get_or_compute(2, || 5), 4);
    assert_eq!(cache.len(), 1);
}
