//! Benchmark for composition and partial application overhead.

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use kindred::unit::Unit;
use std::hint::black_box;

// =============================================================================
// Composition
// =============================================================================

fn benchmark_and_then_chain(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("and_then_chain");

    let closure = |x: i64| x.wrapping_add(1);
    group.bench_function("closure", |bencher| {
        bencher.iter(|| black_box(closure(black_box(1))));
    });

    for depth in [1, 4, 16] {
        let step = Unit::unary(|x: i64| x.wrapping_add(1));
        let chain = (1..depth).fold(step.clone(), |chain, _| chain.and_then(step.clone()));

        group.bench_with_input(BenchmarkId::new("depth", depth), &chain, |bencher, chain| {
            bencher.iter(|| black_box(chain.apply(black_box(1))));
        });
    }

    group.finish();
}

fn benchmark_compose(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("compose");

    let sum = Unit::ternary(|a: i64, b: i64, c: i64| a + b + c);
    let composed = sum.compose((
        Unit::unary(|x: i8| i64::from(x)),
        Unit::unary(|x: i16| i64::from(x)),
        Unit::unary(|x: i32| i64::from(x)),
    ));

    group.bench_function("three_adapters", |bencher| {
        bencher.iter(|| black_box(composed.apply(black_box(1), black_box(2), black_box(3))));
    });

    let left = Unit::binary(|x: i32, y: i32| x < y);
    let right = Unit::binary(|x: i32, y: i32| x % 2 == y % 2);
    let conjunction = left.and(&right);
    let exclusive = left.xor(&right);

    group.bench_function("and_short_circuit", |bencher| {
        bencher.iter(|| black_box(conjunction.apply(black_box(5), black_box(1))));
    });

    group.bench_function("xor_both_sides", |bencher| {
        bencher.iter(|| black_box(exclusive.apply(black_box(5), black_box(1))));
    });

    group.finish();
}

// =============================================================================
// Partial Application
// =============================================================================

fn benchmark_partial(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("partial");

    let format = Unit::ternary(|greeting: String, name: String, count: i32| {
        format!("{greeting}, {name} x{count}")
    });
    let reduced = format.fix_prefix((String::from("Hello"), String::from("world")));

    group.bench_function("direct", |bencher| {
        bencher.iter(|| {
            black_box(format.apply(String::from("Hello"), String::from("world"), black_box(3)))
        });
    });

    group.bench_function("fixed_prefix", |bencher| {
        bencher.iter(|| black_box(reduced.apply(black_box(3))));
    });

    group.finish();
}

criterion_group!(
    benches,
    benchmark_and_then_chain,
    benchmark_compose,
    benchmark_partial
);
criterion_main!(benches);
