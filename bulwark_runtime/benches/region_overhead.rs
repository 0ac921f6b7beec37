//! Protected Region Benchmarks
//!
//! Measures the cost of the region protocol on its common paths.
//!
//! # Key Metrics
//!
//! - Region with no exception: the price of protection when nothing fails
//! - Raise and catch at increasing call depths
//! - Early return through nested cleanups
//! - Ancestry matching against deep hierarchies

use bulwark_runtime::{
    define_exception, Context, ExceptionInstance, ExceptionType, Flow, Region, EXCEPTION,
};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

define_exception! {
    IO_FAILURE = "IOFailure": EXCEPTION;
    DISK_FULL = "DiskFull": IO_FAILURE;
    PARSE_FAILURE = "ParseFailure": EXCEPTION;
}

// =============================================================================
// Normal Completion
// =============================================================================

fn bench_no_exception(c: &mut Criterion) {
    let mut group = c.benchmark_group("no_exception");
    let mut cx = Context::new();

    group.bench_function("body_only", |b| {
        b.iter(|| {
            let flow: Flow = Region::new(|_| Ok(())).run(&mut cx);
            black_box(flow)
        })
    });

    group.bench_function("with_catch_and_finally", |b| {
        b.iter(|| {
            let flow: Flow = Region::new(|_| Ok(()))
                .catch(&IO_FAILURE, |_, _| Ok(()))
                .finally(|_| Ok(()))
                .run(&mut cx);
            black_box(flow)
        })
    });

    group.finish();
}

// =============================================================================
// Raise and Catch
// =============================================================================

fn raise_at_depth(cx: &mut Context, depth: usize) -> Flow {
    if depth == 0 {
        return cx.raise(ExceptionInstance::bare(&DISK_FULL));
    }
    raise_at_depth(cx, depth - 1)?;
    Ok(())
}

fn bench_raise_catch(c: &mut Criterion) {
    let mut group = c.benchmark_group("raise_catch");
    let mut cx = Context::new();

    for depth in [0_usize, 4, 16, 64] {
        group.bench_with_input(BenchmarkId::new("call_depth", depth), &depth, |b, &depth| {
            b.iter(|| {
                let flow: Flow = Region::new(|cx| raise_at_depth(cx, depth))
                    .catch(&PARSE_FAILURE, |_, _| Ok(()))
                    .catch(&IO_FAILURE, |_, exc| {
                        black_box(exc);
                        Ok(())
                    })
                    .run(&mut cx);
                black_box(flow)
            })
        });
    }

    group.finish();
}

// =============================================================================
// Early Return
// =============================================================================

fn nested_return(cx: &mut Context, depth: usize) -> Flow<(), u64> {
    if depth == 0 {
        return cx.return_from(42);
    }
    Region::new(|cx| nested_return(cx, depth - 1))
        .finally(|_| Ok(()))
        .run(cx)
}

fn bench_early_return(c: &mut Criterion) {
    let mut group = c.benchmark_group("early_return");
    let mut cx = Context::new();

    for depth in [1_usize, 8, 32] {
        group.bench_with_input(BenchmarkId::new("cleanups", depth), &depth, |b, &depth| {
            b.iter(|| {
                let value: Flow<u64> = cx.returnable(|cx| {
                    nested_return(cx, depth)?;
                    Ok(0)
                });
                black_box(value)
            })
        });
    }

    group.finish();
}

// =============================================================================
// Ancestry Matching
// =============================================================================

fn deep_chain(depth: usize) -> Vec<&'static ExceptionType> {
    let mut chain: Vec<&'static ExceptionType> = vec![&EXCEPTION];
    for level in 0..depth {
        let parent = chain[level];
        let name: &'static str = Box::leak(format!("Level{level}").into_boxed_str());
        chain.push(Box::leak(Box::new(ExceptionType::new(name, Some(parent)))));
    }
    chain
}

fn bench_ancestry(c: &mut Criterion) {
    let mut group = c.benchmark_group("ancestry");

    for depth in [1_usize, 8, 32] {
        let chain = deep_chain(depth);
        let leaf = ExceptionInstance::bare(chain[depth]);

        group.bench_with_input(BenchmarkId::new("hit_root", depth), &leaf, |b, leaf| {
            b.iter(|| black_box(leaf.is_instance_of(black_box(&EXCEPTION))))
        });
        group.bench_with_input(BenchmarkId::new("miss", depth), &leaf, |b, leaf| {
            b.iter(|| black_box(leaf.is_instance_of(black_box(&PARSE_FAILURE))))
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_no_exception,
    bench_raise_catch,
    bench_early_return,
    bench_ancestry
);
criterion_main!(benches);
