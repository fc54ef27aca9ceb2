//! Concurrent Factorizer Benchmarks
//!
//! Compares the coarse and fine-grained caches under mixed load: most threads
//! ask for a cheap input that is usually cached while one thread keeps
//! factoring an expensive one. The coarse cache makes the cheap requests wait
//! behind the expensive computation; the fine-grained cache does not.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use memo_factor::{CachedFactorizer, Factorizer, SynchronizedFactorizer};
use num_bigint::BigUint;
use std::sync::Arc;
use std::thread;

const OPS_PER_THREAD: usize = 200;
const CHEAP_INPUT: u64 = 360;
// 10_007 * 10_009
const EXPENSIVE_INPUT: u64 = 100_160_063;

/// Benchmark all threads requesting the same cheap input
fn concurrent_hits(c: &mut Criterion) {
    let mut group = c.benchmark_group("Concurrent Hits");

    for num_threads in [2, 4, 8] {
        group.throughput(Throughput::Elements((num_threads * OPS_PER_THREAD) as u64));

        let coarse = Arc::new(SynchronizedFactorizer::new());
        let fine = Arc::new(CachedFactorizer::new());

        group.bench_with_input(
            BenchmarkId::new("synchronized", num_threads),
            &num_threads,
            |b, &n| b.iter(|| run_mixed(Arc::clone(&coarse), n, 0)),
        );
        group.bench_with_input(
            BenchmarkId::new("cached", num_threads),
            &num_threads,
            |b, &n| b.iter(|| run_mixed(Arc::clone(&fine), n, 0)),
        );
    }

    group.finish();
}

/// Benchmark cheap requests alongside threads that keep missing on an
/// expensive input
fn concurrent_mixed(c: &mut Criterion) {
    let mut group = c.benchmark_group("Concurrent Mixed");
    group.sample_size(10);

    for num_threads in [2, 4, 8] {
        group.throughput(Throughput::Elements((num_threads * OPS_PER_THREAD) as u64));

        let coarse = Arc::new(SynchronizedFactorizer::new());
        let fine = Arc::new(CachedFactorizer::new());

        group.bench_with_input(
            BenchmarkId::new("synchronized", num_threads),
            &num_threads,
            |b, &n| b.iter(|| run_mixed(Arc::clone(&coarse), n, 1)),
        );
        group.bench_with_input(
            BenchmarkId::new("cached", num_threads),
            &num_threads,
            |b, &n| b.iter(|| run_mixed(Arc::clone(&fine), n, 1)),
        );
    }

    group.finish();
}

/// Runs `num_threads` request loops; the first `expensive_threads` alternate
/// between two inputs so every one of their requests misses.
fn run_mixed<F: Factorizer + 'static>(
    factorizer: Arc<F>,
    num_threads: usize,
    expensive_threads: usize,
) {
    let mut handles = Vec::with_capacity(num_threads);
    for t in 0..num_threads {
        let factorizer = Arc::clone(&factorizer);
        handles.push(thread::spawn(move || {
            let cheap = BigUint::from(CHEAP_INPUT);
            let expensive = BigUint::from(EXPENSIVE_INPUT);
            for i in 0..OPS_PER_THREAD {
                let input = if t < expensive_threads && i % 2 == 0 {
                    &expensive
                } else {
                    &cheap
                };
                black_box(factorizer.compute(input));
            }
        }));
    }
    for handle in handles {
        handle.join().unwrap();
    }
}

criterion_group!(benches, concurrent_hits, concurrent_mixed);
criterion_main!(benches);
