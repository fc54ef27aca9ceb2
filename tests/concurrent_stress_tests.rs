//! Stress Tests for Concurrent Factorizers
//!
//! These tests verify thread safety and correctness under high contention.

use memo_factor::codec::parse_input_or_identity;
use memo_factor::config::{FactorizerConfig, Strategy};
use memo_factor::counter::{counter_of, Counter, CounterKind};
use memo_factor::lazy::{ExpensiveObject, Lazy, LockedLazy, OnceLazy};
use memo_factor::{factorize, CachedFactorizer, Factorizer, SynchronizedFactorizer};
use num_bigint::BigUint;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

const NUM_THREADS: usize = 16;
const OPS_PER_THREAD: usize = 2_000;

/// Test high contention with every thread requesting the same few inputs
#[test]
fn stress_cached_high_contention() {
    let factorizer = Arc::new(CachedFactorizer::new());
    let mismatches = Arc::new(AtomicUsize::new(0));
    let mut handles = vec![];

    for t in 0..NUM_THREADS {
        let factorizer = Arc::clone(&factorizer);
        let mismatches = Arc::clone(&mismatches);
        handles.push(thread::spawn(move || {
            for i in 0..OPS_PER_THREAD {
                let input = BigUint::from(((t + i) % 4 + 1_000) as u64);
                if *factorizer.compute(&input) != factorize(&input) {
                    mismatches.fetch_add(1, Ordering::Relaxed);
                }
            }
        }));
    }

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(mismatches.load(Ordering::Relaxed), 0);
    let stats = factorizer.stats();
    assert_eq!(stats.requests, (NUM_THREADS * OPS_PER_THREAD) as u64);
    assert_eq!(stats.cache_hits + stats.cache_misses(), stats.requests);
}

/// Test the coarse cache with a single hot input, where nearly every request
/// is a hit
#[test]
fn stress_synchronized_single_hot_input() {
    let factorizer = Arc::new(SynchronizedFactorizer::new());
    let input = BigUint::from(600_851_475_143u64);
    let expected = factorize(&input);
    let mut handles = vec![];

    for _ in 0..NUM_THREADS {
        let factorizer = Arc::clone(&factorizer);
        let input = input.clone();
        let expected = expected.clone();
        handles.push(thread::spawn(move || {
            for _ in 0..OPS_PER_THREAD {
                assert_eq!(*factorizer.compute(&input), expected);
            }
        }));
    }

    for handle in handles {
        handle.join().unwrap();
    }

    let stats = factorizer.stats();
    assert_eq!(stats.cache_misses(), 1);
    assert_eq!(stats.cache_hits, (NUM_THREADS * OPS_PER_THREAD) as u64 - 1);
}

/// Test every correct strategy through the boxed, string-parsing surface
#[test]
fn stress_every_correct_strategy() {
    let raws: Vec<String> = (0..64)
        .map(|i| match i % 8 {
            0 => String::new(),
            1 => "-9".to_string(),
            _ => (i * 37 + 2).to_string(),
        })
        .collect();
    let raws = Arc::new(raws);

    for strategy in Strategy::ALL.into_iter().filter(Strategy::is_thread_safe) {
        let factorizer: Arc<dyn Factorizer> = Arc::from(
            FactorizerConfig {
                strategy,
                ..Default::default()
            }
            .build(),
        );
        let mut handles = vec![];

        for t in 0..NUM_THREADS {
            let factorizer = Arc::clone(&factorizer);
            let raws = Arc::clone(&raws);
            handles.push(thread::spawn(move || {
                for i in 0..OPS_PER_THREAD / 4 {
                    let raw = raws[(t * 7 + i) % raws.len()].as_str();
                    let input = parse_input_or_identity(Some(raw), u64::MAX);
                    assert_eq!(
                        factorizer.service(Some(raw)),
                        factorize(&input).to_string(),
                        "strategy {} on {raw:?}",
                        factorizer.name()
                    );
                }
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }
    }
}

/// Test exact counters under 16-way contention
#[test]
fn stress_exact_counters() {
    for kind in CounterKind::ALL.into_iter().filter(CounterKind::is_exact) {
        let counter: Arc<dyn Counter> = Arc::from(counter_of(kind));
        let mut handles = vec![];

        for _ in 0..NUM_THREADS {
            let counter = Arc::clone(&counter);
            handles.push(thread::spawn(move || {
                for _ in 0..OPS_PER_THREAD {
                    counter.increment();
                }
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(counter.value(), (NUM_THREADS * OPS_PER_THREAD) as u64, "{kind}");
    }
}

/// Test that repeated first-access races on fresh slots always agree
#[test]
fn stress_lazy_first_access() {
    for _ in 0..50 {
        let locked = Arc::new(LockedLazy::<ExpensiveObject>::new());
        let once = Arc::new(OnceLazy::<ExpensiveObject>::new());
        let mut handles = vec![];

        for _ in 0..NUM_THREADS {
            let locked = Arc::clone(&locked);
            let once = Arc::clone(&once);
            handles.push(thread::spawn(move || {
                (locked.get_instance().id(), once.get_instance().id())
            }));
        }

        let ids: Vec<(u64, u64)> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        let locked_ids: HashSet<u64> = ids.iter().map(|(l, _)| *l).collect();
        let once_ids: HashSet<u64> = ids.iter().map(|(_, o)| *o).collect();
        assert_eq!(locked_ids.len(), 1);
        assert_eq!(once_ids.len(), 1);
    }
}
