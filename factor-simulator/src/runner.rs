//! Simulation runner for factorizer strategies
//!
//! Each strategy gets a fresh shared instance and the same workload. The
//! workload is split across the request threads by striding: thread `t`
//! serves requests `t`, `t + N`, `t + 2N`, ... so all threads hit the single
//! cache slot at once.
//!
//! Every response is checked against an independently computed answer for
//! the request's own input. For the correct strategies the mismatch count is
//! always zero; the atomic composite cache can report mismatches under
//! contention.
//!
//! The counter and lazy runs reproduce the lost-update and check-then-act
//! races at a larger scale than the unit tests do.

use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::{Duration, Instant};

use memo_factor::codec::parse_input_or_identity;
use memo_factor::config::{FactorizerConfig, Strategy};
use memo_factor::counter::{counter_of, Counter, CounterKind};
use memo_factor::lazy::{ExpensiveObject, Lazy, LazyKind, LockedLazy, OnceLazy, RacyLazy};
use memo_factor::{factorize, Factorizer};
use tracing::{debug, info, warn};

use crate::models::{
    CounterReport, LazyReport, Request, SimulationConfig, SimulationResult, StrategyStats,
};

pub struct SimulationRunner {
    config: SimulationConfig,
    workload: Arc<Vec<Request>>,
    /// Expected response for each request, computed once up front
    expected: Arc<Vec<String>>,
}

impl SimulationRunner {
    pub fn new(config: SimulationConfig, workload: Vec<Request>) -> Self {
        let expected = workload
            .iter()
            .map(|request| {
                let input = parse_input_or_identity(request.as_param(), config.max_input_bits);
                factorize(&input).to_string()
            })
            .collect();

        Self {
            config,
            workload: Arc::new(workload),
            expected: Arc::new(expected),
        }
    }

    pub fn run(&self) -> SimulationResult {
        let start = Instant::now();
        let mut stats = BTreeMap::new();

        for &strategy in &self.config.strategies {
            let strategy_stats = self.run_strategy(strategy);
            if strategy_stats.mismatches > 0 {
                warn!(
                    %strategy,
                    mismatches = strategy_stats.mismatches,
                    "responses did not match their own inputs"
                );
            }
            info!(
                %strategy,
                requests = strategy_stats.requests,
                hits = strategy_stats.hits,
                elapsed_ms = strategy_stats.elapsed_ms(),
                "strategy finished"
            );
            stats.insert(strategy, strategy_stats);
        }

        let distinct_inputs = self
            .workload
            .iter()
            .map(Request::as_param)
            .collect::<HashSet<_>>()
            .len();

        SimulationResult {
            stats,
            total_requests: self.workload.len(),
            distinct_inputs,
            duration: start.elapsed(),
        }
    }

    fn run_strategy(&self, strategy: Strategy) -> StrategyStats {
        let factorizer: Arc<dyn Factorizer> = Arc::from(
            FactorizerConfig {
                strategy,
                max_input_bits: self.config.max_input_bits,
            }
            .build(),
        );
        let threads = self.config.thread_count.max(1);
        let mismatches = Arc::new(AtomicU64::new(0));
        let served = Arc::new(AtomicU64::new(0));
        let start_line = Arc::new(Barrier::new(threads));

        let start = Instant::now();
        let handles: Vec<_> = (0..threads)
            .map(|t| {
                let factorizer = Arc::clone(&factorizer);
                let workload = Arc::clone(&self.workload);
                let expected = Arc::clone(&self.expected);
                let mismatches = Arc::clone(&mismatches);
                let served = Arc::clone(&served);
                let start_line = Arc::clone(&start_line);

                thread::spawn(move || {
                    start_line.wait();
                    let mut local_served = 0;
                    let mut local_mismatches = 0;
                    for i in (t..workload.len()).step_by(threads) {
                        let response = factorizer.service(workload[i].as_param());
                        if response != expected[i] {
                            local_mismatches += 1;
                        }
                        local_served += 1;
                    }
                    served.fetch_add(local_served, Ordering::Relaxed);
                    mismatches.fetch_add(local_mismatches, Ordering::Relaxed);
                })
            })
            .collect();

        for handle in handles {
            if handle.join().is_err() {
                warn!(%strategy, "request thread panicked");
            }
        }
        let elapsed = start.elapsed();

        let requests = served.load(Ordering::Relaxed);
        let reported = factorizer.stats();
        StrategyStats {
            requests,
            reported_requests: reported.map(|s| s.requests),
            hits: reported.map(|s| s.cache_hits).unwrap_or(0),
            mismatches: mismatches.load(Ordering::Relaxed),
            elapsed,
        }
    }
}

/// Runs `trials` rounds of `threads × increments` concurrent increments on a
/// fresh counter of `kind`.
pub fn run_counter(
    kind: CounterKind,
    threads: usize,
    increments: u64,
    trials: usize,
) -> CounterReport {
    let threads = threads.max(1);
    let finals = (0..trials)
        .map(|trial| {
            let counter: Arc<dyn Counter> = Arc::from(counter_of(kind));
            let handles: Vec<_> = (0..threads)
                .map(|_| {
                    let counter = Arc::clone(&counter);
                    thread::spawn(move || {
                        for _ in 0..increments {
                            counter.increment();
                        }
                    })
                })
                .collect();
            for handle in handles {
                if handle.join().is_err() {
                    warn!(%kind, trial, "increment thread panicked");
                }
            }
            let value = counter.value();
            debug!(%kind, trial, value, "trial finished");
            value
        })
        .collect();

    CounterReport {
        kind,
        expected: threads as u64 * increments,
        finals,
    }
}

/// Releases `threads` callers onto an empty slot of `kind` at once. The
/// initializer sleeps for `init_delay` to widen the check-then-act window.
pub fn run_lazy(kind: LazyKind, threads: usize, init_delay: Duration) -> LazyReport {
    let threads = threads.max(1);
    let (constructions, distinct_instances) = match kind {
        LazyKind::Racy => {
            let slot: RacyLazy<ExpensiveObject> = RacyLazy::new();
            race(Arc::new(slot), threads, init_delay)
        }
        LazyKind::Locked => {
            let slot: LockedLazy<ExpensiveObject> = LockedLazy::new();
            race(Arc::new(slot), threads, init_delay)
        }
        LazyKind::Once => {
            let slot: OnceLazy<ExpensiveObject> = OnceLazy::new();
            race(Arc::new(slot), threads, init_delay)
        }
    };

    LazyReport {
        kind,
        threads,
        constructions,
        distinct_instances,
    }
}

fn race<L>(slot: Arc<L>, threads: usize, init_delay: Duration) -> (usize, usize)
where
    L: Lazy<ExpensiveObject> + Send + Sync + 'static,
{
    let constructions = Arc::new(AtomicUsize::new(0));
    let start_line = Arc::new(Barrier::new(threads));

    let handles: Vec<_> = (0..threads)
        .map(|_| {
            let slot = Arc::clone(&slot);
            let constructions = Arc::clone(&constructions);
            let start_line = Arc::clone(&start_line);
            thread::spawn(move || {
                start_line.wait();
                let instance = slot.get_or_init(|| {
                    constructions.fetch_add(1, Ordering::SeqCst);
                    thread::sleep(init_delay);
                    ExpensiveObject::new()
                });
                instance.id()
            })
        })
        .collect();

    let mut ids = HashSet::new();
    for handle in handles {
        match handle.join() {
            Ok(id) => {
                ids.insert(id);
            }
            Err(_) => warn!("lazy access thread panicked"),
        }
    }

    (constructions.load(Ordering::SeqCst), ids.len())
}
