//! Cached Factorizer
//!
//! Single-slot memoization that holds its lock only while touching shared
//! state. Each request goes through up to three phases:
//!
//! 1. **Check** (locked): count the request; on a hit, count the hit and take
//!    a reference to the cached factors.
//! 2. **Evaluate** (unlocked): on a miss, compute the factors. Any number of
//!    callers can be here at once, for different inputs or the same one.
//! 3. **Update** (locked): replace the cached pair with the new one.
//!
//! The cached pair is only read or written while the lock is held and is
//! always replaced as a whole, so a hit never returns factors that belong to
//! another input. The statistics sit behind the same lock as the slot, so
//! `cache_hits + cache_misses == requests` exactly.
//!
//! Two callers racing on the same new input both miss and both evaluate it.
//! That costs duplicate work and nothing else; whichever update runs last
//! decides what stays cached.
//!
//! Logging happens after the lock is released.

use super::Factorizer;
use crate::config::{FactorizerConfig, Strategy};
use crate::entry::{CacheEntry, CacheSlot};
use crate::factor::{Evaluator, Factors, Input, TrialDivision};
use crate::metrics::{CacheMetrics, CacheStats};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, trace};

/// A single-slot cache that evaluates misses outside its lock.
#[derive(Debug)]
pub struct CachedFactorizer<E = TrialDivision> {
    evaluator: E,
    slot: Mutex<CacheSlot>,
    max_input_bits: u64,
}

impl CachedFactorizer<TrialDivision> {
    /// Creates an empty cache using trial division.
    pub fn new() -> Self {
        Self::with_evaluator(TrialDivision)
    }
}

impl Default for CachedFactorizer<TrialDivision> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Evaluator> CachedFactorizer<E> {
    /// Creates an empty cache around `evaluator`.
    pub fn with_evaluator(evaluator: E) -> Self {
        Self {
            evaluator,
            slot: Mutex::new(CacheSlot::new()),
            max_input_bits: u64::MAX,
        }
    }

    /// Creates an empty cache from a configuration.
    pub fn init(config: FactorizerConfig, evaluator: E) -> Self {
        Self {
            evaluator,
            slot: Mutex::new(CacheSlot::new()),
            max_input_bits: config.max_input_bits,
        }
    }

    /// Snapshot of the request statistics.
    pub fn stats(&self) -> CacheStats {
        self.slot.lock().stats()
    }

    /// Snapshot of the cached pair.
    pub fn entry(&self) -> Option<CacheEntry> {
        self.slot.lock().entry().cloned()
    }

    /// Empties the slot and resets statistics.
    pub fn clear(&self) {
        self.slot.lock().clear();
    }
}

impl<E: Evaluator> Factorizer for CachedFactorizer<E> {
    fn compute(&self, input: &Input) -> Arc<Factors> {
        let (cached, stats) = {
            let mut slot = self.slot.lock();
            let cached = slot.lookup(input);
            (cached, slot.stats())
        };

        if let Some(factors) = cached {
            debug!(
                strategy = self.name(),
                %input,
                requests = stats.requests,
                hits = stats.cache_hits,
                "cache hit"
            );
            return factors;
        }

        trace!(strategy = self.name(), %input, "evaluating unlocked");
        let factors = Arc::new(self.evaluator.evaluate(input));

        let key = input.clone();
        self.slot.lock().replace(key, Arc::clone(&factors));

        debug!(
            strategy = self.name(),
            %input,
            requests = stats.requests,
            hits = stats.cache_hits,
            "cache miss"
        );
        factors
    }

    fn name(&self) -> &'static str {
        Strategy::Cached.as_str()
    }

    fn input_limit(&self) -> u64 {
        self.max_input_bits
    }

    fn stats(&self) -> Option<CacheStats> {
        Some(CachedFactorizer::stats(self))
    }
}

impl<E: Evaluator> CacheMetrics for CachedFactorizer<E> {
    fn metrics(&self) -> BTreeMap<String, f64> {
        CachedFactorizer::stats(self).to_btreemap()
    }

    fn algorithm_name(&self) -> &'static str {
        Strategy::Cached.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factor::factorize;
    use num_bigint::BigUint;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Barrier;
    use std::thread;

    #[test]
    fn test_hit_after_miss() {
        let factorizer = CachedFactorizer::new();
        let n = BigUint::from(2310u32);
        let first = factorizer.compute(&n);
        let second = factorizer.compute(&n);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(*first, factorize(&n));

        let stats = factorizer.stats();
        assert_eq!(stats.requests, 2);
        assert_eq!(stats.cache_hits, 1);
        assert_eq!(stats.cache_misses(), 1);
    }

    #[test]
    fn test_alternating_inputs_always_miss() {
        let factorizer = CachedFactorizer::new();
        for n in [6u32, 7, 6, 7, 6] {
            factorizer.compute(&BigUint::from(n));
        }
        assert_eq!(factorizer.stats().cache_hits, 0);
        assert_eq!(factorizer.entry().unwrap().input(), &BigUint::from(6u32));
    }

    #[test]
    fn test_evaluation_runs_outside_the_lock() {
        // Both callers must be inside evaluate at the same time to get past
        // the barrier. If evaluate ran under the slot lock this would hang.
        let rendezvous = Barrier::new(2);
        let calls = AtomicUsize::new(0);
        let factorizer = CachedFactorizer::with_evaluator(|input: &Input| {
            calls.fetch_add(1, Ordering::SeqCst);
            rendezvous.wait();
            factorize(input)
        });

        let n = BigUint::from(1001u32);
        thread::scope(|s| {
            let a = s.spawn(|| factorizer.compute(&n));
            let b = s.spawn(|| factorizer.compute(&n));
            assert_eq!(*a.join().unwrap(), factorize(&n));
            assert_eq!(*b.join().unwrap(), factorize(&n));
        });

        // Same new input, both missed: redundant but harmless.
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        let stats = factorizer.stats();
        assert_eq!(stats.requests, 2);
        assert_eq!(stats.cache_hits, 0);
        assert_eq!(factorizer.entry().unwrap().input(), &n);
    }

    #[test]
    fn test_metrics_report() {
        let factorizer = CachedFactorizer::new();
        factorizer.service(Some("15"));
        factorizer.service(Some("15"));
        factorizer.service(Some("15"));
        let metrics = factorizer.metrics();
        assert_eq!(metrics["cache_hits"], 2.0);
        assert_eq!(metrics["cache_misses"], 1.0);
        assert_eq!(factorizer.algorithm_name(), "cached");
    }
}
