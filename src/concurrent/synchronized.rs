//! Synchronized Factorizer
//!
//! Single-slot memoization with one lock held for the entire request: check,
//! evaluate, update, return. The cached pair can never be observed half
//! written, and neither can the statistics.
//!
//! The price is that the lock covers the expensive part. A caller asking for
//! the factors of `2` waits behind any caller currently factoring a large
//! semiprime, even before it gets to look at the cache.

use super::Factorizer;
use crate::config::{FactorizerConfig, Strategy};
use crate::entry::{CacheEntry, CacheSlot};
use crate::factor::{Evaluator, Factors, Input, TrialDivision};
use crate::metrics::{CacheMetrics, CacheStats};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

/// A single-slot cache that serializes every request.
#[derive(Debug)]
pub struct SynchronizedFactorizer<E = TrialDivision> {
    evaluator: E,
    slot: Mutex<CacheSlot>,
    max_input_bits: u64,
}

impl SynchronizedFactorizer<TrialDivision> {
    /// Creates an empty cache using trial division.
    pub fn new() -> Self {
        Self::with_evaluator(TrialDivision)
    }
}

impl Default for SynchronizedFactorizer<TrialDivision> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Evaluator> SynchronizedFactorizer<E> {
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

impl<E: Evaluator> Factorizer for SynchronizedFactorizer<E> {
    fn compute(&self, input: &Input) -> Arc<Factors> {
        let mut slot = self.slot.lock();

        if let Some(factors) = slot.lookup(input) {
            debug!(strategy = self.name(), %input, "cache hit");
            return factors;
        }

        let factors = Arc::new(self.evaluator.evaluate(input));
        slot.replace(input.clone(), Arc::clone(&factors));
        debug!(strategy = self.name(), %input, "cache miss");
        factors
    }

    fn name(&self) -> &'static str {
        Strategy::Synchronized.as_str()
    }

    fn input_limit(&self) -> u64 {
        self.max_input_bits
    }

    fn stats(&self) -> Option<CacheStats> {
        Some(SynchronizedFactorizer::stats(self))
    }
}

impl<E: Evaluator> CacheMetrics for SynchronizedFactorizer<E> {
    fn metrics(&self) -> BTreeMap<String, f64> {
        SynchronizedFactorizer::stats(self).to_btreemap()
    }

    fn algorithm_name(&self) -> &'static str {
        Strategy::Synchronized.as_str()
    }
}
