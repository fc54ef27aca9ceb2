//! Counting Factorizers
//!
//! A stateless factorizer plus a single piece of shared state: how many
//! requests it has served. The counter type decides whether that number is
//! right.
//!
//! - [`UnsafeCountingFactorizer`] uses a [`RacyCounter`]. Its read-modify-write
//!   is not atomic, so concurrent requests lose increments.
//! - [`CountingFactorizer`] uses an [`AtomicCounter`] by default. One
//!   `fetch_add` per request, no lock, exact count.

use super::Factorizer;
use crate::config::{FactorizerConfig, Strategy};
use crate::counter::{AtomicCounter, Counter, RacyCounter};
use crate::factor::{Evaluator, Factors, Input, TrialDivision};
use crate::metrics::{CacheMetrics, CacheStats};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

/// A factorizer that counts the requests it serves.
#[derive(Debug)]
pub struct CountingFactorizer<C = AtomicCounter, E = TrialDivision> {
    evaluator: E,
    counter: C,
    max_input_bits: u64,
}

/// A counting factorizer whose counter loses updates under concurrency.
pub type UnsafeCountingFactorizer<E = TrialDivision> = CountingFactorizer<RacyCounter, E>;

impl CountingFactorizer<AtomicCounter, TrialDivision> {
    /// Creates an exact counting factorizer using trial division.
    pub fn new() -> Self {
        Self::with_evaluator(TrialDivision)
    }
}

impl Default for CountingFactorizer<AtomicCounter, TrialDivision> {
    fn default() -> Self {
        Self::new()
    }
}

impl UnsafeCountingFactorizer<TrialDivision> {
    /// Creates an unsynchronized counting factorizer using trial division.
    pub fn unsynchronized() -> Self {
        Self::with_evaluator(TrialDivision)
    }
}

impl<C: Counter + Default, E: Evaluator> CountingFactorizer<C, E> {
    /// Creates a counting factorizer around `evaluator`.
    pub fn with_evaluator(evaluator: E) -> Self {
        Self {
            evaluator,
            counter: C::default(),
            max_input_bits: u64::MAX,
        }
    }

    /// Creates a counting factorizer from a configuration.
    pub fn init(config: FactorizerConfig, evaluator: E) -> Self {
        Self {
            evaluator,
            counter: C::default(),
            max_input_bits: config.max_input_bits,
        }
    }
}

impl<C: Counter, E: Evaluator> CountingFactorizer<C, E> {
    /// Number of requests served so far.
    ///
    /// Unspecified while requests are in flight, and for the unsynchronized
    /// counter possibly lower than the true number even after they finish.
    pub fn count(&self) -> u64 {
        self.counter.value()
    }
}

impl<C: Counter, E: Evaluator> Factorizer for CountingFactorizer<C, E> {
    fn compute(&self, input: &Input) -> Arc<Factors> {
        let factors = Arc::new(self.evaluator.evaluate(input));
        let count = self.counter.increment();
        debug!(strategy = self.name(), %input, count, "request counted");
        factors
    }

    fn name(&self) -> &'static str {
        if self.counter.kind().is_exact() {
            Strategy::Counting.as_str()
        } else {
            Strategy::UnsafeCounting.as_str()
        }
    }

    fn input_limit(&self) -> u64 {
        self.max_input_bits
    }

    fn stats(&self) -> Option<CacheStats> {
        // Nothing is cached, every counted request was computed.
        Some(CacheStats {
            requests: self.count(),
            cache_hits: 0,
        })
    }
}

impl<C: Counter, E: Evaluator> CacheMetrics for CountingFactorizer<C, E> {
    fn metrics(&self) -> BTreeMap<String, f64> {
        let mut metrics = BTreeMap::new();
        metrics.insert("requests".to_string(), self.count() as f64);
        metrics
    }

    fn algorithm_name(&self) -> &'static str {
        self.name()
    }
}
