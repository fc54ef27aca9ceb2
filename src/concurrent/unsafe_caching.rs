//! Unsafe Caching Factorizer
//!
//! Remembers the last input and its factors in two slots, each of them an
//! atomic reference ([`ArcSwapOption`]). Every individual load and store is
//! atomic. The pair is not.
//!
//! # The Broken Invariant
//!
//! The factors in `last_output` should always be the factors of
//! `last_input`. A miss writes the two slots one after the other, which
//! leaves a window where they disagree:
//!
//! ```text
//!   state: last_input = 102, last_output = [2, 3, 17]
//!
//!   Thread A (103)                    Thread B (103)
//!   evaluate 103 -> [103]
//!   last_input  <- 103
//!       ── paused ──                  last_input == 103? yes
//!                                     return last_output  ->  [2, 3, 17]  (factors of 102)
//!   last_output <- [103]
//! ```
//!
//! A reader can straddle the window from the other side too, reading an old
//! input and a new output. This type exists to show that composing atomic
//! operations does not give an atomic composite. Keep it broken.
//!
//! # Deterministic Reproduction
//!
//! A [`StoreHook`] runs between the two stores. The default [`NoHook`] does
//! nothing; a test hook can park the writer there while another thread reads.

use super::Factorizer;
use crate::config::{FactorizerConfig, Strategy};
use crate::factor::{Evaluator, Factors, Input, TrialDivision};
use arc_swap::ArcSwapOption;
use std::sync::Arc;
use tracing::debug;

/// Called by [`UnsafeCachingFactorizer`] after it has published a new input
/// and before it publishes the matching output.
pub trait StoreHook: Send + Sync {
    /// `input` is the value just stored into the input slot.
    fn between_stores(&self, input: &Input);
}

/// A [`StoreHook`] that does nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHook;

impl StoreHook for NoHook {
    #[inline]
    fn between_stores(&self, _input: &Input) {}
}

impl<F> StoreHook for F
where
    F: Fn(&Input) + Send + Sync,
{
    fn between_stores(&self, input: &Input) {
        self(input)
    }
}

/// A factorizer caching its last result in two independently atomic slots.
#[derive(Debug)]
pub struct UnsafeCachingFactorizer<E = TrialDivision, H = NoHook> {
    evaluator: E,
    hook: H,
    last_input: ArcSwapOption<Input>,
    last_output: ArcSwapOption<Factors>,
    max_input_bits: u64,
}

impl UnsafeCachingFactorizer<TrialDivision, NoHook> {
    /// Creates an empty cache using trial division.
    pub fn new() -> Self {
        Self::with_evaluator(TrialDivision)
    }
}

impl Default for UnsafeCachingFactorizer<TrialDivision, NoHook> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Evaluator> UnsafeCachingFactorizer<E, NoHook> {
    /// Creates an empty cache around `evaluator`.
    pub fn with_evaluator(evaluator: E) -> Self {
        Self::with_hook(evaluator, NoHook)
    }

    /// Creates an empty cache from a configuration.
    pub fn init(config: FactorizerConfig, evaluator: E) -> Self {
        let mut factorizer = Self::with_hook(evaluator, NoHook);
        factorizer.max_input_bits = config.max_input_bits;
        factorizer
    }
}

impl<E: Evaluator, H: StoreHook> UnsafeCachingFactorizer<E, H> {
    /// Creates an empty cache that calls `hook` between its two stores.
    pub fn with_hook(evaluator: E, hook: H) -> Self {
        Self {
            evaluator,
            hook,
            last_input: ArcSwapOption::empty(),
            last_output: ArcSwapOption::empty(),
            max_input_bits: u64::MAX,
        }
    }

    /// Current contents of the input slot.
    pub fn last_input(&self) -> Option<Arc<Input>> {
        self.last_input.load_full()
    }

    /// Current contents of the output slot. Not necessarily the factors of
    /// [`last_input`](Self::last_input).
    pub fn last_output(&self) -> Option<Arc<Factors>> {
        self.last_output.load_full()
    }
}

impl<E: Evaluator, H: StoreHook> Factorizer for UnsafeCachingFactorizer<E, H> {
    fn compute(&self, input: &Input) -> Arc<Factors> {
        if self.last_input.load_full().as_deref() == Some(input) {
            // An empty output slot here means the very first writer is
            // between its stores; fall through and compute.
            if let Some(factors) = self.last_output.load_full() {
                debug!(strategy = self.name(), %input, "cache hit");
                return factors;
            }
        }

        let factors = Arc::new(self.evaluator.evaluate(input));
        self.last_input.store(Some(Arc::new(input.clone())));
        self.hook.between_stores(input);
        self.last_output.store(Some(Arc::clone(&factors)));
        debug!(strategy = self.name(), %input, "cache miss");
        factors
    }

    fn name(&self) -> &'static str {
        Strategy::UnsafeCaching.as_str()
    }

    fn input_limit(&self) -> u64 {
        self.max_input_bits
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factor::factorize;
    use num_bigint::BigUint;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_sequential_use_is_consistent() {
        let factorizer = UnsafeCachingFactorizer::new();
        assert!(factorizer.last_input().is_none());

        for n in [102u32, 102, 103, 102] {
            let input = BigUint::from(n);
            assert_eq!(*factorizer.compute(&input), factorize(&input));
        }
        assert_eq!(factorizer.last_input().as_deref(), Some(&BigUint::from(102u32)));
        assert_eq!(
            factorizer.last_output().as_deref(),
            Some(&factorize(&BigUint::from(102u32)))
        );
    }

    #[test]
    fn test_repeat_input_skips_evaluation() {
        let calls = AtomicUsize::new(0);
        let factorizer = UnsafeCachingFactorizer::with_evaluator(|input: &Input| {
            calls.fetch_add(1, Ordering::SeqCst);
            factorize(input)
        });
        let input = BigUint::from(77u32);
        let first = factorizer.compute(&input);
        let second = factorizer.compute(&input);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_hook_sees_half_published_pair() {
        // The hook runs while the input slot is new and the output slot old.
        let observed = parking_lot::Mutex::new(Vec::new());
        let factorizer = UnsafeCachingFactorizer::with_hook(TrialDivision, |input: &Input| {
            observed.lock().push(input.clone());
        });
        factorizer.compute(&BigUint::from(4u32));
        factorizer.compute(&BigUint::from(5u32));
        assert_eq!(
            *observed.lock(),
            vec![BigUint::from(4u32), BigUint::from(5u32)]
        );
    }
}
