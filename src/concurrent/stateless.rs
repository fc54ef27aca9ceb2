//! Stateless Factorizer
//!
//! Evaluates every request from scratch and keeps nothing between calls.
//! With no shared mutable state there is nothing to synchronize, so it is the
//! reference every other strategy is checked against.

use super::Factorizer;
use crate::config::{FactorizerConfig, Strategy};
use crate::factor::{Evaluator, Factors, Input, TrialDivision};
use std::sync::Arc;
use tracing::trace;

/// A factorizer without shared state.
#[derive(Debug, Clone)]
pub struct StatelessFactorizer<E = TrialDivision> {
    evaluator: E,
    max_input_bits: u64,
}

impl StatelessFactorizer<TrialDivision> {
    /// Creates a stateless factorizer using trial division.
    pub fn new() -> Self {
        Self::with_evaluator(TrialDivision)
    }
}

impl Default for StatelessFactorizer<TrialDivision> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Evaluator> StatelessFactorizer<E> {
    /// Creates a stateless factorizer around `evaluator`.
    pub fn with_evaluator(evaluator: E) -> Self {
        Self {
            evaluator,
            max_input_bits: u64::MAX,
        }
    }

    /// Creates a stateless factorizer from a configuration.
    ///
    /// Only `max_input_bits` is read; the strategy field is not checked.
    pub fn init(config: FactorizerConfig, evaluator: E) -> Self {
        Self {
            evaluator,
            max_input_bits: config.max_input_bits,
        }
    }
}

impl<E: Evaluator> Factorizer for StatelessFactorizer<E> {
    fn compute(&self, input: &Input) -> Arc<Factors> {
        trace!(strategy = self.name(), %input, "evaluating");
        Arc::new(self.evaluator.evaluate(input))
    }

    fn name(&self) -> &'static str {
        Strategy::Stateless.as_str()
    }

    fn input_limit(&self) -> u64 {
        self.max_input_bits
    }
}
