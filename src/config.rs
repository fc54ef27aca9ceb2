//! Factorizer Configuration
//!
//! Configuration structs have all public fields for simple instantiation,
//! and a [`Strategy`] selects which synchronization discipline the built
//! factorizer uses.
//!
//! # Strategies
//!
//! | Strategy | Type | Shared state | Correct? |
//! |----------|------|--------------|----------|
//! | `stateless` | [`StatelessFactorizer`] | none | yes |
//! | `unsafe-counting` | [`UnsafeCountingFactorizer`] | racy counter | loses counts |
//! | `counting` | [`CountingFactorizer`] | atomic counter | yes |
//! | `unsafe-caching` | [`UnsafeCachingFactorizer`] | two atomic slots | can return wrong factors |
//! | `synchronized` | [`SynchronizedFactorizer`] | slot, one lock per call | yes, fully serialized |
//! | `cached` | [`CachedFactorizer`] | slot, two short lock regions | yes |
//!
//! # Examples
//!
//! ```
//! use memo_factor::config::{FactorizerConfig, Strategy};
//!
//! let config = FactorizerConfig {
//!     strategy: Strategy::Cached,
//!     max_input_bits: 128,
//! };
//! let factorizer = config.build();
//! assert_eq!(factorizer.service(Some("12")), "Factors: 2 2 3 \n");
//! assert_eq!(factorizer.service(Some("not a number")), "Factors: \n");
//! ```
//!
//! [`StatelessFactorizer`]: crate::concurrent::StatelessFactorizer
//! [`UnsafeCountingFactorizer`]: crate::concurrent::UnsafeCountingFactorizer
//! [`CountingFactorizer`]: crate::concurrent::CountingFactorizer
//! [`UnsafeCachingFactorizer`]: crate::concurrent::UnsafeCachingFactorizer
//! [`SynchronizedFactorizer`]: crate::concurrent::SynchronizedFactorizer
//! [`CachedFactorizer`]: crate::concurrent::CachedFactorizer

use crate::concurrent::{
    CachedFactorizer, CountingFactorizer, Factorizer, StatelessFactorizer,
    SynchronizedFactorizer, UnsafeCachingFactorizer, UnsafeCountingFactorizer,
};
use crate::counter::AtomicCounter;
use crate::factor::{Evaluator, TrialDivision};
use core::fmt;
use core::str::FromStr;

/// The synchronization strategies a factorizer can be built with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Strategy {
    /// No shared state at all
    Stateless,
    /// Request counter without synchronization
    UnsafeCounting,
    /// Request counter with an atomic increment
    Counting,
    /// Last input and output in two independent atomic slots
    UnsafeCaching,
    /// Whole request under one lock
    Synchronized,
    /// Lock only around the cache check and the cache update
    Cached,
}

impl Strategy {
    /// Every strategy, in the order the defects are usually introduced.
    pub const ALL: [Strategy; 6] = [
        Strategy::Stateless,
        Strategy::UnsafeCounting,
        Strategy::Counting,
        Strategy::UnsafeCaching,
        Strategy::Synchronized,
        Strategy::Cached,
    ];

    /// Canonical kebab-case name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Stateless => "stateless",
            Strategy::UnsafeCounting => "unsafe-counting",
            Strategy::Counting => "counting",
            Strategy::UnsafeCaching => "unsafe-caching",
            Strategy::Synchronized => "synchronized",
            Strategy::Cached => "cached",
        }
    }

    /// Whether the strategy memoizes its last result.
    pub fn is_caching(&self) -> bool {
        matches!(
            self,
            Strategy::UnsafeCaching | Strategy::Synchronized | Strategy::Cached
        )
    }

    /// Whether the strategy upholds every invariant it claims under
    /// concurrent use.
    pub fn is_thread_safe(&self) -> bool {
        !matches!(self, Strategy::UnsafeCounting | Strategy::UnsafeCaching)
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('_', "-").as_str() {
            "stateless" => Ok(Strategy::Stateless),
            "unsafe-counting" => Ok(Strategy::UnsafeCounting),
            "counting" => Ok(Strategy::Counting),
            "unsafe-caching" | "atomic" => Ok(Strategy::UnsafeCaching),
            "synchronized" | "coarse" => Ok(Strategy::Synchronized),
            "cached" | "fine" => Ok(Strategy::Cached),
            other => Err(format!("unknown strategy '{other}'")),
        }
    }
}

/// Configuration for building a [`Factorizer`].
///
/// # Fields
///
/// - `strategy`: which synchronization discipline to use
/// - `max_input_bits`: inputs longer than this are treated as invalid and
///   normalized to `1`. Use `u64::MAX` for no limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FactorizerConfig {
    /// Synchronization strategy
    pub strategy: Strategy,
    /// Maximum accepted input size in bits
    pub max_input_bits: u64,
}

impl Default for FactorizerConfig {
    fn default() -> Self {
        Self {
            strategy: Strategy::Cached,
            max_input_bits: u64::MAX,
        }
    }
}

impl FactorizerConfig {
    /// Builds the configured factorizer with trial division.
    pub fn build(&self) -> Box<dyn Factorizer> {
        self.build_with(TrialDivision)
    }

    /// Builds the configured factorizer around a custom evaluator.
    pub fn build_with<E: Evaluator + 'static>(&self, evaluator: E) -> Box<dyn Factorizer> {
        match self.strategy {
            Strategy::Stateless => Box::new(StatelessFactorizer::init(*self, evaluator)),
            Strategy::UnsafeCounting => {
                Box::new(UnsafeCountingFactorizer::init(*self, evaluator))
            }
            Strategy::Counting => {
                Box::new(CountingFactorizer::<AtomicCounter, E>::init(*self, evaluator))
            }
            Strategy::UnsafeCaching => Box::new(UnsafeCachingFactorizer::init(*self, evaluator)),
            Strategy::Synchronized => Box::new(SynchronizedFactorizer::init(*self, evaluator)),
            Strategy::Cached => Box::new(CachedFactorizer::init(*self, evaluator)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_round_trips_through_name() {
        for strategy in Strategy::ALL {
            assert_eq!(strategy.as_str().parse::<Strategy>(), Ok(strategy));
        }
    }

    #[test]
    fn test_strategy_aliases() {
        assert_eq!("fine".parse::<Strategy>(), Ok(Strategy::Cached));
        assert_eq!("COARSE".parse::<Strategy>(), Ok(Strategy::Synchronized));
        assert_eq!("unsafe_caching".parse::<Strategy>(), Ok(Strategy::UnsafeCaching));
        assert!("lru".parse::<Strategy>().is_err());
    }

    #[test]
    fn test_build_every_strategy() {
        for strategy in Strategy::ALL {
            let config = FactorizerConfig {
                strategy,
                ..Default::default()
            };
            let factorizer = config.build();
            assert_eq!(factorizer.name(), strategy.as_str());
            assert_eq!(factorizer.service(Some("102")), "Factors: 2 3 17 \n");
            assert_eq!(factorizer.service(None), "Factors: \n");
        }
    }

    #[test]
    fn test_bit_limit_normalizes_large_inputs() {
        let config = FactorizerConfig {
            strategy: Strategy::Stateless,
            max_input_bits: 8,
        };
        let factorizer = config.build();
        assert_eq!(factorizer.service(Some("255")), "Factors: 3 5 17 \n");
        assert_eq!(factorizer.service(Some("256")), "Factors: \n");
    }
}
