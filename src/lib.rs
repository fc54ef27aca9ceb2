//! # memo-factor
//!
//! A concurrent memoizing compute cache, with prime factorization as the
//! expensive function. One strategy instance is shared between all request
//! threads; each strategy remembers at most the last input and its output and
//! guards that state with a different synchronization discipline.
//!
//! The crate carries the correct designs next to the broken ones they replace,
//! so the defects can be reproduced and tested rather than described.
//!
//! ---
//!
//! # Code Reference
//!
//! ## Strategy Selection Guide
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────────┐
//! │                 Which Factorizer Should I Use?                       │
//! ├──────────────────────────────────────────────────────────────────────┤
//! │                                                                      │
//! │  Repeated inputs worth caching?                                      │
//! │     │                                                                │
//! │    No ──▶ StatelessFactorizer (or CountingFactorizer for a count)    │
//! │     │                                                                │
//! │    Yes                                                               │
//! │     ▼                                                                │
//! │  Can one slow computation block every caller?                        │
//! │     │                                                                │
//! │    Yes ──▶ SynchronizedFactorizer                                    │
//! │     │                                                                │
//! │    No ───▶ CachedFactorizer                                          │
//! │                                                                      │
//! │  Never in production: UnsafeCountingFactorizer,                      │
//! │                       UnsafeCachingFactorizer                        │
//! └──────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Reference
//!
//! | Type | Invariant under concurrency | Contention |
//! |------|-----------------------------|------------|
//! | [`StatelessFactorizer`] | nothing shared | none |
//! | [`UnsafeCountingFactorizer`] | count loses updates | none |
//! | [`CountingFactorizer`] | count exact | one atomic per request |
//! | [`UnsafeCachingFactorizer`] | output may belong to another input | none |
//! | [`SynchronizedFactorizer`] | entry consistent | whole request serialized |
//! | [`CachedFactorizer`] | entry consistent, stats exact | check and update only |
//!
//! ## Code Examples
//!
//! ### Serving Requests
//!
//! Raw parameters are parsed leniently: anything that is not a positive
//! decimal integer is answered as if it were `1`.
//!
//! ```rust
//! use memo_factor::{CachedFactorizer, Factorizer};
//!
//! let factorizer = CachedFactorizer::new();
//! assert_eq!(factorizer.service(Some("12")), "Factors: 2 2 3 \n");
//! assert_eq!(factorizer.service(Some("12")), "Factors: 2 2 3 \n");
//! assert_eq!(factorizer.service(Some("-5")), "Factors: \n");
//!
//! let stats = factorizer.stats();
//! assert_eq!(stats.requests, 3);
//! assert_eq!(stats.cache_hits, 1);
//! ```
//!
//! ### Building From Configuration
//!
//! ```rust
//! use memo_factor::config::{FactorizerConfig, Strategy};
//!
//! let config = FactorizerConfig {
//!     strategy: "coarse".parse::<Strategy>().unwrap(),
//!     max_input_bits: 64,
//! };
//! let factorizer = config.build();
//! assert_eq!(factorizer.name(), "synchronized");
//! assert_eq!(factorizer.service(Some("97")), "Factors: 97 \n");
//! ```
//!
//! ### Custom Evaluator
//!
//! Any `Fn(&Input) -> Factors` is an [`Evaluator`].
//!
//! ```rust
//! use memo_factor::{factorize, CachedFactorizer, Factorizer, Input};
//! use std::sync::atomic::{AtomicUsize, Ordering};
//!
//! let calls = AtomicUsize::new(0);
//! let factorizer = CachedFactorizer::with_evaluator(|n: &Input| {
//!     calls.fetch_add(1, Ordering::Relaxed);
//!     factorize(n)
//! });
//!
//! factorizer.service(Some("360"));
//! factorizer.service(Some("360"));
//! assert_eq!(calls.load(Ordering::Relaxed), 1);
//! ```
//!
//! ### Strict Parsing
//!
//! ```rust
//! use memo_factor::codec::{parse_input, InputError};
//!
//! assert!(parse_input(Some("42"), u64::MAX).is_ok());
//! assert_eq!(parse_input(None, u64::MAX), Err(InputError::Missing));
//! assert!(matches!(parse_input(Some("0"), u64::MAX), Err(InputError::OutOfDomain(_))));
//! ```
//!
//! ## Modules
//!
//! - [`factor`]: Input and output types, the evaluator trait, trial division
//! - [`codec`]: Request parameter parsing and input errors
//! - [`counter`]: Racy, locked and atomic request counters
//! - [`lazy`]: Racy, locked and once-based lazy initialization
//! - [`entry`]: The cached input/output pair
//! - [`metrics`]: Request and hit statistics
//! - [`config`]: Strategy selection and factorizer construction
//! - [`concurrent`]: The factorizer strategies

#[cfg(test)]
extern crate scoped_threadpool;

/// Input and output types and the function being memoized.
pub mod factor;

/// Request codec.
///
/// Parses raw request parameters into inputs. Invalid parameters either
/// surface as an [`InputError`](codec::InputError) or are normalized to `1`.
pub mod codec;

/// Shared request counters.
///
/// One correct and one broken way to count concurrent events, plus the
/// lock-free alternative.
pub mod counter;

/// Lazy initialization.
pub mod lazy;

/// Cache entry type.
///
/// The input/output pair held by the lock-based caches, and the slot that
/// pairs it with request statistics.
pub mod entry;

/// Cache metrics.
pub mod metrics;

/// Factorizer configuration.
///
/// Provides [`Strategy`](config::Strategy) and the configuration struct that
/// builds any strategy behind a `Box<dyn Factorizer>`.
pub mod config;

/// Factorizer strategies.
///
/// Every strategy is shared by reference between request threads and
/// implements the [`Factorizer`](concurrent::Factorizer) trait.
pub mod concurrent;

// Re-export core types
pub use factor::{factorize, Evaluator, Factors, Input, TrialDivision};

// Re-export entry and metrics types
pub use entry::CacheEntry;
pub use metrics::{CacheMetrics, CacheStats};

pub use concurrent::{
    CachedFactorizer, CountingFactorizer, Factorizer, StatelessFactorizer,
    SynchronizedFactorizer, UnsafeCachingFactorizer, UnsafeCountingFactorizer,
};
