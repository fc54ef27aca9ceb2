//! Concurrent Factorizer Strategies
//!
//! Every strategy answers the same question, "what are the prime factors of
//! this number?", and every one is shared between request threads through a
//! single instance. They differ only in what state they keep and how that
//! state is synchronized.
//!
//! # Available Strategies
//!
//! | Type | Shared state | Discipline | Invariant |
//! |------|--------------|------------|-----------|
//! | [`StatelessFactorizer`] | none | none needed | trivially safe |
//! | [`UnsafeCountingFactorizer`] | request count | none | count loses updates |
//! | [`CountingFactorizer`] | request count | atomic `fetch_add` | count exact |
//! | [`UnsafeCachingFactorizer`] | last input, last output | two independent atomics | **broken**: output may belong to another input |
//! | [`SynchronizedFactorizer`] | slot + stats | one mutex around the whole request | holds, fully serialized |
//! | [`CachedFactorizer`] | slot + stats | mutex around check and update only | holds, computes in parallel |
//!
//! The two `Unsafe*` strategies are deliberately defective and kept as
//! negative references. Do not fix them.
//!
//! # Lock Regions
//!
//! ```text
//!   SynchronizedFactorizer            CachedFactorizer
//!
//!   lock ──────────────┐              lock ─ check + count ─ unlock   (A)
//!     check            │                       │
//!     evaluate (slow)  │ serialized          evaluate (slow)          unlocked
//!     update           │                       │
//!   unlock ────────────┘              lock ─ replace entry ─ unlock   (B)
//! ```
//!
//! In [`CachedFactorizer`] two callers that both miss on the same new input
//! both evaluate it. The work is wasted, but no invariant is broken: the
//! entry is always replaced whole and the last writer wins.
//!
//! # Example
//!
//! ```rust
//! use memo_factor::concurrent::{CachedFactorizer, Factorizer};
//! use std::sync::Arc;
//! use std::thread;
//!
//! let factorizer = Arc::new(CachedFactorizer::new());
//!
//! let handles: Vec<_> = ["12", "12", "97", "12"]
//!     .into_iter()
//!     .map(|raw| {
//!         let factorizer = Arc::clone(&factorizer);
//!         thread::spawn(move || factorizer.service(Some(raw)))
//!     })
//!     .collect();
//!
//! for handle in handles {
//!     let response = handle.join().unwrap();
//!     assert!(response == "Factors: 2 2 3 \n" || response == "Factors: 97 \n");
//! }
//!
//! let stats = factorizer.stats();
//! assert_eq!(stats.requests, 4);
//! assert_eq!(stats.cache_hits + stats.cache_misses(), 4);
//! ```

use crate::codec;
use crate::factor::{Factors, Input};
use crate::metrics::CacheStats;
use std::sync::Arc;

mod cached;
mod counting;
mod stateless;
mod synchronized;
mod unsafe_caching;

pub use self::cached::CachedFactorizer;
pub use self::counting::{CountingFactorizer, UnsafeCountingFactorizer};
pub use self::stateless::StatelessFactorizer;
pub use self::synchronized::SynchronizedFactorizer;
pub use self::unsafe_caching::{NoHook, StoreHook, UnsafeCachingFactorizer};

/// The synchronous call surface the request layer drives.
///
/// Implementations are shared between threads by reference, so all mutation
/// happens behind `&self` under the implementation's own discipline.
pub trait Factorizer: Send + Sync {
    /// Returns the prime factors of `input`.
    fn compute(&self, input: &Input) -> Arc<Factors>;

    /// Strategy name, matching [`Strategy::as_str`](crate::config::Strategy::as_str).
    fn name(&self) -> &'static str;

    /// Maximum accepted input size in bits for raw requests.
    fn input_limit(&self) -> u64 {
        u64::MAX
    }

    /// Request statistics, for strategies that keep them.
    fn stats(&self) -> Option<CacheStats> {
        None
    }

    /// Parses a raw request parameter, normalizing invalid input to `1`,
    /// and computes its factors.
    fn compute_raw(&self, raw: Option<&str>) -> Arc<Factors> {
        let input = codec::parse_input_or_identity(raw, self.input_limit());
        self.compute(&input)
    }

    /// Handles one request end to end, returning the response body.
    fn service(&self, raw: Option<&str>) -> String {
        self.compute_raw(raw).to_string()
    }
}
