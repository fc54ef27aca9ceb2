//! Cache Entry and Slot
//!
//! The single-slot state shared by the lock-based caches: the last input, the
//! output computed for it, and the request statistics kept next to them.
//!
//! # Invariant
//!
//! A [`CacheEntry`] is only ever built from an input together with the output
//! evaluated for that input, and it is replaced wholesale. Its fields are
//! private and there is no way to mutate one half of an entry, so
//! `entry.output() == f(entry.input())` holds for every entry a caller can
//! observe.
//!
//! ```text
//!   ┌──────────────── CacheSlot ────────────────┐
//!   │  entry: Option<CacheEntry>                │
//!   │         ┌──────────┬──────────────────┐   │
//!   │         │  input   │  Arc<Factors>    │   │
//!   │         └──────────┴──────────────────┘   │
//!   │  stats: CacheStats { requests, hits }     │
//!   └───────────────────────────────────────────┘
//! ```
//!
//! `CacheSlot` has no synchronization of its own. The coarse and fine-grained
//! caches wrap it in a `parking_lot::Mutex` and differ only in how long they
//! hold that lock.

use crate::factor::{Factors, Input};
use crate::metrics::CacheStats;
use std::sync::Arc;

/// One cached input/output pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    input: Input,
    output: Arc<Factors>,
}

impl CacheEntry {
    /// Pairs an input with the output computed for it.
    pub fn new(input: Input, output: Arc<Factors>) -> Self {
        Self { input, output }
    }

    /// The cached input.
    #[inline]
    pub fn input(&self) -> &Input {
        &self.input
    }

    /// The output computed for [`input`](Self::input).
    #[inline]
    pub fn output(&self) -> &Arc<Factors> {
        &self.output
    }

    /// Returns `true` if this entry answers `input`.
    #[inline]
    pub fn matches(&self, input: &Input) -> bool {
        self.input == *input
    }
}

/// The slot and statistics guarded by a strategy's lock.
#[derive(Debug, Default)]
pub(crate) struct CacheSlot {
    entry: Option<CacheEntry>,
    stats: CacheStats,
}

impl CacheSlot {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Counts the request and returns the cached output on a hit.
    pub(crate) fn lookup(&mut self, input: &Input) -> Option<Arc<Factors>> {
        match &self.entry {
            Some(entry) if entry.matches(input) => {
                self.stats.record_hit();
                Some(Arc::clone(entry.output()))
            }
            _ => {
                self.stats.record_miss();
                None
            }
        }
    }

    /// Replaces the whole entry.
    pub(crate) fn replace(&mut self, input: Input, output: Arc<Factors>) {
        self.entry = Some(CacheEntry::new(input, output));
    }

    pub(crate) fn entry(&self) -> Option<&CacheEntry> {
        self.entry.as_ref()
    }

    pub(crate) fn stats(&self) -> CacheStats {
        self.stats
    }

    pub(crate) fn clear(&mut self) {
        self.entry = None;
        self.stats = CacheStats::new();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factor::factorize;
    use num_bigint::BigUint;

    fn entry_for(n: u32) -> (Input, Arc<Factors>) {
        let input = BigUint::from(n);
        let output = Arc::new(factorize(&input));
        (input, output)
    }

    #[test]
    fn test_empty_slot_misses() {
        let mut slot = CacheSlot::new();
        assert!(slot.lookup(&BigUint::from(6u32)).is_none());
        assert!(slot.entry().is_none());
        assert_eq!(slot.stats().requests, 1);
        assert_eq!(slot.stats().cache_hits, 0);
    }

    #[test]
    fn test_replace_then_hit() {
        let mut slot = CacheSlot::new();
        let (input, output) = entry_for(12);
        slot.replace(input.clone(), Arc::clone(&output));

        let hit = slot.lookup(&input).unwrap();
        assert!(Arc::ptr_eq(&hit, &output));
        assert!(slot.lookup(&BigUint::from(13u32)).is_none());
        assert_eq!(slot.stats().requests, 2);
        assert_eq!(slot.stats().cache_hits, 1);
    }

    #[test]
    fn test_replace_swaps_both_halves() {
        let mut slot = CacheSlot::new();
        let (a, fa) = entry_for(102);
        let (b, fb) = entry_for(103);
        slot.replace(a, fa);
        slot.replace(b.clone(), Arc::clone(&fb));

        let entry = slot.entry().unwrap();
        assert_eq!(entry.input(), &b);
        assert_eq!(entry.output(), &fb);
        assert!(!entry.matches(&BigUint::from(102u32)));
    }

    #[test]
    fn test_clear_resets_everything() {
        let mut slot = CacheSlot::new();
        let (input, output) = entry_for(8);
        slot.replace(input.clone(), output);
        slot.lookup(&input);
        slot.clear();
        assert!(slot.entry().is_none());
        assert_eq!(slot.stats(), CacheStats::new());
    }
}
