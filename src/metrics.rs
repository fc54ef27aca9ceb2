//! Cache Metrics
//!
//! Request and hit counters for the memoizing strategies, reported through a
//! `BTreeMap` so output ordering is deterministic across runs.
//!
//! Counters are plain integers. They are only ever touched while the owning
//! strategy holds the same lock that guards its cache slot, which is what
//! keeps `cache_hits + cache_misses == requests` exact under any load.

use std::collections::BTreeMap;

/// Request statistics for a single-slot cache.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    /// Total number of `compute` calls observed
    pub requests: u64,

    /// Number of calls answered from the cached slot
    pub cache_hits: u64,
}

impl CacheStats {
    /// Creates zeroed statistics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a request answered from the cache.
    pub fn record_hit(&mut self) {
        self.requests += 1;
        self.cache_hits += 1;
    }

    /// Records a request that had to be computed.
    pub fn record_miss(&mut self) {
        self.requests += 1;
    }

    /// Number of requests that were not cache hits.
    pub fn cache_misses(&self) -> u64 {
        self.requests - self.cache_hits
    }

    /// Hit rate between 0.0 and 1.0, or 0.0 before any request.
    pub fn hit_rate(&self) -> f64 {
        if self.requests > 0 {
            self.cache_hits as f64 / self.requests as f64
        } else {
            0.0
        }
    }

    /// Miss rate between 0.0 and 1.0, or 0.0 before any request.
    pub fn miss_rate(&self) -> f64 {
        if self.requests > 0 {
            self.cache_misses() as f64 / self.requests as f64
        } else {
            0.0
        }
    }

    /// Converts the statistics to a deterministically ordered map.
    pub fn to_btreemap(&self) -> BTreeMap<String, f64> {
        let mut metrics = BTreeMap::new();
        metrics.insert("cache_hits".to_string(), self.cache_hits as f64);
        metrics.insert("cache_misses".to_string(), self.cache_misses() as f64);
        metrics.insert("requests".to_string(), self.requests as f64);
        metrics.insert("hit_rate".to_string(), self.hit_rate());
        metrics.insert("miss_rate".to_string(), self.miss_rate());
        metrics
    }
}

/// Uniform metrics reporting for strategies that keep statistics.
pub trait CacheMetrics {
    /// Returns all metrics as key-value pairs in deterministic order.
    fn metrics(&self) -> BTreeMap<String, f64>;

    /// Strategy name for identification.
    fn algorithm_name(&self) -> &'static str;
}
