// Data models for factorizer simulation

use memo_factor::config::Strategy;
use memo_factor::counter::CounterKind;
use memo_factor::lazy::LazyKind;
use serde::Serialize;
use std::collections::BTreeMap;
use std::time::Duration;

/// A single request as the request layer would receive it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    /// Raw query parameter; `None` when the parameter was absent
    pub raw: Option<String>,
}

impl Request {
    /// Create a request carrying `raw`
    pub fn new(raw: impl Into<String>) -> Self {
        Self {
            raw: Some(raw.into()),
        }
    }

    /// Create a request without a parameter
    pub fn absent() -> Self {
        Self { raw: None }
    }

    pub fn as_param(&self) -> Option<&str> {
        self.raw.as_deref()
    }
}

/// Configuration for a simulation run
#[derive(Debug, Clone)]
pub struct SimulationConfig {
    /// Strategies to simulate, each against the full workload
    pub strategies: Vec<Strategy>,
    /// Number of request threads sharing one factorizer
    pub thread_count: usize,
    /// Inputs wider than this are answered as `1`
    pub max_input_bits: u64,
}

/// Results of a simulation run
#[derive(Debug)]
pub struct SimulationResult {
    /// Statistics for each strategy
    pub stats: BTreeMap<Strategy, StrategyStats>,
    /// Number of requests in the workload
    pub total_requests: usize,
    /// Number of distinct raw parameters in the workload
    pub distinct_inputs: usize,
    /// Wall time of the whole run
    pub duration: Duration,
}

/// Statistics for a single strategy
#[derive(Debug, Default, Clone)]
pub struct StrategyStats {
    /// Requests issued by the request threads
    pub requests: u64,
    /// Requests the strategy itself counted, if it counts
    pub reported_requests: Option<u64>,
    /// Cache hits reported by the strategy
    pub hits: u64,
    /// Responses that were not the factors of the request's own input
    pub mismatches: u64,
    /// Wall time spent serving the workload
    pub elapsed: Duration,
}

impl StrategyStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn misses(&self) -> u64 {
        self.requests.saturating_sub(self.hits)
    }

    /// Calculate hit rate as percentage
    pub fn hit_rate(&self) -> f64 {
        if self.requests > 0 {
            (self.hits as f64 / self.requests as f64) * 100.0
        } else {
            0.0
        }
    }

    /// Requests the strategy failed to count
    pub fn lost_counts(&self) -> u64 {
        self.reported_requests
            .map(|reported| self.requests.saturating_sub(reported))
            .unwrap_or(0)
    }

    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed.as_secs_f64() * 1_000.0
    }

    pub fn requests_per_sec(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.requests as f64 / secs
        } else {
            0.0
        }
    }
}

/// CSV export row for simulation results
#[derive(Debug, Serialize)]
pub struct CsvResultRow {
    pub strategy: String,
    pub thread_safe: bool,
    pub requests: u64,
    pub reported_requests: Option<u64>,
    pub hits: u64,
    pub misses: u64,
    pub hit_rate: f64,
    pub mismatches: u64,
    pub lost_counts: u64,
    pub elapsed_ms: f64,
    pub requests_per_sec: f64,
}

/// Outcome of the lost-update demonstration
#[derive(Debug, Clone)]
pub struct CounterReport {
    pub kind: CounterKind,
    /// threads × increments
    pub expected: u64,
    /// Final counter value of each trial
    pub finals: Vec<u64>,
}

impl CounterReport {
    pub fn short_trials(&self) -> usize {
        self.finals.iter().filter(|&&v| v < self.expected).count()
    }

    pub fn worst(&self) -> u64 {
        self.finals.iter().copied().min().unwrap_or(0)
    }
}

/// Outcome of the lazy initialization demonstration
#[derive(Debug, Clone)]
pub struct LazyReport {
    pub kind: LazyKind,
    pub threads: usize,
    /// Number of times the initializer ran
    pub constructions: usize,
    /// Number of distinct instances handed to callers
    pub distinct_instances: usize,
}
