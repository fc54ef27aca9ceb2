//! Synthetic workload generation
//!
//! A single-slot cache only hits when a request repeats the input that was
//! served just before it, so the generator models bursts: a run of identical
//! requests for one input, then a jump to another. Inputs are drawn from a
//! fixed pool with a hot subset, and a small share of requests carries a
//! malformed or out-of-domain parameter.

use crate::models::Request;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

/// Parameters for generating a workload
#[derive(Debug, Clone)]
pub struct WorkloadConfig {
    /// Total number of requests
    pub requests: usize,
    /// Size of the input pool
    pub distinct: usize,
    /// Largest value drawn into the pool
    pub max_value: u64,
    /// Percentage of bursts drawn from the hot tenth of the pool
    pub hot_percent: u8,
    /// Mean burst length
    pub mean_burst: usize,
    /// Percentage of requests with an invalid parameter
    pub invalid_percent: u8,
    /// Seed for reproducible workloads; `None` seeds from the OS
    pub seed: Option<u64>,
}

impl Default for WorkloadConfig {
    fn default() -> Self {
        Self {
            requests: 10_000,
            distinct: 100,
            max_value: 1_000_000_000,
            hot_percent: 80,
            mean_burst: 4,
            invalid_percent: 2,
            seed: None,
        }
    }
}

const INVALID_PARAMS: [&str; 5] = ["", "abc", "-42", "0", "12 "];

pub struct WorkloadGenerator {
    config: WorkloadConfig,
}

impl WorkloadGenerator {
    pub fn new(config: WorkloadConfig) -> Self {
        Self { config }
    }

    pub fn generate(&self) -> Vec<Request> {
        let config = &self.config;
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let max_value = config.max_value.max(2);
        let pool: Vec<u64> = (0..config.distinct.max(1))
            .map(|_| rng.gen_range(2..=max_value))
            .collect();
        let hot = (pool.len() / 10).max(1);
        let mean_burst = config.mean_burst.max(1);

        let mut requests = Vec::with_capacity(config.requests);
        while requests.len() < config.requests {
            let value = if rng.gen_range(0..100) < config.hot_percent {
                pool[rng.gen_range(0..hot)]
            } else {
                pool[rng.gen_range(0..pool.len())]
            };

            let burst = rng.gen_range(1..=2 * mean_burst - 1);
            for _ in 0..burst {
                if requests.len() == config.requests {
                    break;
                }
                if rng.gen_range(0..100) < config.invalid_percent {
                    let param = INVALID_PARAMS[rng.gen_range(0..INVALID_PARAMS.len())];
                    requests.push(if param.is_empty() {
                        Request::absent()
                    } else {
                        Request::new(param)
                    });
                } else {
                    requests.push(Request::new(value.to_string()));
                }
            }
        }

        debug!(
            requests = requests.len(),
            pool = pool.len(),
            hot,
            "generated workload"
        );
        requests
    }
}
