// Statistics reporting for factorizer simulation

use crate::models::{CounterReport, CsvResultRow, LazyReport, SimulationResult, StrategyStats};
use memo_factor::config::Strategy;
use std::collections::BTreeMap;
use std::path::Path;

/// Reports statistics from simulation runs
pub struct SimulationStats {
    /// Stats for each strategy, in strategy order
    stats: BTreeMap<Strategy, StrategyStats>,
    total_requests: usize,
    distinct_inputs: usize,
}

impl SimulationStats {
    /// Create SimulationStats from a SimulationResult
    pub fn from_result(result: &SimulationResult) -> Self {
        Self {
            stats: result.stats.clone(),
            total_requests: result.total_requests,
            distinct_inputs: result.distinct_inputs,
        }
    }

    /// Print a summary report of the simulation results
    pub fn print_summary(&self) {
        println!("\nFactorizer Simulation Summary");
        println!("=============================");
        println!("Total requests: {}", self.total_requests);
        println!("Distinct parameters: {}", self.distinct_inputs);

        println!("\nResults by Strategy:");
        println!(
            "{:<16} {:>10} {:>10} {:>10} {:>8} {:>10} {:>8} {:>12} {:>12}",
            "Strategy",
            "Requests",
            "Hits",
            "Misses",
            "HitRate",
            "Mismatch",
            "Lost",
            "Elapsed",
            "Req/sec"
        );
        println!("{}", "-".repeat(106));

        for (strategy, stats) in &self.stats {
            println!(
                "{:<16} {:>10} {:>10} {:>10} {:>7.2}% {:>10} {:>8} {:>10.1}ms {:>12.0}",
                strategy.as_str(),
                stats.requests,
                stats.hits,
                stats.misses(),
                stats.hit_rate(),
                stats.mismatches,
                stats.lost_counts(),
                stats.elapsed_ms(),
                stats.requests_per_sec()
            );
        }

        let broken: Vec<&str> = self
            .stats
            .iter()
            .filter(|(_, stats)| stats.mismatches > 0 || stats.lost_counts() > 0)
            .map(|(strategy, _)| strategy.as_str())
            .collect();
        if !broken.is_empty() {
            println!("\nInvariant violations observed in: {}", broken.join(", "));
        }
    }

    /// Build one CSV row per strategy
    pub fn rows(&self) -> Vec<CsvResultRow> {
        self.stats
            .iter()
            .map(|(strategy, stats)| CsvResultRow {
                strategy: strategy.as_str().to_string(),
                thread_safe: strategy.is_thread_safe(),
                requests: stats.requests,
                reported_requests: stats.reported_requests,
                hits: stats.hits,
                misses: stats.misses(),
                hit_rate: stats.hit_rate(),
                mismatches: stats.mismatches,
                lost_counts: stats.lost_counts(),
                elapsed_ms: stats.elapsed_ms(),
                requests_per_sec: stats.requests_per_sec(),
            })
            .collect()
    }

    /// Export results to a CSV file
    pub fn export_csv(&self, path: &Path) -> Result<(), csv::Error> {
        let mut writer = csv::Writer::from_path(path)?;
        for row in self.rows() {
            writer.serialize(row)?;
        }
        writer.flush()?;
        Ok(())
    }
}

/// Print the outcome of the lost-update demonstration
pub fn print_counter_report(report: &CounterReport) {
    println!("\nCounter: {}", report.kind);
    println!("==========");
    println!("Expected per trial: {}", report.expected);
    for (trial, value) in report.finals.iter().enumerate() {
        let lost = report.expected.saturating_sub(*value);
        println!("  trial {trial:>3}: {value:>12} (lost {lost})");
    }
    println!(
        "Trials short of expected: {}/{} (worst: {})",
        report.short_trials(),
        report.finals.len(),
        report.worst()
    );
}

/// Print the outcome of the lazy initialization demonstration
pub fn print_lazy_report(report: &LazyReport) {
    println!("\nLazy slot: {}", report.kind);
    println!("============");
    println!("Concurrent first accesses: {}", report.threads);
    println!("Initializer runs:          {}", report.constructions);
    println!("Distinct instances seen:   {}", report.distinct_instances);
    if report.constructions > 1 {
        println!("More than one instance was constructed.");
    }
}
