use clap::{Parser, Subcommand};
use memo_factor::codec::parse_input;
use memo_factor::config::{FactorizerConfig, Strategy};
use memo_factor::counter::CounterKind;
use memo_factor::lazy::LazyKind;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};

mod generator;
mod input;
mod models;
mod runner;
mod stats;
mod trc;

/// Concurrent factorizer simulator CLI
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

/// Subcommands for the CLI
#[derive(Subcommand, Debug)]
enum Commands {
    /// Serve a workload from many threads with each strategy and verify every
    /// response
    Simulate {
        /// Strategies to simulate (stateless, unsafe-counting, counting,
        /// unsafe-caching, synchronized, cached; aliases coarse and fine)
        /// If not provided, all strategies will be used
        #[arg(short, long, value_name = "STRATEGIES", num_args = 1.., value_delimiter = ',')]
        strategies: Option<Vec<String>>,

        /// Number of request threads sharing one factorizer
        #[arg(short, long, default_value = "8")]
        threads: usize,

        /// Number of generated requests (ignored with --input)
        #[arg(short, long, default_value = "10000")]
        requests: usize,

        /// Workload file with one raw parameter per line
        #[arg(short, long, value_name = "FILE")]
        input: Option<PathBuf>,

        /// Size of the generated input pool
        #[arg(long, default_value = "100")]
        distinct: usize,

        /// Largest generated input value
        #[arg(long, default_value = "1000000000")]
        max_value: u64,

        /// Mean length of a run of identical generated requests
        #[arg(long, default_value = "4")]
        burst: usize,

        /// Seed for a reproducible generated workload
        #[arg(long)]
        seed: Option<u64>,

        /// Inputs wider than this many bits are answered as 1
        #[arg(long, default_value_t = u64::MAX)]
        max_input_bits: u64,

        /// Export results to CSV file
        #[arg(long, value_name = "PATH")]
        output_csv: Option<PathBuf>,
    },

    /// Increment a shared counter from many threads and report lost updates
    Counter {
        /// Counter implementation (racy, locked, atomic)
        #[arg(short, long, default_value = "racy")]
        kind: CounterKind,

        #[arg(short, long, default_value = "2")]
        threads: usize,

        /// Increments per thread
        #[arg(short, long, default_value = "10000")]
        increments: u64,

        #[arg(long, default_value = "10")]
        trials: usize,
    },

    /// Race many threads on the first access to a lazy slot
    Lazy {
        /// Lazy slot implementation (racy, locked, once)
        #[arg(short, long, default_value = "racy")]
        kind: LazyKind,

        #[arg(short, long, default_value = "8")]
        threads: usize,

        /// Time the initializer takes, in milliseconds
        #[arg(long, default_value = "10")]
        delay_ms: u64,
    },

    /// Print the response for each raw parameter
    Factor {
        /// Raw parameters, passed through unparsed
        #[arg(required = true, allow_hyphen_values = true)]
        values: Vec<String>,

        /// Strategy that serves the requests
        #[arg(short, long, default_value = "cached")]
        strategy: Strategy,

        /// Inputs wider than this many bits are answered as 1
        #[arg(long, default_value_t = u64::MAX)]
        max_input_bits: u64,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    trc::Trc::default().init()?;

    let args = Args::parse();

    match args.command {
        Commands::Simulate {
            strategies,
            threads,
            requests,
            input: workload_file,
            distinct,
            max_value,
            burst,
            seed,
            max_input_bits,
            output_csv,
        } => {
            let workload = match workload_file {
                Some(path) => input::WorkloadReader::new(path).read()?,
                None => generator::WorkloadGenerator::new(generator::WorkloadConfig {
                    requests,
                    distinct,
                    max_value,
                    mean_burst: burst,
                    seed,
                    ..Default::default()
                })
                .generate(),
            };

            let config = models::SimulationConfig {
                strategies: parse_strategies(strategies.as_deref()),
                thread_count: threads,
                max_input_bits,
            };
            run_simulation(config, workload, output_csv)
        }

        Commands::Counter {
            kind,
            threads,
            increments,
            trials,
        } => {
            let report = runner::run_counter(kind, threads, increments, trials);
            stats::print_counter_report(&report);
            Ok(())
        }

        Commands::Lazy {
            kind,
            threads,
            delay_ms,
        } => {
            let report = runner::run_lazy(kind, threads, Duration::from_millis(delay_ms));
            stats::print_lazy_report(&report);
            Ok(())
        }

        Commands::Factor {
            values,
            strategy,
            max_input_bits,
        } => {
            let factorizer = FactorizerConfig {
                strategy,
                max_input_bits,
            }
            .build();

            for raw in &values {
                if let Err(e) = parse_input(Some(raw), max_input_bits) {
                    warn!(raw = %raw, error = %e, "answering as 1");
                }
                print!("{}", factorizer.service(Some(raw)));
            }
            Ok(())
        }
    }
}

/// Parse strategy names, skipping unknown ones
fn parse_strategies(names: Option<&[String]>) -> Vec<Strategy> {
    let names = match names {
        Some(names) if !names.is_empty() => names,
        _ => return Strategy::ALL.to_vec(),
    };

    let mut selected = Vec::new();
    for name in names {
        match name.parse::<Strategy>() {
            Ok(strategy) if !selected.contains(&strategy) => selected.push(strategy),
            Ok(_) => {}
            Err(e) => warn!("{e}, skipping"),
        }
    }

    if selected.is_empty() {
        warn!("no valid strategies selected, using all strategies");
        Strategy::ALL.to_vec()
    } else {
        selected
    }
}

/// Run the simulation with the given configuration
fn run_simulation(
    config: models::SimulationConfig,
    workload: Vec<models::Request>,
    output_csv: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("Factorizer Simulation");
    println!("=====================");
    println!("Requests: {}", workload.len());
    println!("Threads: {}", config.thread_count);
    println!(
        "Strategies: {:?}",
        config
            .strategies
            .iter()
            .map(|s| s.as_str())
            .collect::<Vec<_>>()
    );

    let runner = runner::SimulationRunner::new(config, workload);
    let result = runner.run();
    info!(duration = ?result.duration, "simulation completed");

    let stats = stats::SimulationStats::from_result(&result);
    stats.print_summary();

    if let Some(csv_path) = output_csv {
        stats.export_csv(&csv_path)?;
        println!("\nResults exported to: {}", csv_path.display());
    }

    Ok(())
}
