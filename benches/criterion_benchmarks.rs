use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use memo_factor::config::{FactorizerConfig, Strategy};
use memo_factor::{factorize, Factorizer};
use num_bigint::BigUint;

// Inputs whose largest prime factor grows, so trial division cost grows too
const INPUTS: [(&str, u64); 4] = [
    ("smooth", 1_048_576),
    ("semiprime_small", 10_403),
    ("semiprime_medium", 100_160_063),
    ("prime", 2_147_483_647),
];

fn make_factorizer(strategy: Strategy) -> Box<dyn Factorizer> {
    let config = FactorizerConfig {
        strategy,
        max_input_bits: u64::MAX,
    };
    config.build()
}

fn evaluate_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("Evaluate");

    for (name, value) in INPUTS {
        let input = BigUint::from(value);
        group.bench_with_input(BenchmarkId::from_parameter(name), &input, |b, input| {
            b.iter(|| black_box(factorize(black_box(input))));
        });
    }

    group.finish();
}

fn hit_path_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("Hit Path");
    let input = BigUint::from(INPUTS[2].1);

    for strategy in Strategy::ALL {
        let factorizer = make_factorizer(strategy);
        factorizer.compute(&input);
        group.bench_function(strategy.as_str(), |b| {
            b.iter(|| black_box(factorizer.compute(black_box(&input))));
        });
    }

    group.finish();
}

fn service_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("Service");
    let factorizer = make_factorizer(Strategy::Cached);

    group.bench_function("valid", |b| {
        b.iter(|| black_box(factorizer.service(black_box(Some("10403")))));
    });

    group.bench_function("malformed", |b| {
        b.iter(|| black_box(factorizer.service(black_box(Some("10403x")))));
    });

    group.finish();
}

criterion_group!(
    benches,
    evaluate_benchmark,
    hit_path_benchmark,
    service_benchmark
);
criterion_main!(benches);
