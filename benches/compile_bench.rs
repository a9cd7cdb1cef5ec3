//! Benchmarks for end-to-end compiles of growing configs.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use agent_confgen::config::parse_unified_config;
use agent_confgen::validate::validate;
use agent_confgen::{compile, CompileOptions, Platform};

/// A config with `count` file pipelines, each with its own parser.
fn logging_config(count: usize) -> String {
    let mut receivers = String::new();
    let mut processors = String::new();
    let mut pipelines = String::new();
    for i in 0..count {
        receivers.push_str(&format!(
            "    app_{i}:\n      type: files\n      include_paths: [/var/log/app_{i}/*.log]\n"
        ));
        processors.push_str(&format!(
            "    json_{i}:\n      type: parse_json\n      time_key: time\n"
        ));
        pipelines.push_str(&format!(
            "      pipeline_{i}:\n        receivers: [app_{i}]\n        processors: [json_{i}]\n"
        ));
    }
    format!(
        "logging:\n  receivers:\n{}  processors:\n{}  service:\n    pipelines:\n{}",
        receivers, processors, pipelines
    )
}

/// Benchmark full compiles for different pipeline counts
fn bench_compile_pipelines(c: &mut Criterion) {
    let mut group = c.benchmark_group("compile_pipelines");

    for count in [1, 10, 100] {
        let input = logging_config(count);
        group.throughput(Throughput::Bytes(input.len() as u64));
        for platform in [Platform::Linux, Platform::Windows] {
            let options = CompileOptions::for_platform(platform);
            group.bench_with_input(
                BenchmarkId::new(platform.to_string(), count),
                &input,
                |b, input| {
                    b.iter(|| compile(black_box(input.as_bytes()), black_box(&options)).unwrap());
                },
            );
        }
    }

    group.finish();
}

/// Benchmark validation alone, without generation
fn bench_validate(c: &mut Criterion) {
    let config = parse_unified_config(logging_config(100).as_bytes()).unwrap();

    c.bench_function("validate_100_pipelines", |b| {
        b.iter(|| validate(black_box(&config), Platform::Linux).unwrap());
    });
}

/// Benchmark the built-in default pipelines
fn bench_default_config(c: &mut Criterion) {
    let options = CompileOptions::for_platform(Platform::Linux);

    c.bench_function("compile_empty_config", |b| {
        b.iter(|| compile(black_box(b""), black_box(&options)).unwrap());
    });
}

criterion_group!(benches, bench_compile_pipelines, bench_validate, bench_default_config);
criterion_main!(benches);
