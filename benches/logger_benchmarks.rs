//! Criterion benchmarks for rust_category_logging

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use rust_category_logging::core::format_message;
use rust_category_logging::prelude::*;
use std::sync::Arc;

/// Formatted channel that discards everything
struct NullChannel;

impl FormattedChannel for NullChannel {
    fn write(&self, message: &LogMessage) -> Result<()> {
        black_box(message);
        Ok(())
    }

    fn name(&self) -> &str {
        "null"
    }
}

fn provider(level: LogLevel) -> LoggerProvider {
    LoggerProvider::new(
        "bench",
        ProviderConfig::builder()
            .level(level)
            .channel(LogChannel::formatted(NullChannel))
            .build(),
    )
}

// ============================================================================
// Logger Lookup Benchmarks
// ============================================================================

fn bench_logger_lookup(c: &mut Criterion) {
    let mut group = c.benchmark_group("logger_lookup");
    group.throughput(Throughput::Elements(1));

    let provider = provider(LogLevel::Info);
    provider.get_logger("existing").unwrap();

    group.bench_function("existing", |b| {
        b.iter(|| black_box(provider.get_logger(black_box("existing")).unwrap()));
    });

    let categories = CategoryProvider::new("bench", ProviderConfig::default());
    let root = categories.get_category("root", None).unwrap();
    group.bench_function("existing_category", |b| {
        b.iter(|| black_box(categories.get_category(black_box("child"), Some(&root)).unwrap()));
    });

    group.finish();
}

// ============================================================================
// Logging Performance Benchmarks
// ============================================================================

fn bench_logging(c: &mut Criterion) {
    let mut group = c.benchmark_group("logging");
    group.throughput(Throughput::Elements(1));

    let provider = provider(LogLevel::Info);
    let logger = provider.get_logger("svc").unwrap();

    group.bench_function("gated", |b| {
        b.iter(|| logger.debug(black_box("Debug message")));
    });

    group.bench_function("gated_lazy", |b| {
        b.iter(|| logger.debug(Message::lazy(|| format!("value {}", black_box(42)))));
    });

    group.bench_function("emitted", |b| {
        b.iter(|| logger.info(black_box("Info message")));
    });

    group.bench_function("emitted_with_args", |b| {
        b.iter(|| logger.info_with("request", Detail::args([black_box(200), black_box(15)])));
    });

    group.bench_function("emitted_with_error", |b| {
        let error = LogError::new("IoError", "connection refused");
        b.iter(|| logger.error_with("failed", Detail::error(error.clone())));
    });

    group.finish();
}

fn bench_concurrent_logging(c: &mut Criterion) {
    let mut group = c.benchmark_group("concurrent_logging");

    for threads in [2, 4] {
        group.throughput(Throughput::Elements(threads * 100));
        group.bench_function(format!("{}_threads", threads), |b| {
            let provider = Arc::new(provider(LogLevel::Info));
            b.iter(|| {
                let handles: Vec<_> = (0..threads)
                    .map(|t| {
                        let provider = Arc::clone(&provider);
                        std::thread::spawn(move || {
                            let logger = provider.get_logger(format!("worker-{}", t)).unwrap();
                            for i in 0..100 {
                                logger.info(format!("message {}", i));
                            }
                        })
                    })
                    .collect();
                for handle in handles {
                    handle.join().unwrap();
                }
            });
        });
    }

    group.finish();
}

// ============================================================================
// Formatting Benchmarks
// ============================================================================

fn bench_formatting(c: &mut Criterion) {
    let mut group = c.benchmark_group("formatting");

    let args = vec![LogArg::from("ada"), LogArg::from(42), LogArg::from(true)];
    let formatter = ArgumentFormatter::default();
    group.bench_function("placeholders", |b| {
        b.iter(|| {
            black_box(format_message(
                black_box("user {} has {} items, active {}"),
                &args,
                &formatter,
            ))
        });
    });

    let date = DateFormatter::default();
    group.bench_function("date", |b| {
        b.iter(|| black_box(date.format(black_box(1_736_332_245_007))));
    });

    group.finish();
}

// ============================================================================
// Runtime Update Benchmarks
// ============================================================================

fn bench_runtime_update(c: &mut Criterion) {
    let mut group = c.benchmark_group("runtime_update");

    let provider = provider(LogLevel::Info);
    for i in 0..100 {
        provider.get_logger(format!("logger-{}", i)).unwrap();
    }

    group.bench_function("update_100_loggers", |b| {
        let mut flip = false;
        b.iter(|| {
            flip = !flip;
            let level = if flip { LogLevel::Debug } else { LogLevel::Info };
            provider.update_runtime_settings(&SettingsUpdate::new().level(level));
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_logger_lookup,
    bench_logging,
    bench_concurrent_logging,
    bench_formatting,
    bench_runtime_update
);

criterion_main!(benches);
