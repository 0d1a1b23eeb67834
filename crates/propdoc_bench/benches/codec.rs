//! Escape codec benchmarks.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use propdoc_bench::utils::{escape_heavy, random_ascii};
use propdoc_codec::{escape_key, escape_value, unescape_key, unescape_value};

/// Benchmark escaping.
fn bench_escape(c: &mut Criterion) {
    let mut group = c.benchmark_group("escape");

    group.bench_function("key_short", |b| {
        let key = "section.sub key=1";
        b.iter(|| black_box(escape_key(black_box(key))));
    });

    for size in [64, 1024, 16384].iter() {
        group.throughput(Throughput::Bytes(*size as u64));
        group.bench_with_input(BenchmarkId::new("value_plain", size), size, |b, &size| {
            let value = random_ascii(size);
            b.iter(|| black_box(escape_value(black_box(&value))));
        });
        group.bench_with_input(BenchmarkId::new("value_escaped", size), size, |b, &size| {
            let value = escape_heavy(size);
            b.iter(|| black_box(escape_value(black_box(&value))));
        });
    }

    group.finish();
}

/// Benchmark unescaping.
fn bench_unescape(c: &mut Criterion) {
    let mut group = c.benchmark_group("unescape");

    group.bench_function("key_short", |b| {
        let raw = "section.sub\\ key\\=1";
        b.iter(|| black_box(unescape_key(black_box(raw)).unwrap()));
    });

    group.bench_function("continued_value", |b| {
        let raw = "one \\\n    two  \\\n\tthree";
        b.iter(|| black_box(unescape_value(black_box(raw)).unwrap()));
    });

    for size in [64, 1024, 16384].iter() {
        group.throughput(Throughput::Bytes(*size as u64));
        group.bench_with_input(BenchmarkId::new("value_escaped", size), size, |b, &size| {
            let raw = escape_value(&escape_heavy(size));
            b.iter(|| black_box(unescape_value(black_box(&raw)).unwrap()));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_escape, bench_unescape);

criterion_main!(benches);
