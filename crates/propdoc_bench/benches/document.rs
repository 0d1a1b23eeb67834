//! Document parse, store and edit benchmarks.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use propdoc_bench::utils::generate_document;
use propdoc_core::Properties;
use std::sync::Arc;

/// Benchmark parsing documents of growing size.
fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");

    for count in [10, 100, 1000, 10000].iter() {
        let doc = generate_document(*count, 32);
        group.throughput(Throughput::Bytes(doc.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &doc, |b, doc| {
            b.iter(|| {
                let props: Properties = black_box(doc.as_str()).parse().unwrap();
                black_box(props);
            });
        });
    }

    group.finish();
}

/// Benchmark writing documents back out.
fn bench_store(c: &mut Criterion) {
    let mut group = c.benchmark_group("store");

    for count in [100, 1000, 10000].iter() {
        let doc = generate_document(*count, 32);
        let props: Properties = doc.parse().unwrap();
        group.throughput(Throughput::Bytes(doc.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &props, |b, props| {
            let mut out = Vec::with_capacity(doc.len());
            b.iter(|| {
                out.clear();
                props.store(&mut out).unwrap();
                black_box(&out);
            });
        });
    }

    group.finish();
}

/// Benchmark edits on a loaded document.
fn bench_edit(c: &mut Criterion) {
    let mut group = c.benchmark_group("edit");
    let props: Properties = generate_document(1000, 32).parse().unwrap();

    group.bench_function("put_existing", |b| {
        let mut props = props.clone();
        b.iter(|| black_box(props.put(black_box("section.key500"), "new value")));
    });

    group.bench_function("get", |b| {
        b.iter(|| black_box(props.get(black_box("section.key999"))));
    });

    group.bench_function("remove_front_and_reinsert", |b| {
        let mut props = props.clone();
        b.iter(|| {
            let value = props.remove("section.key1").unwrap();
            props.put("section.key1", &value);
        });
    });

    group.bench_function("get_property_depth3", |b| {
        let root = Arc::new(props.clone());
        let middle = Arc::new(Properties::with_defaults(root));
        let leaf = Properties::with_defaults(middle);
        b.iter(|| black_box(leaf.get_property(black_box("section.key999"))));
    });

    group.finish();
}

criterion_group!(benches, bench_parse, bench_store, bench_edit);

criterion_main!(benches);
