//! Benchmarks for resc-rebalance
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn benchmark_partition(c: &mut Criterion) {
    use resc_rebalance::cohort::{ladder, partition};
    use resc_rebalance::inventory::WorkItem;

    // Sizes spread across all eight tiers
    let items: Vec<WorkItem> = (0..100_000u64)
        .map(|i| WorkItem::new((i * 7919) % (600 * 1024 * 1024), format!("/zone/obj{}", i)))
        .collect();
    let specs = ladder();

    c.bench_function("partition_100k_items", |b| {
        b.iter(|| {
            for spec in &specs {
                let cohort = partition(&items, &spec.range);
                black_box(cohort);
            }
        })
    });
}

fn benchmark_record_parse(c: &mut Criterion) {
    use resc_rebalance::executor::CompletionRecord;

    c.bench_function("completion_record_parse", |b| {
        b.iter(|| {
            let ok = CompletionRecord::parse("/tempZone/home/alice/data.dat");
            let err = CompletionRecord::parse("ERROR: /tempZone/home/alice/data.dat: timeout");
            black_box((ok, err));
        })
    });
}

criterion_group!(benches, benchmark_partition, benchmark_record_parse);
criterion_main!(benches);
