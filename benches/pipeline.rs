use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use csv_processor::pipeline::{run_stages, ProcessOptions, StageArgs};
use csv_processor::types::{Header, Row, Table};

fn synthetic_table(rows: usize) -> Table {
    let brands = ["apple", "samsung", "xiaomi", "google"];
    let rows = (0..rows)
        .map(|i| {
            Row::new([
                format!("item {i}"),
                brands[i % brands.len()].to_string(),
                ((i * 7919) % 2000).to_string(),
                format!("{:.1}", 3.0 + (i % 20) as f64 / 10.0),
            ])
        })
        .collect();
    Table::new(Header::new(["name", "brand", "price", "rating"]), rows)
}

fn bench_stages(c: &mut Criterion) {
    let options = ProcessOptions::default();
    let mut group = c.benchmark_group("pipeline");

    for size in [1_000usize, 100_000] {
        let table = synthetic_table(size);

        let filter_only = StageArgs::new(Some("price>500"), None, None);
        group.bench_with_input(BenchmarkId::new("filter", size), &table, |b, t| {
            b.iter(|| run_stages(black_box(t.clone()), &filter_only, &options).unwrap())
        });

        let sort_only = StageArgs::new(None, Some("price=desc"), None);
        group.bench_with_input(BenchmarkId::new("sort", size), &table, |b, t| {
            b.iter(|| run_stages(black_box(t.clone()), &sort_only, &options).unwrap())
        });

        let all = StageArgs::new(Some("brand=apple"), Some("rating=asc"), Some("price=avg"));
        group.bench_with_input(BenchmarkId::new("filter_sort_avg", size), &table, |b, t| {
            b.iter(|| run_stages(black_box(t.clone()), &all, &options).unwrap())
        });
    }

    group.finish();
}

criterion_group!(benches, bench_stages);
criterion_main!(benches);
