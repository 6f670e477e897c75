//! Operator benchmarks for StrataDB.
//!
//! Benchmarks for:
//! - Range scans under each strategy
//! - Bulk load with clustering
//! - Block nested-loop join at several block lengths

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use strata_bench::utils::{random_rows, random_values};
use strata_common::config::EngineConfig;
use strata_common::types::{IndexKind, RowId, ValueRange};
use strata_exec::operators::{block_nested_loop_join, select_column};
use strata_storage::table::Table;

const ROWS: usize = 100_000;

fn loaded_table(sorted: bool, index: Option<IndexKind>) -> Table {
    let mut table = Table::new("t", 2, EngineConfig::default()).unwrap();
    table.add_column("a", sorted).unwrap();
    table.add_column("b", false).unwrap();
    if let Some(kind) = index {
        table.create_index("a", kind).unwrap();
    }
    table.bulk_load(&random_rows(ROWS, 2, 1_000_000)).unwrap();
    table
}

fn bench_scan(c: &mut Criterion) {
    let mut group = c.benchmark_group("exec/scan");
    let range = ValueRange::new(100_000, 110_000);

    for (name, table) in [
        ("linear", loaded_table(false, None)),
        ("clustered", loaded_table(true, None)),
        ("sorted_index", loaded_table(false, Some(IndexKind::Sorted))),
        ("btree_index", loaded_table(false, Some(IndexKind::BPlusTree))),
    ] {
        let column = table.column("a").unwrap();
        group.bench_function(name, |b| {
            b.iter(|| black_box(select_column(column, range).len()));
        });
    }

    group.finish();
}

fn bench_bulk_load(c: &mut Criterion) {
    let mut group = c.benchmark_group("exec/bulk_load");
    let rows = random_rows(ROWS, 4, 1_000_000);
    group.throughput(Throughput::Elements(ROWS as u64));

    for sorted in [false, true] {
        group.bench_with_input(BenchmarkId::new("clustered", sorted), &sorted, |b, sorted| {
            b.iter(|| {
                let mut table = Table::new("t", 4, EngineConfig::default()).unwrap();
                table.add_column("k", *sorted).unwrap();
                for name in ["b", "c", "d"] {
                    table.add_column(name, false).unwrap();
                }
                black_box(table.bulk_load(&rows).unwrap())
            });
        });
    }

    group.finish();
}

fn bench_join(c: &mut Criterion) {
    let mut group = c.benchmark_group("exec/join");
    let left = random_values(5_000, 10_000);
    let right = random_values(5_000, 10_000);
    let left_pos: Vec<RowId> = (0..left.len() as RowId).collect();
    let right_pos: Vec<RowId> = (0..right.len() as RowId).collect();

    for block_len in [64, 2048, 8192].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(block_len), block_len, |b, len| {
            b.iter(|| {
                let out = block_nested_loop_join(&left, &left_pos, &right, &right_pos, *len)
                    .unwrap();
                black_box(out.len())
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_scan, bench_bulk_load, bench_join);
criterion_main!(benches);
