//! Shared helpers for integration tests.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use strata_common::config::EngineConfig;
use strata_common::types::RowId;
use strata_exec::{ColumnRef, ExecutionContext, OperatorDescriptor};
use tempfile::TempDir;

/// Deterministic generator for a test.
pub fn rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// `count` values drawn from `0..max`.
pub fn random_values(rng: &mut StdRng, count: usize, max: i32) -> Vec<i32> {
    (0..count).map(|_| rng.gen_range(0..max)).collect()
}

/// `count` rows of `width` values drawn from `0..max`.
pub fn random_rows(rng: &mut StdRng, count: usize, width: usize, max: i32) -> Vec<Vec<i32>> {
    (0..count).map(|_| random_values(rng, width, max)).collect()
}

/// Reference equi-join: every matching pair from a double loop, sorted.
pub fn naive_join(
    left_values: &[i32],
    left_positions: &[RowId],
    right_values: &[i32],
    right_positions: &[RowId],
) -> Vec<(RowId, RowId)> {
    let mut out = Vec::new();
    for (l, lp) in left_values.iter().zip(left_positions) {
        for (r, rp) in right_values.iter().zip(right_positions) {
            if l == r {
                out.push((*lp, *rp));
            }
        }
    }
    out.sort_unstable();
    out
}

/// Reference range scan: every position whose value is in `[low, high)`.
pub fn naive_scan(values: &[i32], low: i32, high: i32) -> Vec<RowId> {
    values
        .iter()
        .enumerate()
        .filter(|(_, v)| low <= **v && **v < high)
        .map(|(p, _)| p as RowId)
        .collect()
}

/// Sorts a position vector.
pub fn sorted(mut positions: Vec<RowId>) -> Vec<RowId> {
    positions.sort_unstable();
    positions
}

/// A config whose data directory lives in `dir`.
pub fn config_in(dir: &TempDir) -> EngineConfig {
    let mut config = EngineConfig::for_testing();
    config.data_dir = dir.path().to_path_buf();
    config
}

/// Creates database `db` with table `table` whose columns are `columns`,
/// the first one clustered if `clustered` is set.
pub fn create_table(
    ctx: &mut ExecutionContext,
    table: &str,
    columns: &[&str],
    clustered: bool,
) {
    if !ctx.has_database() {
        ctx.execute(OperatorDescriptor::CreateDatabase { name: "db".into() })
            .unwrap();
    }
    ctx.execute(OperatorDescriptor::CreateTable {
        name: table.into(),
        column_count: columns.len(),
    })
    .unwrap();
    for (i, column) in columns.iter().enumerate() {
        ctx.execute(OperatorDescriptor::CreateColumn {
            column: ColumnRef::new(table, *column),
            sorted: clustered && i == 0,
        })
        .unwrap();
    }
}
