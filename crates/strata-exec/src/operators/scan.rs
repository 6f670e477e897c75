//! Range selection.

use std::fmt;

use strata_common::error::{StrataError, StrataResult};
use strata_common::types::{RowId, ValueRange};
use strata_storage::column::Column;
use tracing::debug;

/// How a column range scan finds its positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanStrategy {
    /// Range query on the column's index.
    Index,
    /// Binary search on the clustered column's sorted values.
    ClusteredBinarySearch,
    /// Compare every value.
    Linear,
}

impl fmt::Display for ScanStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index => write!(f, "index"),
            Self::ClusteredBinarySearch => write!(f, "clustered"),
            Self::Linear => write!(f, "linear"),
        }
    }
}

/// Picks the cheapest strategy the column supports.
#[must_use]
pub fn choose_strategy(column: &Column) -> ScanStrategy {
    if column.index().is_some() {
        ScanStrategy::Index
    } else if column.is_clustered() {
        ScanStrategy::ClusteredBinarySearch
    } else {
        ScanStrategy::Linear
    }
}

/// Returns the positions of `column` whose value lies in `range`.
///
/// Index scans return positions in value order. The other strategies
/// return them in position order.
pub fn select_column(column: &Column, range: ValueRange) -> Vec<RowId> {
    let strategy = choose_strategy(column);
    debug!(
        column = column.name(),
        %strategy,
        %range,
        rows = column.len(),
        "scan"
    );

    if range.is_empty() {
        return Vec::new();
    }

    match (strategy, column.index()) {
        (ScanStrategy::Index, Some(index)) => index.range(range.low, range.high),
        (ScanStrategy::ClusteredBinarySearch, _) => {
            let start = column.index_of_left(range.low);
            let end = column.index_of_right(range.high);
            (start..end).map(|p| p as RowId).collect()
        }
        _ => linear_scan(column.values(), range),
    }
}

fn linear_scan(values: &[i32], range: ValueRange) -> Vec<RowId> {
    values
        .iter()
        .enumerate()
        .filter(|(_, v)| range.contains(**v))
        .map(|(p, _)| p as RowId)
        .collect()
}

/// Returns the entries of `positions` whose paired entry of `values` lies
/// in `range`.
///
/// This is a select over the output of an earlier select and fetch.
pub fn select_positions(
    positions: &[RowId],
    values: &[i32],
    range: ValueRange,
) -> StrataResult<Vec<RowId>> {
    if positions.len() != values.len() {
        return Err(StrataError::LengthMismatch {
            left: positions.len(),
            right: values.len(),
        });
    }
    Ok(positions
        .iter()
        .zip(values)
        .filter(|(_, v)| range.contains(**v))
        .map(|(p, _)| *p)
        .collect())
}
