//! Cache-conscious merge sort.
//!
//! The input is cut into runs small enough to stay resident in cache. Each
//! run is sorted in place, then adjacent runs are merged two at a time into a
//! scratch buffer with the run width doubling every pass. Source and scratch
//! swap roles between passes.
//!
//! The sort is stable: entries with equal values keep their input order. The
//! sorted index and the clustering path both rely on this.

use std::cmp::Ordering;

use strata_common::config::EngineConfig;
use strata_common::error::{StrataError, StrataResult};
use strata_common::types::RowId;
use tracing::trace;

/// A value paired with the position it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortEntry {
    /// Sort key.
    pub value: i32,
    /// Original position of the value.
    pub row: RowId,
}

impl SortEntry {
    /// Creates an entry.
    #[inline]
    #[must_use]
    pub const fn new(value: i32, row: RowId) -> Self {
        Self { value, row }
    }
}

/// Pairs every value with its index.
pub fn zip_with_index(values: &[i32]) -> StrataResult<Vec<SortEntry>> {
    let mut entries = Vec::new();
    entries
        .try_reserve_exact(values.len())
        .map_err(|_| StrataError::out_of_memory("sort entries", values.len()))?;
    entries.extend(
        values
            .iter()
            .enumerate()
            .map(|(i, &value)| SortEntry::new(value, i as RowId)),
    );
    Ok(entries)
}

/// Two-way merge sort with cache-sized runs.
#[derive(Debug, Clone, Copy)]
pub struct CacheConsciousSorter {
    run_len: usize,
}

impl CacheConsciousSorter {
    /// Creates a sorter whose runs hold `run_len` entries.
    #[must_use]
    pub fn new(run_len: usize) -> Self {
        Self {
            run_len: run_len.max(1),
        }
    }

    /// Creates a sorter sized from the configured sort cache budget.
    #[must_use]
    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.sort_run_len())
    }

    /// Entries per run.
    #[inline]
    #[must_use]
    pub fn run_len(&self) -> usize {
        self.run_len
    }

    /// Sorts entries by value, stably.
    pub fn sort(&self, mut entries: Vec<SortEntry>) -> StrataResult<Vec<SortEntry>> {
        let n = entries.len();
        if n <= 1 {
            return Ok(entries);
        }

        let mut runs = 0usize;
        for run in entries.chunks_mut(self.run_len) {
            run.sort_by_key(|e| e.value);
            runs += 1;
        }
        trace!(entries = n, runs, run_len = self.run_len, "sorted runs");

        if runs == 1 {
            return Ok(entries);
        }

        let mut scratch = Vec::new();
        scratch
            .try_reserve_exact(n)
            .map_err(|_| StrataError::out_of_memory("sort scratch", n))?;
        scratch.resize(n, SortEntry::new(0, 0));

        let mut src = entries;
        let mut dst = scratch;
        let mut width = self.run_len;
        let mut passes = 0usize;

        while width < n {
            let mut start = 0;
            while start < n {
                let mid = (start + width).min(n);
                let end = (start + 2 * width).min(n);
                merge(&src[start..mid], &src[mid..end], &mut dst[start..end]);
                start = end;
            }
            std::mem::swap(&mut src, &mut dst);
            width = width.saturating_mul(2);
            passes += 1;
        }
        trace!(passes, "merge complete");

        Ok(src)
    }

    /// Sorts `values` and returns the sorted values with the permutation
    /// `perm[new_position] = original_position`.
    pub fn sort_with_permutation(&self, values: &[i32]) -> StrataResult<(Vec<i32>, Vec<RowId>)> {
        let sorted = self.sort(zip_with_index(values)?)?;
        Ok(sorted.into_iter().map(|e| (e.value, e.row)).unzip())
    }
}

impl Default for CacheConsciousSorter {
    fn default() -> Self {
        Self::from_config(&EngineConfig::default())
    }
}

/// Merges two sorted runs into `out`. Ties take the left run first.
fn merge(left: &[SortEntry], right: &[SortEntry], out: &mut [SortEntry]) {
    debug_assert_eq!(left.len() + right.len(), out.len());

    let (mut i, mut j, mut k) = (0, 0, 0);
    while i < left.len() && j < right.len() {
        if right[j].value.cmp(&left[i].value) == Ordering::Less {
            out[k] = right[j];
            j += 1;
        } else {
            out[k] = left[i];
            i += 1;
        }
        k += 1;
    }
    let rest_left = left.len() - i;
    out[k..k + rest_left].copy_from_slice(&left[i..]);
    k += rest_left;
    out[k..].copy_from_slice(&right[j..]);
}
