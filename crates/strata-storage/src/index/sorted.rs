//! Sorted secondary index.
//!
//! A flat array of `(value, position)` pairs in ascending value order. Range
//! and point queries are two binary searches. Inserting a row into a
//! clustered table renumbers every later position, the same bookkeeping a
//! leading B+-tree does, applied to a flat array.

use strata_common::error::{StrataError, StrataResult};
use strata_common::types::RowId;

use crate::sort::{zip_with_index, CacheConsciousSorter, SortEntry};

const STRUCTURE: &str = "sorted index";

/// Sorted array of `(value, position)` pairs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortedIndex {
    entries: Vec<SortEntry>,
    /// Next power of two at or above the entry count.
    capacity: usize,
}

impl SortedIndex {
    /// Creates an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            capacity: 0,
        }
    }

    /// Builds the index over a whole column.
    ///
    /// Equal values keep ascending position order.
    pub fn build(values: &[i32], sorter: &CacheConsciousSorter) -> StrataResult<Self> {
        let mut entries = sorter.sort(zip_with_index(values)?)?;
        let capacity = values.len().next_power_of_two();
        entries
            .try_reserve_exact(capacity - entries.len())
            .map_err(|_| StrataError::out_of_memory(STRUCTURE, capacity))?;
        Ok(Self { entries, capacity })
    }

    /// Restores an index from persisted pairs.
    pub fn from_entries(mut entries: Vec<SortEntry>) -> StrataResult<Self> {
        if entries.windows(2).any(|w| w[0].value > w[1].value) {
            return Err(StrataError::corruption("sorted index entries out of order"));
        }
        let capacity = entries.len().next_power_of_two();
        entries
            .try_reserve_exact(capacity - entries.len())
            .map_err(|_| StrataError::out_of_memory(STRUCTURE, capacity))?;
        Ok(Self { entries, capacity })
    }

    /// Number of entries.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the index is empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Current storage capacity.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// The raw pairs, ascending by value.
    #[inline]
    #[must_use]
    pub fn entries(&self) -> &[SortEntry] {
        &self.entries
    }

    /// Makes room for one more entry without touching the stored ones.
    pub fn reserve_one(&mut self) -> StrataResult<()> {
        self.grow_for(self.entries.len() + 1)
    }

    /// Indexes a row inserted at `position`.
    ///
    /// Every existing entry at or past `position` moves up by one, then the
    /// new pair goes after all entries with an equal value.
    pub fn insert(&mut self, position: RowId, value: i32) -> StrataResult<()> {
        self.reserve_one()?;

        for entry in &mut self.entries {
            if entry.row >= position {
                entry.row += 1;
            }
        }

        let slot = self.entries.partition_point(|e| e.value <= value);
        self.entries.insert(slot, SortEntry::new(value, position));
        Ok(())
    }

    /// Positions of every value in `[low, high)`, in value order.
    #[must_use]
    pub fn range_scan(&self, low: i32, high: i32) -> Vec<RowId> {
        let (start, end) = self.bounds(low, high);
        self.entries[start..end].iter().map(|e| e.row).collect()
    }

    /// Positions holding exactly `value`.
    #[must_use]
    pub fn find(&self, value: i32) -> Vec<RowId> {
        let start = self.entries.partition_point(|e| e.value < value);
        let end = self.entries.partition_point(|e| e.value <= value);
        self.entries[start..end].iter().map(|e| e.row).collect()
    }

    /// Smallest indexed value.
    #[must_use]
    pub fn min_value(&self) -> Option<i32> {
        self.entries.first().map(|e| e.value)
    }

    /// Largest indexed value.
    #[must_use]
    pub fn max_value(&self) -> Option<i32> {
        self.entries.last().map(|e| e.value)
    }

    /// Slot range `[start, end)` of entries with `low <= value <= high - 1`.
    fn bounds(&self, low: i32, high: i32) -> (usize, usize) {
        if low >= high {
            return (0, 0);
        }
        let start = self.entries.partition_point(|e| e.value < low);
        let end = self.entries.partition_point(|e| e.value <= high - 1);
        if start >= end {
            (0, 0)
        } else {
            (start, end)
        }
    }

    fn grow_for(&mut self, required: usize) -> StrataResult<()> {
        if required <= self.capacity {
            return Ok(());
        }
        let new_capacity = required
            .checked_next_power_of_two()
            .ok_or_else(|| StrataError::out_of_memory(STRUCTURE, required))?;
        self.entries
            .try_reserve_exact(new_capacity - self.entries.len())
            .map_err(|_| StrataError::out_of_memory(STRUCTURE, new_capacity))?;
        self.capacity = new_capacity;
        Ok(())
    }
}

impl Default for SortedIndex {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn build(values: &[i32]) -> SortedIndex {
        SortedIndex::build(values, &CacheConsciousSorter::new(2)).unwrap()
    }

    #[test]
    fn test_build_is_stable() {
        let index = build(&[3, 1, 3, 2, 1]);
        let pairs: Vec<(i32, RowId)> = index.entries().iter().map(|e| (e.value, e.row)).collect();
        assert_eq!(pairs, vec![(1, 1), (1, 4), (2, 3), (3, 0), (3, 2)]);
        assert_eq!(index.capacity(), 8);
    }

    #[test]
    fn test_range_scan() {
        let index = build(&[50, 10, 40, 20, 30]);
        assert_eq!(index.range_scan(20, 40), vec![3, 4]);
        assert_eq!(index.range_scan(0, 11), vec![1]);
        assert_eq!(index.range_scan(41, 50), Vec::<RowId>::new());
        assert_eq!(index.range_scan(40, 20), Vec::<RowId>::new());
        assert_eq!(index.range_scan(i32::MIN, i32::MAX), vec![1, 3, 4, 2, 0]);
    }

    #[test]
    fn test_find() {
        let index = build(&[7, 3, 7, 7]);
        assert_eq!(index.find(7), vec![0, 2, 3]);
        assert!(index.find(4).is_empty());
        assert_eq!(index.min_value(), Some(3));
        assert_eq!(index.max_value(), Some(7));
    }

    #[test]
    fn test_insert_renumbers_later_positions() {
        // Clustered column [1, 2, 4] with the index on a sibling column [9, 5, 5].
        let mut index = build(&[9, 5, 5]);
        // Row with clustered value 3 lands at position 2, sibling value 5.
        index.insert(2, 5).unwrap();

        let mut fives = index.find(5);
        fives.sort_unstable();
        assert_eq!(fives, vec![1, 2, 3]);
        assert_eq!(index.find(9), vec![0]);
    }

    #[test]
    fn test_insert_append_position() {
        let mut index = build(&[4, 2]);
        index.insert(2, 3).unwrap();
        assert_eq!(index.range_scan(i32::MIN, i32::MAX), vec![1, 2, 0]);
    }

    #[test]
    fn test_capacity_power_of_two() {
        let mut index = SortedIndex::new();
        for (i, v) in [5, 4, 3, 2, 1].iter().enumerate() {
            index.insert(i as RowId, *v).unwrap();
        }
        assert_eq!(index.len(), 5);
        assert_eq!(index.capacity(), 8);
    }

    #[test]
    fn test_random_inserts_match_model() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut column: Vec<i32> = Vec::new();
        let mut index = SortedIndex::new();

        for _ in 0..300 {
            let value = rng.gen_range(0..20);
            let pos = rng.gen_range(0..=column.len());
            column.insert(pos, value);
            index.insert(pos as RowId, value).unwrap();
        }

        for low in 0..20 {
            let mut got = index.range_scan(low, low + 3);
            got.sort_unstable();
            let expected: Vec<RowId> = (0..column.len())
                .filter(|&i| (low..low + 3).contains(&column[i]))
                .map(|i| i as RowId)
                .collect();
            assert_eq!(got, expected);
        }
    }

    #[test]
    fn test_from_entries_rejects_unsorted() {
        let err = SortedIndex::from_entries(vec![SortEntry::new(2, 0), SortEntry::new(1, 1)])
            .unwrap_err();
        assert!(err.to_string().contains("out of order"));
    }
}
