//! Secondary indexes.
//!
//! A column carries at most one index, either a sorted array or a B+-tree.
//! `ColumnIndex` gives the table a single surface for building, maintaining
//! and querying either kind.

mod sorted;

pub use sorted::SortedIndex;

use strata_common::config::EngineConfig;
use strata_common::error::StrataResult;
use strata_common::types::{IndexKind, RowId};

use crate::btree::BPlusTree;
use crate::sort::CacheConsciousSorter;

/// The index attached to a column.
#[derive(Debug, Clone)]
pub enum ColumnIndex {
    /// Sorted `(value, position)` array.
    Sorted(SortedIndex),
    /// B+-tree keyed by value.
    BPlusTree(BPlusTree),
}

impl ColumnIndex {
    /// Builds an index of `kind` over a whole column.
    ///
    /// `leading` is true when the column is its table's clustered column.
    pub fn build(
        kind: IndexKind,
        values: &[i32],
        leading: bool,
        config: &EngineConfig,
    ) -> StrataResult<Self> {
        let sorter = CacheConsciousSorter::from_config(config);
        Ok(match kind {
            IndexKind::Sorted => Self::Sorted(SortedIndex::build(values, &sorter)?),
            IndexKind::BPlusTree => {
                Self::BPlusTree(BPlusTree::build(config, leading, values, &sorter)?)
            }
        })
    }

    /// Returns the kind of index.
    #[must_use]
    pub fn kind(&self) -> IndexKind {
        match self {
            Self::Sorted(_) => IndexKind::Sorted,
            Self::BPlusTree(_) => IndexKind::BPlusTree,
        }
    }

    /// Number of indexed rows.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Sorted(index) => index.len(),
            Self::BPlusTree(tree) => tree.len(),
        }
    }

    /// Returns true if no rows are indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Indexes a new row holding `value` at `position`.
    ///
    /// `shifted` is true when the insert moved every row at or after
    /// `position` up by one, which is the case for clustered tables.
    pub fn insert(&mut self, position: RowId, value: i32, shifted: bool) -> StrataResult<()> {
        match self {
            Self::Sorted(index) => index.insert(position, value),
            Self::BPlusTree(tree) if shifted => tree.insert_shifting(value, position),
            Self::BPlusTree(tree) => tree.insert(value, position),
        }
    }

    /// Reserves what a following [`insert`](Self::insert) of `value`
    /// allocates.
    pub fn reserve(&mut self, value: i32) -> StrataResult<()> {
        match self {
            Self::Sorted(index) => index.reserve_one(),
            Self::BPlusTree(tree) => tree.reserve(value),
        }
    }

    /// Positions of every value in `[low, high)`.
    #[must_use]
    pub fn range(&self, low: i32, high: i32) -> Vec<RowId> {
        match self {
            Self::Sorted(index) => index.range_scan(low, high),
            Self::BPlusTree(tree) => tree.range_search(low, high),
        }
    }

    /// Positions holding exactly `value`.
    #[must_use]
    pub fn find(&self, value: i32) -> Vec<RowId> {
        match self {
            Self::Sorted(index) => index.find(value),
            Self::BPlusTree(tree) => tree
                .point_search(value)
                .map(<[RowId]>::to_vec)
                .unwrap_or_default(),
        }
    }
}
