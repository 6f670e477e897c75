//! A single named column.

use strata_common::error::{StrataError, StrataResult};
use strata_common::types::{IndexKind, RowId};

use crate::index::ColumnIndex;
use crate::vector::IntVector;

/// A named `i32` column.
///
/// Columns are owned by their table, which keeps every column the same
/// length. A clustered column is always sorted ascending.
#[derive(Debug, Clone)]
pub struct Column {
    name: String,
    data: IntVector<i32>,
    clustered: bool,
    index: Option<ColumnIndex>,
}

impl Column {
    /// Creates an empty column.
    pub fn new(name: impl Into<String>, clustered: bool, capacity: usize) -> StrataResult<Self> {
        Ok(Self {
            name: name.into(),
            data: IntVector::with_capacity(capacity)?,
            clustered,
            index: None,
        })
    }

    /// Creates a column around existing values.
    pub(crate) fn from_values(name: impl Into<String>, clustered: bool, values: Vec<i32>) -> Self {
        Self {
            name: name.into(),
            data: IntVector::from_vec(values),
            clustered,
            index: None,
        }
    }

    /// Returns the column name.
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of rows.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if the column has no rows.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns true if this is its table's clustered column.
    #[inline]
    #[must_use]
    pub fn is_clustered(&self) -> bool {
        self.clustered
    }

    /// The column's values in row order.
    #[inline]
    #[must_use]
    pub fn values(&self) -> &[i32] {
        self.data.as_slice()
    }

    /// Value at `position`.
    pub fn get(&self, position: RowId) -> StrataResult<i32> {
        self.data
            .get(position as usize)
            .ok_or(StrataError::PositionOutOfRange {
                position,
                len: self.data.len(),
            })
    }

    /// The attached index, if any.
    #[inline]
    #[must_use]
    pub fn index(&self) -> Option<&ColumnIndex> {
        self.index.as_ref()
    }

    /// Kind of the attached index, if any.
    #[must_use]
    pub fn index_kind(&self) -> Option<IndexKind> {
        self.index.as_ref().map(ColumnIndex::kind)
    }

    /// First position whose value is `>= low`. Clustered columns only.
    #[must_use]
    pub fn index_of_left(&self, low: i32) -> usize {
        debug_assert!(self.clustered, "binary search on unclustered column");
        self.values().partition_point(|v| *v < low)
    }

    /// One past the last position whose value is `< high`. Clustered
    /// columns only.
    #[must_use]
    pub fn index_of_right(&self, high: i32) -> usize {
        debug_assert!(self.clustered, "binary search on unclustered column");
        self.values().partition_point(|v| *v < high)
    }

    pub(crate) fn data_mut(&mut self) -> &mut IntVector<i32> {
        &mut self.data
    }

    pub(crate) fn index_mut(&mut self) -> Option<&mut ColumnIndex> {
        self.index.as_mut()
    }

    pub(crate) fn set_index(&mut self, index: ColumnIndex) {
        self.index = Some(index);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clustered_binary_search() {
        let column = Column::from_values("a", true, vec![1, 2, 2, 4, 7]);
        assert_eq!(column.index_of_left(2), 1);
        assert_eq!(column.index_of_right(4), 3);
        assert_eq!(column.index_of_left(8), 5);
        assert_eq!(column.index_of_right(i32::MIN), 0);
    }

    #[test]
    fn test_get_out_of_range() {
        let column = Column::from_values("a", false, vec![3, 4]);
        assert_eq!(column.get(1).unwrap(), 4);
        let err = column.get(2).unwrap_err();
        assert!(matches!(err, StrataError::PositionOutOfRange { position: 2, len: 2 }));
    }

    #[test]
    fn test_new_column_is_empty() {
        let column = Column::new("b", false, 4).unwrap();
        assert!(column.is_empty());
        assert_eq!(column.index_kind(), None);
        assert!(!column.is_clustered());
    }
}
