//! Tables and their mutation paths.
//!
//! A table owns a fixed number of declared columns that always share one
//! row count. If one column is clustered, the table's physical row order is
//! that column's ascending order:
//! - a single-row insert finds its position by sorted insert into the
//!   clustered column and shifts every other column to match;
//! - a bulk load appends everything, sorts the clustered column and
//!   permutes every sibling column into the same order.
//!
//! Indexes are maintained on every single-row insert and rebuilt from
//! scratch after a bulk load.

use strata_common::config::EngineConfig;
use strata_common::error::{StrataError, StrataResult};
use strata_common::types::{IndexKind, RowId};
use tracing::debug;

use crate::cluster::apply_permutation;
use crate::column::Column;
use crate::index::ColumnIndex;
use crate::sort::CacheConsciousSorter;

/// Checks a table or column name.
///
/// Names become `<table>.<column>` in queries and in data file names, so
/// they may not be empty or hold `.`, `/` or `\`.
pub(crate) fn check_name(what: &str, name: &str) -> StrataResult<()> {
    if name.is_empty() || name.contains(['.', '/', '\\']) {
        return Err(StrataError::invalid_argument(format!(
            "invalid {what} name '{name}'"
        )));
    }
    Ok(())
}

/// A table of equal-length `i32` columns.
#[derive(Debug, Clone)]
pub struct Table {
    name: String,
    columns: Vec<Column>,
    /// Number of columns declared at creation.
    declared: usize,
    row_count: usize,
    /// Position of the clustered column in `columns`.
    clustered: Option<usize>,
    config: EngineConfig,
}

impl Table {
    /// Creates an empty table with room for `declared` columns.
    pub fn new(name: impl Into<String>, declared: usize, config: EngineConfig) -> StrataResult<Self> {
        let name = name.into();
        check_name("table", &name)?;
        if declared == 0 {
            return Err(StrataError::invalid_argument(format!(
                "table '{name}' must declare at least one column"
            )));
        }
        Ok(Self {
            name,
            columns: Vec::with_capacity(declared),
            declared,
            row_count: 0,
            clustered: None,
            config,
        })
    }

    /// Reassembles a table from persisted parts.
    pub(crate) fn from_parts(
        name: String,
        declared: usize,
        columns: Vec<Column>,
        config: EngineConfig,
    ) -> StrataResult<Self> {
        let row_count = columns.first().map_or(0, Column::len);
        if columns.iter().any(|c| c.len() != row_count) {
            return Err(StrataError::corruption(format!(
                "columns of table '{name}' have different lengths"
            )));
        }
        if columns.len() > declared {
            return Err(StrataError::corruption(format!(
                "table '{name}' has {} columns but declares {declared}",
                columns.len()
            )));
        }
        let mut clustered = columns.iter().enumerate().filter(|(_, c)| c.is_clustered());
        let first = clustered.next().map(|(i, _)| i);
        if clustered.next().is_some() {
            return Err(StrataError::corruption(format!(
                "table '{name}' has more than one clustered column"
            )));
        }
        Ok(Self {
            name,
            columns,
            declared,
            row_count,
            clustered: first,
            config,
        })
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Returns the table name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of rows.
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.row_count
    }

    /// Number of columns declared at creation.
    #[must_use]
    pub fn declared_columns(&self) -> usize {
        self.declared
    }

    /// Columns defined so far, in creation order.
    #[must_use]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Position of the named column.
    pub fn column_position(&self, name: &str) -> StrataResult<usize> {
        self.columns
            .iter()
            .position(|c| c.name() == name)
            .ok_or_else(|| StrataError::column_not_found(&self.name, name))
    }

    /// Looks up a column by name.
    pub fn column(&self, name: &str) -> StrataResult<&Column> {
        let pos = self.column_position(name)?;
        Ok(&self.columns[pos])
    }

    /// The clustered column, if any.
    #[must_use]
    pub fn clustered_column(&self) -> Option<&Column> {
        self.clustered.map(|i| &self.columns[i])
    }

    /// The configuration the table builds indexes with.
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    // =========================================================================
    // Schema
    // =========================================================================

    /// Defines the next column. `sorted` makes it the clustered column.
    pub fn add_column(&mut self, name: impl Into<String>, sorted: bool) -> StrataResult<usize> {
        let name = name.into();
        check_name("column", &name)?;

        if self.columns.iter().any(|c| c.name() == name) {
            return Err(StrataError::ColumnExists {
                column: name,
                table: self.name.clone(),
            });
        }
        if self.columns.len() >= self.declared {
            return Err(StrataError::TableFull {
                table: self.name.clone(),
                capacity: self.declared,
            });
        }
        if sorted {
            if let Some(existing) = self.clustered_column() {
                return Err(StrataError::ClusteredColumnExists {
                    table: self.name.clone(),
                    column: existing.name().to_string(),
                });
            }
        }
        if self.row_count > 0 {
            return Err(StrataError::invalid_argument(format!(
                "cannot add column '{name}' to table '{}' after rows were loaded",
                self.name
            )));
        }

        let column = Column::new(name, sorted, self.config.vector_initial_capacity)?;
        self.columns.push(column);
        let pos = self.columns.len() - 1;
        if sorted {
            self.clustered = Some(pos);
        }
        Ok(pos)
    }

    /// Builds an index of `kind` on the named column.
    ///
    /// An index on the clustered column is leading.
    pub fn create_index(&mut self, column: &str, kind: IndexKind) -> StrataResult<()> {
        let pos = self.column_position(column)?;
        if self.columns[pos].index().is_some() {
            return Err(StrataError::IndexExists {
                column: column.to_string(),
            });
        }

        let leading = self.clustered == Some(pos);
        let index = ColumnIndex::build(kind, self.columns[pos].values(), leading, &self.config)?;
        self.columns[pos].set_index(index);
        debug!(table = %self.name, column, %kind, leading, "created index");
        Ok(())
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Inserts one row and returns its position.
    ///
    /// `values` lists one value per column in creation order. Columns and
    /// indexes reserve their growth before the first write, so a failed
    /// insert leaves the table unchanged.
    pub fn insert_row(&mut self, values: &[i32]) -> StrataResult<RowId> {
        self.check_width(values.len())?;
        for (column, &value) in self.columns.iter_mut().zip(values) {
            column.data_mut().reserve(1)?;
            if let Some(index) = column.index_mut() {
                index.reserve(value)?;
            }
        }

        let position = match self.clustered {
            Some(c) => {
                let pos = self.columns[c].data_mut().insert_sorted(values[c])?;
                for (i, column) in self.columns.iter_mut().enumerate() {
                    if i != c {
                        column.data_mut().insert_at(pos, values[i])?;
                    }
                }
                pos
            }
            None => {
                let pos = self.row_count;
                for (column, &value) in self.columns.iter_mut().zip(values) {
                    column.data_mut().push(value)?;
                }
                pos
            }
        };
        self.row_count += 1;

        let position = position as RowId;
        let shifted = self.clustered.is_some();
        for (column, &value) in self.columns.iter_mut().zip(values) {
            if let Some(index) = column.index_mut() {
                index.insert(position, value, shifted)?;
            }
        }
        Ok(position)
    }

    /// Appends many rows, then re-clusters and rebuilds indexes.
    ///
    /// Returns the number of rows loaded.
    pub fn bulk_load(&mut self, rows: &[Vec<i32>]) -> StrataResult<usize> {
        for row in rows {
            self.check_width(row.len())?;
        }
        for column in &mut self.columns {
            column.data_mut().reserve(rows.len())?;
        }

        for row in rows {
            for (column, &value) in self.columns.iter_mut().zip(row) {
                column.data_mut().push(value)?;
            }
        }
        self.row_count += rows.len();

        if self.clustered.is_some() {
            self.cluster()?;
        }
        self.rebuild_indexes()?;

        debug!(
            table = %self.name,
            loaded = rows.len(),
            rows = self.row_count,
            "bulk load complete"
        );
        Ok(rows.len())
    }

    /// Sorts the clustered column and moves every sibling column into the
    /// same row order.
    fn cluster(&mut self) -> StrataResult<()> {
        let Some(c) = self.clustered else {
            return Ok(());
        };

        let sorter = CacheConsciousSorter::from_config(&self.config);
        let (sorted, perm) = sorter.sort_with_permutation(self.columns[c].values())?;

        self.columns[c].data_mut().as_mut_slice().copy_from_slice(&sorted);
        for (i, column) in self.columns.iter_mut().enumerate() {
            if i != c {
                apply_permutation(column.data_mut().as_mut_slice(), &perm)?;
            }
        }

        debug!(
            table = %self.name,
            column = self.columns[c].name(),
            rows = self.row_count,
            "clustered table"
        );
        Ok(())
    }

    /// Rebuilds every column index from the column's current values.
    pub fn rebuild_indexes(&mut self) -> StrataResult<()> {
        for (i, column) in self.columns.iter_mut().enumerate() {
            if let Some(kind) = column.index_kind() {
                let leading = self.clustered == Some(i);
                let index = ColumnIndex::build(kind, column.values(), leading, &self.config)?;
                column.set_index(index);
            }
        }
        Ok(())
    }

    fn check_width(&self, width: usize) -> StrataResult<()> {
        if self.columns.len() != self.declared {
            return Err(StrataError::invalid_argument(format!(
                "table '{}' has {} of {} columns defined",
                self.name,
                self.columns.len(),
                self.declared
            )));
        }
        if width != self.declared {
            return Err(StrataError::LengthMismatch {
                left: width,
                right: self.declared,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use strata_common::error::ErrorCode;

    fn table(columns: &[(&str, bool)]) -> Table {
        let mut t = Table::new("t", columns.len(), EngineConfig::for_testing()).unwrap();
        for (name, sorted) in columns {
            t.add_column(*name, *sorted).unwrap();
        }
        t
    }

    fn rows_of(t: &Table) -> Vec<Vec<i32>> {
        (0..t.row_count())
            .map(|r| t.columns().iter().map(|c| c.values()[r]).collect())
            .collect()
    }

    #[test]
    fn test_schema_errors() {
        let mut t = Table::new("t", 2, EngineConfig::for_testing()).unwrap();
        t.add_column("a", true).unwrap();

        let err = t.add_column("a", false).unwrap_err();
        assert!(matches!(err, StrataError::ColumnExists { .. }));

        let err = t.add_column("b", true).unwrap_err();
        assert_eq!(err.code(), ErrorCode::ClusteredColumnExists);

        t.add_column("b", false).unwrap();
        let err = t.add_column("c", false).unwrap_err();
        assert_eq!(err.code(), ErrorCode::TableFull);

        assert!(Table::new("empty", 0, EngineConfig::for_testing()).is_err());
    }

    #[test]
    fn test_names_with_separators_rejected() {
        for name in ["", "a.b", "a/b", "a\\b", ".."] {
            let err = Table::new(name, 1, EngineConfig::for_testing()).unwrap_err();
            assert_eq!(err.code(), ErrorCode::InvalidArgument, "table {name:?}");
        }

        let mut t = Table::new("t", 1, EngineConfig::for_testing()).unwrap();
        for name in ["b.c", "", "b/c"] {
            let err = t.add_column(name, false).unwrap_err();
            assert_eq!(err.code(), ErrorCode::InvalidArgument, "column {name:?}");
        }
        assert!(t.columns().is_empty());
        t.add_column("b_c", false).unwrap();
    }

    #[test]
    fn test_failed_insert_leaves_indexes_untouched() {
        let mut t = table(&[("k", true), ("v", false)]);
        t.create_index("k", IndexKind::BPlusTree).unwrap();
        t.create_index("v", IndexKind::Sorted).unwrap();
        t.insert_row(&[2, 20]).unwrap();
        t.insert_row(&[1, 10]).unwrap();

        assert!(t.insert_row(&[1]).is_err());
        assert_eq!(t.row_count(), 2);
        for name in ["k", "v"] {
            assert_eq!(t.column(name).unwrap().index().unwrap().len(), 2);
        }

        // A duplicate clustered key lands behind its equal and renumbers
        // the rows after it in both indexes.
        assert_eq!(t.insert_row(&[1, 11]).unwrap(), 1);
        let k = t.column("k").unwrap().index().unwrap();
        assert_eq!(k.find(1), vec![0, 1]);
        assert_eq!(k.find(2), vec![2]);
        let v = t.column("v").unwrap().index().unwrap();
        assert_eq!(v.find(11), vec![1]);
        assert_eq!(v.find(20), vec![2]);
    }

    #[test]
    fn test_insert_into_incomplete_table() {
        let mut t = Table::new("t", 2, EngineConfig::for_testing()).unwrap();
        t.add_column("a", false).unwrap();
        assert!(t.insert_row(&[1]).is_err());
        assert!(t.insert_row(&[1, 2]).is_err());
        assert_eq!(t.row_count(), 0);
    }

    #[test]
    fn test_unclustered_insert_appends() {
        let mut t = table(&[("a", false), ("b", false)]);
        assert_eq!(t.insert_row(&[3, 30]).unwrap(), 0);
        assert_eq!(t.insert_row(&[1, 10]).unwrap(), 1);
        assert_eq!(rows_of(&t), vec![vec![3, 30], vec![1, 10]]);

        let err = t.insert_row(&[1]).unwrap_err();
        assert_eq!(err.code(), ErrorCode::LengthMismatch);
    }

    #[test]
    fn test_clustered_insert_keeps_rows_aligned() {
        let mut t = table(&[("a", false), ("k", true)]);
        t.insert_row(&[50, 5]).unwrap();
        t.insert_row(&[10, 1]).unwrap();
        assert_eq!(t.insert_row(&[30, 3]).unwrap(), 1);
        assert_eq!(t.insert_row(&[31, 3]).unwrap(), 2);

        assert_eq!(t.column("k").unwrap().values(), &[1, 3, 3, 5]);
        assert_eq!(t.column("a").unwrap().values(), &[10, 30, 31, 50]);
    }

    #[test]
    fn test_bulk_load_clusters_single_column() {
        let mut t = table(&[("k", true)]);
        let rows: Vec<Vec<i32>> = [5, 1, 4, 2, 3].iter().map(|v| vec![*v]).collect();
        assert_eq!(t.bulk_load(&rows).unwrap(), 5);
        assert_eq!(t.column("k").unwrap().values(), &[1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_bulk_load_permutes_siblings() {
        let mut t = table(&[("a", false), ("k", true), ("b", false)]);
        let mut rng = StdRng::seed_from_u64(42);
        let rows: Vec<Vec<i32>> = (0..200)
            .map(|i| vec![i, rng.gen_range(0..20), -i])
            .collect();
        t.bulk_load(&rows).unwrap();

        let keys = t.column("k").unwrap().values();
        assert!(keys.windows(2).all(|w| w[0] <= w[1]));

        // Every loaded row survives intact, and ties keep load order.
        let loaded = rows_of(&t);
        let mut expected = rows.clone();
        expected.sort_by_key(|r| r[1]);
        assert_eq!(loaded, expected);
    }

    #[test]
    fn test_indexes_follow_inserts_and_bulk_load() {
        let mut t = table(&[("k", true), ("v", false)]);
        t.create_index("k", IndexKind::BPlusTree).unwrap();
        t.create_index("v", IndexKind::Sorted).unwrap();

        let err = t.create_index("v", IndexKind::BPlusTree).unwrap_err();
        assert_eq!(err.code(), ErrorCode::IndexExists);

        let mut rng = StdRng::seed_from_u64(1);
        let rows: Vec<Vec<i32>> = (0..50)
            .map(|_| vec![rng.gen_range(0..10), rng.gen_range(0..10)])
            .collect();
        t.bulk_load(&rows).unwrap();
        for _ in 0..50 {
            t.insert_row(&[rng.gen_range(0..10), rng.gen_range(0..10)])
                .unwrap();
        }

        for name in ["k", "v"] {
            let column = t.column(name).unwrap();
            let index = column.index().unwrap();
            for value in 0..10 {
                let mut got = index.find(value);
                got.sort_unstable();
                let expected: Vec<RowId> = (0..column.len())
                    .filter(|&i| column.values()[i] == value)
                    .map(|i| i as RowId)
                    .collect();
                assert_eq!(got, expected, "column {name} value {value}");
            }
        }

        match t.column("k").unwrap().index().unwrap() {
            ColumnIndex::BPlusTree(tree) => {
                assert!(tree.is_leading());
                tree.validate().unwrap();
            }
            ColumnIndex::Sorted(_) => panic!("expected a b+tree"),
        }
    }

    #[test]
    fn test_unknown_column() {
        let t = table(&[("a", false)]);
        let err = t.column("zz").unwrap_err();
        assert_eq!(err.code(), ErrorCode::ColumnNotFound);
    }

    #[test]
    fn test_from_parts_rejects_ragged_columns() {
        let columns = vec![
            Column::from_values("a", false, vec![1, 2]),
            Column::from_values("b", false, vec![1]),
        ];
        let err = Table::from_parts("t".into(), 2, columns, EngineConfig::for_testing())
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::Corruption);
    }
}
