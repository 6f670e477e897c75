//! # strata-storage
//!
//! Column storage engine for StrataDB.
//!
//! This crate owns everything that lives in a table:
//! - Growable `i32` column vectors with fallible growth
//! - A cache-conscious two-way merge sorter
//! - Sorted-array and B+-tree secondary indexes
//! - Clustering: bulk load that physically orders a table by one column
//! - The database catalog and its on-disk persistence

#![warn(missing_docs)]
#![warn(clippy::all)]

/// B+-tree secondary index
pub mod btree;

/// Catalog of databases, tables and columns
pub mod catalog;

/// In-place permutation of dependent columns
pub mod cluster;

/// A single named column
pub mod column;

/// Secondary index dispatch and the sorted index
pub mod index;

/// Catalog and column persistence
pub mod persist;

/// Cache-conscious merge sort
pub mod sort;

/// Tables and their mutation paths
pub mod table;

/// Growable integer vector
pub mod vector;

pub use btree::{BPlusTree, RowSlot, TreeStats};
pub use catalog::{Database, TableHandle};
pub use column::Column;
pub use index::{ColumnIndex, SortedIndex};
pub use sort::{CacheConsciousSorter, SortEntry};
pub use table::Table;
pub use vector::IntVector;
