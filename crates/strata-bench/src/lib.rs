//! StrataDB performance benchmarks
//!
//! This crate contains benchmarks for:
//! - B+-tree inserts and range searches
//! - The cache-conscious sorter and clustering
//! - Scan, aggregate and join operators
//!
//! Run benchmarks with:
//! ```bash
//! cargo bench -p strata-bench
//! ```

pub mod utils;
