//! # strata-common
//!
//! Common types, errors, and configuration for StrataDB.
//!
//! This crate provides the foundational pieces shared by the storage and
//! execution crates:
//!
//! - **Types**: Row positions (`RowId`), index kinds, value ranges, operator kinds
//! - **Errors**: Unified error handling with `StrataError`
//! - **Config**: Engine configuration (`EngineConfig`)
//! - **Constants**: Cache budgets, tree order, file format constants
//!
//! ## Example
//!
//! ```rust
//! use strata_common::types::ValueRange;
//! use strata_common::error::StrataResult;
//!
//! fn example() -> StrataResult<()> {
//!     let range = ValueRange::parse("10", "not-a-number");
//!     assert_eq!(range.low, 10);
//!     assert_eq!(range.high, i32::MAX);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod constants;
pub mod error;
pub mod types;

// Re-export commonly used items at the crate root
pub use config::{EngineConfig, EngineConfigBuilder};
pub use constants::*;
pub use error::{ErrorCode, StrataError, StrataResult};
pub use types::{AggregateOp, ArithOp, IndexKind, RowId, ValueRange};
