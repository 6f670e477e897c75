//! # strata-test
//!
//! Integration tests for StrataDB.
//!
//! This crate contains:
//! - Concrete end-to-end scenarios
//! - Randomized property checks against naive reference implementations
//! - Persistence round trips

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Test utilities and helpers
pub mod utils;
