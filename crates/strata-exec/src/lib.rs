//! # strata-exec
//!
//! Query execution for StrataDB.
//!
//! The surrounding system parses a command into an [`OperatorDescriptor`]
//! and hands it to [`ExecutionContext::execute`]. Operators read and write
//! the current database, and every operator that produces a vector binds it
//! under the requested output name in the context's [`Bindings`].
//!
//! # Example
//!
//! ```rust
//! use strata_common::{EngineConfig, ValueRange};
//! use strata_exec::{ColumnRef, ExecutionContext, OperatorDescriptor};
//!
//! let mut ctx = ExecutionContext::new(EngineConfig::for_testing()).unwrap();
//! ctx.execute(OperatorDescriptor::CreateDatabase { name: "db".into() }).unwrap();
//! ctx.execute(OperatorDescriptor::CreateTable { name: "t".into(), column_count: 1 }).unwrap();
//! ctx.execute(OperatorDescriptor::CreateColumn {
//!     column: ColumnRef::parse("db.t.a").unwrap(),
//!     sorted: true,
//! })
//! .unwrap();
//! ctx.execute(OperatorDescriptor::BulkLoad {
//!     table: "t".into(),
//!     rows: vec![vec![5], vec![1], vec![4], vec![2], vec![3]],
//! })
//! .unwrap();
//! ctx.execute(OperatorDescriptor::Select {
//!     output: "p".into(),
//!     column: ColumnRef::parse("t.a").unwrap(),
//!     range: ValueRange::new(2, 5),
//! })
//! .unwrap();
//!
//! assert_eq!(ctx.bindings().positions("p").unwrap(), &[1, 2, 3]);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

mod bindings;
mod context;
mod descriptor;
mod engine;
mod result;

/// Query operators
pub mod operators;

pub use bindings::Bindings;
pub use context::ExecutionContext;
pub use descriptor::{ColumnRef, Operand, OperatorDescriptor};
pub use result::{ResultVector, StatementResult};
