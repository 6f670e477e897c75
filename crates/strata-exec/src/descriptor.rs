//! Operator descriptors.
//!
//! A descriptor is a fully parsed command. Names are resolved against the
//! current database when the operator runs, not when it is built.

use serde::{Deserialize, Serialize};
use std::fmt;

use strata_common::error::{StrataError, StrataResult};
use strata_common::types::{AggregateOp, ArithOp, IndexKind, ValueRange};

/// Reference to a column by name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColumnRef {
    /// Database name, if the reference was fully qualified.
    pub database: Option<String>,
    /// Table name.
    pub table: String,
    /// Column name.
    pub column: String,
}

impl ColumnRef {
    /// Creates a reference to `table.column`.
    pub fn new(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            database: None,
            table: table.into(),
            column: column.into(),
        }
    }

    /// Parses `db.table.column` or `table.column`.
    pub fn parse(s: &str) -> StrataResult<Self> {
        let parts: Vec<&str> = s.trim().split('.').collect();
        if parts.iter().any(|p| p.is_empty()) {
            return Err(invalid_ref(s));
        }
        match parts.as_slice() {
            [db, table, column] => Ok(Self {
                database: Some((*db).to_string()),
                table: (*table).to_string(),
                column: (*column).to_string(),
            }),
            [table, column] => Ok(Self::new(*table, *column)),
            _ => Err(invalid_ref(s)),
        }
    }
}

fn invalid_ref(s: &str) -> StrataError {
    StrataError::invalid_argument(format!(
        "'{s}' is not a column reference of the form db.table.column"
    ))
}

impl fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(db) = &self.database {
            write!(f, "{db}.")?;
        }
        write!(f, "{}.{}", self.table, self.column)
    }
}

/// Input of an aggregate: a stored column or a bound vector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operand {
    /// A table column.
    Column(ColumnRef),
    /// A bound result vector.
    Variable(String),
}

/// A parsed operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum OperatorDescriptor {
    /// Create the session's database.
    CreateDatabase {
        /// Database name.
        name: String,
    },
    /// Create a table.
    CreateTable {
        /// Table name.
        name: String,
        /// Number of columns the table will hold.
        column_count: usize,
    },
    /// Define the next column of a table.
    CreateColumn {
        /// The new column.
        column: ColumnRef,
        /// Make it the table's clustered column.
        sorted: bool,
    },
    /// Index a column.
    CreateIndex {
        /// Column to index.
        column: ColumnRef,
        /// Index kind.
        kind: IndexKind,
    },
    /// Insert one row.
    Insert {
        /// Target table.
        table: String,
        /// One value per column, in column creation order.
        values: Vec<i32>,
    },
    /// Load many rows at once.
    BulkLoad {
        /// Target table.
        table: String,
        /// Rows, each with one value per column.
        rows: Vec<Vec<i32>>,
    },
    /// Positions of a column's values in a range.
    Select {
        /// Output variable.
        output: String,
        /// Scanned column.
        column: ColumnRef,
        /// Value range.
        range: ValueRange,
    },
    /// Positions from a position vector whose paired value is in a range.
    SelectPositions {
        /// Output variable.
        output: String,
        /// Bound position vector.
        positions: String,
        /// Bound value vector of the same length.
        values: String,
        /// Value range.
        range: ValueRange,
    },
    /// Values of a column at bound positions.
    Fetch {
        /// Output variable.
        output: String,
        /// Source column.
        column: ColumnRef,
        /// Bound position vector.
        positions: String,
    },
    /// Min, max or avg.
    Aggregate {
        /// Output variable.
        output: String,
        /// Input column or vector.
        source: Operand,
        /// Aggregate function.
        op: AggregateOp,
    },
    /// Elementwise add or sub of two bound value vectors.
    Arithmetic {
        /// Output variable.
        output: String,
        /// Left operand variable.
        left: String,
        /// Right operand variable.
        right: String,
        /// Operator.
        op: ArithOp,
    },
    /// Equi-join of two `(values, positions)` pairs.
    Join {
        /// Output variable for matching left positions.
        left_output: String,
        /// Output variable for matching right positions.
        right_output: String,
        /// Bound left values.
        left_values: String,
        /// Bound left positions.
        left_positions: String,
        /// Bound right values.
        right_values: String,
        /// Bound right positions.
        right_positions: String,
    },
    /// Persist the database, then release it and every binding.
    Sync,
}

impl OperatorDescriptor {
    /// Operator name for logging.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::CreateDatabase { .. } => "create_db",
            Self::CreateTable { .. } => "create_table",
            Self::CreateColumn { .. } => "create_column",
            Self::CreateIndex { .. } => "create_index",
            Self::Insert { .. } => "insert",
            Self::BulkLoad { .. } => "bulk_load",
            Self::Select { .. } => "select",
            Self::SelectPositions { .. } => "select_positions",
            Self::Fetch { .. } => "fetch",
            Self::Aggregate { .. } => "aggregate",
            Self::Arithmetic { .. } => "arithmetic",
            Self::Join { .. } => "join",
            Self::Sync => "sync",
        }
    }
}
