//! Operator results.

use std::fmt;

use strata_common::types::RowId;

/// A vector or scalar produced by an operator.
#[derive(Debug, Clone, PartialEq)]
pub enum ResultVector {
    /// Row positions, from a select or a join.
    Positions(Vec<RowId>),
    /// Column values, from a fetch.
    Values(Vec<i32>),
    /// 64-bit values, from add or sub.
    Longs(Vec<i64>),
    /// Integer scalar, from min or max.
    Int(i64),
    /// Floating point scalar, from avg.
    Float(f64),
    /// Aggregate over an empty input.
    Null,
}

impl ResultVector {
    /// Short type name used in error messages.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Positions(_) => "positions",
            Self::Values(_) => "values",
            Self::Longs(_) => "longs",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Null => "null",
        }
    }

    /// Number of elements. Scalars count as one, `Null` as zero.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Positions(v) => v.len(),
            Self::Values(v) => v.len(),
            Self::Longs(v) => v.len(),
            Self::Int(_) | Self::Float(_) => 1,
            Self::Null => 0,
        }
    }

    /// Returns true if the result holds nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The positions, if this is a position vector.
    #[must_use]
    pub fn as_positions(&self) -> Option<&[RowId]> {
        match self {
            Self::Positions(v) => Some(v),
            _ => None,
        }
    }

    /// The values, if this is a value vector.
    #[must_use]
    pub fn as_values(&self) -> Option<&[i32]> {
        match self {
            Self::Values(v) => Some(v),
            _ => None,
        }
    }

    /// The 64-bit values, if this is a long vector.
    #[must_use]
    pub fn as_longs(&self) -> Option<&[i64]> {
        match self {
            Self::Longs(v) => Some(v),
            _ => None,
        }
    }
}

impl fmt::Display for ResultVector {
    /// One element per line, the way results go back to a client.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn lines<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: &[T]) -> fmt::Result {
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    writeln!(f)?;
                }
                write!(f, "{item}")?;
            }
            Ok(())
        }

        match self {
            Self::Positions(v) => lines(f, v),
            Self::Values(v) => lines(f, v),
            Self::Longs(v) => lines(f, v),
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v:.2}"),
            Self::Null => Ok(()),
        }
    }
}

/// Outcome of executing one operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatementResult {
    /// Catalog change (create database, table, column or index).
    Ddl {
        /// What was created.
        command: String,
    },
    /// Single-row insert.
    Insert {
        /// Position the row landed at.
        position: RowId,
    },
    /// Bulk load.
    BulkLoad {
        /// Rows loaded.
        rows_affected: u64,
    },
    /// Results were bound to these names.
    Bound {
        /// Bound names, in output order.
        names: Vec<String>,
    },
    /// Database persisted and released.
    Sync {
        /// Number of tables written.
        tables: usize,
    },
}

impl StatementResult {
    /// Creates a DDL result.
    pub fn ddl(command: impl Into<String>) -> Self {
        Self::Ddl {
            command: command.into(),
        }
    }

    /// Creates a result for a single binding.
    pub fn bound(name: impl Into<String>) -> Self {
        Self::Bound {
            names: vec![name.into()],
        }
    }

    /// Returns the number of rows affected, if applicable.
    #[must_use]
    pub fn rows_affected(&self) -> Option<u64> {
        match self {
            Self::Insert { .. } => Some(1),
            Self::BulkLoad { rows_affected } => Some(*rows_affected),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(ResultVector::Positions(vec![1, 2, 3]).to_string(), "1\n2\n3");
        assert_eq!(ResultVector::Float(2.5).to_string(), "2.50");
        assert_eq!(ResultVector::Null.to_string(), "");
        assert_eq!(ResultVector::Values(Vec::new()).to_string(), "");
    }

    #[test]
    fn test_accessors() {
        let v = ResultVector::Values(vec![4, 5]);
        assert_eq!(v.as_values(), Some(&[4, 5][..]));
        assert_eq!(v.as_positions(), None);
        assert_eq!(v.type_name(), "values");
        assert_eq!(ResultVector::Null.len(), 0);
        assert_eq!(ResultVector::Int(3).len(), 1);
    }

    #[test]
    fn test_rows_affected() {
        assert_eq!(StatementResult::Insert { position: 4 }.rows_affected(), Some(1));
        assert_eq!(StatementResult::ddl("create table").rows_affected(), None);
    }
}
