//! Engine error types.
//!
//! Provides the error taxonomy for every storage and execution operation.

use std::fmt;
use thiserror::Error;

/// Error codes for categorizing errors.
///
/// These codes are what the dispatch layer reports back to a client as the
/// status of an operator, and are stable across versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum ErrorCode {
    // General errors (0x0000 - 0x00FF)
    /// Unknown or unspecified error.
    Unknown = 0x0000,
    /// Internal error (bug).
    Internal = 0x0001,
    /// Invalid argument provided.
    InvalidArgument = 0x0003,

    // Memory errors (0x0100 - 0x01FF)
    /// A growth path could not allocate.
    OutOfMemory = 0x0100,

    // Catalog errors (0x0200 - 0x02FF)
    /// No database has been created or restored.
    NoDatabase = 0x0200,
    /// Table not found.
    TableNotFound = 0x0201,
    /// Column not found.
    ColumnNotFound = 0x0202,
    /// Name already in use.
    NameExists = 0x0203,
    /// Table has no room for another column.
    TableFull = 0x0204,
    /// Table already has a clustered column.
    ClusteredColumnExists = 0x0205,
    /// Column already has an index.
    IndexExists = 0x0206,

    // Query errors (0x0300 - 0x03FF)
    /// Variable not bound.
    VariableNotFound = 0x0300,
    /// Type mismatch.
    TypeMismatch = 0x0301,
    /// Operand lengths differ.
    LengthMismatch = 0x0302,
    /// Position outside the column.
    PositionOutOfRange = 0x0303,

    // I/O errors (0x0400 - 0x04FF)
    /// General I/O error.
    Io = 0x0400,
    /// Data corruption detected.
    Corruption = 0x0401,
    /// Invalid configuration.
    Config = 0x0402,
}

impl ErrorCode {
    /// Returns the numeric code.
    #[inline]
    #[must_use]
    pub const fn as_u16(self) -> u16 {
        self as u16
    }

    /// Returns the error category name.
    #[must_use]
    pub const fn category(&self) -> &'static str {
        match (*self as u16) >> 8 {
            0x00 => "General",
            0x01 => "Memory",
            0x02 => "Catalog",
            0x03 => "Query",
            0x04 => "I/O",
            _ => "Unknown",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// The main error type for StrataDB.
///
/// Lookup misses (absent key, empty range) are never errors; they are empty
/// results. Broken structural invariants are panics, not variants here.
///
/// # Example
///
/// ```rust
/// use strata_common::error::{ErrorCode, StrataError, StrataResult};
///
/// fn find_table(name: &str) -> StrataResult<()> {
///     Err(StrataError::TableNotFound { table: name.to_string() })
/// }
///
/// assert_eq!(find_table("t").unwrap_err().code(), ErrorCode::TableNotFound);
/// ```
#[derive(Debug, Error)]
pub enum StrataError {
    // ==========================================================================
    // General Errors
    // ==========================================================================
    /// Internal error - this indicates a bug.
    #[error("internal error: {message}")]
    Internal {
        /// Error message.
        message: String,
    },

    /// Invalid argument provided.
    #[error("invalid argument: {message}")]
    InvalidArgument {
        /// Error message.
        message: String,
    },

    // ==========================================================================
    // Memory Errors
    // ==========================================================================
    /// A structure could not grow.
    #[error("out of memory growing {structure} to {requested} elements")]
    OutOfMemory {
        /// The structure that failed to grow.
        structure: &'static str,
        /// Requested element count.
        requested: usize,
    },

    // ==========================================================================
    // Catalog Errors
    // ==========================================================================
    /// No current database.
    #[error("no database: create or restore one first")]
    NoDatabase,

    /// A database already exists in this context.
    #[error("database '{name}' already exists")]
    DatabaseExists {
        /// Name of the existing database.
        name: String,
    },

    /// Table not found.
    #[error("table '{table}' not found")]
    TableNotFound {
        /// The missing table.
        table: String,
    },

    /// Table already exists.
    #[error("table '{table}' already exists")]
    TableExists {
        /// The duplicate table name.
        table: String,
    },

    /// Column not found.
    #[error("column '{column}' not found in table '{table}'")]
    ColumnNotFound {
        /// The missing column.
        column: String,
        /// The table name.
        table: String,
    },

    /// Column already exists.
    #[error("column '{column}' already exists in table '{table}'")]
    ColumnExists {
        /// The duplicate column.
        column: String,
        /// The table name.
        table: String,
    },

    /// All declared columns of the table are defined.
    #[error("table '{table}' already has its {capacity} declared columns")]
    TableFull {
        /// The table name.
        table: String,
        /// Declared column count.
        capacity: usize,
    },

    /// A second clustered column was requested.
    #[error("table '{table}' is already clustered on '{column}'")]
    ClusteredColumnExists {
        /// The table name.
        table: String,
        /// The existing clustered column.
        column: String,
    },

    /// Column already carries an index.
    #[error("column '{column}' already has an index")]
    IndexExists {
        /// The indexed column.
        column: String,
    },

    // ==========================================================================
    // Query Errors
    // ==========================================================================
    /// Variable not bound in the session.
    #[error("variable '{name}' is not bound")]
    VariableNotFound {
        /// The missing variable.
        name: String,
    },

    /// Type mismatch.
    #[error("type mismatch: expected {expected}, got {actual}")]
    TypeMismatch {
        /// Expected type.
        expected: &'static str,
        /// Actual type.
        actual: &'static str,
    },

    /// Operands of different lengths.
    #[error("length mismatch: {left} vs {right}")]
    LengthMismatch {
        /// Left operand length.
        left: usize,
        /// Right operand length.
        right: usize,
    },

    /// Position beyond the end of a column.
    #[error("position {position} out of range for {len} rows")]
    PositionOutOfRange {
        /// The offending position.
        position: u32,
        /// Number of rows.
        len: usize,
    },

    // ==========================================================================
    // I/O Errors
    // ==========================================================================
    /// I/O error from the underlying system.
    #[error("I/O error: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Data corruption detected.
    #[error("data corruption detected: {message}")]
    Corruption {
        /// Description of the corruption.
        message: String,
    },

    /// Checksum mismatch.
    #[error("checksum mismatch: expected {expected:#010x}, got {actual:#010x}")]
    ChecksumMismatch {
        /// Expected checksum.
        expected: u32,
        /// Actual checksum.
        actual: u32,
    },

    /// Invalid configuration.
    #[error("invalid configuration: {message}")]
    Config {
        /// Error message.
        message: String,
    },
}

impl StrataError {
    /// Returns the error code for this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Internal { .. } => ErrorCode::Internal,
            Self::InvalidArgument { .. } => ErrorCode::InvalidArgument,
            Self::OutOfMemory { .. } => ErrorCode::OutOfMemory,
            Self::NoDatabase => ErrorCode::NoDatabase,
            Self::DatabaseExists { .. } => ErrorCode::NameExists,
            Self::TableNotFound { .. } => ErrorCode::TableNotFound,
            Self::TableExists { .. } => ErrorCode::NameExists,
            Self::ColumnNotFound { .. } => ErrorCode::ColumnNotFound,
            Self::ColumnExists { .. } => ErrorCode::NameExists,
            Self::TableFull { .. } => ErrorCode::TableFull,
            Self::ClusteredColumnExists { .. } => ErrorCode::ClusteredColumnExists,
            Self::IndexExists { .. } => ErrorCode::IndexExists,
            Self::VariableNotFound { .. } => ErrorCode::VariableNotFound,
            Self::TypeMismatch { .. } => ErrorCode::TypeMismatch,
            Self::LengthMismatch { .. } => ErrorCode::LengthMismatch,
            Self::PositionOutOfRange { .. } => ErrorCode::PositionOutOfRange,
            Self::Io { .. } => ErrorCode::Io,
            Self::Corruption { .. } => ErrorCode::Corruption,
            Self::ChecksumMismatch { .. } => ErrorCode::Corruption,
            Self::Config { .. } => ErrorCode::Config,
        }
    }

    /// Returns true if the request failed cleanly and the session may go on.
    ///
    /// Allocation failures and internal errors end the current request.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        !matches!(self, Self::OutOfMemory { .. } | Self::Internal { .. })
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Creates an invalid argument error.
    #[must_use]
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Creates a corruption error.
    #[must_use]
    pub fn corruption(message: impl Into<String>) -> Self {
        Self::Corruption {
            message: message.into(),
        }
    }

    /// Creates an out-of-memory error.
    #[must_use]
    pub fn out_of_memory(structure: &'static str, requested: usize) -> Self {
        Self::OutOfMemory {
            structure,
            requested,
        }
    }

    /// Creates a column-not-found error.
    #[must_use]
    pub fn column_not_found(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self::ColumnNotFound {
            column: column.into(),
            table: table.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code() {
        let err = StrataError::TableNotFound {
            table: "t1".to_string(),
        };
        assert_eq!(err.code(), ErrorCode::TableNotFound);
        assert_eq!(err.code().category(), "Catalog");
    }

    #[test]
    fn test_error_display() {
        let err = StrataError::column_not_found("grades", "score");
        assert_eq!(
            err.to_string(),
            "column 'score' not found in table 'grades'"
        );

        let err = StrataError::out_of_memory("column vector", 1 << 40);
        assert!(err.to_string().contains("column vector"));
    }

    #[test]
    fn test_recoverable() {
        assert!(StrataError::NoDatabase.is_recoverable());
        assert!(StrataError::VariableNotFound {
            name: "p1".to_string()
        }
        .is_recoverable());
        assert!(!StrataError::out_of_memory("sorter", 10).is_recoverable());
        assert!(!StrataError::internal("bug").is_recoverable());
    }

    #[test]
    fn test_checksum_maps_to_corruption() {
        let err = StrataError::ChecksumMismatch {
            expected: 1,
            actual: 2,
        };
        assert_eq!(err.code(), ErrorCode::Corruption);
        assert_eq!(err.code().category(), "I/O");
    }

    #[test]
    fn test_io_error_from() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: StrataError = io_err.into();
        assert_eq!(err.code(), ErrorCode::Io);
    }
}
