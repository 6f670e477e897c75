//! Core types shared by the storage and execution layers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::StrataError;

/// Physical position of a row inside its table.
///
/// Positions are dense: a table with `n` rows uses exactly `0..n`.
pub type RowId = u32;

// =============================================================================
// Index Kind
// =============================================================================

/// Kind of secondary index attached to a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexKind {
    /// Sorted array of `(value, position)` pairs.
    Sorted,
    /// B+-tree keyed by value.
    #[serde(rename = "btree")]
    BPlusTree,
}

impl IndexKind {
    /// Returns the persisted tag of this kind.
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        match self {
            Self::Sorted => 1,
            Self::BPlusTree => 2,
        }
    }

    /// Decodes a persisted tag.
    #[must_use]
    pub const fn from_u8(tag: u8) -> Option<Self> {
        match tag {
            1 => Some(Self::Sorted),
            2 => Some(Self::BPlusTree),
            _ => None,
        }
    }
}

impl fmt::Display for IndexKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sorted => write!(f, "sorted"),
            Self::BPlusTree => write!(f, "btree"),
        }
    }
}

impl FromStr for IndexKind {
    type Err = StrataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sorted" => Ok(Self::Sorted),
            "btree" | "b+tree" => Ok(Self::BPlusTree),
            other => Err(StrataError::invalid_argument(format!(
                "unknown index kind '{other}'"
            ))),
        }
    }
}

// =============================================================================
// Operator Kinds
// =============================================================================

/// Aggregate function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregateOp {
    /// Smallest value.
    Min,
    /// Largest value.
    Max,
    /// Arithmetic mean.
    Avg,
}

impl fmt::Display for AggregateOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Min => write!(f, "min"),
            Self::Max => write!(f, "max"),
            Self::Avg => write!(f, "avg"),
        }
    }
}

/// Elementwise arithmetic operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArithOp {
    /// `left + right`.
    Add,
    /// `left - right`.
    Sub,
}

impl ArithOp {
    /// Applies the operator in 64-bit arithmetic.
    #[inline]
    #[must_use]
    pub const fn apply(self, left: i32, right: i32) -> i64 {
        match self {
            Self::Add => left as i64 + right as i64,
            Self::Sub => left as i64 - right as i64,
        }
    }
}

impl fmt::Display for ArithOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Add => write!(f, "add"),
            Self::Sub => write!(f, "sub"),
        }
    }
}

// =============================================================================
// Value Range
// =============================================================================

/// Half-open value range `[low, high)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ValueRange {
    /// Inclusive lower bound.
    pub low: i32,
    /// Exclusive upper bound.
    pub high: i32,
}

impl ValueRange {
    /// Creates a range.
    #[inline]
    #[must_use]
    pub const fn new(low: i32, high: i32) -> Self {
        Self { low, high }
    }

    /// The range covering every value except `i32::MAX`.
    #[must_use]
    pub const fn unbounded() -> Self {
        Self::new(i32::MIN, i32::MAX)
    }

    /// Parses textual bounds.
    ///
    /// A bound that is not an integer (`null`, empty, garbage) becomes
    /// `i32::MIN` for the low side and `i32::MAX` for the high side.
    #[must_use]
    pub fn parse(low: &str, high: &str) -> Self {
        Self {
            low: low.trim().parse().unwrap_or(i32::MIN),
            high: high.trim().parse().unwrap_or(i32::MAX),
        }
    }

    /// Returns true if `value` lies in `[low, high)`.
    #[inline]
    #[must_use]
    pub const fn contains(&self, value: i32) -> bool {
        self.low <= value && value < self.high
    }

    /// Returns true if no value can satisfy the range.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.low >= self.high
    }
}

impl fmt::Display for ValueRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.low, self.high)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_kind_parse() {
        assert_eq!("sorted".parse::<IndexKind>().unwrap(), IndexKind::Sorted);
        assert_eq!("BTREE".parse::<IndexKind>().unwrap(), IndexKind::BPlusTree);
        assert!("hash".parse::<IndexKind>().is_err());
    }

    #[test]
    fn test_index_kind_tag() {
        for kind in [IndexKind::Sorted, IndexKind::BPlusTree] {
            assert_eq!(IndexKind::from_u8(kind.as_u8()), Some(kind));
        }
        assert_eq!(IndexKind::from_u8(0), None);
    }

    #[test]
    fn test_value_range_parse() {
        let range = ValueRange::parse("null", "20");
        assert_eq!(range, ValueRange::new(i32::MIN, 20));
        assert!(range.contains(-5));
        assert!(!range.contains(20));

        let range = ValueRange::parse(" 7 ", "");
        assert_eq!(range, ValueRange::new(7, i32::MAX));
    }

    #[test]
    fn test_empty_range() {
        assert!(ValueRange::new(5, 5).is_empty());
        assert!(!ValueRange::new(5, 6).is_empty());
    }

    #[test]
    fn test_arith_no_overflow() {
        assert_eq!(ArithOp::Add.apply(i32::MAX, 1), i32::MAX as i64 + 1);
        assert_eq!(ArithOp::Sub.apply(i32::MIN, 1), i32::MIN as i64 - 1);
    }
}
