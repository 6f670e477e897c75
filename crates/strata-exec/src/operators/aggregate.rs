//! Min, max and avg.

use strata_common::types::AggregateOp;
use strata_storage::column::Column;

use crate::result::ResultVector;

/// Running min, max, sum and count over 64-bit inputs.
///
/// The sum is kept in an `i128`, so no input of `i64` values can overflow
/// it.
#[derive(Debug, Clone, Copy, Default)]
pub struct Accumulator {
    count: u64,
    sum: i128,
    min: Option<i64>,
    max: Option<i64>,
}

impl Accumulator {
    /// Creates an empty accumulator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one value.
    #[inline]
    pub fn update(&mut self, value: i64) {
        self.count += 1;
        self.sum += i128::from(value);
        self.min = Some(self.min.map_or(value, |m| m.min(value)));
        self.max = Some(self.max.map_or(value, |m| m.max(value)));
    }

    /// Number of values seen.
    #[must_use]
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Produces the result of `op`, `Null` if nothing was seen.
    #[must_use]
    pub fn finish(&self, op: AggregateOp) -> ResultVector {
        if self.count == 0 {
            return ResultVector::Null;
        }
        match op {
            AggregateOp::Min => self.min.map_or(ResultVector::Null, ResultVector::Int),
            AggregateOp::Max => self.max.map_or(ResultVector::Null, ResultVector::Int),
            AggregateOp::Avg => ResultVector::Float(self.sum as f64 / self.count as f64),
        }
    }
}

/// Aggregates a stored column.
///
/// Min and max of a clustered column read its first and last value.
#[must_use]
pub fn aggregate_column(column: &Column, op: AggregateOp) -> ResultVector {
    let values = column.values();
    let edge = match op {
        _ if !column.is_clustered() => None,
        AggregateOp::Min => Some(values.first()),
        AggregateOp::Max => Some(values.last()),
        AggregateOp::Avg => None,
    };
    match edge {
        Some(Some(v)) => ResultVector::Int(i64::from(*v)),
        Some(None) => ResultVector::Null,
        None => aggregate_values(values, op),
    }
}

/// Aggregates a vector of 32-bit values.
#[must_use]
pub fn aggregate_values(values: &[i32], op: AggregateOp) -> ResultVector {
    let mut acc = Accumulator::new();
    for &v in values {
        acc.update(i64::from(v));
    }
    acc.finish(op)
}

/// Aggregates a vector of 64-bit values, such as the output of an add.
#[must_use]
pub fn aggregate_longs(values: &[i64], op: AggregateOp) -> ResultVector {
    let mut acc = Accumulator::new();
    for &v in values {
        acc.update(v);
    }
    acc.finish(op)
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_common::config::EngineConfig;
    use strata_storage::table::Table;

    #[test]
    fn test_aggregate_values() {
        let values = [4, -2, 9, 1];
        assert_eq!(aggregate_values(&values, AggregateOp::Min), ResultVector::Int(-2));
        assert_eq!(aggregate_values(&values, AggregateOp::Max), ResultVector::Int(9));
        assert_eq!(aggregate_values(&values, AggregateOp::Avg), ResultVector::Float(3.0));
    }

    #[test]
    fn test_empty_is_null() {
        for op in [AggregateOp::Min, AggregateOp::Max, AggregateOp::Avg] {
            assert_eq!(aggregate_values(&[], op), ResultVector::Null);
            assert_eq!(aggregate_longs(&[], op), ResultVector::Null);
        }
    }

    #[test]
    fn test_avg_does_not_overflow() {
        let values = [i32::MAX; 8];
        assert_eq!(
            aggregate_values(&values, AggregateOp::Avg),
            ResultVector::Float(f64::from(i32::MAX))
        );

        let longs = [i64::MAX, i64::MAX];
        let ResultVector::Float(avg) = aggregate_longs(&longs, AggregateOp::Avg) else {
            panic!("expected float");
        };
        assert!((avg - i64::MAX as f64).abs() < 1.0e4);
    }

    #[test]
    fn test_clustered_column() {
        let mut table = Table::new("t", 2, EngineConfig::for_testing()).unwrap();
        table.add_column("k", true).unwrap();
        table.add_column("v", false).unwrap();
        table
            .bulk_load(&[vec![30, 1], vec![10, 2], vec![20, 3]])
            .unwrap();

        let k = table.column("k").unwrap();
        assert_eq!(aggregate_column(k, AggregateOp::Min), ResultVector::Int(10));
        assert_eq!(aggregate_column(k, AggregateOp::Max), ResultVector::Int(30));
        assert_eq!(aggregate_column(k, AggregateOp::Avg), ResultVector::Float(20.0));

        let v = table.column("v").unwrap();
        assert_eq!(aggregate_column(v, AggregateOp::Max), ResultVector::Int(3));
    }

    #[test]
    fn test_accumulator_count() {
        let mut acc = Accumulator::new();
        acc.update(5);
        acc.update(-5);
        assert_eq!(acc.count(), 2);
        assert_eq!(acc.finish(AggregateOp::Avg), ResultVector::Float(0.0));
    }
}
