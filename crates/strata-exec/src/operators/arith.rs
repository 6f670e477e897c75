//! Elementwise add and sub.

use strata_common::error::{StrataError, StrataResult};
use strata_common::types::ArithOp;

/// Applies `op` to each pair of `left` and `right` in 64-bit arithmetic.
pub fn arithmetic(left: &[i32], right: &[i32], op: ArithOp) -> StrataResult<Vec<i64>> {
    if left.len() != right.len() {
        return Err(StrataError::LengthMismatch {
            left: left.len(),
            right: right.len(),
        });
    }
    Ok(left.iter().zip(right).map(|(l, r)| op.apply(*l, *r)).collect())
}
