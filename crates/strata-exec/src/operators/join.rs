//! Cache-blocked nested-loop equi-join.
//!
//! Both inputs are cut into blocks of `block_len` values, sized so a pair
//! of blocks stays resident in L1. For every right block (outer) and every
//! left block (inner) all pairs are compared. Output follows block-scan
//! order and is not sorted.

use strata_common::error::{StrataError, StrataResult};
use strata_common::types::RowId;
use tracing::trace;

/// Matching position pairs of a join, as two parallel vectors.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JoinOutput {
    /// Left positions.
    pub left: Vec<RowId>,
    /// Right positions, `right[i]` paired with `left[i]`.
    pub right: Vec<RowId>,
}

impl JoinOutput {
    /// Number of matches.
    #[must_use]
    pub fn len(&self) -> usize {
        self.left.len()
    }

    /// Returns true if nothing matched.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.left.is_empty()
    }

    /// Iterates `(left, right)` pairs.
    pub fn pairs(&self) -> impl Iterator<Item = (RowId, RowId)> + '_ {
        self.left.iter().copied().zip(self.right.iter().copied())
    }
}

fn check_pair(values: &[i32], positions: &[RowId]) -> StrataResult<()> {
    if values.len() != positions.len() {
        return Err(StrataError::LengthMismatch {
            left: values.len(),
            right: positions.len(),
        });
    }
    Ok(())
}

/// Joins `(left_values, left_positions)` with `(right_values,
/// right_positions)` on value equality.
pub fn block_nested_loop_join(
    left_values: &[i32],
    left_positions: &[RowId],
    right_values: &[i32],
    right_positions: &[RowId],
    block_len: usize,
) -> StrataResult<JoinOutput> {
    check_pair(left_values, left_positions)?;
    check_pair(right_values, right_positions)?;
    if block_len == 0 {
        return Err(StrataError::invalid_argument("join block length must be positive"));
    }

    let mut out = JoinOutput::default();
    for (rb, right_block) in right_values.chunks(block_len).enumerate() {
        let right_base = rb * block_len;
        for (lb, left_block) in left_values.chunks(block_len).enumerate() {
            let left_base = lb * block_len;
            for (j, r) in right_block.iter().enumerate() {
                for (i, l) in left_block.iter().enumerate() {
                    if l == r {
                        out.left.push(left_positions[left_base + i]);
                        out.right.push(right_positions[right_base + j]);
                    }
                }
            }
        }
    }

    trace!(
        left = left_values.len(),
        right = right_values.len(),
        block_len,
        matches = out.len(),
        "join"
    );
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn naive(
        lv: &[i32],
        lp: &[RowId],
        rv: &[i32],
        rp: &[RowId],
    ) -> Vec<(RowId, RowId)> {
        let mut out = Vec::new();
        for (l, lpos) in lv.iter().zip(lp) {
            for (r, rpos) in rv.iter().zip(rp) {
                if l == r {
                    out.push((*lpos, *rpos));
                }
            }
        }
        out.sort_unstable();
        out
    }

    #[test]
    fn test_small_join() {
        let out = block_nested_loop_join(&[1, 2, 2], &[10, 11, 12], &[2, 3, 1], &[20, 21, 22], 2)
            .unwrap();
        let mut pairs: Vec<_> = out.pairs().collect();
        pairs.sort_unstable();
        assert_eq!(pairs, vec![(10, 22), (11, 20), (12, 20)]);
    }

    #[test]
    fn test_block_scan_order() {
        // One block each: right element outer, left element inner.
        let out = block_nested_loop_join(&[5, 5], &[0, 1], &[5, 5], &[7, 8], 16).unwrap();
        assert_eq!(out.left, vec![0, 1, 0, 1]);
        assert_eq!(out.right, vec![7, 7, 8, 8]);
    }

    #[test]
    fn test_matches_naive() {
        let mut rng = StdRng::seed_from_u64(7);
        for block_len in [1, 3, 16, 1000] {
            let ln = rng.gen_range(0..200);
            let rn = rng.gen_range(0..200);
            let lv: Vec<i32> = (0..ln).map(|_| rng.gen_range(0..20)).collect();
            let rv: Vec<i32> = (0..rn).map(|_| rng.gen_range(0..20)).collect();
            let lp: Vec<RowId> = (0..ln as RowId).collect();
            let rp: Vec<RowId> = (0..rn as RowId).map(|p| p + 1000).collect();

            let out = block_nested_loop_join(&lv, &lp, &rv, &rp, block_len).unwrap();
            let mut pairs: Vec<_> = out.pairs().collect();
            pairs.sort_unstable();
            assert_eq!(pairs, naive(&lv, &lp, &rv, &rp), "block_len {block_len}");
        }
    }

    #[test]
    fn test_rejects_bad_input() {
        assert!(block_nested_loop_join(&[1], &[], &[1], &[0], 4).is_err());
        assert!(block_nested_loop_join(&[1], &[0], &[1], &[0], 0).is_err());
        assert!(block_nested_loop_join(&[], &[], &[1], &[0], 4).unwrap().is_empty());
    }
}
