//! Permutations for clustering.
//!
//! Clustering sorts one column and must move every sibling column into the
//! same row order. `apply_permutation` does that in place by walking each
//! cycle of the permutation, so the only scratch space is one visited flag
//! per row instead of a second copy of the column.
//!
//! All permutations here use gather form: `perm[new_position]` is the
//! position the row came from, so applying `perm` to `data` yields
//! `new[i] = old[perm[i]]`.

use strata_common::error::{StrataError, StrataResult};
use strata_common::types::RowId;

fn visited_flags(len: usize) -> StrataResult<Vec<bool>> {
    let mut visited = Vec::new();
    visited
        .try_reserve_exact(len)
        .map_err(|_| StrataError::out_of_memory("permutation markers", len))?;
    visited.resize(len, false);
    Ok(visited)
}

/// Checks that `perm` is a permutation of `0..len`.
fn check_permutation(perm: &[RowId], len: usize, seen: &mut [bool]) -> StrataResult<()> {
    if perm.len() != len {
        return Err(StrataError::LengthMismatch {
            left: perm.len(),
            right: len,
        });
    }
    for &source in perm {
        let source = source as usize;
        if source >= len || seen[source] {
            return Err(StrataError::invalid_argument(format!(
                "permutation entry {source} is out of range or repeated"
            )));
        }
        seen[source] = true;
    }
    seen.fill(false);
    Ok(())
}

/// Reorders `data` in place so that `data[i]` becomes the old `data[perm[i]]`.
pub fn apply_permutation(data: &mut [i32], perm: &[RowId]) -> StrataResult<()> {
    let mut visited = visited_flags(data.len())?;
    check_permutation(perm, data.len(), &mut visited)?;

    for start in 0..data.len() {
        if visited[start] {
            continue;
        }
        let carried = data[start];
        let mut current = start;
        loop {
            visited[current] = true;
            let source = perm[current] as usize;
            if source == start {
                data[current] = carried;
                break;
            }
            data[current] = data[source];
            current = source;
        }
    }
    Ok(())
}

/// Returns the inverse permutation: `inverse[perm[i]] = i`.
pub fn invert_permutation(perm: &[RowId]) -> StrataResult<Vec<RowId>> {
    let mut seen = visited_flags(perm.len())?;
    check_permutation(perm, perm.len(), &mut seen)?;

    let mut inverse = vec![0; perm.len()];
    for (i, &source) in perm.iter().enumerate() {
        inverse[source as usize] = i as RowId;
    }
    Ok(inverse)
}

/// Reorders by copying into a fresh vector. Reference for `apply_permutation`.
#[must_use]
pub fn gather(data: &[i32], perm: &[RowId]) -> Vec<i32> {
    perm.iter().map(|&source| data[source as usize]).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::seq::SliceRandom;
    use rand::{Rng, SeedableRng};

    #[test]
    fn test_apply_simple_cycle() {
        let mut data = vec![10, 20, 30, 40];
        apply_permutation(&mut data, &[1, 2, 3, 0]).unwrap();
        assert_eq!(data, vec![20, 30, 40, 10]);
    }

    #[test]
    fn test_identity_and_empty() {
        let mut data = vec![1, 2, 3];
        apply_permutation(&mut data, &[0, 1, 2]).unwrap();
        assert_eq!(data, vec![1, 2, 3]);

        let mut empty: Vec<i32> = Vec::new();
        apply_permutation(&mut empty, &[]).unwrap();
        assert!(empty.is_empty());
    }

    #[test]
    fn test_matches_gather_and_inverse_restores() {
        let mut rng = StdRng::seed_from_u64(42);
        for len in [1usize, 2, 7, 100, 1000] {
            let original: Vec<i32> = (0..len).map(|_| rng.gen_range(-50..50)).collect();
            let mut perm: Vec<RowId> = (0..len as RowId).collect();
            perm.shuffle(&mut rng);

            let mut data = original.clone();
            apply_permutation(&mut data, &perm).unwrap();
            assert_eq!(data, gather(&original, &perm));

            let inverse = invert_permutation(&perm).unwrap();
            apply_permutation(&mut data, &inverse).unwrap();
            assert_eq!(data, original);
        }
    }

    #[test]
    fn test_rejects_bad_permutation() {
        let mut data = vec![1, 2, 3];
        assert!(apply_permutation(&mut data, &[0, 1]).is_err());
        assert!(apply_permutation(&mut data, &[0, 0, 1]).is_err());
        assert!(apply_permutation(&mut data, &[0, 1, 3]).is_err());
        assert_eq!(data, vec![1, 2, 3]);
    }
}
