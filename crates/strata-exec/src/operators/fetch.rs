//! Positional fetch.

use strata_common::error::StrataResult;
use strata_common::types::RowId;
use strata_storage::column::Column;

/// Gathers `column[p]` for every `p` in `positions`.
pub fn fetch(column: &Column, positions: &[RowId]) -> StrataResult<Vec<i32>> {
    let mut out = Vec::with_capacity(positions.len());
    for &position in positions {
        out.push(column.get(position)?);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_common::config::EngineConfig;
    use strata_common::error::ErrorCode;
    use strata_storage::table::Table;

    #[test]
    fn test_fetch() {
        let mut table = Table::new("t", 1, EngineConfig::for_testing()).unwrap();
        table.add_column("a", false).unwrap();
        table
            .bulk_load(&[vec![10], vec![20], vec![30]])
            .unwrap();
        let column = table.column("a").unwrap();

        assert_eq!(fetch(column, &[2, 0, 2]).unwrap(), vec![30, 10, 30]);
        assert!(fetch(column, &[]).unwrap().is_empty());

        let err = fetch(column, &[0, 3]).unwrap_err();
        assert_eq!(err.code(), ErrorCode::PositionOutOfRange);
    }
}
