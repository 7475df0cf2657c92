//! Row ordering for [`crate::types::Table`].

use crate::error::ProcessingResult;
use crate::expr::{parse_sort, SortDirection, SortSpec};
use crate::types::{Scalar, Table};

/// Returns a new [`Table`] ordered by the inferred value of a column (`column=asc|desc`).
///
/// An empty table is returned unchanged, before the expression is parsed.
pub fn sort(table: &Table, spec: &str) -> ProcessingResult<Table> {
    if table.is_empty() {
        return Ok(table.clone());
    }
    let spec = parse_sort(spec)?;
    sort_by(table, &spec)
}

/// Like [`sort`], with an already parsed [`SortSpec`].
///
/// The sort is stable in both directions: rows with equal keys keep their input order, also
/// when sorting descending. Keys use [`Scalar::total_cmp`], so mixed columns never fail.
pub fn sort_by(table: &Table, spec: &SortSpec) -> ProcessingResult<Table> {
    let idx = table.require_column(&spec.column)?;

    let mut keyed: Vec<(Scalar, usize)> = table
        .rows()
        .iter()
        .enumerate()
        .map(|(pos, row)| (Scalar::infer(row.get(idx).unwrap_or("")), pos))
        .collect();

    match spec.direction {
        SortDirection::Asc => keyed.sort_by(|(a, _), (b, _)| a.total_cmp(b)),
        SortDirection::Desc => keyed.sort_by(|(a, _), (b, _)| b.total_cmp(a)),
    }

    let rows = keyed
        .into_iter()
        .map(|(_, pos)| table.rows()[pos].clone())
        .collect();
    Ok(table.with_rows(rows))
}
