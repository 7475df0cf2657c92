//! Column aggregation for [`crate::types::Table`].

use crate::error::{ProcessingError, ProcessingResult};
use crate::expr::{parse_aggregate_func, split_aggregate, AggregateFunc, AggregateSpec};
use crate::types::{Scalar, Table};

/// Reduce a column to a single value (`column=avg|min|max`).
///
/// - An empty table fails before the expression or the column is looked at.
/// - A missing column is reported before an unknown function name.
/// - Every cell must infer to a number; one non-numeric cell fails the whole aggregate.
/// - The result is always an `f64`, also for `min`/`max` over an integer column.
pub fn aggregate(table: &Table, spec: &str) -> ProcessingResult<f64> {
    if table.is_empty() {
        return Err(ProcessingError::aggregation("Cannot aggregate empty dataset"));
    }
    let (column, func) = split_aggregate(spec)?;
    table.require_column(&column)?;
    let func = parse_aggregate_func(&func)?;
    aggregate_by(table, &AggregateSpec { column, func })
}

/// Like [`aggregate`], with an already parsed [`AggregateSpec`].
pub fn aggregate_by(table: &Table, spec: &AggregateSpec) -> ProcessingResult<f64> {
    if table.is_empty() {
        return Err(ProcessingError::aggregation("Cannot aggregate empty dataset"));
    }
    let idx = table.require_column(&spec.column)?;

    let mut values = Vec::with_capacity(table.row_count());
    for row in table.rows() {
        let value = Scalar::infer(row.get(idx).unwrap_or(""))
            .as_f64()
            .ok_or_else(|| {
                ProcessingError::aggregation(format!(
                    "Column '{}' contains non-numeric values",
                    spec.column
                ))
            })?;
        values.push(value);
    }

    Ok(match spec.func {
        AggregateFunc::Avg => values.iter().sum::<f64>() / values.len() as f64,
        AggregateFunc::Min => values.iter().copied().fold(f64::INFINITY, f64::min),
        AggregateFunc::Max => values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
    })
}

#[cfg(test)]
mod tests {
    use super::aggregate;
    use crate::error::ErrorKind;
    use crate::types::{Header, Row, Table};

    fn products() -> Table {
        Table::new(
            Header::new(["name", "price", "rating"]),
            vec![
                Row::new(["iphone", "999", "4.9"]),
                Row::new(["redmi", "199", "4.6"]),
                Row::new(["poco", " 299 ", "4.4"]),
            ],
        )
    }

    #[test]
    fn avg_min_max() {
        let t = products();
        assert_eq!(aggregate(&t, "price=avg").unwrap(), 499.0);
        assert_eq!(aggregate(&t, "price=min").unwrap(), 199.0);
        assert_eq!(aggregate(&t, "price=max").unwrap(), 999.0);
        assert_eq!(aggregate(&t, "rating=MAX").unwrap(), 4.9);
        assert!((aggregate(&t, "rating=avg").unwrap() - 4.633_333).abs() < 1e-5);
    }

    #[test]
    fn mixed_int_and_float_cells() {
        let t = Table::new(
            Header::new(["v"]),
            vec![Row::new(["1"]), Row::new(["2.5"]), Row::new(["-3"])],
        );
        assert_eq!(aggregate(&t, "v=avg").unwrap(), 0.5 / 3.0);
        assert_eq!(aggregate(&t, "v=min").unwrap(), -3.0);
        assert_eq!(aggregate(&t, "v=max").unwrap(), 2.5);
    }

    #[test]
    fn non_numeric_column_is_rejected() {
        let err = aggregate(&products(), "name=avg").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Aggregation);
        assert!(err.to_string().contains("Column 'name' contains non-numeric values"));
    }

    #[test]
    fn one_blank_cell_fails_the_aggregate() {
        let t = Table::new(Header::new(["v"]), vec![Row::new(["1"]), Row::new([""])]);
        assert_eq!(aggregate(&t, "v=max").unwrap_err().kind(), ErrorKind::Aggregation);
    }

    #[test]
    fn empty_table_fails_before_column_lookup() {
        let t = Table::new(Header::new(["price"]), vec![]);
        let err = aggregate(&t, "missing=avg").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Aggregation);
        assert_eq!(
            err.to_string(),
            "Aggregation error: Cannot aggregate empty dataset"
        );
    }

    #[test]
    fn bad_expression_and_missing_column() {
        let t = products();
        assert_eq!(aggregate(&t, "price").unwrap_err().kind(), ErrorKind::Aggregation);
        assert_eq!(
            aggregate(&t, "price=sum").unwrap_err().kind(),
            ErrorKind::Aggregation
        );
        let err = aggregate(&t, "cost=avg").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ColumnNotFound);
        assert!(err.to_string().contains("Available columns: name, price, rating"));
    }

    #[test]
    fn missing_column_wins_over_unknown_function() {
        let err = aggregate(&products(), "cost=median").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ColumnNotFound);
        assert_eq!(
            err.to_string(),
            "Column 'cost' not found. Available columns: name, price, rating"
        );

        let err = aggregate(&products(), "price=median").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Aggregation error: Unsupported aggregation function: median"
        );
    }
}
