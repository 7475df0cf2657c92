//! Row filtering for [`crate::types::Table`].

use std::cmp::Ordering;

use crate::error::{ProcessingError, ProcessingResult};
use crate::expr::{parse_condition, CompareOp, Condition};
use crate::types::{Scalar, Table};

/// Returns a new [`Table`] containing only rows that satisfy `condition` (`column OP value`).
///
/// An empty table or an empty condition returns the input unchanged, before any parsing.
/// Surviving rows keep their relative order.
pub fn filter(table: &Table, condition: &str) -> ProcessingResult<Table> {
    if condition.is_empty() || table.is_empty() {
        return Ok(table.clone());
    }
    let condition = parse_condition(condition)?;
    filter_by(table, &condition)
}

/// Like [`filter`], with an already parsed [`Condition`].
pub fn filter_by(table: &Table, condition: &Condition) -> ProcessingResult<Table> {
    let idx = table.require_column(&condition.column)?;
    let literal = Scalar::infer(&condition.literal);

    let mut rows = Vec::new();
    for (row_idx, row) in table.rows().iter().enumerate() {
        let value = Scalar::infer(row.get(idx).unwrap_or(""));
        let keep = matches(&value, condition.op, &literal).map_err(|message| {
            ProcessingError::filter(format!(
                "Error comparing values in row {}: {message}",
                row_idx + 1
            ))
        })?;
        if keep {
            rows.push(row.clone());
        }
    }

    Ok(table.with_rows(rows))
}

/// Evaluate `value OP literal`.
///
/// Two strings under `=`/`!=` compare case-insensitively. Equality across a numeric and a
/// string is simply false; ordering across them is an error.
fn matches(value: &Scalar, op: CompareOp, literal: &Scalar) -> Result<bool, String> {
    if let (Scalar::Str(a), Scalar::Str(b), true) = (value, literal, op.is_equality()) {
        let equal = a.to_lowercase() == b.to_lowercase();
        return Ok(equal == (op == CompareOp::Eq));
    }

    let ordering = value.compare(literal);
    let result = match op {
        CompareOp::Eq => ordering == Some(Ordering::Equal),
        CompareOp::Ne => ordering != Some(Ordering::Equal),
        CompareOp::Gt | CompareOp::Lt | CompareOp::Ge | CompareOp::Le => {
            if value.is_numeric() != literal.is_numeric() {
                return Err(format!(
                    "'{op}' not supported between {} '{value}' and {} '{literal}'",
                    value.kind_name(),
                    literal.kind_name()
                ));
            }
            match (op, ordering) {
                (_, None) => false,
                (CompareOp::Gt, Some(o)) => o == Ordering::Greater,
                (CompareOp::Lt, Some(o)) => o == Ordering::Less,
                (CompareOp::Ge, Some(o)) => o != Ordering::Less,
                (CompareOp::Le, Some(o)) => o != Ordering::Greater,
                _ => unreachable!("equality operators handled above"),
            }
        }
    };
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::filter;
    use crate::error::ErrorKind;
    use crate::types::{Header, Row, Table};

    fn sample_table() -> Table {
        Table::new(
            Header::new(["name", "brand", "price", "rating"]),
            vec![
                Row::new(["iphone 15 pro", "apple", "999", "4.9"]),
                Row::new(["galaxy s23 ultra", "samsung", "1199", "4.8"]),
                Row::new(["redmi note 12", "xiaomi", "199", "4.6"]),
                Row::new(["iphone 14", "Apple", "799", "4.7"]),
                Row::new(["poco x5 pro", "xiaomi", "299", "4.4"]),
            ],
        )
    }

    fn names(table: &Table) -> Vec<String> {
        table
            .column_values("name")
            .unwrap()
            .into_iter()
            .map(str::to_owned)
            .collect()
    }

    #[test]
    fn numeric_comparisons() {
        let t = sample_table();
        assert_eq!(
            names(&filter(&t, "price>500").unwrap()),
            vec!["iphone 15 pro", "galaxy s23 ultra", "iphone 14"]
        );
        assert_eq!(
            names(&filter(&t, "price<=299").unwrap()),
            vec!["redmi note 12", "poco x5 pro"]
        );
        assert_eq!(names(&filter(&t, "rating>=4.8").unwrap()).len(), 2);
        assert_eq!(names(&filter(&t, "price=799.0").unwrap()), vec!["iphone 14"]);
        assert_eq!(filter(&t, "price!=999").unwrap().row_count(), 4);
    }

    #[test]
    fn string_equality_is_case_insensitive() {
        let t = sample_table();
        let lower = filter(&t, "brand=apple").unwrap();
        let upper = filter(&t, "brand=APPLE").unwrap();
        assert_eq!(lower, upper);
        assert_eq!(names(&lower), vec!["iphone 15 pro", "iphone 14"]);
        assert_eq!(filter(&t, "brand!=Apple").unwrap().row_count(), 3);
    }

    #[test]
    fn string_ordering_is_lexicographic() {
        let t = sample_table();
        assert_eq!(
            names(&filter(&t, "brand>s").unwrap()),
            vec!["galaxy s23 ultra", "redmi note 12", "poco x5 pro"]
        );
    }

    #[test]
    fn equality_across_kinds_is_false_not_an_error() {
        let t = sample_table();
        assert!(filter(&t, "brand=100").unwrap().is_empty());
        assert_eq!(filter(&t, "price!=cheap").unwrap().row_count(), 5);
    }

    #[test]
    fn ordering_across_kinds_is_a_filter_error() {
        let t = sample_table();
        let err = filter(&t, "brand>100").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Filter);
        assert!(err.to_string().contains("row 1"));
    }

    #[test]
    fn stable_and_idempotent() {
        let t = sample_table();
        let once = filter(&t, "rating<4.9").unwrap();
        let twice = filter(&once, "rating<4.9").unwrap();
        assert_eq!(once, twice);
        assert_eq!(
            names(&once),
            vec!["galaxy s23 ultra", "redmi note 12", "iphone 14", "poco x5 pro"]
        );
    }

    #[test]
    fn empty_inputs_short_circuit() {
        let t = sample_table();
        assert_eq!(filter(&t, "").unwrap(), t);

        let empty = Table::new(Header::new(["name"]), vec![]);
        // Neither the column nor the operator is checked.
        assert_eq!(filter(&empty, "missing>1").unwrap(), empty);
        assert_eq!(filter(&empty, "garbage").unwrap(), empty);
    }

    #[test]
    fn missing_column_lists_header() {
        let err = filter(&sample_table(), "cost>1").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ColumnNotFound);
        assert_eq!(
            err.to_string(),
            "Column 'cost' not found. Available columns: name, brand, price, rating"
        );
    }

    #[test]
    fn missing_operator_is_a_filter_error() {
        let err = filter(&sample_table(), "price").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Filter);
    }
}
