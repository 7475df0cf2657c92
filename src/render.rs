//! Text rendering of a [`PipelineOutput`] for the command shell.

use clap::ValueEnum;
use serde::Serialize;
use serde_json::{Map, Value as JsonValue};

use crate::error::{ProcessingError, ProcessingResult};
use crate::expr::{AggregateFunc, AggregateSpec};
use crate::types::{PipelineOutput, Scalar, Table};

/// Printed instead of a grid when no row survived.
pub const NO_MATCHES: &str = "No matching records found";

/// Output format of the command shell.
#[derive(Debug, Clone, Copy, Default, ValueEnum, PartialEq, Eq)]
pub enum OutputFormat {
    /// Bordered text grid
    #[default]
    Grid,
    /// JSON (array of row objects, or an object for an aggregate)
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Align {
    Left,
    Right,
}

/// Render `output` in `format`.
///
/// `aggregate` names the aggregate that produced a scalar; it labels the value and is ignored
/// for tables.
pub fn render_output(
    output: &PipelineOutput,
    aggregate: Option<&AggregateSpec>,
    format: OutputFormat,
) -> ProcessingResult<String> {
    match (output, format) {
        (PipelineOutput::Table(t), OutputFormat::Grid) if t.is_empty() => Ok(NO_MATCHES.to_string()),
        (PipelineOutput::Table(t), OutputFormat::Grid) => Ok(render_table_grid(t)),
        (PipelineOutput::Table(t), OutputFormat::Json) => render_table_json(t),
        (PipelineOutput::Scalar(v), OutputFormat::Grid) => {
            let header = match aggregate {
                Some(spec) => format!("{} ({})", spec.column, spec.func.label()),
                None => "value".to_string(),
            };
            Ok(render_grid(&[header], &[vec![format!("{v:.2}")]], &[Align::Right]))
        }
        (PipelineOutput::Scalar(v), OutputFormat::Json) => render_scalar_json(aggregate, *v),
    }
}

/// Render a table as a bordered grid. Numeric columns are right-aligned.
pub fn render_table_grid(table: &Table) -> String {
    let headers = &table.header().columns;
    let rows: Vec<Vec<String>> = table.rows().iter().map(|r| r.cells().to_vec()).collect();
    let aligns: Vec<Align> = (0..headers.len())
        .map(|idx| {
            let numeric = rows.iter().all(|r| {
                let cell = r[idx].trim();
                cell.is_empty() || Scalar::infer(cell).is_numeric()
            });
            if numeric && !rows.is_empty() {
                Align::Right
            } else {
                Align::Left
            }
        })
        .collect();
    render_grid(headers, &rows, &aligns)
}

fn render_grid(headers: &[String], rows: &[Vec<String>], aligns: &[Align]) -> String {
    let widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(idx, h)| {
            rows.iter()
                .map(|r| display_width(&r[idx]))
                .chain(std::iter::once(display_width(h)))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let rule = |fill: char| {
        let mut line = String::from("+");
        for w in &widths {
            line.extend(std::iter::repeat_n(fill, w + 2));
            line.push('+');
        }
        line
    };
    let line = |cells: &[String]| {
        let mut out = String::from("|");
        for ((cell, w), align) in cells.iter().zip(&widths).zip(aligns) {
            let pad = w - display_width(cell);
            out.push(' ');
            match align {
                Align::Left => {
                    out.push_str(cell);
                    out.extend(std::iter::repeat_n(' ', pad));
                }
                Align::Right => {
                    out.extend(std::iter::repeat_n(' ', pad));
                    out.push_str(cell);
                }
            }
            out.push_str(" |");
        }
        out
    };

    let mut lines = vec![rule('-'), line(headers), rule('=')];
    for row in rows {
        lines.push(line(row));
        lines.push(rule('-'));
    }
    lines.join("\n")
}

fn display_width(s: &str) -> usize {
    s.chars().count()
}

fn render_table_json(table: &Table) -> ProcessingResult<String> {
    let rows: Vec<JsonValue> = table
        .rows()
        .iter()
        .map(|row| {
            let obj: Map<String, JsonValue> = table
                .header()
                .names()
                .zip(row.cells())
                .map(|(name, cell)| (name.to_owned(), JsonValue::String(cell.clone())))
                .collect();
            JsonValue::Object(obj)
        })
        .collect();
    to_json(&rows)
}

#[derive(Serialize)]
struct ScalarReport<'a> {
    column: Option<&'a str>,
    function: Option<AggregateFunc>,
    value: f64,
}

fn render_scalar_json(aggregate: Option<&AggregateSpec>, value: f64) -> ProcessingResult<String> {
    to_json(&ScalarReport {
        column: aggregate.map(|a| a.column.as_str()),
        function: aggregate.map(|a| a.func),
        value,
    })
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> ProcessingResult<String> {
    serde_json::to_string_pretty(value)
        .map_err(|e| ProcessingError::unexpected(format!("failed to encode JSON: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Header, Row};

    fn table() -> Table {
        Table::new(
            Header::new(["name", "price"]),
            vec![Row::new(["iphone", "999"]), Row::new(["redmi", "19"])],
        )
    }

    #[test]
    fn grid_layout() {
        let expected = "\
+--------+-------+
| name   | price |
+========+=======+
| iphone |   999 |
+--------+-------+
| redmi  |    19 |
+--------+-------+";
        assert_eq!(render_table_grid(&table()), expected);
    }

    #[test]
    fn empty_table_prints_no_matches() {
        let empty = Table::new(Header::new(["name"]), vec![]);
        let out = render_output(&PipelineOutput::Table(empty), None, OutputFormat::Grid).unwrap();
        assert_eq!(out, NO_MATCHES);
    }

    #[test]
    fn scalar_grid_uses_long_function_name_and_two_decimals() {
        let spec = AggregateSpec {
            column: "price".into(),
            func: AggregateFunc::Avg,
        };
        let out = render_output(&PipelineOutput::Scalar(200.0), Some(&spec), OutputFormat::Grid)
            .unwrap();
        let expected = "\
+-----------------+
| price (average) |
+=================+
|          200.00 |
+-----------------+";
        assert_eq!(out, expected);
    }

    #[test]
    fn json_keeps_header_order() {
        let out = render_output(&PipelineOutput::Table(table()), None, OutputFormat::Json).unwrap();
        let parsed: JsonValue = serde_json::from_str(&out).unwrap();
        let first = parsed[0].as_object().unwrap();
        assert_eq!(first.keys().collect::<Vec<_>>(), vec!["name", "price"]);
        assert_eq!(parsed[1]["price"], "19");
    }

    #[test]
    fn json_scalar_report() {
        let spec = AggregateSpec {
            column: "rating".into(),
            func: AggregateFunc::Max,
        };
        let out = render_output(&PipelineOutput::Scalar(4.9), Some(&spec), OutputFormat::Json)
            .unwrap();
        let parsed: JsonValue = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed["column"], "rating");
        assert_eq!(parsed["function"], "max");
        assert_eq!(parsed["value"], 4.9);
    }
}
