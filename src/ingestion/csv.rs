//! CSV loading into the in-memory [`Table`].

use std::path::Path;

use crate::error::{ProcessingError, ProcessingResult};
use crate::types::{Header, Row, Table};

/// Load a CSV file into an in-memory [`Table`].
///
/// Rules:
///
/// - The first line is the header and defines the column names.
/// - Every data line must have the header's field count; a ragged line is an error.
/// - Cells are kept as raw text; typing happens later, per stage.
///
/// The file handle is owned by the reader and released when this function returns, on both the
/// success and the error path.
pub fn load_csv_from_path(path: impl AsRef<Path>, delimiter: u8) -> ProcessingResult<Table> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .delimiter(delimiter)
        .from_path(path)?;
    load_csv_from_reader(&mut rdr)
}

/// Load CSV data from an existing CSV reader.
pub fn load_csv_from_reader<R: std::io::Read>(rdr: &mut csv::Reader<R>) -> ProcessingResult<Table> {
    let header = Header::new(rdr.headers()?.iter());

    let mut rows = Vec::new();
    for (row_idx0, result) in rdr.records().enumerate() {
        let record = result?;
        if record.len() != header.len() {
            // Only reachable with a flexible reader; the default reader rejects ragged lines.
            return Err(ProcessingError::unexpected(format!(
                "line {} has {} fields but the header has {}",
                row_idx0 + 2,
                record.len(),
                header.len()
            )));
        }
        rows.push(Row::new(record.iter()));
    }

    Ok(Table::new(header, rows))
}

/// Load a CSV document held in memory, mostly useful for tests and embedding.
pub fn load_csv_from_str(input: &str, delimiter: u8) -> ProcessingResult<Table> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .delimiter(delimiter)
        .from_reader(input.as_bytes());
    load_csv_from_reader(&mut rdr)
}
