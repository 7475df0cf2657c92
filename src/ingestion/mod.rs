//! Loading the source file into a [`crate::types::Table`].
//!
//! - [`validate_source_path`] performs the checks the command shell runs before loading
//! - [`csv`] holds the reader itself

pub mod csv;

use std::path::Path;

use crate::error::{ProcessingError, ProcessingResult};

pub use self::csv::{load_csv_from_path, load_csv_from_reader, load_csv_from_str};

/// Check that `path` exists and carries a `.csv` extension (case-insensitive).
///
/// Existence is checked first, so a missing `data.txt` reports "File not found".
pub fn validate_source_path(path: impl AsRef<Path>) -> ProcessingResult<()> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(ProcessingError::file_validation(format!(
            "File not found: {}",
            path.display()
        )));
    }

    let is_csv = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
    if !is_csv {
        return Err(ProcessingError::file_validation("Only CSV files are supported"));
    }

    Ok(())
}
