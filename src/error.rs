use thiserror::Error;

/// Convenience result type for loading and pipeline operations.
pub type ProcessingResult<T> = Result<T, ProcessingError>;

/// Error type returned by every stage of the pipeline and by the command shell.
///
/// Each variant maps to a stable process exit code via [`ProcessingError::code`].
#[derive(Debug, Error)]
pub enum ProcessingError {
    /// The input path is missing or does not have a `.csv` extension.
    #[error("File error: {message}")]
    FileValidation { message: String },

    /// A `where`/`aggregate`/`order-by` expression is syntactically malformed.
    #[error("Argument error: {message}")]
    Argument { message: String },

    /// The filter operator could not be parsed, or a comparison could not be performed.
    #[error("Filter error: {message}")]
    Filter { message: String },

    /// Empty dataset, non-numeric column or unknown aggregation function.
    #[error("Aggregation error: {message}")]
    Aggregation { message: String },

    /// A referenced column is not part of the table header.
    #[error("{}", column_not_found_message(.column, .available))]
    ColumnNotFound {
        column: String,
        available: Vec<String>,
    },

    /// The sort expression is malformed.
    #[error("Sort error: {message}")]
    Sort { message: String },

    /// Underlying I/O error while reading the source file.
    #[error("Unexpected error: {0}")]
    Io(#[from] std::io::Error),

    /// The source file is not valid CSV (bad UTF-8, ragged rows, ...).
    #[error("Unexpected error: {0}")]
    Csv(#[from] csv::Error),

    /// Anything else.
    #[error("Unexpected error: {message}")]
    Unexpected { message: String },
}

/// Discriminant of [`ProcessingError`], used for exit-code mapping and matching in tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    FileValidation,
    Argument,
    Filter,
    Aggregation,
    ColumnNotFound,
    Sort,
    Unexpected,
}

impl ErrorKind {
    /// Process exit code reported by the command shell for this kind.
    pub fn code(self) -> i32 {
        match self {
            ErrorKind::FileValidation => 101,
            ErrorKind::Argument => 102,
            ErrorKind::Filter => 201,
            ErrorKind::Aggregation => 301,
            ErrorKind::ColumnNotFound => 401,
            ErrorKind::Sort => 501,
            ErrorKind::Unexpected => 99,
        }
    }

    /// Status the binary exits with. POSIX keeps only the low byte of a status, so codes above
    /// 255 wrap the same way a plain `exit(code)` would (401 exits as 145, 501 as 245).
    pub fn exit_status(self) -> u8 {
        (self.code() & 0xFF) as u8
    }
}

/// Severity classification used when reporting failures to observers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// The input or the expressions were wrong; rerunning with the same input fails the same way.
    Error,
    /// Infrastructure failure (I/O, undecodable file, internal inconsistency).
    Critical,
}

impl ProcessingError {
    pub(crate) fn file_validation(message: impl Into<String>) -> Self {
        Self::FileValidation {
            message: message.into(),
        }
    }

    pub(crate) fn argument(message: impl Into<String>) -> Self {
        Self::Argument {
            message: message.into(),
        }
    }

    pub(crate) fn filter(message: impl Into<String>) -> Self {
        Self::Filter {
            message: message.into(),
        }
    }

    pub(crate) fn aggregation(message: impl Into<String>) -> Self {
        Self::Aggregation {
            message: message.into(),
        }
    }

    pub(crate) fn sort(message: impl Into<String>) -> Self {
        Self::Sort {
            message: message.into(),
        }
    }

    pub(crate) fn unexpected(message: impl Into<String>) -> Self {
        Self::Unexpected {
            message: message.into(),
        }
    }

    pub(crate) fn column_not_found<'a>(
        column: impl Into<String>,
        available: impl IntoIterator<Item = &'a str>,
    ) -> Self {
        Self::ColumnNotFound {
            column: column.into(),
            available: available.into_iter().map(str::to_owned).collect(),
        }
    }

    /// The kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ProcessingError::FileValidation { .. } => ErrorKind::FileValidation,
            ProcessingError::Argument { .. } => ErrorKind::Argument,
            ProcessingError::Filter { .. } => ErrorKind::Filter,
            ProcessingError::Aggregation { .. } => ErrorKind::Aggregation,
            ProcessingError::ColumnNotFound { .. } => ErrorKind::ColumnNotFound,
            ProcessingError::Sort { .. } => ErrorKind::Sort,
            ProcessingError::Io(_) | ProcessingError::Csv(_) | ProcessingError::Unexpected { .. } => {
                ErrorKind::Unexpected
            }
        }
    }

    /// Process exit code for this error (see [`ErrorKind::code`]).
    pub fn code(&self) -> i32 {
        self.kind().code()
    }

    /// Process exit status for this error (see [`ErrorKind::exit_status`]).
    pub fn exit_status(&self) -> u8 {
        self.kind().exit_status()
    }

    /// Severity used by observers to pick a log level.
    pub fn severity(&self) -> Severity {
        match self {
            ProcessingError::Io(_) | ProcessingError::Unexpected { .. } => Severity::Critical,
            ProcessingError::Csv(err) => match err.kind() {
                ::csv::ErrorKind::Io(_) | ::csv::ErrorKind::Utf8 { .. } => Severity::Critical,
                _ => Severity::Error,
            },
            _ => Severity::Error,
        }
    }
}

fn column_not_found_message(column: &str, available: &[String]) -> String {
    if available.is_empty() {
        format!("Column '{column}' not found")
    } else {
        format!(
            "Column '{column}' not found. Available columns: {}",
            available.join(", ")
        )
    }
}
