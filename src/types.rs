//! Core data model: the untyped row store and the inferred [`Scalar`].
//!
//! A [`Table`] holds every row of a loaded file as raw text. Typing happens lazily: the
//! filter, sort and aggregate stages call [`Scalar::infer`] on the cells they touch and never
//! write the result back.

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

/// Ordered list of column names taken from the first line of the file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    /// Column names in file order.
    pub columns: Vec<String>,
}

impl Header {
    /// Create a header from column names.
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
        }
    }

    /// Iterate column names in order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(String::as_str)
    }

    /// Returns the index of a column by name, if present.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Number of columns.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// `true` if the file had no header line.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// One data line: raw cell text in header order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    cells: Vec<String>,
}

impl Row {
    /// Create a row from cell values in header order.
    pub fn new<I, S>(cells: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            cells: cells.into_iter().map(Into::into).collect(),
        }
    }

    /// Raw text of the cell at `idx`.
    pub fn get(&self, idx: usize) -> Option<&str> {
        self.cells.get(idx).map(String::as_str)
    }

    /// All cells in header order.
    pub fn cells(&self) -> &[String] {
        &self.cells
    }
}

/// In-memory table: a header shared by every row plus the rows in load (or sorted) order.
///
/// Tables are never mutated by the pipeline. Each stage builds a new table that shares the
/// header with its input.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    header: Arc<Header>,
    rows: Vec<Row>,
}

impl Table {
    /// Create a table, checking that every row has exactly the header's column count.
    ///
    /// # Panics
    ///
    /// Panics if a row's length differs from the header length.
    pub fn new(header: Header, rows: Vec<Row>) -> Self {
        let expected = header.len();
        for (idx, row) in rows.iter().enumerate() {
            assert!(
                row.cells.len() == expected,
                "row {idx} has {} cells but header has {expected} columns",
                row.cells.len()
            );
        }
        Self {
            header: Arc::new(header),
            rows,
        }
    }

    /// Build a table with the same header as `self` from a new row sequence.
    pub(crate) fn with_rows(&self, rows: Vec<Row>) -> Self {
        Self {
            header: Arc::clone(&self.header),
            rows,
        }
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Number of data rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Resolve a column name to its index, or fail with the list of available columns.
    pub fn require_column(&self, name: &str) -> crate::ProcessingResult<usize> {
        self.header
            .index_of(name)
            .ok_or_else(|| crate::ProcessingError::column_not_found(name, self.header.names()))
    }

    /// Raw text of `column` in `row`, looked up by name.
    pub fn cell<'a>(&self, row: &'a Row, column: &str) -> Option<&'a str> {
        self.header.index_of(column).and_then(|idx| row.get(idx))
    }

    /// Raw text of every row's cell in `column`, in row order.
    pub fn column_values(&self, column: &str) -> Option<Vec<&str>> {
        let idx = self.header.index_of(column)?;
        Some(self.rows.iter().map(|r| r.get(idx).unwrap_or("")).collect())
    }
}

/// The typed value inferred from one cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    /// 64-bit signed integer.
    Int(i64),
    /// 64-bit float.
    Float(f64),
    /// Anything that is not numeric, whitespace-trimmed.
    Str(String),
}

impl Scalar {
    /// Infer a scalar from raw cell text. Never fails: non-numeric text becomes [`Scalar::Str`].
    ///
    /// ```
    /// use csv_processor::types::Scalar;
    ///
    /// assert_eq!(Scalar::infer(" 100 "), Scalar::Int(100));
    /// assert_eq!(Scalar::infer("3.14"), Scalar::Float(3.14));
    /// assert_eq!(Scalar::infer("12.3.4"), Scalar::Str("12.3.4".to_string()));
    /// ```
    pub fn infer(raw: &str) -> Self {
        let token = raw.trim();
        if is_integer_token(token) {
            if let Ok(v) = token.parse::<i64>() {
                return Scalar::Int(v);
            }
        }
        match token.parse::<f64>() {
            Ok(v) => Scalar::Float(v),
            Err(_) => Scalar::Str(token.to_owned()),
        }
    }

    /// `true` for [`Scalar::Int`] and [`Scalar::Float`].
    pub fn is_numeric(&self) -> bool {
        matches!(self, Scalar::Int(_) | Scalar::Float(_))
    }

    /// Numeric value widened to f64; `None` for strings.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Scalar::Int(v) => Some(*v as f64),
            Scalar::Float(v) => Some(*v),
            Scalar::Str(_) => None,
        }
    }

    /// Short name of the inferred kind, for error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Scalar::Int(_) => "integer",
            Scalar::Float(_) => "float",
            Scalar::Str(_) => "string",
        }
    }

    /// Native ordering used by filter comparisons.
    ///
    /// Integers and floats compare numerically with each other, strings compare
    /// lexicographically. Returns `None` when the comparison cannot be performed: a numeric
    /// against a string, or a NaN operand.
    pub fn compare(&self, other: &Scalar) -> Option<Ordering> {
        match (self, other) {
            (Scalar::Int(a), Scalar::Int(b)) => Some(a.cmp(b)),
            (Scalar::Str(a), Scalar::Str(b)) => Some(a.cmp(b)),
            (Scalar::Str(_), _) | (_, Scalar::Str(_)) => None,
            (a, b) => a.as_f64()?.partial_cmp(&b.as_f64()?),
        }
    }

    /// Total order used by sorting.
    ///
    /// Every numeric sorts before every string. Two integers compare exactly; any pair
    /// involving a float uses [`f64::total_cmp`] with the integer widened (so NaN sorts after
    /// infinity). Strings compare by bytes.
    pub fn total_cmp(&self, other: &Scalar) -> Ordering {
        match (self, other) {
            (Scalar::Int(a), Scalar::Int(b)) => a.cmp(b),
            (Scalar::Str(a), Scalar::Str(b)) => a.cmp(b),
            (Scalar::Str(_), _) => Ordering::Greater,
            (_, Scalar::Str(_)) => Ordering::Less,
            (a, b) => {
                let (a, b) = (a.as_f64().unwrap_or(f64::NAN), b.as_f64().unwrap_or(f64::NAN));
                a.total_cmp(&b)
            }
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Int(v) => write!(f, "{v}"),
            Scalar::Float(v) => write!(f, "{v}"),
            Scalar::Str(s) => f.write_str(s),
        }
    }
}

fn is_integer_token(token: &str) -> bool {
    let digits = token.strip_prefix('-').unwrap_or(token);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

/// Result of running the pipeline: either the (possibly filtered/sorted) table, or the single
/// value produced by an aggregate stage.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineOutput {
    Table(Table),
    Scalar(f64),
}

impl PipelineOutput {
    pub fn as_table(&self) -> Option<&Table> {
        match self {
            PipelineOutput::Table(t) => Some(t),
            PipelineOutput::Scalar(_) => None,
        }
    }

    pub fn as_scalar(&self) -> Option<f64> {
        match self {
            PipelineOutput::Table(_) => None,
            PipelineOutput::Scalar(v) => Some(*v),
        }
    }

    pub fn into_table(self) -> Option<Table> {
        match self {
            PipelineOutput::Table(t) => Some(t),
            PipelineOutput::Scalar(_) => None,
        }
    }
}
