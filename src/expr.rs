//! Parsing of the three stage expressions.
//!
//! - filter: `column OP value`, with `OP` one of `>= <= != > < =`
//! - aggregate: `column=avg|min|max`
//! - sort: `column=asc|desc`
//!
//! The `parse_*` functions are used by the stages themselves and report stage errors
//! (`Filter`, `Aggregation`, `Sort`). The `validate_*_syntax` functions are the stricter checks
//! the command shell runs before loading anything; they report `Argument` errors.

use std::fmt;

use serde::Serialize;

use crate::error::{ProcessingError, ProcessingResult};

/// Comparison operator of a filter condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Ge,
    Le,
    Ne,
    Gt,
    Lt,
    Eq,
}

impl CompareOp {
    /// Operators in match order. Two-character tokens come before their one-character prefixes.
    pub const ALL: [CompareOp; 6] = [
        CompareOp::Ge,
        CompareOp::Le,
        CompareOp::Ne,
        CompareOp::Gt,
        CompareOp::Lt,
        CompareOp::Eq,
    ];

    pub fn token(self) -> &'static str {
        match self {
            CompareOp::Ge => ">=",
            CompareOp::Le => "<=",
            CompareOp::Ne => "!=",
            CompareOp::Gt => ">",
            CompareOp::Lt => "<",
            CompareOp::Eq => "=",
        }
    }

    /// `true` for `=` and `!=`.
    pub fn is_equality(self) -> bool {
        matches!(self, CompareOp::Eq | CompareOp::Ne)
    }

    /// Find the first operator (in [`CompareOp::ALL`] order) that occurs anywhere in `input`.
    pub fn find_in(input: &str) -> Option<CompareOp> {
        Self::ALL.into_iter().find(|op| input.contains(op.token()))
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// A parsed filter expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Condition {
    pub column: String,
    pub op: CompareOp,
    /// Right-hand side, trimmed but otherwise untyped.
    pub literal: String,
}

/// Parse `column OP value`.
///
/// A string with no operator is a `Filter` error. A string that starts or ends with an operator
/// token is rejected as an `Argument` error, matching what the shell would have reported.
pub fn parse_condition(input: &str) -> ProcessingResult<Condition> {
    let op = CompareOp::find_in(input).ok_or_else(|| {
        ProcessingError::filter(format!("Invalid operator in condition: {input}"))
    })?;
    if touches_operator(input) {
        return Err(operator_placement_error(input));
    }

    let (column, literal) = input
        .split_once(op.token())
        .ok_or_else(|| ProcessingError::filter(format!("Invalid operator in condition: {input}")))?;

    Ok(Condition {
        column: column.trim().to_owned(),
        op,
        literal: literal.trim().to_owned(),
    })
}

/// Aggregation function of an aggregate expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AggregateFunc {
    Avg,
    Min,
    Max,
}

impl AggregateFunc {
    /// Parse a lower-cased function name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "avg" => Some(AggregateFunc::Avg),
            "min" => Some(AggregateFunc::Min),
            "max" => Some(AggregateFunc::Max),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            AggregateFunc::Avg => "avg",
            AggregateFunc::Min => "min",
            AggregateFunc::Max => "max",
        }
    }

    /// Long name used in rendered headers, e.g. `price (average)`.
    pub fn label(self) -> &'static str {
        match self {
            AggregateFunc::Avg => "average",
            AggregateFunc::Min => "minimum",
            AggregateFunc::Max => "maximum",
        }
    }
}

/// A parsed aggregate expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregateSpec {
    pub column: String,
    pub func: AggregateFunc,
}

/// Parse `column=function`. Function names are case-insensitive.
pub fn parse_aggregate(input: &str) -> ProcessingResult<AggregateSpec> {
    let (column, func) = split_aggregate(input)?;
    let func = parse_aggregate_func(&func)?;
    Ok(AggregateSpec { column, func })
}

/// First half of [`parse_aggregate`]: split into the column and the lower-cased function name.
pub(crate) fn split_aggregate(input: &str) -> ProcessingResult<(String, String)> {
    split_assignment(input).ok_or_else(|| {
        ProcessingError::aggregation(format!("Invalid aggregation format: {input}"))
    })
}

pub(crate) fn parse_aggregate_func(name: &str) -> ProcessingResult<AggregateFunc> {
    AggregateFunc::from_name(name).ok_or_else(|| {
        ProcessingError::aggregation(format!("Unsupported aggregation function: {name}"))
    })
}

/// Direction of a sort expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "asc" => Some(SortDirection::Asc),
            "desc" => Some(SortDirection::Desc),
            _ => None,
        }
    }
}

/// A parsed sort expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    pub column: String,
    pub direction: SortDirection,
}

/// Parse `column=asc|desc`. Directions are case-insensitive.
pub fn parse_sort(input: &str) -> ProcessingResult<SortSpec> {
    let (column, direction) = split_assignment(input).ok_or_else(|| {
        ProcessingError::sort(format!(
            "Invalid sort format: {input}. Use 'column=asc|desc'"
        ))
    })?;
    let direction = SortDirection::from_name(&direction).ok_or_else(|| {
        ProcessingError::sort(format!(
            "Invalid sort direction: {direction}. Use 'asc' or 'desc'"
        ))
    })?;
    Ok(SortSpec { column, direction })
}

/// Shell-side check of a filter expression.
pub fn validate_filter_syntax(input: &str) -> ProcessingResult<()> {
    if CompareOp::find_in(input).is_none() {
        return Err(ProcessingError::argument(format!(
            "Invalid filter format: '{input}'. Use operators: >, <, =, >=, <=, !=. Example: 'price>500'"
        )));
    }
    if touches_operator(input) {
        return Err(operator_placement_error(input));
    }
    Ok(())
}

/// Shell-side check of an aggregate expression.
pub fn validate_aggregate_syntax(input: &str) -> ProcessingResult<()> {
    let (column, func) = split_assignment(input).ok_or_else(|| {
        ProcessingError::argument(format!(
            "Invalid aggregation format: '{input}'. Use format: column=function. Example: 'price=avg'"
        ))
    })?;
    if column.is_empty() || func.is_empty() {
        return Err(ProcessingError::argument(format!(
            "Invalid aggregation format: '{input}'. Use format: column=function. Example: 'price=avg'"
        )));
    }
    if AggregateFunc::from_name(&func).is_none() {
        return Err(ProcessingError::argument(format!(
            "Unsupported aggregation function: '{func}'. Use: avg, min, max"
        )));
    }
    Ok(())
}

/// Shell-side check of a sort expression.
pub fn validate_sort_syntax(input: &str) -> ProcessingResult<()> {
    let (column, direction) = split_assignment(input).ok_or_else(|| {
        ProcessingError::argument(format!(
            "Invalid sort format: '{input}'. Use format: column=direction. Example: 'price=desc'"
        ))
    })?;
    if column.is_empty() || direction.is_empty() {
        return Err(ProcessingError::argument(format!(
            "Invalid sort format: '{input}'. Use format: column=direction. Example: 'price=desc'"
        )));
    }
    if SortDirection::from_name(&direction).is_none() {
        return Err(ProcessingError::argument(format!(
            "Unsupported sort direction: '{direction}'. Use: asc or desc"
        )));
    }
    Ok(())
}

/// Split on the first `=`; left side trimmed, right side trimmed and lower-cased.
fn split_assignment(input: &str) -> Option<(String, String)> {
    let (left, right) = input.split_once('=')?;
    Some((left.trim().to_owned(), right.trim().to_lowercase()))
}

fn touches_operator(input: &str) -> bool {
    CompareOp::ALL
        .iter()
        .any(|op| input.starts_with(op.token()) || input.ends_with(op.token()))
}

fn operator_placement_error(input: &str) -> ProcessingError {
    ProcessingError::argument(format!(
        "Invalid filter format: '{input}'. Operator should be between column name and value."
    ))
}
