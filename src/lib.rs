//! `csv-processor` loads a CSV file into memory and runs, in a fixed order, an optional row
//! filter, an optional sort and an optional column aggregate over it.
//!
//! Cells are kept as raw text and typed lazily: each stage infers an integer, float or string
//! [`types::Scalar`] from the cells it touches, with one set of comparison rules shared by all
//! stages.
//!
//! ## Quick example
//!
//! ```no_run
//! use csv_processor::pipeline::process;
//! use csv_processor::types::PipelineOutput;
//!
//! # fn main() -> Result<(), csv_processor::ProcessingError> {
//! // filter → sort → aggregate; absent stages pass the table through.
//! let out = process("products.csv", Some("brand=apple"), None, Some("price=avg"))?;
//! if let PipelineOutput::Scalar(avg) = out {
//!     println!("average price {avg:.2}");
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Expressions
//!
//! - `where`: `column OP value` with `OP` in `>= <= != > < =`. String equality is
//!   case-insensitive; ordering a number against a string is an error.
//! - `order_by`: `column=asc|desc`. Numbers sort before strings.
//! - `aggregate`: `column=avg|min|max` over a fully numeric column; always yields `f64`.
//!
//! ## Modules
//!
//! - [`types`]: table, rows and the inferred scalar
//! - [`expr`]: expression parsing and syntax validation
//! - [`ingestion`]: CSV loading
//! - [`processing`]: filter/sort/aggregate engines
//! - [`pipeline`]: stage registry, orchestration and observers
//! - [`render`], [`cli`]: the command shell used by the binary
//! - [`error`]: the error taxonomy and exit codes

pub mod cli;
pub mod error;
pub mod expr;
pub mod ingestion;
pub mod pipeline;
pub mod processing;
pub mod render;
pub mod types;

pub use error::{ErrorKind, ProcessingError, ProcessingResult, Severity};
pub use pipeline::process;
