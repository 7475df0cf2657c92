//! Command-line surface: argument parsing, pre-flight validation and the `run` entry point used
//! by the binary.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;

use crate::error::{ProcessingError, ProcessingResult};
use crate::expr::{
    parse_aggregate, validate_aggregate_syntax, validate_filter_syntax, validate_sort_syntax,
};
use crate::ingestion::validate_source_path;
use crate::pipeline::{process_with_options, LogObserver, ProcessOptions, StageArgs};
use crate::render::{render_output, OutputFormat};

/// Command-line arguments for csv-processor
#[derive(Parser, Debug, Clone)]
#[command(
    version,
    about = "Process CSV files with filtering, aggregation and sorting"
)]
pub struct Args {
    /// Path to CSV file
    #[arg(long = "file")]
    pub file: PathBuf,

    /// Filter condition (e.g. "price>500")
    #[arg(long = "where")]
    pub where_clause: Option<String>,

    /// Aggregation operation (e.g. "rating=avg")
    #[arg(long = "aggregate")]
    pub aggregate: Option<String>,

    /// Sorting operation (e.g. "price=desc")
    #[arg(long = "order-by")]
    pub order_by: Option<String>,

    /// Field delimiter of the input file
    #[arg(long = "delimiter", default_value_t = ',')]
    pub delimiter: char,

    /// Output format
    #[arg(long = "format", value_enum, default_value_t = OutputFormat::Grid)]
    pub format: OutputFormat,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Args {
    /// Checks run before anything is loaded: the file must exist and be a `.csv`, and each
    /// expression must be well-formed.
    pub fn validate(&self) -> ProcessingResult<()> {
        validate_source_path(&self.file)?;
        if !self.delimiter.is_ascii() {
            return Err(ProcessingError::argument(format!(
                "Delimiter must be a single ASCII character, got '{}'",
                self.delimiter
            )));
        }
        if let Some(w) = &self.where_clause {
            validate_filter_syntax(w)?;
        }
        if let Some(a) = &self.aggregate {
            validate_aggregate_syntax(a)?;
        }
        if let Some(o) = &self.order_by {
            validate_sort_syntax(o)?;
        }
        Ok(())
    }

    pub fn stage_args(&self) -> StageArgs {
        StageArgs::new(
            self.where_clause.as_deref(),
            self.order_by.as_deref(),
            self.aggregate.as_deref(),
        )
    }

    pub fn process_options(&self) -> ProcessOptions {
        ProcessOptions {
            delimiter: self.delimiter as u8,
            observer: Some(Arc::new(LogObserver)),
            ..Default::default()
        }
    }

    /// `log` filter implied by `-v`, or `None` to defer to `RUST_LOG`.
    pub fn log_level(&self) -> Option<log::LevelFilter> {
        match self.verbose {
            0 => None,
            1 => Some(log::LevelFilter::Info),
            _ => Some(log::LevelFilter::Debug),
        }
    }
}

/// Validate, run the pipeline and render the result.
pub fn run(args: &Args) -> ProcessingResult<String> {
    args.validate()?;
    let output = process_with_options(&args.file, &args.stage_args(), &args.process_options())?;
    let aggregate = args
        .aggregate
        .as_deref()
        .filter(|a| !a.is_empty())
        .map(parse_aggregate)
        .transpose()?;
    render_output(&output, aggregate.as_ref(), args.format)
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::Args;
    use crate::error::ErrorKind;
    use crate::render::OutputFormat;

    #[test]
    fn parses_all_flags() {
        let args = Args::try_parse_from([
            "csv-processor",
            "--file",
            "data.csv",
            "--where",
            "price>500",
            "--aggregate",
            "rating=avg",
            "--order-by",
            "price=desc",
            "--delimiter",
            ";",
            "--format",
            "json",
            "-vv",
        ])
        .unwrap();
        assert_eq!(args.where_clause.as_deref(), Some("price>500"));
        assert_eq!(args.aggregate.as_deref(), Some("rating=avg"));
        assert_eq!(args.order_by.as_deref(), Some("price=desc"));
        assert_eq!(args.delimiter, ';');
        assert_eq!(args.format, OutputFormat::Json);
        assert_eq!(args.log_level(), Some(log::LevelFilter::Debug));
        assert_eq!(args.process_options().delimiter, b';');
    }

    #[test]
    fn file_is_required() {
        assert!(Args::try_parse_from(["csv-processor", "--where", "a=1"]).is_err());
    }

    #[test]
    fn missing_file_fails_validation_first() {
        let args = Args::try_parse_from([
            "csv-processor",
            "--file",
            "definitely/not/here.csv",
            "--where",
            "bad",
        ])
        .unwrap();
        let err = args.validate().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::FileValidation);
        assert!(err.to_string().contains("File not found"));
    }
}
