//! Pipeline orchestration: load once, then filter → sort → aggregate.
//!
//! Most callers should use [`process`], which loads a CSV file and runs each stage whose
//! argument is present. Stages are looked up by name in an [`OperationRegistry`], so an embedder
//! can replace a built-in stage, or register a new one and add it to [`StageArgs`], without
//! touching the orchestration.
//!
//! ```no_run
//! use csv_processor::pipeline::process;
//! use csv_processor::types::PipelineOutput;
//!
//! # fn main() -> Result<(), csv_processor::ProcessingError> {
//! match process("products.csv", Some("price>500"), Some("price=desc"), None)? {
//!     PipelineOutput::Table(t) => println!("rows={}", t.row_count()),
//!     PipelineOutput::Scalar(v) => println!("value={v}"),
//! }
//! # Ok(())
//! # }
//! ```

mod observability;

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use crate::error::{ProcessingError, ProcessingResult};
use crate::ingestion::load_csv_from_path;
use crate::processing::{aggregate, filter, sort};
use crate::types::{PipelineOutput, Table};

pub use observability::{
    CompositeObserver, LoadStats, LogObserver, PipelineContext, PipelineObserver, StageOutcome,
    StageStats,
};

/// Registry name of the filter stage.
pub const WHERE: &str = "where";
/// Registry name of the sort stage.
pub const ORDER_BY: &str = "order_by";
/// Registry name of the aggregate stage.
pub const AGGREGATE: &str = "aggregate";

/// A pipeline stage with a uniform contract: take the current table and the raw stage
/// argument, produce a table or a scalar.
pub trait Operation: Send + Sync {
    fn execute(&self, table: &Table, arg: &str) -> ProcessingResult<PipelineOutput>;
}

/// Built-in `where` stage.
#[derive(Debug, Default)]
pub struct FilterOperation;

impl Operation for FilterOperation {
    fn execute(&self, table: &Table, arg: &str) -> ProcessingResult<PipelineOutput> {
        filter(table, arg).map(PipelineOutput::Table)
    }
}

/// Built-in `order_by` stage.
#[derive(Debug, Default)]
pub struct SortOperation;

impl Operation for SortOperation {
    fn execute(&self, table: &Table, arg: &str) -> ProcessingResult<PipelineOutput> {
        sort(table, arg).map(PipelineOutput::Table)
    }
}

/// Built-in `aggregate` stage.
#[derive(Debug, Default)]
pub struct AggregateOperation;

impl Operation for AggregateOperation {
    fn execute(&self, table: &Table, arg: &str) -> ProcessingResult<PipelineOutput> {
        aggregate(table, arg).map(PipelineOutput::Scalar)
    }
}

/// Name-keyed lookup table of stage operations.
#[derive(Clone)]
pub struct OperationRegistry {
    ops: BTreeMap<String, Arc<dyn Operation>>,
}

impl OperationRegistry {
    /// A registry with no operations.
    pub fn empty() -> Self {
        Self {
            ops: BTreeMap::new(),
        }
    }

    /// A registry holding the three built-in stages.
    pub fn builtin() -> Self {
        let mut registry = Self::empty();
        registry.register(WHERE, FilterOperation);
        registry.register(ORDER_BY, SortOperation);
        registry.register(AGGREGATE, AggregateOperation);
        registry
    }

    /// Register (or replace) the operation stored under `name`.
    pub fn register(&mut self, name: impl Into<String>, op: impl Operation + 'static) {
        self.ops.insert(name.into(), Arc::new(op));
    }

    pub fn get(&self, name: &str) -> Option<&dyn Operation> {
        self.ops.get(name).map(|op| op.as_ref())
    }

    /// Registered names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.ops.keys().map(String::as_str)
    }
}

impl Default for OperationRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl fmt::Debug for OperationRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OperationRegistry")
            .field("names", &self.names().collect::<Vec<_>>())
            .finish()
    }
}

/// Options controlling a pipeline run.
///
/// Use [`Default`] for common cases: comma-delimited input, built-in stages, no observer.
#[derive(Clone)]
pub struct ProcessOptions {
    /// Field delimiter of the source file.
    pub delimiter: u8,
    /// Operations the stages are dispatched to.
    pub registry: OperationRegistry,
    /// Optional observer for logging.
    pub observer: Option<Arc<dyn PipelineObserver>>,
}

impl fmt::Debug for ProcessOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcessOptions")
            .field("delimiter", &(self.delimiter as char))
            .field("registry", &self.registry)
            .field("observer_set", &self.observer.is_some())
            .finish()
    }
}

impl Default for ProcessOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            registry: OperationRegistry::builtin(),
            observer: None,
        }
    }
}

/// The stage arguments of one run, in execution order.
///
/// [`StageArgs::new`] covers the built-in `where` → `order_by` → `aggregate` sequence. Stages
/// registered under other names are appended with [`StageArgs::then`] and run in the order they
/// were added.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StageArgs {
    stages: Vec<(String, String)>,
}

impl StageArgs {
    pub fn new(
        where_clause: Option<&str>,
        order_by: Option<&str>,
        aggregate: Option<&str>,
    ) -> Self {
        [
            (WHERE, where_clause),
            (ORDER_BY, order_by),
            (AGGREGATE, aggregate),
        ]
        .into_iter()
        .filter_map(|(name, arg)| arg.map(|a| (name, a)))
        .fold(Self::default(), |args, (name, arg)| args.then(name, arg))
    }

    /// Append a stage that runs after every stage added so far.
    pub fn then(mut self, name: impl Into<String>, arg: impl Into<String>) -> Self {
        self.stages.push((name.into(), arg.into()));
        self
    }

    /// `(stage name, argument)` pairs in execution order, skipping empty arguments.
    pub fn stages(&self) -> impl Iterator<Item = (&str, &str)> {
        self.stages
            .iter()
            .filter(|(_, arg)| !arg.is_empty())
            .map(|(name, arg)| (name.as_str(), arg.as_str()))
    }
}

/// Load `path` and run the stages whose argument is present, with default options.
///
/// Returns the scalar if an aggregate ran, otherwise the (possibly filtered/sorted) table.
pub fn process(
    path: impl AsRef<Path>,
    where_clause: Option<&str>,
    order_by: Option<&str>,
    aggregate: Option<&str>,
) -> ProcessingResult<PipelineOutput> {
    process_with_options(
        path,
        &StageArgs::new(where_clause, order_by, aggregate),
        &ProcessOptions::default(),
    )
}

/// Load `path` and run `stages` with explicit options.
///
/// When an observer is configured, this function reports `on_loaded` after reading the file,
/// `on_stage_finished` after each stage and `on_failure` for the first error.
pub fn process_with_options(
    path: impl AsRef<Path>,
    stages: &StageArgs,
    options: &ProcessOptions,
) -> ProcessingResult<PipelineOutput> {
    let path = path.as_ref();
    let ctx = PipelineContext {
        path: Some(path.to_path_buf()),
    };

    let table = match load_csv_from_path(path, options.delimiter) {
        Ok(table) => table,
        Err(e) => {
            report_failure(options, &ctx, None, &e);
            return Err(e);
        }
    };
    if let Some(obs) = options.observer.as_ref() {
        obs.on_loaded(
            &ctx,
            LoadStats {
                rows: table.row_count(),
                columns: table.header().len(),
            },
        );
    }

    run_stages_with_context(table, stages, options, &ctx)
}

/// Run `stages` against an already loaded table.
pub fn run_stages(
    table: Table,
    stages: &StageArgs,
    options: &ProcessOptions,
) -> ProcessingResult<PipelineOutput> {
    run_stages_with_context(table, stages, options, &PipelineContext::default())
}

fn run_stages_with_context(
    table: Table,
    stages: &StageArgs,
    options: &ProcessOptions,
    ctx: &PipelineContext,
) -> ProcessingResult<PipelineOutput> {
    let mut current = PipelineOutput::Table(table);

    for (name, arg) in stages.stages() {
        let result = run_stage(&options.registry, name, arg, current);
        current = match result {
            Ok((output, stats)) => {
                if let Some(obs) = options.observer.as_ref() {
                    obs.on_stage_finished(ctx, &stats);
                }
                output
            }
            Err(e) => {
                report_failure(options, ctx, Some(name), &e);
                return Err(e);
            }
        };
    }

    Ok(current)
}

fn run_stage(
    registry: &OperationRegistry,
    name: &str,
    arg: &str,
    input: PipelineOutput,
) -> ProcessingResult<(PipelineOutput, StageStats)> {
    let op = registry
        .get(name)
        .ok_or_else(|| ProcessingError::unexpected(format!("Unsupported operation: {name}")))?;
    let table = input.into_table().ok_or_else(|| {
        ProcessingError::unexpected(format!(
            "operation '{name}' cannot run after an aggregate"
        ))
    })?;

    let start = Instant::now();
    let output = op.execute(&table, arg)?;
    let outcome = match &output {
        PipelineOutput::Table(t) => StageOutcome::Rows(t.row_count()),
        PipelineOutput::Scalar(v) => StageOutcome::Scalar(*v),
    };
    let stats = StageStats {
        stage: name.to_owned(),
        input_rows: table.row_count(),
        outcome,
        elapsed: start.elapsed(),
    };
    Ok((output, stats))
}

fn report_failure(
    options: &ProcessOptions,
    ctx: &PipelineContext,
    stage: Option<&str>,
    error: &ProcessingError,
) {
    if let Some(obs) = options.observer.as_ref() {
        obs.on_failure(ctx, stage, error.severity(), error);
    }
}

/// Owned request object: source path, stage arguments and options.
#[derive(Debug, Clone)]
pub struct PipelineRequest {
    pub path: PathBuf,
    pub stages: StageArgs,
    pub options: ProcessOptions,
}

impl PipelineRequest {
    /// Execute the request by calling [`process_with_options`].
    pub fn run(&self) -> ProcessingResult<PipelineOutput> {
        process_with_options(&self.path, &self.stages, &self.options)
    }
}
