use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::error::{ProcessingError, Severity};

/// Context about one pipeline run.
#[derive(Debug, Clone, Default)]
pub struct PipelineContext {
    /// Source file, when the table was loaded from a path.
    pub path: Option<PathBuf>,
}

impl PipelineContext {
    fn source(&self) -> String {
        self.path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "<memory>".to_string())
    }
}

/// Stats reported once the source file has been read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadStats {
    pub rows: usize,
    pub columns: usize,
}

/// What a stage produced.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StageOutcome {
    Rows(usize),
    Scalar(f64),
}

/// Stats reported after each stage that ran.
#[derive(Debug, Clone, PartialEq)]
pub struct StageStats {
    pub stage: String,
    pub input_rows: usize,
    pub outcome: StageOutcome,
    pub elapsed: Duration,
}

/// Observer interface for pipeline progress and failures.
///
/// All callbacks default to no-ops.
pub trait PipelineObserver: Send + Sync {
    /// Called after the source file has been loaded.
    fn on_loaded(&self, _ctx: &PipelineContext, _stats: LoadStats) {}

    /// Called after a stage succeeded.
    fn on_stage_finished(&self, _ctx: &PipelineContext, _stats: &StageStats) {}

    /// Called when loading (`stage == None`) or a stage failed.
    fn on_failure(
        &self,
        _ctx: &PipelineContext,
        _stage: Option<&str>,
        _severity: Severity,
        _error: &ProcessingError,
    ) {
    }
}

/// An observer that fans out callbacks to a list of observers.
#[derive(Default)]
pub struct CompositeObserver {
    observers: Vec<Arc<dyn PipelineObserver>>,
}

impl CompositeObserver {
    pub fn new(observers: Vec<Arc<dyn PipelineObserver>>) -> Self {
        Self { observers }
    }
}

impl fmt::Debug for CompositeObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeObserver")
            .field("observers_len", &self.observers.len())
            .finish()
    }
}

impl PipelineObserver for CompositeObserver {
    fn on_loaded(&self, ctx: &PipelineContext, stats: LoadStats) {
        for o in &self.observers {
            o.on_loaded(ctx, stats);
        }
    }

    fn on_stage_finished(&self, ctx: &PipelineContext, stats: &StageStats) {
        for o in &self.observers {
            o.on_stage_finished(ctx, stats);
        }
    }

    fn on_failure(
        &self,
        ctx: &PipelineContext,
        stage: Option<&str>,
        severity: Severity,
        error: &ProcessingError,
    ) {
        for o in &self.observers {
            o.on_failure(ctx, stage, severity, error);
        }
    }
}

/// Forwards pipeline events to the [`log`] facade.
///
/// Loads are logged at `info`, stages at `debug`. Failures go through [`failure_level`]: the
/// command shell already reports user errors on stderr, so only critical ones log above `debug`.
#[derive(Debug, Default)]
pub struct LogObserver;

impl PipelineObserver for LogObserver {
    fn on_loaded(&self, ctx: &PipelineContext, stats: LoadStats) {
        log::info!(
            "loaded source={} rows={} columns={}",
            ctx.source(),
            stats.rows,
            stats.columns
        );
    }

    fn on_stage_finished(&self, ctx: &PipelineContext, stats: &StageStats) {
        match stats.outcome {
            StageOutcome::Rows(rows) => log::debug!(
                "stage={} source={} rows_in={} rows_out={rows} elapsed={:?}",
                stats.stage,
                ctx.source(),
                stats.input_rows,
                stats.elapsed
            ),
            StageOutcome::Scalar(value) => log::debug!(
                "stage={} source={} rows_in={} value={value} elapsed={:?}",
                stats.stage,
                ctx.source(),
                stats.input_rows,
                stats.elapsed
            ),
        }
    }

    fn on_failure(
        &self,
        ctx: &PipelineContext,
        stage: Option<&str>,
        severity: Severity,
        error: &ProcessingError,
    ) {
        log::log!(
            failure_level(severity),
            "failed stage={} source={} code={} err={error}",
            stage.unwrap_or("load"),
            ctx.source(),
            error.code()
        );
    }
}

/// Log level for a failure of the given severity.
fn failure_level(severity: Severity) -> log::Level {
    match severity {
        Severity::Error => log::Level::Debug,
        Severity::Critical => log::Level::Error,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    #[derive(Default)]
    struct Recording {
        events: Mutex<Vec<String>>,
    }

    impl PipelineObserver for Recording {
        fn on_loaded(&self, _ctx: &PipelineContext, stats: LoadStats) {
            self.events
                .lock()
                .unwrap()
                .push(format!("loaded {}", stats.rows));
        }

        fn on_stage_finished(&self, _ctx: &PipelineContext, stats: &StageStats) {
            self.events
                .lock()
                .unwrap()
                .push(format!("stage {}", stats.stage));
        }

        fn on_failure(
            &self,
            _ctx: &PipelineContext,
            stage: Option<&str>,
            severity: Severity,
            error: &ProcessingError,
        ) {
            self.events.lock().unwrap().push(format!(
                "failed {} {severity:?} {}",
                stage.unwrap_or("load"),
                error.code()
            ));
        }
    }

    #[test]
    fn composite_forwards_every_callback_to_each_observer() {
        let first = Arc::new(Recording::default());
        let second = Arc::new(Recording::default());
        let composite = CompositeObserver::new(vec![first.clone() as Arc<dyn PipelineObserver>, second.clone()]);
        let ctx = PipelineContext::default();

        composite.on_loaded(
            &ctx,
            LoadStats {
                rows: 3,
                columns: 2,
            },
        );
        composite.on_stage_finished(
            &ctx,
            &StageStats {
                stage: "where".to_string(),
                input_rows: 3,
                outcome: StageOutcome::Rows(1),
                elapsed: Duration::ZERO,
            },
        );
        let err = ProcessingError::sort("bad");
        composite.on_failure(&ctx, Some("order_by"), err.severity(), &err);

        let expected = vec!["loaded 3", "stage where", "failed order_by Error 501"];
        assert_eq!(*first.events.lock().unwrap(), expected);
        assert_eq!(*second.events.lock().unwrap(), expected);
        assert_eq!(format!("{composite:?}"), "CompositeObserver { observers_len: 2 }");
    }

    #[test]
    fn user_errors_log_at_debug() {
        assert_eq!(failure_level(Severity::Error), log::Level::Debug);
        assert_eq!(failure_level(Severity::Critical), log::Level::Error);
    }

    #[test]
    fn context_without_path_reports_memory_source() {
        assert_eq!(PipelineContext::default().source(), "<memory>");
    }
}
