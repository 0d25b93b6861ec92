#[cfg(feature = "excel")]
use std::error::Error as StdError;
use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::MappingError;

/// Severity classification used for observer callbacks and alerting thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ParseSeverity {
    /// Informational event.
    Info,
    /// Non-fatal event (a rejected row).
    Warning,
    /// The parse failed.
    Error,
    /// The parse failed on I/O or other infrastructure problems.
    Critical,
}

impl ParseSeverity {
    /// Classify a fatal parse error.
    pub fn of(error: &MappingError) -> Self {
        match error {
            MappingError::Io(_) => ParseSeverity::Critical,
            MappingError::Csv(err) => match err.kind() {
                ::csv::ErrorKind::Io(_) => ParseSeverity::Critical,
                _ => ParseSeverity::Error,
            },
            #[cfg(feature = "excel")]
            MappingError::Excel(err) => {
                if error_chain_contains_io(err) {
                    ParseSeverity::Critical
                } else {
                    ParseSeverity::Error
                }
            }
            MappingError::ThreadPool(_) => ParseSeverity::Critical,
            MappingError::Json(_)
            | MappingError::MissingSheet { .. }
            | MappingError::Admission { .. }
            | MappingError::InvalidLayout { .. }
            | MappingError::EmptySheet { .. }
            | MappingError::TooManyRows { .. }
            | MappingError::DuplicateHeader { .. }
            | MappingError::UnsupportedField { .. }
            | MappingError::Validator { .. } => ParseSeverity::Error,
        }
    }
}

#[cfg(feature = "excel")]
fn error_chain_contains_io(e: &(dyn StdError + 'static)) -> bool {
    let mut cur: Option<&(dyn StdError + 'static)> = Some(e);
    while let Some(err) = cur {
        if err.is::<std::io::Error>() {
            return true;
        }
        cur = err.source();
    }
    false
}

/// What is being parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseContext {
    /// Type name of the target record.
    pub record_type: &'static str,
    /// [`super::RowSource::label`] of the input.
    pub source: String,
}

/// Counts reported on a successful parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseStats {
    pub data_rows: usize,
    pub accepted: usize,
    pub rejected: usize,
}

/// Observer interface for parse outcomes.
///
/// Implementors can record metrics, logs, or trigger alerts.
pub trait ParseObserver: Send + Sync {
    /// Called when a parse completes (possibly with rejected rows).
    fn on_success(&self, _ctx: &ParseContext, _stats: ParseStats) {}

    /// Called once per rejected row, in row order, before [`Self::on_success`].
    fn on_row_rejected(&self, _ctx: &ParseContext, _row: usize, _errors: &[String]) {}

    /// Called when the parse fails.
    fn on_failure(&self, _ctx: &ParseContext, _severity: ParseSeverity, _error: &MappingError) {}

    /// Called when a failure meets the alert threshold.
    ///
    /// Default behavior forwards to [`Self::on_failure`].
    fn on_alert(&self, ctx: &ParseContext, severity: ParseSeverity, error: &MappingError) {
        self.on_failure(ctx, severity, error)
    }
}

/// Fans callbacks out to a list of observers.
#[derive(Default)]
pub struct CompositeObserver {
    observers: Vec<Arc<dyn ParseObserver>>,
}

impl CompositeObserver {
    pub fn new(observers: Vec<Arc<dyn ParseObserver>>) -> Self {
        Self { observers }
    }
}

impl fmt::Debug for CompositeObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeObserver")
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl ParseObserver for CompositeObserver {
    fn on_success(&self, ctx: &ParseContext, stats: ParseStats) {
        for o in &self.observers {
            o.on_success(ctx, stats);
        }
    }

    fn on_row_rejected(&self, ctx: &ParseContext, row: usize, errors: &[String]) {
        for o in &self.observers {
            o.on_row_rejected(ctx, row, errors);
        }
    }

    fn on_failure(&self, ctx: &ParseContext, severity: ParseSeverity, error: &MappingError) {
        for o in &self.observers {
            o.on_failure(ctx, severity, error);
        }
    }

    fn on_alert(&self, ctx: &ParseContext, severity: ParseSeverity, error: &MappingError) {
        for o in &self.observers {
            o.on_alert(ctx, severity, error);
        }
    }
}

/// Logs parse events to stderr.
#[derive(Debug, Default)]
pub struct StdErrObserver;

impl ParseObserver for StdErrObserver {
    fn on_success(&self, ctx: &ParseContext, stats: ParseStats) {
        eprintln!(
            "[sheet][ok] record={} source={} rows={} accepted={} rejected={}",
            ctx.record_type, ctx.source, stats.data_rows, stats.accepted, stats.rejected
        );
    }

    fn on_row_rejected(&self, ctx: &ParseContext, row: usize, errors: &[String]) {
        eprintln!(
            "[sheet][row] source={} row={} errors={}",
            ctx.source,
            row,
            errors.join("; ")
        );
    }

    fn on_failure(&self, ctx: &ParseContext, severity: ParseSeverity, error: &MappingError) {
        eprintln!(
            "[sheet][{:?}] record={} source={} err={}",
            severity, ctx.record_type, ctx.source, error
        );
    }

    fn on_alert(&self, ctx: &ParseContext, severity: ParseSeverity, error: &MappingError) {
        eprintln!(
            "[ALERT][sheet][{:?}] record={} source={} err={}",
            severity, ctx.record_type, ctx.source, error
        );
    }
}

/// Appends parse events to a local log file.
#[derive(Debug)]
pub struct FileObserver {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileObserver {
    /// Writes are best-effort; failures to open or write the log file are ignored.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lock: Mutex::new(()),
        }
    }

    fn log_line(&self, line: &str) {
        let _guard = self.lock.lock().ok();
        if let Ok(mut f) = OpenOptions::new().create(true).append(true).open(&self.path) {
            let _ = writeln!(f, "{line}");
        }
    }
}

impl ParseObserver for FileObserver {
    fn on_success(&self, ctx: &ParseContext, stats: ParseStats) {
        self.log_line(&format!(
            "{} ok record={} source={} rows={} accepted={} rejected={}",
            unix_ts(),
            ctx.record_type,
            ctx.source,
            stats.data_rows,
            stats.accepted,
            stats.rejected
        ));
    }

    fn on_row_rejected(&self, ctx: &ParseContext, row: usize, errors: &[String]) {
        self.log_line(&format!(
            "{} row source={} row={} errors={}",
            unix_ts(),
            ctx.source,
            row,
            errors.join("; ")
        ));
    }

    fn on_failure(&self, ctx: &ParseContext, severity: ParseSeverity, error: &MappingError) {
        self.log_line(&format!(
            "{} fail severity={:?} record={} source={} err={}",
            unix_ts(),
            severity,
            ctx.record_type,
            ctx.source,
            error
        ));
    }

    fn on_alert(&self, ctx: &ParseContext, severity: ParseSeverity, error: &MappingError) {
        self.log_line(&format!(
            "{} ALERT severity={:?} record={} source={} err={}",
            unix_ts(),
            severity,
            ctx.record_type,
            ctx.source,
            error
        ));
    }
}

fn unix_ts() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
