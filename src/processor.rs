//! Row processor: drives the cell pipeline over every data row of a sheet.
//!
//! A [`Processor`] is built once per record type (the schema is derived at construction) and can
//! parse any number of sources. Each parse:
//!
//! 1. validates the [`RowLayout`] and decodes the full row matrix from the [`RowSource`]
//! 2. resolves the header row against the schema (extra columns are ignored)
//! 3. for every data row, clones the template record and runs each mapped cell through
//!    [`crate::transform`], then [`Record::validate_row`] when custom validation is on
//! 4. accepts rows without messages and rejects the rest into the [`ParseReport`]
//!
//! Any [`MappingError`] aborts the whole parse and no report is returned.

use std::fmt;
use std::sync::Arc;

use rayon::prelude::*;

use crate::error::{MappingError, MappingResult};
use crate::ingestion::observability::{ParseContext, ParseObserver, ParseSeverity, ParseStats};
use crate::ingestion::{RowMatrix, RowSource};
use crate::report::{ErrorCatalog, ParseReport, RowErrors};
use crate::schema::{DuplicateHeaders, FieldSpec, Record, Schema};
use crate::transform::{UniquenessIndex, apply_cell};

/// Data row cap applied by [`ProcessorOptions::default`].
pub const DEFAULT_MAX_DATA_ROWS: usize = 500;

/// 1-based positions of the header row and the first data row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowLayout {
    header_row: usize,
    data_start_row: usize,
}

impl RowLayout {
    /// Requires `1 <= header_row < data_start_row`.
    pub fn new(header_row: usize, data_start_row: usize) -> MappingResult<Self> {
        if header_row < 1 {
            return Err(MappingError::InvalidLayout {
                message: "no header row specified (rows are numbered from 1)".to_string(),
            });
        }
        if header_row >= data_start_row {
            return Err(MappingError::InvalidLayout {
                message: format!(
                    "header row {header_row} must come before the first data row {data_start_row}"
                ),
            });
        }
        Ok(Self {
            header_row,
            data_start_row,
        })
    }

    pub fn header_row(&self) -> usize {
        self.header_row
    }

    pub fn data_start_row(&self) -> usize {
        self.data_start_row
    }
}

/// How data rows are processed within one parse.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Execution {
    /// One row after another on the calling thread (default).
    #[default]
    Sequential,
    /// Rows are spread over a dedicated rayon pool. `None` lets rayon pick the thread count.
    ///
    /// The uniqueness index is fully built before rows start, and accepted records keep sheet
    /// order.
    Parallel { num_threads: Option<usize> },
}

/// Options controlling processor behavior.
///
/// Use [`Default`] for common cases.
#[derive(Clone)]
pub struct ProcessorOptions {
    /// Run [`Record::validate_row`] after each row is built.
    pub custom_validation: bool,
    /// Maximum number of data rows per parse. `None` disables the cap.
    pub max_data_rows: Option<usize>,
    /// Policy for two fields declaring the same header.
    pub duplicate_headers: DuplicateHeaders,
    pub execution: Execution,
    /// Templates behind [`RowErrors::add_error`].
    pub catalog: ErrorCatalog,
    /// Optional observer for logging/alerts.
    pub observer: Option<Arc<dyn ParseObserver>>,
    /// Severity threshold at which `on_alert` is invoked.
    pub alert_at_or_above: ParseSeverity,
}

impl fmt::Debug for ProcessorOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcessorOptions")
            .field("custom_validation", &self.custom_validation)
            .field("max_data_rows", &self.max_data_rows)
            .field("duplicate_headers", &self.duplicate_headers)
            .field("execution", &self.execution)
            .field("catalog", &self.catalog)
            .field("observer_set", &self.observer.is_some())
            .field("alert_at_or_above", &self.alert_at_or_above)
            .finish()
    }
}

impl Default for ProcessorOptions {
    fn default() -> Self {
        Self {
            custom_validation: false,
            max_data_rows: Some(DEFAULT_MAX_DATA_ROWS),
            duplicate_headers: DuplicateHeaders::default(),
            execution: Execution::default(),
            catalog: ErrorCatalog::default(),
            observer: None,
            alert_at_or_above: ParseSeverity::Critical,
        }
    }
}

enum RowOutcome<R> {
    Accepted(R),
    Rejected { row: usize, messages: Vec<String> },
}

/// Maps sheet rows into records of type `R`.
pub struct Processor<R: Record> {
    template: R,
    schema: Schema<R>,
    options: ProcessorOptions,
}

impl<R: Record> Processor<R> {
    /// Build a processor with default options.
    ///
    /// Every row starts as a clone of `template`, so values set on it (timestamps, owner ids)
    /// carry into every record.
    pub fn new(template: R, custom_validation: bool) -> MappingResult<Self> {
        Self::with_options(
            template,
            ProcessorOptions {
                custom_validation,
                ..ProcessorOptions::default()
            },
        )
    }

    pub fn with_options(template: R, options: ProcessorOptions) -> MappingResult<Self> {
        let schema = Schema::build(options.duplicate_headers)?;
        Ok(Self {
            template,
            schema,
            options,
        })
    }

    pub fn schema(&self) -> &Schema<R> {
        &self.schema
    }

    pub fn template(&self) -> &R {
        &self.template
    }

    pub fn options(&self) -> &ProcessorOptions {
        &self.options
    }

    /// Parse `source` with the header on row `header_row` and data from `data_start_row` on.
    ///
    /// When an observer is configured, this reports:
    ///
    /// - `on_row_rejected` for every rejected row, then `on_success` with row counts
    /// - `on_failure` on failure, with a computed severity
    /// - `on_alert` on failure when the computed severity is >= `options.alert_at_or_above`
    pub fn parse(
        &self,
        source: impl RowSource,
        header_row: usize,
        data_start_row: usize,
    ) -> MappingResult<ParseReport<R>> {
        let ctx = ParseContext {
            record_type: std::any::type_name::<R>(),
            source: source.label(),
        };
        let result = RowLayout::new(header_row, data_start_row)
            .and_then(|layout| self.parse_rows(source.into_rows()?, layout));
        self.notify(&ctx, &result);
        result
    }

    fn parse_rows(&self, rows: RowMatrix, layout: RowLayout) -> MappingResult<ParseReport<R>> {
        if rows.len() < layout.data_start_row {
            return Err(MappingError::EmptySheet {
                rows: rows.len(),
                data_start_row: layout.data_start_row,
            });
        }
        let first = layout.data_start_row - 1;
        let data_rows = rows.len() - first;
        if let Some(limit) = self.options.max_data_rows {
            if data_rows > limit {
                return Err(MappingError::TooManyRows {
                    rows: data_rows,
                    limit,
                });
            }
        }

        let columns: Vec<Option<&FieldSpec<R>>> = rows[layout.header_row - 1]
            .iter()
            .map(|header| self.schema.get(header))
            .collect();
        let unique_columns = columns
            .iter()
            .enumerate()
            .filter(|(_, spec)| spec.is_some_and(|s| s.directive().unique))
            .map(|(column, _)| column);
        let uniqueness = UniquenessIndex::new(&rows, unique_columns);

        let process = |(offset, cells): (usize, &Vec<String>)| {
            self.process_row(first + offset + 1, cells, &columns, &uniqueness)
        };
        let outcomes: Vec<RowOutcome<R>> = match self.options.execution {
            Execution::Sequential => rows[first..]
                .iter()
                .enumerate()
                .map(process)
                .collect::<MappingResult<_>>()?,
            Execution::Parallel { num_threads } => {
                uniqueness.prime();
                let mut builder = rayon::ThreadPoolBuilder::new();
                if let Some(n) = num_threads {
                    builder = builder.num_threads(n);
                }
                let pool = builder.build()?;
                pool.install(|| {
                    rows[first..]
                        .par_iter()
                        .enumerate()
                        .map(process)
                        .collect::<MappingResult<_>>()
                })?
            }
        };

        let mut report = ParseReport::new(data_rows);
        for outcome in outcomes {
            match outcome {
                RowOutcome::Accepted(record) => report.accept(record),
                RowOutcome::Rejected { row, messages } => report.reject(row, messages),
            }
        }
        Ok(report)
    }

    fn process_row(
        &self,
        row: usize,
        cells: &[String],
        columns: &[Option<&FieldSpec<R>>],
        uniqueness: &UniquenessIndex<'_>,
    ) -> MappingResult<RowOutcome<R>> {
        let mut record = self.template.clone();
        let mut errors = RowErrors::new(row, &self.options.catalog);

        // Cells past the end of the header row have no column to map to.
        for (column, cell) in cells.iter().enumerate() {
            let Some(Some(spec)) = columns.get(column) else {
                continue;
            };
            apply_cell(spec, &mut record, column, cell, uniqueness, &mut errors)?;
        }

        if self.options.custom_validation {
            record.validate_row(&mut errors)?;
        }

        Ok(if errors.has_errors() {
            RowOutcome::Rejected {
                row,
                messages: errors.into_messages(),
            }
        } else {
            RowOutcome::Accepted(record)
        })
    }

    fn notify(&self, ctx: &ParseContext, result: &MappingResult<ParseReport<R>>) {
        let Some(obs) = self.options.observer.as_ref() else {
            return;
        };
        match result {
            Ok(report) => {
                for (row, errors) in report.errors() {
                    obs.on_row_rejected(ctx, *row, errors);
                }
                obs.on_success(
                    ctx,
                    ParseStats {
                        data_rows: report.data_rows(),
                        accepted: report.records().len(),
                        rejected: report.rejected_rows(),
                    },
                );
            }
            Err(e) => {
                let sev = ParseSeverity::of(e);
                obs.on_failure(ctx, sev, e);
                if sev >= self.options.alert_at_or_above {
                    obs.on_alert(ctx, sev, e);
                }
            }
        }
    }
}

impl<R: Record> fmt::Debug for Processor<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Processor")
            .field("record_type", &std::any::type_name::<R>())
            .field("schema", &self.schema)
            .field("options", &self.options)
            .finish()
    }
}
