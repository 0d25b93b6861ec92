//! `sheet-mapper` maps spreadsheet rows into typed records, driven by per-field annotations
//! instead of hand-written parsing code.
//!
//! A record type declares, per field, the column header it comes from and the rules its cells
//! must satisfy. A [`Processor`] then turns every data row of a sheet into a fresh record and
//! reports, per row, everything that was wrong with it. Bad rows are dropped from the result;
//! they never stop the rest of the sheet from being processed.
//!
//! ## Annotations
//!
//! ```text
//! name(<header>);unique(true);date(<in>,<out>);mapping(<raw>:<value>,...)
//! ```
//!
//! - `name(...)`: the column header (trimmed) this field is read from
//! - `unique(true)`: the value must not appear on any other row of the sheet
//! - `date(in,out)`: parse the cell with `in` (local time) and rewrite it with `out`; patterns are
//!   reference layouts such as `01-02-06` / `2006-01-02 15:04:05`, or strftime when they contain `%`
//! - `mapping(k:v,...)`: controlled vocabulary; cells outside it are rejected
//!
//! Cells are trimmed, then checked for uniqueness, date-normalized, translated, and finally
//! coerced into the field (`String`, `bool`, integers, floats, or `Option` of those).
//!
//! ## Quick example
//!
//! ```rust
//! use sheet_mapper::{ErrorKind, Fields, MappingResult, Processor, Record, RowErrors};
//!
//! #[derive(Debug, Clone, Default, serde::Serialize)]
//! struct Statistics {
//!     num: i64,
//! }
//!
//! impl Record for Statistics {
//!     fn describe(fields: &mut Fields<Self>) {
//!         fields.field("num", "name(Quantity)", |s| &mut s.num);
//!     }
//! }
//!
//! #[derive(Debug, Clone, Default, serde::Serialize)]
//! struct Project {
//!     name: String,
//!     start: Option<String>,
//!     status: i32,
//!     statistics: Option<Statistics>,
//!     imported_by: String,
//! }
//!
//! impl Record for Project {
//!     fn describe(fields: &mut Fields<Self>) {
//!         fields
//!             .field("name", "name(Name);unique(true)", |p| &mut p.name)
//!             .field("start", "name(Start);date(01-02-06,2006-01-02)", |p| &mut p.start)
//!             .field("status", "name(Status);mapping(done:1,pending:2)", |p| &mut p.status)
//!             .optional("statistics", |p| &mut p.statistics);
//!     }
//!
//!     fn validate_row(&self, row: &mut RowErrors<'_>) -> MappingResult<()> {
//!         if self.name.len() > 64 {
//!             row.add_error(ErrorKind::Malformed, &["Name"]);
//!         }
//!         Ok(())
//!     }
//! }
//!
//! # fn main() -> MappingResult<()> {
//! let template = Project {
//!     imported_by: "ops".into(),
//!     ..Project::default()
//! };
//! let processor = Processor::new(template, true)?;
//!
//! let rows = vec![
//!     vec!["Name", "Start", "Status", "Quantity"],
//!     vec!["Apollo", "01-15-24", "done", "3"],
//!     vec!["Gemini", "tomorrow", "paused", "x"],
//! ];
//! let report = processor.parse(rows, 1, 2)?;
//!
//! assert_eq!(report.records().len(), 1);
//! assert_eq!(report.records()[0].start.as_deref(), Some("2024-01-15"));
//! assert_eq!(report.records()[0].imported_by, "ops");
//! assert_eq!(
//!     report.row_errors(3).unwrap(),
//!     [
//!         "Start cell has a bad date format",
//!         "Status cell contains illegal input",
//!         "Quantity cell contains illegal input, expected an integer value",
//!     ]
//! );
//! # Ok(())
//! # }
//! ```
//!
//! ## Reading files
//!
//! Workbooks (`.xlsx` and `.xls`, Cargo feature `excel`, on by default) are read with
//! [`ingestion::WorkbookSource`]; CSV with [`ingestion::CsvSource`]. Uploads can be checked with
//! [`ingestion::SpreadsheetFormat::from_path`] and [`ingestion::validate_upload_size`] before
//! decoding.
//!
//! ```no_run
//! # use sheet_mapper::{Fields, Processor, Record};
//! # #[derive(Debug, Clone, Default)]
//! # struct Project { name: String }
//! # impl Record for Project {
//! #     fn describe(fields: &mut Fields<Self>) {
//! #         fields.field("name", "name(Name)", |p| &mut p.name);
//! #     }
//! # }
//! use sheet_mapper::ingestion::WorkbookSource;
//!
//! # fn main() -> sheet_mapper::MappingResult<()> {
//! let processor = Processor::new(Project::default(), false)?;
//! let report = processor.parse(WorkbookSource::from_path("projects.xlsx"), 1, 2)?;
//! for (row, errors) in report.errors() {
//!     eprintln!("row {row}: {}", errors.join(", "));
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`schema`]: the [`Record`] trait, field registration and annotation parsing
//! - [`transform`]: the per-cell pipeline, date layouts and the uniqueness index
//! - [`processor`]: [`Processor`] and its options
//! - [`report`]: [`ParseReport`], row error collection and the error message catalog
//! - [`ingestion`]: row sources, upload admission checks and observers
//! - [`error`]: the fatal error type

pub mod error;
pub mod ingestion;
pub mod processor;
pub mod report;
pub mod schema;
pub mod transform;

pub use error::{MappingError, MappingResult};
pub use processor::{Execution, Processor, ProcessorOptions, RowLayout};
pub use report::{ErrorCatalog, ErrorKind, ParseReport, RowErrors};
pub use schema::{CellField, DuplicateHeaders, Fields, Record};
