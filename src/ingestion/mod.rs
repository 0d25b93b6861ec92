//! Row sources: everything that turns an input into a [`RowMatrix`] for the processor.
//!
//! - [`excel`]: `.xlsx` / `.xls` workbooks through `calamine` (feature `excel`)
//! - [`csv`]: delimited text through the `csv` crate
//! - in-memory `Vec<Vec<String>>` / `Vec<Vec<&str>>`
//!
//! [`admission`] holds the checks a file must pass before it is decoded, and [`observability`]
//! the observer hooks the processor reports parse outcomes to.

pub mod admission;
pub mod csv;
#[cfg(feature = "excel")]
pub mod excel;
pub mod observability;

use crate::error::MappingResult;

pub use admission::{
    DEFAULT_MAX_UPLOAD_BYTES, SpreadsheetFormat, check_upload_size, validate_upload_size,
};
pub use self::csv::CsvSource;
#[cfg(feature = "excel")]
pub use excel::{WorkbookSource, read_workbook_bytes, read_workbook_path};
pub use observability::{
    CompositeObserver, FileObserver, ParseContext, ParseObserver, ParseSeverity, ParseStats,
    StdErrObserver,
};

/// Ordered rows of ordered cell strings, as decoded from a sheet.
pub type RowMatrix = Vec<Vec<String>>;

/// Anything the processor can read a full row matrix from.
pub trait RowSource {
    /// Short description used in observer events (a path, a sheet name, ...).
    fn label(&self) -> String;

    /// Decode every row up front.
    fn into_rows(self) -> MappingResult<RowMatrix>;
}

impl RowSource for RowMatrix {
    fn label(&self) -> String {
        "<memory>".to_string()
    }

    fn into_rows(self) -> MappingResult<RowMatrix> {
        Ok(self)
    }
}

impl RowSource for Vec<Vec<&str>> {
    fn label(&self) -> String {
        "<memory>".to_string()
    }

    fn into_rows(self) -> MappingResult<RowMatrix> {
        Ok(self
            .into_iter()
            .map(|row| row.into_iter().map(str::to_string).collect())
            .collect())
    }
}

/// Which worksheet of a workbook to read.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SheetSelection {
    /// The first sheet in workbook order (default).
    #[default]
    First,
    /// A sheet by name.
    Named(String),
}

/// strftime pattern for date cells: Excel's built-in short date (`mm-dd-yy`).
pub const DEFAULT_DATE_CELL_FORMAT: &str = "%m-%d-%y";

/// strftime pattern for date cells that carry a time of day.
pub const DEFAULT_DATETIME_CELL_FORMAT: &str = "%m-%d-%y %H:%M";

/// Options for reading a workbook from a path or from bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadOptions {
    pub sheet: SheetSelection,
    /// Files larger than this are refused before decoding. `None` disables the check.
    pub max_upload_bytes: Option<u64>,
    /// How date cells are rendered to text, so `date(...)` directives see what the sheet shows.
    pub date_cell_format: String,
    /// Same, for date cells with a non-midnight time.
    pub datetime_cell_format: String,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            sheet: SheetSelection::default(),
            max_upload_bytes: Some(DEFAULT_MAX_UPLOAD_BYTES),
            date_cell_format: DEFAULT_DATE_CELL_FORMAT.to_string(),
            datetime_cell_format: DEFAULT_DATETIME_CELL_FORMAT.to_string(),
        }
    }
}
