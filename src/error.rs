use thiserror::Error;

/// Convenience result type for mapping operations.
pub type MappingResult<T> = Result<T, MappingError>;

/// Fatal error returned by processor construction and parsing.
///
/// Row-scoped problems (bad cells, duplicates, vocabulary misses, custom validator findings) are
/// never reported through this type; they accumulate in [`crate::report::ParseReport`] instead.
/// Any `MappingError` aborts the whole call and no partial report is returned.
#[derive(Debug, Error)]
pub enum MappingError {
    /// Underlying I/O error (e.g. file not found, permission denied).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(feature = "excel")]
    /// Workbook decoding error (feature-gated behind `excel`).
    #[error("excel error: {0}")]
    Excel(#[from] calamine::Error),

    /// CSV decoding error.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// The requested worksheet does not exist in the workbook.
    #[error("worksheet '{sheet}' not found")]
    MissingSheet { sheet: String },

    /// The parallel row pool could not be started.
    #[error("thread pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    /// Boundary conversion of accepted records failed.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// The file was refused before decoding (extension or size).
    #[error("file rejected: {message}")]
    Admission { message: String },

    /// The header/data row configuration is invalid.
    #[error("invalid row layout: {message}")]
    InvalidLayout { message: String },

    /// The decoded sheet has fewer rows than the configured data start row.
    #[error("sheet has no data rows: {rows} row(s) decoded, data starts at row {data_start_row}")]
    EmptySheet { rows: usize, data_start_row: usize },

    /// More data rows than the configured cap.
    #[error("data overrun: {rows} data row(s) exceed the limit of {limit}")]
    TooManyRows { rows: usize, limit: usize },

    /// Two fields declare the same header text and the schema rejects duplicates.
    #[error("header '{header}' is declared by both '{first}' and '{second}'")]
    DuplicateHeader {
        header: String,
        first: String,
        second: String,
    },

    /// A field's target kind cannot be assigned from cell text.
    #[error("column '{header}' (field '{path}') has unsupported target kind '{kind}'")]
    UnsupportedField {
        header: String,
        path: String,
        kind: String,
    },

    /// A custom row validator aborted the parse.
    #[error("row {row}: validator failed: {message}")]
    Validator { row: usize, message: String },
}
