#![cfg(feature = "excel")]

//! Workbook decoding (`.xlsx` and legacy `.xls`) into a [`RowMatrix`].
//!
//! Both formats are read natively by `calamine`. One worksheet is read per call. Cells are
//! rendered as text (date cells through [`ReadOptions::date_cell_format`] and
//! [`ReadOptions::datetime_cell_format`]) and rows are rebased so that index 0 is column A / row 1 even when the sheet's
//! used range starts further in. Trailing empty cells are dropped from every row.

use std::fmt::Write as _;
use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use calamine::{Data, Range, Reader, Sheets, open_workbook_auto, open_workbook_auto_from_rs};
use chrono::{NaiveDateTime, Timelike};

use crate::error::{MappingError, MappingResult};

use super::admission::{SpreadsheetFormat, check_upload_size};
use super::{ReadOptions, RowMatrix, RowSource, SheetSelection};

/// Read one worksheet of the workbook at `path`.
///
/// The path must carry an `.xlsx`/`.xls` extension and, when
/// [`ReadOptions::max_upload_bytes`] is set, fit the size limit.
pub fn read_workbook_path(path: impl AsRef<Path>, options: &ReadOptions) -> MappingResult<RowMatrix> {
    let path = path.as_ref();
    SpreadsheetFormat::from_path(path)?;
    if let Some(limit) = options.max_upload_bytes {
        check_upload_size(fs::metadata(path)?.len(), limit)?;
    }
    let mut workbook = open_workbook_auto(path)?;
    read_sheet(&mut workbook, options)
}

/// Read one worksheet of an in-memory workbook. The format is sniffed from the content.
pub fn read_workbook_bytes(bytes: Vec<u8>, options: &ReadOptions) -> MappingResult<RowMatrix> {
    if let Some(limit) = options.max_upload_bytes {
        check_upload_size(bytes.len() as u64, limit)?;
    }
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))?;
    read_sheet(&mut workbook, options)
}

fn read_sheet<RS>(workbook: &mut Sheets<RS>, options: &ReadOptions) -> MappingResult<RowMatrix>
where
    RS: std::io::Read + std::io::Seek,
{
    let range = match &options.sheet {
        SheetSelection::First => workbook
            .worksheet_range_at(0)
            .ok_or_else(|| MappingError::MissingSheet {
                sheet: "<first>".to_string(),
            })??,
        SheetSelection::Named(name) => {
            if !workbook.sheet_names().iter().any(|s| s == name) {
                return Err(MappingError::MissingSheet { sheet: name.clone() });
            }
            workbook.worksheet_range(name)?
        }
    };
    Ok(range_to_rows(&range, options))
}

fn range_to_rows(range: &Range<Data>, options: &ReadOptions) -> RowMatrix {
    let Some((first_row, first_col)) = range.start() else {
        return RowMatrix::new();
    };
    let pad_cols = first_col as usize;

    let mut rows: RowMatrix = vec![Vec::new(); first_row as usize];
    for cells in range.rows() {
        let mut row: Vec<String> = Vec::with_capacity(pad_cols + cells.len());
        row.resize(pad_cols, String::new());
        row.extend(cells.iter().map(|c| cell_to_string(c, options)));
        while row.last().is_some_and(|c| c.is_empty()) {
            row.pop();
        }
        rows.push(row);
    }
    rows
}

fn cell_to_string(c: &Data, options: &ReadOptions) -> String {
    match c {
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => {
            if f.fract() == 0.0 && f.abs() < 1e15 {
                (*f as i64).to_string()
            } else {
                f.to_string()
            }
        }
        Data::Bool(b) => (if *b { "TRUE" } else { "FALSE" }).to_string(),
        Data::DateTime(dt) if dt.is_datetime() => match dt.as_datetime() {
            Some(ndt) if ndt.num_seconds_from_midnight() == 0 => {
                render_date(&ndt, &options.date_cell_format)
            }
            Some(ndt) => render_date(&ndt, &options.datetime_cell_format),
            None => dt.to_string(),
        },
        Data::DateTime(dt) => dt.to_string(),
        Data::DateTimeIso(s) => s.clone(),
        Data::DurationIso(s) => s.clone(),
        Data::Error(e) => format!("{e:?}"),
        Data::Empty => String::new(),
    }
}

// An unusable pattern falls back to ISO 8601 rather than failing the read.
fn render_date(ndt: &NaiveDateTime, pattern: &str) -> String {
    let mut out = String::new();
    match write!(out, "{}", ndt.format(pattern)) {
        Ok(()) => out,
        Err(_) => ndt.to_string(),
    }
}

/// A workbook on disk or in memory, read lazily when the processor asks for rows.
#[derive(Debug, Clone)]
pub struct WorkbookSource {
    origin: Origin,
    options: ReadOptions,
}

#[derive(Debug, Clone)]
enum Origin {
    Path(PathBuf),
    Bytes { name: String, bytes: Vec<u8> },
}

impl WorkbookSource {
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        Self {
            origin: Origin::Path(path.as_ref().to_path_buf()),
            options: ReadOptions::default(),
        }
    }

    /// An uploaded file. `name` is the client-side file name and is checked for an accepted
    /// extension before decoding.
    pub fn from_upload(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            origin: Origin::Bytes {
                name: name.into(),
                bytes,
            },
            options: ReadOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ReadOptions) -> Self {
        self.options = options;
        self
    }
}

impl RowSource for WorkbookSource {
    fn label(&self) -> String {
        match &self.origin {
            Origin::Path(path) => path.display().to_string(),
            Origin::Bytes { name, .. } => name.clone(),
        }
    }

    fn into_rows(self) -> MappingResult<RowMatrix> {
        match self.origin {
            Origin::Path(path) => read_workbook_path(path, &self.options),
            Origin::Bytes { name, bytes } => {
                SpreadsheetFormat::from_path(&name)?;
                read_workbook_bytes(bytes, &self.options)
            }
        }
    }
}
