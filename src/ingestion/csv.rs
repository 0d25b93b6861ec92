//! CSV row source.
//!
//! Every record (header lines included) becomes one row; no header handling happens here since
//! the processor picks the header row itself. Ragged rows are allowed.

use std::io::Read;
use std::path::{Path, PathBuf};

use crate::error::MappingResult;

use super::{RowMatrix, RowSource};

enum Input {
    Path(PathBuf),
    Reader(Box<dyn Read>),
}

/// Delimited text from a file or any reader.
pub struct CsvSource {
    input: Input,
    label: String,
    delimiter: u8,
}

impl CsvSource {
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        Self {
            label: path.display().to_string(),
            input: Input::Path(path),
            delimiter: b',',
        }
    }

    pub fn from_reader(reader: impl Read + 'static) -> Self {
        Self {
            input: Input::Reader(Box::new(reader)),
            label: "<reader>".to_string(),
            delimiter: b',',
        }
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    fn builder(&self) -> csv::ReaderBuilder {
        let mut builder = csv::ReaderBuilder::new();
        builder.has_headers(false).flexible(true).delimiter(self.delimiter);
        builder
    }
}

impl std::fmt::Debug for CsvSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CsvSource")
            .field("label", &self.label)
            .field("delimiter", &(self.delimiter as char))
            .finish()
    }
}

impl RowSource for CsvSource {
    fn label(&self) -> String {
        self.label.clone()
    }

    fn into_rows(self) -> MappingResult<RowMatrix> {
        let builder = self.builder();
        match self.input {
            Input::Path(path) => read_rows(&mut builder.from_path(path)?),
            Input::Reader(reader) => read_rows(&mut builder.from_reader(reader)),
        }
    }
}

fn read_rows<R: Read>(rdr: &mut csv::Reader<R>) -> MappingResult<RowMatrix> {
    let mut rows = RowMatrix::new();
    for result in rdr.records() {
        let record = result?;
        rows.push(record.iter().map(str::to_string).collect());
    }
    Ok(rows)
}
