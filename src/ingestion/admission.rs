//! Checks applied to an uploaded file before it is decoded.

use std::path::Path;

use crate::error::{MappingError, MappingResult};

/// 500 KiB.
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 500 * 1024;

/// Spreadsheet formats accepted for upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpreadsheetFormat {
    /// Legacy binary workbook.
    Xls,
    /// Office Open XML workbook.
    Xlsx,
}

impl SpreadsheetFormat {
    /// Parse a file extension (case-insensitive, without the dot).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "xls" => Some(Self::Xls),
            "xlsx" => Some(Self::Xlsx),
            _ => None,
        }
    }

    /// Format of `path`, or an admission error naming the accepted extensions.
    pub fn from_path(path: impl AsRef<Path>) -> MappingResult<Self> {
        let path = path.as_ref();
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
            .ok_or_else(|| MappingError::Admission {
                message: format!(
                    "unsupported file format '{}': expected .xlsx or .xls",
                    path.display()
                ),
            })
    }
}

/// Refuse uploads above [`DEFAULT_MAX_UPLOAD_BYTES`].
pub fn validate_upload_size(size: u64) -> MappingResult<()> {
    check_upload_size(size, DEFAULT_MAX_UPLOAD_BYTES)
}

/// Refuse uploads above `limit` bytes.
pub fn check_upload_size(size: u64, limit: u64) -> MappingResult<()> {
    if size > limit {
        return Err(MappingError::Admission {
            message: format!("file is {size} bytes; the maximum upload size is {} KiB", limit / 1024),
        });
    }
    Ok(())
}
