//! Column-wide value counts backing `unique(true)` checks.

use std::collections::HashMap;
use std::sync::OnceLock;

use crate::ingestion::RowMatrix;

/// Per-parse index of the unique columns of one row matrix.
///
/// Each registered column is counted once, on first use, across *all* rows of the matrix
/// (header rows included). Values are compared trimmed and case-sensitive; empty cells never
/// count. Counting is lazy per column; [`UniquenessIndex::prime`] builds every column up front so
/// the index is read-only while rows are processed concurrently.
#[derive(Debug)]
pub struct UniquenessIndex<'a> {
    rows: &'a RowMatrix,
    columns: HashMap<usize, OnceLock<HashMap<&'a str, usize>>>,
}

impl<'a> UniquenessIndex<'a> {
    pub fn new(rows: &'a RowMatrix, unique_columns: impl IntoIterator<Item = usize>) -> Self {
        Self {
            rows,
            columns: unique_columns
                .into_iter()
                .map(|col| (col, OnceLock::new()))
                .collect(),
        }
    }

    /// Build the counts for every registered column now.
    pub fn prime(&self) {
        for &col in self.columns.keys() {
            self.counts(col);
        }
    }

    /// Whether `value` appears in `column` on some row other than the one holding it.
    ///
    /// Unregistered columns and empty values are never duplicates.
    pub fn is_duplicate(&self, column: usize, value: &str) -> bool {
        if value.is_empty() {
            return false;
        }
        self.counts(column)
            .and_then(|counts| counts.get(value))
            .is_some_and(|&n| n > 1)
    }

    fn counts(&self, column: usize) -> Option<&HashMap<&'a str, usize>> {
        let rows = self.rows;
        self.columns.get(&column).map(|slot| {
            slot.get_or_init(|| {
                let mut counts = HashMap::new();
                for value in rows.iter().filter_map(|row| row.get(column)).map(|c| c.trim()) {
                    if !value.is_empty() {
                        *counts.entry(value).or_insert(0) += 1;
                    }
                }
                counts
            })
        })
    }
}
