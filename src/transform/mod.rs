//! Per-cell transform pipeline.
//!
//! Every cell whose header matches a schema entry runs these stages in order:
//!
//! 1. trim
//! 2. uniqueness check (`unique(true)`)
//! 3. date normalization (`date(in,out)`)
//! 4. vocabulary translation (`mapping(...)`)
//! 5. coercion into the target field
//!
//! Stage failures append a row message and the next stage still runs, with one exception: a
//! vocabulary miss skips coercion so untranslated text never reaches the field. The only fatal
//! outcome is a target kind that cannot be written at all.

pub mod date;
pub mod unique;

use std::borrow::Cow;

use crate::error::{MappingError, MappingResult};
use crate::report::RowErrors;
use crate::schema::{CellError, FieldSpec};

pub use unique::UniquenessIndex;

/// Run the pipeline for one cell, writing into `record` and appending messages to `row`.
pub(crate) fn apply_cell<R>(
    spec: &FieldSpec<R>,
    record: &mut R,
    column: usize,
    raw: &str,
    uniqueness: &UniquenessIndex<'_>,
    row: &mut RowErrors<'_>,
) -> MappingResult<()> {
    let directive = spec.directive();
    let header = directive.header.as_str();
    let mut text = Cow::Borrowed(raw.trim());

    if directive.unique && uniqueness.is_duplicate(column, &text) {
        row.push(format!("{header}[{text}] duplicate"));
    }

    if let Some(date) = directive.date.as_ref().filter(|_| !text.is_empty()) {
        match date.reformat(&text) {
            Some(normalized) => text = Cow::Owned(normalized),
            None => {
                row.push(format!("{header} cell has a bad date format"));
            }
        }
    }

    if let Some(vocabulary) = &directive.vocabulary {
        match vocabulary.translate(&text) {
            Some(canonical) => text = Cow::Owned(canonical.to_string()),
            None => {
                row.push(format!("{header} cell contains illegal input"));
                return Ok(());
            }
        }
    }

    match spec.assign(record, &text) {
        Ok(()) => Ok(()),
        Err(CellError::Mismatch(kind)) => {
            row.push(format!(
                "{header} cell contains illegal input, expected {}",
                kind.expected()
            ));
            Ok(())
        }
        Err(CellError::Unsupported(kind)) => Err(MappingError::UnsupportedField {
            header: header.to_string(),
            path: directive.path.clone(),
            kind: kind.to_string(),
        }),
    }
}
