//! Parse results: per-row error lists, accepted records, and the error message catalog.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::{Arc, LazyLock};

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::MappingResult;

/// Kinds of row errors a custom validator can report through [`RowErrors::add_error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Generic failure; also the template used for kinds the catalog does not know.
    Invalid,
    FailedValidation,
    Malformed,
    AlreadyExists,
    DoesNotExist,
    NotInConfiguredSet,
    BadTimeFormat,
    OutOfRange,
    Missing,
    /// Application-defined kind, registered through [`ErrorCatalogBuilder::register`].
    Custom(&'static str),
}

static DEFAULT_CATALOG: LazyLock<ErrorCatalog> = LazyLock::new(|| {
    ErrorCatalog::builder()
        .register(ErrorKind::Invalid, "{} validation failed")
        .register(ErrorKind::FailedValidation, "{} failed validation")
        .register(ErrorKind::Malformed, "{} has an invalid format")
        .register(ErrorKind::AlreadyExists, "{} already exists")
        .register(ErrorKind::DoesNotExist, "{} does not exist")
        .register(ErrorKind::NotInConfiguredSet, "{} is not in the configured set")
        .register(ErrorKind::BadTimeFormat, "{} has a bad time format")
        .register(ErrorKind::OutOfRange, "{} is outside the expected range")
        .register(ErrorKind::Missing, "{} must not be empty")
        .finish()
});

const FALLBACK_TEMPLATE: &str = "{} validation failed";

/// Immutable error kind → message template table.
///
/// Each template has one `{}` placeholder. [`ErrorCatalog::default`] is a shared process-wide
/// table; extend it with [`ErrorCatalog::extend`] before handing it to a processor.
#[derive(Clone)]
pub struct ErrorCatalog {
    templates: Arc<HashMap<ErrorKind, String>>,
}

impl ErrorCatalog {
    /// Start an empty catalog.
    pub fn builder() -> ErrorCatalogBuilder {
        ErrorCatalogBuilder::default()
    }

    /// Start from this catalog's templates and add more.
    pub fn extend(&self) -> ErrorCatalogBuilder {
        ErrorCatalogBuilder {
            templates: (*self.templates).clone(),
        }
    }

    pub fn template(&self, kind: ErrorKind) -> &str {
        self.templates
            .get(&kind)
            .or_else(|| self.templates.get(&ErrorKind::Invalid))
            .map_or(FALLBACK_TEMPLATE, String::as_str)
    }

    /// Fill `kind`'s template with `args` concatenated without separator.
    pub fn render(&self, kind: ErrorKind, args: &[&str]) -> String {
        self.template(kind).replacen("{}", &args.concat(), 1)
    }

    pub fn contains(&self, kind: ErrorKind) -> bool {
        self.templates.contains_key(&kind)
    }
}

impl Default for ErrorCatalog {
    fn default() -> Self {
        DEFAULT_CATALOG.clone()
    }
}

impl fmt::Debug for ErrorCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErrorCatalog")
            .field("templates_len", &self.templates.len())
            .finish()
    }
}

#[derive(Debug, Default)]
pub struct ErrorCatalogBuilder {
    templates: HashMap<ErrorKind, String>,
}

impl ErrorCatalogBuilder {
    /// Set the template for `kind`. Templates without a `{}` placeholder render verbatim.
    pub fn register(mut self, kind: ErrorKind, template: impl Into<String>) -> Self {
        self.templates.insert(kind, template.into());
        self
    }

    pub fn finish(self) -> ErrorCatalog {
        ErrorCatalog {
            templates: Arc::new(self.templates),
        }
    }
}

/// Error list of the row currently being processed.
///
/// Passed to [`crate::schema::Record::validate_row`]; messages land under this row's 1-based
/// number in the [`ParseReport`].
#[derive(Debug)]
pub struct RowErrors<'a> {
    row: usize,
    messages: Vec<String>,
    catalog: &'a ErrorCatalog,
}

impl<'a> RowErrors<'a> {
    pub(crate) fn new(row: usize, catalog: &'a ErrorCatalog) -> Self {
        Self {
            row,
            messages: Vec::new(),
            catalog,
        }
    }

    /// 1-based sheet row number.
    pub fn row(&self) -> usize {
        self.row
    }

    /// Append a catalog message, e.g. `add_error(ErrorKind::Malformed, &["Name"])`.
    pub fn add_error(&mut self, kind: ErrorKind, args: &[&str]) -> &mut Self {
        let message = self.catalog.render(kind, args);
        self.messages.push(message);
        self
    }

    /// Append a preformatted message.
    pub fn push(&mut self, message: impl Into<String>) -> &mut Self {
        self.messages.push(message.into());
        self
    }

    pub fn has_errors(&self) -> bool {
        !self.messages.is_empty()
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    pub(crate) fn into_messages(self) -> Vec<String> {
        self.messages
    }
}

/// Outcome of one successful parse.
///
/// A parse that returns a report may still have row errors: check [`ParseReport::has_error`]
/// before trusting [`ParseReport::records`]. Rejected rows are absent from `records`; accepted
/// records keep sheet order.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseReport<R> {
    errors: BTreeMap<usize, Vec<String>>,
    records: Vec<R>,
    data_rows: usize,
}

impl<R> ParseReport<R> {
    pub(crate) fn new(data_rows: usize) -> Self {
        Self {
            errors: BTreeMap::new(),
            records: Vec::new(),
            data_rows,
        }
    }

    pub(crate) fn accept(&mut self, record: R) {
        self.records.push(record);
    }

    pub(crate) fn reject(&mut self, row: usize, messages: Vec<String>) {
        self.errors.entry(row).or_default().extend(messages);
    }

    pub fn has_error(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Row number (1-based) → messages, for every rejected row.
    pub fn errors(&self) -> &BTreeMap<usize, Vec<String>> {
        &self.errors
    }

    pub fn row_errors(&self, row: usize) -> Option<&[String]> {
        self.errors.get(&row).map(Vec::as_slice)
    }

    /// Total number of messages across all rows.
    pub fn error_count(&self) -> usize {
        self.errors.values().map(Vec::len).sum()
    }

    pub fn rejected_rows(&self) -> usize {
        self.errors.len()
    }

    pub fn records(&self) -> &[R] {
        &self.records
    }

    pub fn into_records(self) -> Vec<R> {
        self.records
    }

    /// Number of data rows the parse visited.
    pub fn data_rows(&self) -> usize {
        self.data_rows
    }
}

impl<R: Serialize> ParseReport<R> {
    /// Re-encode the accepted records into a structurally compatible type via JSON.
    ///
    /// ```rust
    /// # use sheet_mapper::{Fields, Processor, Record};
    /// #[derive(Debug, Clone, Default, serde::Serialize)]
    /// struct Row {
    ///     name: String,
    /// }
    ///
    /// impl Record for Row {
    ///     fn describe(fields: &mut Fields<Self>) {
    ///         fields.field("name", "name(Name)", |r| &mut r.name);
    ///     }
    /// }
    ///
    /// #[derive(serde::Deserialize)]
    /// struct View {
    ///     name: String,
    /// }
    ///
    /// # fn main() -> sheet_mapper::MappingResult<()> {
    /// let processor = Processor::new(Row::default(), false)?;
    /// let report = processor.parse(vec![vec!["Name"], vec!["Ada"]], 1, 2)?;
    /// let views: Vec<View> = report.format()?;
    /// assert_eq!(views[0].name, "Ada");
    /// # Ok(())
    /// # }
    /// ```
    pub fn format<T: DeserializeOwned>(&self) -> MappingResult<T> {
        let value = serde_json::to_value(&self.records)?;
        Ok(serde_json::from_value(value)?)
    }
}
