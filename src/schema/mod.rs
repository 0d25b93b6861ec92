//! Header-to-field mapping derived from a record type's declared annotations.
//!
//! A record type describes its shape once through [`Record::describe`], a type-level walk that
//! never looks at an instance:
//!
//! ```rust
//! use sheet_mapper::schema::{Fields, Record};
//!
//! #[derive(Debug, Clone, Default)]
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
//! #[derive(Debug, Clone, Default)]
//! struct Project {
//!     name: String,
//!     status: i32,
//!     statistics: Option<Statistics>,
//! }
//!
//! impl Record for Project {
//!     fn describe(fields: &mut Fields<Self>) {
//!         fields
//!             .field("name", "name(Name);unique(true)", |p| &mut p.name)
//!             .field("status", "name(Status);mapping(done:1,pending:2)", |p| &mut p.status)
//!             .optional("statistics", |p| &mut p.statistics);
//!     }
//! }
//!
//! let schema = sheet_mapper::schema::Schema::<Project>::build(Default::default()).unwrap();
//! assert_eq!(schema.get("Quantity").unwrap().directive().path, "statistics.num");
//! ```
//!
//! Leaves carry an annotation (see [`directive`]); nested records are registered without one
//! and contribute their own leaves under a dotted path. Un-annotated primitive fields are simply
//! never registered.

pub mod cell;
pub mod directive;

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::fmt;
use std::sync::Arc;

use crate::error::{MappingError, MappingResult};
use crate::report::RowErrors;

pub use cell::{CellError, CellField, FieldKind, Scalar, ScalarKind};
pub use directive::{Annotation, DateSpec, FieldDirective, Vocabulary};

/// A record type that rows are mapped into.
pub trait Record: Clone + Send + Sync + 'static {
    /// Register the annotated leaves and nested records of this type.
    fn describe(fields: &mut Fields<Self>);

    /// Custom per-row validation, run after all cells of a row are assigned.
    ///
    /// Runs only when [`crate::processor::ProcessorOptions::custom_validation`] is set. Append
    /// row errors through `row`; return `Err` only to abort the whole parse. Types without
    /// cross-field rules keep this default no-op.
    fn validate_row(&self, row: &mut RowErrors<'_>) -> MappingResult<()> {
        let _ = row;
        Ok(())
    }
}

type Setter<R> = Arc<dyn Fn(&mut R, &str) -> Result<(), CellError> + Send + Sync>;

/// One schema entry: the parsed directive plus a typed setter for its target field.
pub struct FieldSpec<R> {
    directive: FieldDirective,
    kind: FieldKind,
    setter: Setter<R>,
}

impl<R> FieldSpec<R> {
    pub fn directive(&self) -> &FieldDirective {
        &self.directive
    }

    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    pub(crate) fn assign(&self, record: &mut R, text: &str) -> Result<(), CellError> {
        (self.setter)(record, text)
    }
}

impl<R> Clone for FieldSpec<R> {
    fn clone(&self) -> Self {
        Self {
            directive: self.directive.clone(),
            kind: self.kind,
            setter: Arc::clone(&self.setter),
        }
    }
}

impl<R> fmt::Debug for FieldSpec<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldSpec")
            .field("directive", &self.directive)
            .field("kind", &self.kind)
            .finish()
    }
}

/// Registration sink passed to [`Record::describe`].
pub struct Fields<R> {
    prefix: Option<String>,
    specs: Vec<FieldSpec<R>>,
}

impl<R: 'static> Fields<R> {
    fn under(prefix: Option<String>) -> Self {
        Self {
            prefix,
            specs: Vec::new(),
        }
    }

    fn path_of(&self, name: &str) -> String {
        match &self.prefix {
            Some(prefix) => format!("{prefix}.{name}"),
            None => name.to_string(),
        }
    }

    /// Register an annotated leaf field.
    pub fn field<T: CellField + 'static>(
        &mut self,
        name: &str,
        tag: &str,
        access: fn(&mut R) -> &mut T,
    ) -> &mut Self {
        let setter: Setter<R> = Arc::new(move |record: &mut R, text: &str| access(record).assign(text));
        self.specs.push(FieldSpec {
            directive: Annotation::parse(tag).at(self.path_of(name)),
            kind: T::kind(),
            setter,
        });
        self
    }

    /// Register an un-annotated nested record; its leaves are mapped under `name.`.
    pub fn nested<S: Record>(&mut self, name: &str, access: fn(&mut R) -> &mut S) -> &mut Self {
        for inner in collect::<S>(Some(self.path_of(name))) {
            let setter = inner.setter;
            self.specs.push(FieldSpec {
                directive: inner.directive,
                kind: inner.kind,
                setter: Arc::new(move |record: &mut R, text: &str| setter(access(record), text)),
            });
        }
        self
    }

    /// Register an un-annotated optional nested record.
    ///
    /// Discovery uses only the type; the record is allocated with `S::default()` the first time
    /// one of its leaves is written.
    pub fn optional<S: Record + Default>(
        &mut self,
        name: &str,
        access: fn(&mut R) -> &mut Option<S>,
    ) -> &mut Self {
        for inner in collect::<S>(Some(self.path_of(name))) {
            let setter = inner.setter;
            self.specs.push(FieldSpec {
                directive: inner.directive,
                kind: inner.kind,
                setter: Arc::new(move |record: &mut R, text: &str| {
                    setter(access(record).get_or_insert_with(S::default), text)
                }),
            });
        }
        self
    }
}

fn collect<S: Record>(prefix: Option<String>) -> Vec<FieldSpec<S>> {
    let mut fields = Fields::under(prefix);
    S::describe(&mut fields);
    fields.specs
}

/// What to do when two fields declare the same header text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DuplicateHeaders {
    /// Fail schema construction with [`MappingError::DuplicateHeader`].
    #[default]
    Reject,
    /// The later-declared field replaces the earlier one.
    LastWins,
}

/// Header text → field mapping for one record type.
pub struct Schema<R> {
    specs: Vec<FieldSpec<R>>,
    by_header: HashMap<String, usize>,
}

impl<R: Record> Schema<R> {
    /// Walk `R`'s declaration and index it by header.
    pub fn build(duplicates: DuplicateHeaders) -> MappingResult<Self> {
        let mut specs: Vec<FieldSpec<R>> = Vec::new();
        let mut by_header = HashMap::new();

        for spec in collect::<R>(None) {
            match by_header.entry(spec.directive.header.clone()) {
                Entry::Vacant(slot) => {
                    slot.insert(specs.len());
                    specs.push(spec);
                }
                Entry::Occupied(slot) => match duplicates {
                    DuplicateHeaders::Reject => {
                        return Err(MappingError::DuplicateHeader {
                            header: slot.key().clone(),
                            first: specs[*slot.get()].directive.path.clone(),
                            second: spec.directive.path,
                        });
                    }
                    DuplicateHeaders::LastWins => specs[*slot.get()] = spec,
                },
            }
        }

        Ok(Self { specs, by_header })
    }
}

impl<R> Schema<R> {
    /// Look up a header cell (trimmed before matching).
    pub fn get(&self, header: &str) -> Option<&FieldSpec<R>> {
        self.by_header.get(header.trim()).map(|&i| &self.specs[i])
    }

    /// Entries in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = &FieldSpec<R>> {
        self.specs.iter()
    }

    pub fn headers(&self) -> impl Iterator<Item = &str> {
        self.specs.iter().map(|s| s.directive.header.as_str())
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}

impl<R> Clone for Schema<R> {
    fn clone(&self) -> Self {
        Self {
            specs: self.specs.clone(),
            by_header: self.by_header.clone(),
        }
    }
}

impl<R> fmt::Debug for Schema<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.specs.iter()).finish()
    }
}
